//! Social tools
//!
//! Wrappers over the X API v2: posting an update and searching recent
//! posts. A bearer token is supplied by the caller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::{Result, TelosError};
use crate::tools::{arg_str, arg_u64, Tool};

const X_API: &str = "https://api.x.com/2";

/// Maximum characters accepted for a post
const MAX_POST_LEN: usize = 280;

/// Shared X API client used by the social tools
pub struct XClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    text: String,
    #[serde(default)]
    author_id: Option<String>,
}

impl XClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(X_API, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    async fn post(&self, text: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/tweets", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({"text": text}))
            .send()
            .await
            .map_err(|e| TelosError::tool(format!("Failed to post update: {}", e)))?;

        if !response.status().is_success() {
            return Err(TelosError::tool(format!(
                "X API returned {} posting update",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TelosError::tool(format!("Invalid X API response: {}", e)))?;
        Ok(body
            .pointer("/data/id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }

    async fn search_recent(&self, query: &str, max_results: u64) -> Result<Vec<Post>> {
        // The recent-search endpoint rejects max_results outside 10..=100.
        let max_results = max_results.clamp(10, 100);

        let response = self
            .client
            .get(format!("{}/tweets/search/recent", self.base_url))
            .bearer_auth(&self.token)
            .query(&[
                ("query", query),
                ("max_results", &max_results.to_string()),
                ("tweet.fields", "author_id"),
            ])
            .send()
            .await
            .map_err(|e| TelosError::tool(format!("Failed to search posts: {}", e)))?;

        if !response.status().is_success() {
            return Err(TelosError::tool(format!(
                "X API returned {} searching posts",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| TelosError::tool(format!("Invalid X API response: {}", e)))?;
        Ok(body.data)
    }
}

/// Tool that posts a status update
pub struct PostUpdateTool {
    x: Arc<XClient>,
}

impl PostUpdateTool {
    pub fn new(x: Arc<XClient>) -> Self {
        Self { x }
    }
}

#[async_trait]
impl Tool for PostUpdateTool {
    fn name(&self) -> &str {
        "post_update"
    }

    fn description(&self) -> &str {
        "Post a status update (max 280 characters)"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(
            "text".to_string(),
            "str - The text of the post, at most 280 characters".to_string(),
        )])
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let text = arg_str(args, "text").ok_or_else(|| TelosError::tool("No text provided"))?;

        if text.chars().count() > MAX_POST_LEN {
            return Err(TelosError::tool(format!(
                "Post is {} characters; the limit is {}",
                text.chars().count(),
                MAX_POST_LEN
            )));
        }

        let id = self.x.post(text).await?;

        Ok(json!({
            "success": true,
            "post_id": id,
            "text": text,
            "message": "Update posted",
        }))
    }
}

/// Tool that searches recent posts
pub struct SearchPostsTool {
    x: Arc<XClient>,
}

impl SearchPostsTool {
    pub fn new(x: Arc<XClient>) -> Self {
        Self { x }
    }
}

#[async_trait]
impl Tool for SearchPostsTool {
    fn name(&self) -> &str {
        "search_posts"
    }

    fn description(&self) -> &str {
        "Search recent public posts matching a query"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "query".to_string(),
                "str - The search query (supports X search operators)".to_string(),
            ),
            (
                "max_results".to_string(),
                "int - Maximum number of posts to return (default: 10)".to_string(),
            ),
        ])
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let query = arg_str(args, "query").ok_or_else(|| TelosError::tool("No query provided"))?;
        let max_results = arg_u64(args, "max_results").unwrap_or(10);

        let posts = self.x.search_recent(query, max_results).await?;

        let results: Vec<Value> = posts
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "text": p.text,
                    "author_id": p.author_id,
                })
            })
            .collect();

        Ok(json!({
            "success": true,
            "query": query,
            "count": results.len(),
            "posts": results,
            "message": format!("Found {} posts for '{}'", results.len(), query),
        }))
    }
}

/// Social tools for an agent, given an X API bearer token
pub fn social_tools(token: impl Into<String>) -> Vec<Box<dyn Tool>> {
    let x = Arc::new(XClient::new(token));
    vec![
        Box::new(PostUpdateTool::new(x.clone())),
        Box::new(SearchPostsTool::new(x)),
    ]
}
