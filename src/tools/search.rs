//! Research tools
//!
//! Web search via the DuckDuckGo Instant Answer API, and content analysis
//! that fetches a page and summarizes it through the model invoker.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::{Result, TelosError};
use crate::llm::{ModelCall, ModelInvoker};
use crate::tools::{arg_str, arg_u64, Tool};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

/// Normalize a URL to ensure it has a proper protocol.
pub fn normalize_url(url: &str) -> String {
    if url.starts_with("//") {
        format!("https:{}", url)
    } else if url.starts_with('/') {
        format!("https://duckduckgo.com{}", url)
    } else {
        url.to_string()
    }
}

/// Extract the host of a URL for source attribution.
fn source_of(raw: &str) -> String {
    url::Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "Unknown".to_string())
}

/// DuckDuckGo Instant Answer response (fields we consume)
#[derive(Debug, Deserialize)]
struct InstantAnswer {
    #[serde(rename = "Abstract", default)]
    abstract_text: String,
    #[serde(rename = "Heading", default)]
    heading: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(rename = "AbstractSource", default)]
    abstract_source: String,
    #[serde(rename = "RelatedTopics", default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
struct RelatedTopic {
    #[serde(rename = "Text", default)]
    text: String,
    #[serde(rename = "FirstURL", default)]
    first_url: String,
}

/// Tool for performing web searches using the DuckDuckGo Instant Answer API
pub struct WebSearchTool {
    client: Client,
}

impl WebSearchTool {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information using DuckDuckGo search API"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "query".to_string(),
                "str - The search query to perform. Ideally targeting specific information that is needed.".to_string(),
            ),
            (
                "max_results".to_string(),
                "int - Maximum number of results to return (default: 5)".to_string(),
            ),
        ])
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let query = arg_str(args, "query")
            .ok_or_else(|| TelosError::tool("No search query provided"))?;
        let max_results = arg_u64(args, "max_results").unwrap_or(5) as usize;

        let response = self
            .client
            .get("https://api.duckduckgo.com/")
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_redirect", "1"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| TelosError::tool(format!("Network error during search: {}", e)))?;

        let answer: InstantAnswer = response
            .json()
            .await
            .map_err(|e| TelosError::tool(format!("Search failed: {}", e)))?;

        let mut results = Vec::new();

        if !answer.abstract_text.is_empty() {
            results.push(json!({
                "title": if answer.heading.is_empty() { "Instant Answer" } else { answer.heading.as_str() },
                "url": normalize_url(&answer.abstract_url),
                "snippet": answer.abstract_text,
                "source": if answer.abstract_source.is_empty() { "DuckDuckGo" } else { answer.abstract_source.as_str() },
                "type": "instant_answer",
            }));
        }

        for topic in answer
            .related_topics
            .iter()
            .filter(|t| !t.text.is_empty())
            .take(max_results.saturating_sub(results.len()))
        {
            let url = normalize_url(&topic.first_url);
            results.push(json!({
                "title": topic.text.chars().take(100).collect::<String>(),
                "url": url,
                "snippet": topic.text,
                "source": "DuckDuckGo Related",
                "type": "related_topic",
            }));
        }

        // Instant answers can come back thin; leave the model a search link
        // rather than an empty result set.
        if results.len() < 2 {
            results.push(json!({
                "title": format!("Search Results for: {}", query),
                "url": format!("https://duckduckgo.com/?q={}", query.replace(' ', "+")),
                "snippet": format!(
                    "Search performed for '{}'. Consider using more specific terms or checking multiple sources.",
                    query
                ),
                "source": "Search Engine",
                "type": "search_link",
            }));
        }

        results.truncate(max_results);

        Ok(json!({
            "success": true,
            "query": query,
            "results": results,
            "total_results": results.len(),
            "message": format!("Found {} results for '{}'", results.len(), query),
        }))
    }
}

/// Strip a fetched HTML document down to readable text.
///
/// Drops script/style blocks and tags, collapses whitespace. Good enough
/// for feeding page text to the analysis model.
fn html_to_text(html: &str) -> (String, String) {
    let mut text = String::with_capacity(html.len() / 2);
    let mut title = String::new();

    let mut rest = html;
    let mut in_title = false;
    while let Some(open) = rest.find('<') {
        let chunk = &rest[..open];
        if in_title {
            title.push_str(chunk);
        } else {
            text.push_str(chunk);
            text.push(' ');
        }

        rest = &rest[open..];
        let Some(close) = rest.find('>') else { break };
        let tag = rest[1..close].trim().to_ascii_lowercase();

        if tag.starts_with("script") || tag.starts_with("style") {
            let end = format!("</{}", tag.split_whitespace().next().unwrap_or(""));
            match rest.to_ascii_lowercase().find(&end) {
                Some(idx) => rest = &rest[idx..],
                None => break,
            }
            // Skip past the closing tag on the next pass.
            let Some(close) = rest.find('>') else { break };
            rest = &rest[close + 1..];
            continue;
        }

        in_title = tag == "title";
        rest = &rest[close + 1..];
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (collapsed, title.trim().to_string())
}

fn analysis_instructions(analysis_type: &str, focus_area: &str) -> String {
    let base = "You are a content analysis expert. Analyze the provided web content and provide insights.";

    let body = match analysis_type {
        "summary" => {
            "Provide a concise summary of the main content: key topics and themes, main arguments or findings, important conclusions."
        }
        "facts" => {
            "Extract key facts and data points: specific statistics and numbers, verifiable claims, important dates, names, and places."
        }
        "key_points" => {
            "Identify the key points: main arguments or positions, important conclusions or recommendations, critical insights, in order of importance."
        }
        _ => {
            "Provide a comprehensive analysis: summary of main themes, key facts, important arguments, credibility assessment of the source, and potential biases or limitations."
        }
    };

    let mut instructions = format!("{}\n\n{}", base, body);
    if !focus_area.is_empty() {
        instructions.push_str(&format!(
            "\n\nPay special attention to information related to: {}",
            focus_area
        ));
    }
    instructions
}

/// Tool for fetching a web page and analyzing it through the model invoker
pub struct AnalyzeContentTool {
    client: Client,
    invoker: Arc<dyn ModelInvoker>,
    model: Option<String>,
}

impl AnalyzeContentTool {
    pub fn new(invoker: Arc<dyn ModelInvoker>, model: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            invoker,
            model,
        }
    }
}

#[async_trait]
impl Tool for AnalyzeContentTool {
    fn name(&self) -> &str {
        "analyze_content"
    }

    fn description(&self) -> &str {
        "Fetch and analyze content from web URLs, providing summaries and key insights"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("url".to_string(), "str - The URL to fetch and analyze".to_string()),
            (
                "analysis_type".to_string(),
                "str - Type of analysis: 'summary', 'facts', 'key_points', 'comprehensive' (default: 'comprehensive')".to_string(),
            ),
            (
                "focus_area".to_string(),
                "str - Specific area to focus analysis on (optional)".to_string(),
            ),
        ])
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let raw_url =
            arg_str(args, "url").ok_or_else(|| TelosError::tool("No URL provided for analysis"))?;
        let url = normalize_url(raw_url);
        let analysis_type = arg_str(args, "analysis_type").unwrap_or("comprehensive");
        let focus_area = arg_str(args, "focus_area").unwrap_or("");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| TelosError::tool(format!("Failed to fetch content from URL: {}", e)))?;

        let html = response
            .text()
            .await
            .map_err(|e| TelosError::tool(format!("Failed to read content from URL: {}", e)))?;

        let (mut content, title) = html_to_text(&html);
        // Bound the text handed to the model.
        if content.len() > 8000 {
            let mut end = 8000;
            while !content.is_char_boundary(end) {
                end -= 1;
            }
            content.truncate(end);
            content.push_str("...");
        }

        let instructions = analysis_instructions(analysis_type, focus_area);
        let schema = json!({
            "type": "object",
            "properties": {
                "analysis": {"type": "string", "description": "The analysis of the content"}
            },
            "required": ["analysis"]
        });

        let mut call = ModelCall::new(
            "analyze_web_content",
            &instructions,
            json!({
                "url": url,
                "title": title,
                "content": content,
                "analysis_type": analysis_type,
                "focus_area": focus_area,
            }),
        )
        .with_schema(&schema);
        if let Some(ref model) = self.model {
            call = call.with_model(model);
        }

        let analysis = self.invoker.invoke(call).await?;

        Ok(json!({
            "success": true,
            "url": url,
            "title": title,
            "content_length": content.len(),
            "analysis_type": analysis_type,
            "analysis": analysis.get("analysis").cloned().unwrap_or(analysis),
            "focus_area": if focus_area.is_empty() { "general" } else { focus_area },
            "message": format!("Successfully analyzed content from {}", source_of(&url)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("//example.com/a"),
            "https://example.com/a"
        );
        assert_eq!(
            normalize_url("/l/?kh=-1"),
            "https://duckduckgo.com/l/?kh=-1"
        );
        assert_eq!(normalize_url("https://x.org"), "https://x.org");
    }

    #[test]
    fn test_html_to_text_strips_tags_and_scripts() {
        let html = "<html><head><title>T</title><script>var x = 1;</script></head>\
                    <body><p>Hello</p> <style>p { color: red }</style><p>world</p></body></html>";
        let (text, title) = html_to_text(html);
        assert_eq!(title, "T");
        assert!(text.contains("Hello world"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_source_of() {
        assert_eq!(source_of("https://example.com/page"), "example.com");
        assert_eq!(source_of("not a url"), "Unknown");
    }
}
