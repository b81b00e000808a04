//! Email tools
//!
//! Thin wrappers over the Gmail REST API: listing messages, drafting
//! replies, and generating reply content through the model invoker.
//! Telos consumes an access token; obtaining one is the caller's problem.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::{Result, TelosError};
use crate::llm::{ModelCall, ModelInvoker};
use crate::tools::{arg_str, arg_u64, Tool};

const GMAIL_API: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Shared Gmail API client used by the email tools
pub struct GmailClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageMetadata {
    id: String,
    #[serde(rename = "threadId")]
    thread_id: String,
    #[serde(default)]
    snippet: String,
    payload: Option<MessagePayload>,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    #[serde(default)]
    headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

impl MessageMetadata {
    fn header(&self, name: &str) -> &str {
        self.payload
            .as_ref()
            .and_then(|p| {
                p.headers
                    .iter()
                    .find(|h| h.name.eq_ignore_ascii_case(name))
            })
            .map(|h| h.value.as_str())
            .unwrap_or("")
    }
}

impl GmailClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(GMAIL_API, token)
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

    async fn list_messages(&self, query: &str, max_results: u64) -> Result<Vec<MessageRef>> {
        let response = self
            .client
            .get(format!("{}/messages", self.base_url))
            .bearer_auth(&self.token)
            .query(&[("q", query), ("maxResults", &max_results.to_string())])
            .send()
            .await
            .map_err(|e| TelosError::tool(format!("Failed to list emails: {}", e)))?;

        if !response.status().is_success() {
            return Err(TelosError::tool(format!(
                "Gmail API returned {}",
                response.status()
            )));
        }

        let list: MessageList = response
            .json()
            .await
            .map_err(|e| TelosError::tool(format!("Invalid Gmail response: {}", e)))?;
        Ok(list.messages)
    }

    async fn get_metadata(&self, message_id: &str) -> Result<MessageMetadata> {
        let response = self
            .client
            .get(format!("{}/messages/{}", self.base_url, message_id))
            .bearer_auth(&self.token)
            .query(&[
                ("format", "metadata"),
                ("metadataHeaders", "From"),
                ("metadataHeaders", "Subject"),
                ("metadataHeaders", "Date"),
                ("metadataHeaders", "Message-ID"),
            ])
            .send()
            .await
            .map_err(|e| TelosError::tool(format!("Failed to read email: {}", e)))?;

        if !response.status().is_success() {
            return Err(TelosError::tool(format!(
                "Gmail API returned {} for message {}",
                response.status(),
                message_id
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TelosError::tool(format!("Invalid Gmail response: {}", e)))
    }

    async fn create_draft(&self, raw: &str, thread_id: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/drafts", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({
                "message": {"raw": raw, "threadId": thread_id}
            }))
            .send()
            .await
            .map_err(|e| TelosError::tool(format!("Failed to create draft: {}", e)))?;

        if !response.status().is_success() {
            return Err(TelosError::tool(format!(
                "Gmail API returned {} creating draft",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| TelosError::tool(format!("Invalid Gmail response: {}", e)))?;
        Ok(body
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string())
    }
}

/// Build the base64url-encoded RFC 2822 payload for a reply draft.
fn encode_reply(to: &str, subject: &str, in_reply_to: &str, body: &str) -> String {
    let subject = if subject.to_ascii_lowercase().starts_with("re:") {
        subject.to_string()
    } else {
        format!("Re: {}", subject)
    };

    let mut message = format!("To: {}\r\nSubject: {}\r\n", to, subject);
    if !in_reply_to.is_empty() {
        message.push_str(&format!(
            "In-Reply-To: {}\r\nReferences: {}\r\n",
            in_reply_to, in_reply_to
        ));
    }
    message.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
    message.push_str(body);

    URL_SAFE_NO_PAD.encode(message)
}

/// Tool that lists recent emails matching a query
pub struct ListEmailsTool {
    gmail: Arc<GmailClient>,
}

impl ListEmailsTool {
    pub fn new(gmail: Arc<GmailClient>) -> Self {
        Self { gmail }
    }
}

#[async_trait]
impl Tool for ListEmailsTool {
    fn name(&self) -> &str {
        "list_emails"
    }

    fn description(&self) -> &str {
        "List recent emails from the inbox, optionally filtered by a Gmail search query"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "max_results".to_string(),
                "int - Maximum number of emails to return (default: 10)".to_string(),
            ),
            (
                "query".to_string(),
                "str - Gmail search query (default: 'is:inbox')".to_string(),
            ),
        ])
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let max_results = arg_u64(args, "max_results").unwrap_or(10);
        let query = arg_str(args, "query").unwrap_or("is:inbox");

        let refs = self.gmail.list_messages(query, max_results).await?;

        let mut emails = Vec::with_capacity(refs.len());
        for message_ref in &refs {
            let meta = self.gmail.get_metadata(&message_ref.id).await?;
            emails.push(json!({
                "message_id": meta.id,
                "thread_id": meta.thread_id,
                "from": meta.header("From"),
                "subject": meta.header("Subject"),
                "date": meta.header("Date"),
                "snippet": meta.snippet,
            }));
        }

        Ok(json!({
            "success": true,
            "query": query,
            "count": emails.len(),
            "emails": emails,
            "message": format!("Found {} emails matching '{}'", emails.len(), query),
        }))
    }
}

/// Tool that creates a Gmail draft replying to an existing message
pub struct CreateDraftReplyTool {
    gmail: Arc<GmailClient>,
}

impl CreateDraftReplyTool {
    pub fn new(gmail: Arc<GmailClient>) -> Self {
        Self { gmail }
    }
}

#[async_trait]
impl Tool for CreateDraftReplyTool {
    fn name(&self) -> &str {
        "create_draft_reply"
    }

    fn description(&self) -> &str {
        "Create a draft reply to an existing email, threaded under the original message"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "message_id".to_string(),
                "str - The ID of the message to reply to".to_string(),
            ),
            (
                "reply_content".to_string(),
                "str - The body text of the reply".to_string(),
            ),
        ])
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let message_id =
            arg_str(args, "message_id").ok_or_else(|| TelosError::tool("No message_id provided"))?;
        let reply_content = arg_str(args, "reply_content")
            .ok_or_else(|| TelosError::tool("No reply_content provided"))?;

        let meta = self.gmail.get_metadata(message_id).await?;
        let raw = encode_reply(
            meta.header("From"),
            meta.header("Subject"),
            meta.header("Message-ID"),
            reply_content,
        );

        let draft_id = self.gmail.create_draft(&raw, &meta.thread_id).await?;

        Ok(json!({
            "success": true,
            "draft_id": draft_id,
            "message_id": message_id,
            "to": meta.header("From"),
            "message": format!("Draft reply created for message {}", message_id),
        }))
    }
}

/// Tool that generates reply text for an email through the model invoker
pub struct GenerateReplyContentTool {
    invoker: Arc<dyn ModelInvoker>,
}

impl GenerateReplyContentTool {
    pub fn new(invoker: Arc<dyn ModelInvoker>) -> Self {
        Self { invoker }
    }
}

#[async_trait]
impl Tool for GenerateReplyContentTool {
    fn name(&self) -> &str {
        "generate_reply_content"
    }

    fn description(&self) -> &str {
        "Generate appropriate reply content for an email based on its text and desired tone"
    }

    fn parameters(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (
                "original_email".to_string(),
                "str - The text of the email being replied to".to_string(),
            ),
            (
                "sender_name".to_string(),
                "str - Name of the original sender".to_string(),
            ),
            (
                "context".to_string(),
                "str - Additional context for the reply (optional)".to_string(),
            ),
            (
                "tone".to_string(),
                "str - Desired tone: 'professional', 'friendly', 'brief' (default: 'professional')".to_string(),
            ),
        ])
    }

    async fn execute(&self, args: &Value) -> Result<Value> {
        let original_email = arg_str(args, "original_email")
            .ok_or_else(|| TelosError::tool("No original_email provided"))?;
        let sender_name = arg_str(args, "sender_name").unwrap_or("the sender");
        let context = arg_str(args, "context").unwrap_or("");
        let tone = arg_str(args, "tone").unwrap_or("professional");

        let schema = json!({
            "type": "object",
            "properties": {
                "reply_content": {"type": "string", "description": "The full text of the reply"},
                "tone_used": {"type": "string", "description": "The tone the reply was written in"}
            },
            "required": ["reply_content", "tone_used"]
        });

        let instructions = "You are an email assistant. Write a reply to the provided email \
                            in the requested tone. Address the sender's questions directly, \
                            keep it concise, and do not invent commitments the user has not made.";

        let result = self
            .invoker
            .invoke(
                ModelCall::new(
                    "email_reply_generator",
                    instructions,
                    json!({
                        "original_email": original_email,
                        "sender_name": sender_name,
                        "context": context,
                        "tone": tone,
                    }),
                )
                .with_schema(&schema),
            )
            .await?;

        Ok(json!({
            "success": true,
            "reply_content": result.get("reply_content").cloned().unwrap_or(Value::Null),
            "tone_used": result.get("tone_used").cloned().unwrap_or(json!(tone)),
            "message": format!("Generated a {} reply to {}", tone, sender_name),
        }))
    }
}

/// Email tools for an agent, given a Gmail token and the invoker
pub fn email_tools(token: impl Into<String>, invoker: Arc<dyn ModelInvoker>) -> Vec<Box<dyn Tool>> {
    let gmail = Arc::new(GmailClient::new(token));
    vec![
        Box::new(ListEmailsTool::new(gmail.clone())),
        Box::new(CreateDraftReplyTool::new(gmail)),
        Box::new(GenerateReplyContentTool::new(invoker)),
    ]
}
