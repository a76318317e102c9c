#[cfg(test)]
#[path = "handler_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use crate::agent::{AgentError, RagAgent};
use crate::config::DocumentsConfig;

/// Inbound request shape. Missing or wrong-typed fields are treated as empty
/// strings before they reach validation.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "string_or_default")]
    pub message: String,
    #[serde(default, deserialize_with = "string_or_default")]
    pub conversation_id: String,
}

fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string).unwrap_or_default())
}

/// Response envelope in the API-gateway shape the outer transport expects.
#[derive(Debug)]
pub struct ApiResponse {
    status_code: u16,
    headers: BTreeMap<String, String>,
    body: String,
}

impl ApiResponse {
    fn new(status_code: u16, body: &Value) -> Self {
        Self {
            status_code,
            headers: cors_headers(),
            body: body.to_string(),
        }
    }

    fn error(status_code: u16, error: &str, message: &str) -> Self {
        Self::new(
            status_code,
            &json!({
                "error": error,
                "message": message,
            }),
        )
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn body_json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_default()
    }
}

fn cors_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
        (
            "Access-Control-Allow-Methods".to_string(),
            "GET, POST, PUT, DELETE, OPTIONS".to_string(),
        ),
        (
            "Access-Control-Allow-Headers".to_string(),
            "Content-Type, Authorization".to_string(),
        ),
    ])
}

/// Maps raw request bodies onto the agent pipeline and converts every outcome
/// to the fixed `{error, message}` envelope: 400 for caller-fixable input,
/// 500 for internal failures. The status mapping lives here and only here.
pub struct Handler {
    agent: RagAgent,
    documents: DocumentsConfig,
}

impl Handler {
    pub fn new(agent: RagAgent) -> Self {
        Self {
            agent,
            documents: DocumentsConfig::default(),
        }
    }

    pub fn with_documents(mut self, documents: DocumentsConfig) -> Self {
        self.documents = documents;
        self
    }

    pub async fn handle_chat(&self, raw_body: &str) -> ApiResponse {
        let request: ChatRequest = match serde_json::from_str(raw_body) {
            Ok(request) => request,
            Err(err) => {
                log::debug!("Rejecting malformed request body: {}", err);
                return ApiResponse::error(
                    400,
                    "invalid_json",
                    "The request body must be valid JSON",
                );
            }
        };

        match self
            .agent
            .chat(&request.message, &request.conversation_id)
            .await
        {
            Ok(reply) => ApiResponse::new(
                200,
                &json!({
                    "message": reply.message,
                    "conversation_id": reply.conversation_id,
                    "timestamp": reply.timestamp.to_rfc3339(),
                    "status": "success",
                }),
            ),
            Err(AgentError::Validation(err)) => {
                ApiResponse::error(400, err.code(), &err.to_string())
            }
            Err(AgentError::Generation(err)) => {
                log::error!("Error processing RAG query: {:?}", err);
                ApiResponse::error(500, "Internal server error", &err.to_string())
            }
        }
    }

    /// Document ingestion endpoint. Processing is not implemented; the
    /// endpoint validates the body and reports the configured resources.
    pub async fn handle_document(&self, raw_body: &str) -> ApiResponse {
        let body: Value = match serde_json::from_str(raw_body) {
            Ok(body) => body,
            Err(err) => {
                log::debug!("Rejecting malformed request body: {}", err);
                return ApiResponse::error(
                    400,
                    "invalid_json",
                    "The request body must be valid JSON",
                );
            }
        };

        let is_empty = match body.as_object() {
            Some(map) => map.is_empty(),
            None => true,
        };
        if is_empty {
            return ApiResponse::error(400, "invalid_request", "Request body is required");
        }

        log::info!(
            "Processing document request: {}",
            body.get("document_id")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
        );

        ApiResponse::new(
            200,
            &json!({
                "message": "Document processing endpoint ready",
                "bucket": self.documents.bucket,
                "table": self.documents.table,
                "status": "success",
            }),
        )
    }
}
