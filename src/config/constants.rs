/// Hard cap applied by sanitization before any other check
pub const SANITIZE_MAX_LENGTH: usize = 50_000;

/// Max message length after sanitization
pub const MAX_MESSAGE_LENGTH: usize = 10_000;

/// Max conversation identifier length
pub const MAX_CONVERSATION_ID_LENGTH: usize = 256;

/// History window size handed to the generation prompt
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Stand-ins for the provisioned document resources
pub const DOCUMENT_BUCKET: &str = "ragline-documents";

pub const EMBEDDINGS_TABLE: &str = "ragline-embeddings";

pub const SYSTEM_PROMPT: &str = r#"You are an intelligent RAG (Retrieval-Augmented Generation) assistant.

Your capabilities include:
- Searching through uploaded documents to find relevant information
- Maintaining conversation context across multiple interactions

When users ask questions:
1. First search through the available documents for relevant information
2. Use the conversation history to maintain context
3. Provide comprehensive, accurate answers based on the retrieved information

Always be helpful, accurate, and cite your sources when referencing document content."#;
