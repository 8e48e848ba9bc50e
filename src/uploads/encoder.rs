use super::Upload;
use crate::{Result, llm::InlineContent};
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Reads a staged upload and wraps it as inline model content.
pub async fn encode(upload: &Upload) -> Result<InlineContent> {
    let bytes = tokio::fs::read(upload.path()).await?;

    Ok(InlineContent {
        mime_type: upload.mime_type().to_string(),
        data: STANDARD.encode(bytes),
    })
}
