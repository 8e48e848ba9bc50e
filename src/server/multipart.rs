use crate::{
    Error, Result,
    uploads::{Upload, UploadStore},
};
use axum::extract::Multipart;
use tracing::debug;

const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// The parts of a file-route form this service cares about.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub prompt: Option<String>,
    pub upload: Option<Upload>,
}

/// Reads the whole form, staging the single file field named `field_name`.
///
/// A repeated or unexpected file field rejects the request; unknown text fields are
/// ignored. Anything already staged is released when an error drops the form.
pub async fn read_upload_form(
    mut multipart: Multipart,
    field_name: &str,
    store: &UploadStore,
) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == field_name {
            if form.upload.is_some() {
                return Err(Error::multipart(format!("Unexpected field: {}", name)));
            }

            let mime_type = field
                .content_type()
                .unwrap_or(DEFAULT_MIME_TYPE)
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| Error::multipart(e.to_string()))?;

            form.upload = Some(store.stage(field_name, &mime_type, &data).await?);
        } else if name == "prompt" {
            let prompt = field
                .text()
                .await
                .map_err(|e| Error::multipart(e.to_string()))?;
            form.prompt = Some(prompt);
        } else if field.file_name().is_some() {
            return Err(Error::multipart(format!("Unexpected field: {}", name)));
        } else {
            debug!("Ignoring multipart field: {}", name);
        }
    }

    Ok(form)
}
