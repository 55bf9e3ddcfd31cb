use std::collections::HashMap;

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ParsedResume;
use crate::resume::parse_document;
use crate::state::AppState;
use crate::storage::upload_key;

pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A multipart form split into its file part and its text fields.
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub file: Option<UploadedFile>,
    pub fields: HashMap<String, String>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require_file(self) -> Result<(UploadedFile, HashMap<String, String>), AppError> {
        match self.file {
            Some(file) if !file.data.is_empty() => Ok((file, self.fields)),
            _ => Err(AppError::Validation(format!(
                "multipart field '{FILE_FIELD}' with a non-empty document is required"
            ))),
        }
    }
}

pub async fn read_multipart(mut multipart: Multipart) -> Result<MultipartForm, AppError> {
    let mut form = MultipartForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == FILE_FIELD {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(String::from);
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read uploaded file: {e}")))?;
            form.file = Some(UploadedFile {
                name: file_name,
                content_type,
                data,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

#[derive(Debug, Serialize)]
pub struct StoredFile {
    pub key: String,
    pub name: String,
    pub size: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub file: StoredFile,
}

/// POST /api/resume/parse
///
/// Multipart field `file` (PDF, DOCX or plain text) → structured CV.
pub async fn handle_parse(multipart: Multipart) -> Result<Json<ParsedResume>, AppError> {
    let (file, _) = read_multipart(multipart).await?.require_file()?;
    let size = file.data.len();
    let parsed = parse_document(&file.name, file.content_type.as_deref(), file.data).await?;
    info!(
        "Parsed CV '{}' ({} bytes): {} experience, {} education, {} skills",
        file.name,
        size,
        parsed.experience.len(),
        parsed.education.len(),
        parsed.skills.len()
    );
    Ok(Json(parsed))
}

/// POST /api/upload
///
/// Stores the raw document for the signed-in user.
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let (file, _) = read_multipart(multipart).await?.require_file()?;
    let key = upload_key(user.id, Uuid::new_v4(), &file.name);
    let size = file.data.len();
    let content_type = file
        .content_type
        .clone()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    state.storage.put(&key, file.data, &content_type).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded successfully".to_string(),
        file: StoredFile {
            key,
            name: file.name,
            size,
        },
    }))
}
