//! S3-compatible object storage for uploaded CVs and published site exports.

use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

const MAX_FILE_NAME_LEN: usize = 80;

#[derive(Clone)]
pub struct Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl Storage {
    /// Constructs a client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "cvsite-static",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        // MinIO only understands path-style addressing.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: config.s3_bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn put(
        &self,
        key: &str,
        body: impl Into<ByteStream>,
        content_type: &str,
    ) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body.into())
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload of {key} failed: {e}")))?;

        info!("Uploaded s3://{}/{}", self.bucket, key);
        Ok(())
    }

    /// Deleting a missing key is not an error on S3.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 delete of {key} failed: {e}")))?;

        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

/// Keeps `[A-Za-z0-9._-]`, maps everything else to `_`, and never returns an empty name.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    let cleaned: String = cleaned.chars().take(MAX_FILE_NAME_LEN).collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

pub fn upload_key(user_id: Uuid, upload_id: Uuid, file_name: &str) -> String {
    format!(
        "uploads/{user_id}/{upload_id}-{}",
        sanitize_file_name(file_name)
    )
}

pub fn site_export_key(domain: &str) -> String {
    format!("sites/{domain}/index.html")
}
