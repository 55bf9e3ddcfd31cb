use anyhow::{Context, Result};

const DEFAULT_HF_API_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_HF_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// When unset, sessions live in process memory.
    pub redis_url: Option<String>,
    pub auth_secret: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// When unset, the AI endpoints answer 503.
    pub huggingface_api_key: Option<String>,
    pub huggingface_api_url: String,
    pub huggingface_model: String,
    pub session_ttl_secs: u64,
    pub cookie_secure: bool,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: optional_env("REDIS_URL"),
            auth_secret: require_env("AUTH_SECRET")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            huggingface_api_key: optional_env("HUGGINGFACE_API_KEY"),
            huggingface_api_url: optional_env("HUGGINGFACE_API_URL")
                .unwrap_or_else(|| DEFAULT_HF_API_URL.to_string()),
            huggingface_model: optional_env("HUGGINGFACE_MODEL")
                .unwrap_or_else(|| DEFAULT_HF_MODEL.to_string()),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
            cookie_secure: parse_env("COOKIE_SECURE", false)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Treats an empty value the same as a missing one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default_when_missing() {
        let value: u16 = parse_env("CVSITE_TEST_UNSET_PORT_VALUE", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("CVSITE_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_env("CVSITE_TEST_BAD_PORT", 8080);
        assert!(result.is_err());
    }

    #[test]
    fn test_optional_env_ignores_blank_values() {
        std::env::set_var("CVSITE_TEST_BLANK", "   ");
        assert!(optional_env("CVSITE_TEST_BLANK").is_none());
    }
}
