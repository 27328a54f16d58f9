use thiserror::Error;

use crate::i18n::Locale;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub site: SiteConfig,
    /// Maximum request body size in bytes for admin form submissions
    pub max_upload_size: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Mark the session cookie `Secure` (requires HTTPS in front of the service)
    pub secure_cookies: bool,
}

/// Credentials for the hosted backend. Both values are required.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub locale: Locale,
    /// Emails allowed into the admin panel. Empty means every signed-in user.
    pub admin_emails: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            secure_cookies: false,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            locale: Locale::Ru,
            admin_emails: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = required(&lookup, "SUPABASE_URL")?;
        let anon_key = required(&lookup, "SUPABASE_ANON_KEY")?;

        let bind_address = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string());

        let secure_cookies = lookup("SECURE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let max_upload_size = lookup("MAX_UPLOAD_SIZE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(64 * 1024 * 1024); // 64MB

        let locale = match lookup("SITE_LOCALE") {
            Some(value) => Locale::parse(&value).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "SITE_LOCALE must be one of: ru, en (got '{value}')"
                ))
            })?,
            None => Locale::Ru,
        };

        let admin_emails: Vec<String> = lookup("ADMIN_EMAILS")
            .map(|list| {
                list.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let config = Config {
            server: ServerConfig {
                bind_address,
                secure_cookies,
            },
            backend: BackendConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            },
            site: SiteConfig {
                locale,
                admin_emails,
            },
            max_upload_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.backend.url.starts_with("http://") && !self.backend.url.starts_with("https://") {
            return Err(ConfigError::ValidationError(
                "SUPABASE_URL must be an http(s) URL".to_string(),
            ));
        }

        let video_ceiling = crate::media::MediaKind::Video.max_size();
        if self.max_upload_size < video_ceiling {
            return Err(ConfigError::ValidationError(format!(
                "MAX_UPLOAD_SIZE must be at least {video_ceiling} bytes to accept video uploads"
            )));
        }

        if self.site.admin_emails.is_empty() {
            tracing::warn!(
                "ADMIN_EMAILS is not set. Every authenticated user will be treated as an admin."
            );
        }

        Ok(())
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}
