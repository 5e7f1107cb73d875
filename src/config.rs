//! Configuration
//!
//! Everything is read from environment variables (a `.env` file is loaded by
//! the binary). Credentials are held in memory only and never logged.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use url::Url;

use crate::error::ConfigError;
use crate::messages::Locale;

/// Default WordPress taxonomy for WooCommerce product categories
pub const DEFAULT_TAXONOMY: &str = "product_cat";

/// Default HTTP timeout for WordPress calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Yoast SEO term meta keys
pub const DEFAULT_SEO_TITLE_KEY: &str = "_yoast_wpseo_title";
pub const DEFAULT_SEO_METADESC_KEY: &str = "_yoast_wpseo_metadesc";
pub const DEFAULT_SEO_FOCUSKW_KEY: &str = "_yoast_wpseo_focuskw";

/// Maximum number of suggestions returned by the resolver
pub const DEFAULT_MAX_SUGGESTIONS: usize = 5;

/// Minimum similarity for a candidate to be suggested
pub const DEFAULT_MIN_SCORE: f64 = 0.75;

/// Site URL plus application-password auth, supplied by the login collaborator
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub site_url: Url,
    pub username: String,
    application_password: String,
}

impl Credentials {
    pub fn new(
        site_url: Url,
        username: impl Into<String>,
        application_password: impl Into<String>,
    ) -> Self {
        Self {
            site_url,
            username: username.into(),
            application_password: application_password.into(),
        }
    }

    /// Parse the site URL and build credentials
    pub fn parse(site_url: &str, username: &str, application_password: &str) -> Result<Self> {
        let site_url = Url::parse(site_url.trim())
            .with_context(|| format!("Invalid site URL '{}'", site_url))?;
        Ok(Self::new(site_url, username, application_password))
    }

    /// Load from WP_SITE_URL, WP_USERNAME, WP_APP_PASSWORD
    pub fn from_env() -> Result<Self> {
        let site_url = required("WP_SITE_URL")?;
        let username = required("WP_USERNAME")?;
        let password = required("WP_APP_PASSWORD")?;
        Self::parse(&site_url, &username, &password)
    }

    pub fn application_password(&self) -> &str {
        &self.application_password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("site_url", &self.site_url.as_str())
            .field("username", &self.username)
            .field("application_password", &"<redacted>")
            .finish()
    }
}

/// Term meta keys that hold the SEO fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoFieldKeys {
    pub title: String,
    pub meta_description: String,
    pub focus_keyphrase: String,
}

impl Default for SeoFieldKeys {
    fn default() -> Self {
        Self {
            title: DEFAULT_SEO_TITLE_KEY.to_string(),
            meta_description: DEFAULT_SEO_METADESC_KEY.to_string(),
            focus_keyphrase: DEFAULT_SEO_FOCUSKW_KEY.to_string(),
        }
    }
}

/// WordPress REST client settings
#[derive(Debug, Clone)]
pub struct WordPressConfig {
    pub taxonomy: String,
    pub timeout: Duration,
    pub seo_keys: SeoFieldKeys,
}

impl Default for WordPressConfig {
    fn default() -> Self {
        Self {
            taxonomy: DEFAULT_TAXONOMY.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            seo_keys: SeoFieldKeys::default(),
        }
    }
}

impl WordPressConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let timeout_secs: u64 = parsed("WP_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        Ok(Self {
            taxonomy: optional("WP_TAXONOMY").unwrap_or(defaults.taxonomy),
            timeout: Duration::from_secs(timeout_secs),
            seo_keys: SeoFieldKeys {
                title: optional("WP_SEO_TITLE_KEY").unwrap_or(defaults.seo_keys.title),
                meta_description: optional("WP_SEO_METADESC_KEY")
                    .unwrap_or(defaults.seo_keys.meta_description),
                focus_keyphrase: optional("WP_SEO_FOCUSKW_KEY")
                    .unwrap_or(defaults.seo_keys.focus_keyphrase),
            },
        })
    }
}

/// Resolver tunables
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    pub max_suggestions: usize,
    pub min_score: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl ResolverConfig {
    pub fn from_env() -> Result<Self> {
        let max_suggestions = parsed("CATEGORY_AGENT_MAX_SUGGESTIONS", DEFAULT_MAX_SUGGESTIONS)?;
        let min_score: f64 = parsed("CATEGORY_AGENT_MIN_SCORE", DEFAULT_MIN_SCORE)?;
        if !(0.0..=1.0).contains(&min_score) {
            return Err(ConfigError::Invalid {
                key: "CATEGORY_AGENT_MIN_SCORE",
                reason: format!("{} is outside 0.0..=1.0", min_score),
            }
            .into());
        }
        Ok(Self {
            max_suggestions,
            min_score,
        })
    }
}

/// Everything the agent needs to run against one site
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub credentials: Credentials,
    pub wordpress: WordPressConfig,
    pub resolver: ResolverConfig,
    pub locale: Locale,
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let locale = match optional("CATEGORY_AGENT_LOCALE") {
            Some(value) => value.parse::<Locale>().map_err(|e| ConfigError::Invalid {
                key: "CATEGORY_AGENT_LOCALE",
                reason: format!("{}", e),
            })?,
            None => Locale::default(),
        };

        Ok(Self {
            credentials: Credentials::from_env()?,
            wordpress: WordPressConfig::from_env()?,
            resolver: ResolverConfig::from_env()?,
            locale,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(key: &'static str) -> Result<String> {
    optional(key).ok_or_else(|| anyhow::Error::from(ConfigError::Missing(key)))
}

fn parsed<T>(key: &'static str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match optional(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| {
            anyhow::Error::from(ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::parse("https://shop.example.com", "admin", "abcd efgh").unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("abcd efgh"));
        assert_eq!(creds.application_password(), "abcd efgh");
    }

    #[test]
    fn test_credentials_rejects_bad_url() {
        assert!(Credentials::parse("not a url", "admin", "pw").is_err());
    }

    #[test]
    fn test_defaults() {
        let wp = WordPressConfig::default();
        assert_eq!(wp.taxonomy, "product_cat");
        assert_eq!(wp.seo_keys.meta_description, "_yoast_wpseo_metadesc");

        let resolver = ResolverConfig::default();
        assert_eq!(resolver.max_suggestions, 5);
        assert!((resolver.min_score - 0.75).abs() < f64::EPSILON);
    }
}
