//! WordPress REST directory
//!
//! Talks to the core taxonomy endpoints (`/wp-json/wp/v2/{taxonomy}`) with an
//! application password over HTTP basic auth. SEO fields are term meta, read
//! from and written to the configured meta keys.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};
use url::Url;

use super::CategoryDirectory;
use crate::category::{Category, CategoryPatch, SeoMeta};
use crate::config::{Credentials, SeoFieldKeys, WordPressConfig};
use crate::error::{DirectoryError, DirectoryResult};

/// Largest page size the WordPress REST API accepts
const PER_PAGE: u32 = 100;

/// Hard stop for pagination
const MAX_PAGES: u32 = 200;

const TOTAL_PAGES_HEADER: &str = "x-wp-totalpages";

/// Term as returned by `context=edit`
#[derive(Debug, Deserialize)]
struct WpTerm {
    id: u64,
    name: String,
    slug: String,
    #[serde(default)]
    description: String,
    /// An object when meta is registered, `[]` when there is none
    #[serde(default)]
    meta: Value,
}

/// WordPress REST error body
#[derive(Debug, Deserialize)]
struct WpError {
    code: Option<String>,
    message: Option<String>,
}

/// Category directory backed by a WordPress site
#[derive(Clone)]
pub struct WordPressDirectory {
    client: reqwest::Client,
    config: WordPressConfig,
}

impl WordPressDirectory {
    pub fn new(config: WordPressConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("category-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &WordPressConfig {
        &self.config
    }

    async fn fetch_page(
        &self,
        credentials: &Credentials,
        page: u32,
    ) -> DirectoryResult<(Vec<WpTerm>, u32)> {
        let url = collection_url(&credentials.site_url, &self.config.taxonomy)
            .map_err(|e| DirectoryError::Connection(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .basic_auth(&credentials.username, Some(credentials.application_password()))
            .query(&[
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("context", "edit".to_string()),
            ])
            .send()
            .await
            .map_err(|e| DirectoryError::Connection(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Connection(describe_failure(status, &body)));
        }

        let total_pages = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(1);

        let terms: Vec<WpTerm> = response
            .json()
            .await
            .map_err(|e| DirectoryError::Connection(format!("invalid category list: {}", e)))?;

        Ok((terms, total_pages))
    }
}

#[async_trait]
impl CategoryDirectory for WordPressDirectory {
    async fn list_all(&self, credentials: &Credentials) -> DirectoryResult<Vec<Category>> {
        let mut categories = Vec::new();
        let mut page = 1;

        loop {
            let (terms, total_pages) = self.fetch_page(credentials, page).await?;
            debug!(page, total_pages, count = terms.len(), "fetched category page");

            let fetched = terms.len();
            categories.extend(
                terms
                    .into_iter()
                    .map(|t| term_to_category(t, &self.config.seo_keys)),
            );

            if page >= total_pages || fetched == 0 {
                break;
            }
            if page >= MAX_PAGES {
                warn!(page, total_pages, "category pagination stopped at page limit");
                break;
            }
            page += 1;
        }

        info!(
            site = credentials.site_url.as_str(),
            count = categories.len(),
            "loaded category catalog"
        );
        Ok(categories)
    }

    async fn update(
        &self,
        credentials: &Credentials,
        id: u64,
        patch: &CategoryPatch,
    ) -> DirectoryResult<Category> {
        let rejected = |reason: String| DirectoryError::Update {
            category_id: id,
            reason,
        };

        let url = item_url(&credentials.site_url, &self.config.taxonomy, id)
            .map_err(|e| rejected(e.to_string()))?;
        let body = patch_body(patch, &self.config.seo_keys);
        debug!(category_id = id, fields = ?body.keys().collect::<Vec<_>>(), "updating category");

        let response = self
            .client
            .post(url)
            .basic_auth(&credentials.username, Some(credentials.application_password()))
            .json(&body)
            .send()
            .await
            .map_err(|e| rejected(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = describe_failure(status, &body);
            warn!(category_id = id, %reason, "category update rejected");
            return Err(rejected(reason));
        }

        let term: WpTerm = response
            .json()
            .await
            .map_err(|e| rejected(format!("invalid update response: {}", e)))?;

        info!(category_id = id, "category updated");
        Ok(term_to_category(term, &self.config.seo_keys))
    }

    fn backend_name(&self) -> &str {
        "WordPress"
    }
}

/// `{site}/wp-json/wp/v2/{taxonomy}`, keeping any sub-directory in the site URL
fn collection_url(site: &Url, taxonomy: &str) -> Result<Url, url::ParseError> {
    let mut base = site.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&format!("wp-json/wp/v2/{}", taxonomy))
}

fn item_url(site: &Url, taxonomy: &str, id: u64) -> Result<Url, url::ParseError> {
    let collection = collection_url(site, taxonomy)?;
    let path = format!("{}/{}", collection.path(), id);
    let mut item = collection;
    item.set_path(&path);
    Ok(item)
}

fn term_to_category(term: WpTerm, keys: &SeoFieldKeys) -> Category {
    let meta = |key: &str| -> Option<String> {
        term.meta
            .as_object()
            .and_then(|m| m.get(key))
            .and_then(meta_string)
    };
    let seo = SeoMeta {
        title: meta(&keys.title),
        meta_description: meta(&keys.meta_description),
        focus_keyphrase: meta(&keys.focus_keyphrase),
    };

    Category {
        id: term.id,
        name: decode_entities(&term.name),
        slug: term.slug,
        description: term.description,
        seo,
    }
}

/// Meta values are strings, or single-element arrays for non-single meta
fn meta_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.first().and_then(meta_string),
        _ => None,
    }
}

/// JSON body carrying only the patched fields
fn patch_body(patch: &CategoryPatch, keys: &SeoFieldKeys) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(name) = &patch.name {
        body.insert("name".into(), Value::String(name.clone()));
    }
    if let Some(slug) = &patch.slug {
        body.insert("slug".into(), Value::String(slug.clone()));
    }
    if let Some(description) = &patch.description {
        body.insert("description".into(), Value::String(description.clone()));
    }

    if patch.touches_seo() {
        let mut meta = Map::new();
        let seo_fields = [
            (&keys.title, &patch.seo_title),
            (&keys.meta_description, &patch.seo_meta_description),
            (&keys.focus_keyphrase, &patch.focus_keyphrase),
        ];
        for (key, value) in seo_fields {
            if let Some(v) = value {
                meta.insert(key.clone(), Value::String(v.clone()));
            }
        }
        body.insert("meta".into(), Value::Object(meta));
    }

    body
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<WpError>(body)
        .ok()
        .map(|e| {
            [e.code, e.message]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(": ")
        })
        .filter(|d| !d.is_empty());

    let prefix = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "authentication rejected",
        _ => "backend error",
    };

    match detail {
        Some(detail) => format!("{} (HTTP {}): {}", prefix, status.as_u16(), detail),
        None => format!("{} (HTTP {})", prefix, status.as_u16()),
    }
}

/// WordPress escapes a handful of characters in term names
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_url_keeps_subdirectory() {
        let site = Url::parse("https://example.com/shop").unwrap();
        assert_eq!(
            collection_url(&site, "product_cat").unwrap().as_str(),
            "https://example.com/shop/wp-json/wp/v2/product_cat"
        );

        let site = Url::parse("https://example.com/").unwrap();
        assert_eq!(
            item_url(&site, "product_cat", 42).unwrap().as_str(),
            "https://example.com/wp-json/wp/v2/product_cat/42"
        );
    }

    #[test]
    fn test_term_with_yoast_meta() {
        let term: WpTerm = serde_json::from_value(serde_json::json!({
            "id": 15,
            "name": "Shoes &amp; Boots",
            "slug": "shoes-boots",
            "description": "Footwear",
            "meta": {
                "_yoast_wpseo_title": "Shoes | Shop",
                "_yoast_wpseo_metadesc": ["Buy shoes online"],
                "_yoast_wpseo_focuskw": ""
            }
        }))
        .unwrap();

        let category = term_to_category(term, &SeoFieldKeys::default());
        assert_eq!(category.id, 15);
        assert_eq!(category.name, "Shoes & Boots");
        assert_eq!(category.seo.title.as_deref(), Some("Shoes | Shop"));
        assert_eq!(
            category.seo.meta_description.as_deref(),
            Some("Buy shoes online")
        );
        assert_eq!(category.seo.focus_keyphrase.as_deref(), Some(""));
    }

    #[test]
    fn test_term_with_empty_meta_array() {
        let term: WpTerm = serde_json::from_value(serde_json::json!({
            "id": 3, "name": "Bags", "slug": "bags", "meta": []
        }))
        .unwrap();
        let category = term_to_category(term, &SeoFieldKeys::default());
        assert_eq!(category.description, "");
        assert_eq!(category.seo, SeoMeta::default());
    }

    #[test]
    fn test_patch_body_only_present_fields() {
        let patch = CategoryPatch {
            description: Some(String::new()),
            seo_title: Some("New Title".to_string()),
            ..Default::default()
        };
        let body = patch_body(&patch, &SeoFieldKeys::default());
        assert_eq!(
            Value::Object(body),
            serde_json::json!({
                "description": "",
                "meta": {"_yoast_wpseo_title": "New Title"}
            })
        );

        let body = patch_body(
            &CategoryPatch {
                slug: Some("s".to_string()),
                ..Default::default()
            },
            &SeoFieldKeys::default(),
        );
        assert!(!body.contains_key("meta"));
    }

    #[test]
    fn test_describe_failure() {
        let body = r#"{"code":"rest_cannot_update","message":"Sorry, you are not allowed to edit this term.","data":{"status":403}}"#;
        assert_eq!(
            describe_failure(StatusCode::FORBIDDEN, body),
            "authentication rejected (HTTP 403): rest_cannot_update: Sorry, you are not allowed to edit this term."
        );
        assert_eq!(
            describe_failure(StatusCode::BAD_GATEWAY, "<html>"),
            "backend error (HTTP 502)"
        );
    }

    #[test]
    fn test_new_directory() {
        let dir = WordPressDirectory::new(WordPressConfig::default()).unwrap();
        assert_eq!(dir.backend_name(), "WordPress");
        assert_eq!(dir.config().taxonomy, "product_cat");
    }
}
