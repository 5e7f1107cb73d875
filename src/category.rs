//! Category records and sparse patches
//!
//! A [`Category`] is a transient copy of a backend record, fetched per
//! action. A [`CategoryPatch`] names only the fields a write should touch.

use serde::{Deserialize, Serialize};

/// SEO metadata attached to a category. Every field may be absent or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeoMeta {
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub focus_keyphrase: Option<String>,
}

/// A WordPress product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(default)]
    pub seo: SeoMeta,
}

impl Category {
    /// Bare category with empty description and no SEO data
    pub fn new(id: u64, name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            slug: slug.into(),
            description: String::new(),
            seo: SeoMeta::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_seo(mut self, seo: SeoMeta) -> Self {
        self.seo = seo;
        self
    }

    /// Apply a patch in place. Absent fields are left untouched.
    pub fn apply(&mut self, patch: &CategoryPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(slug) = &patch.slug {
            self.slug = slug.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(title) = &patch.seo_title {
            self.seo.title = Some(title.clone());
        }
        if let Some(meta) = &patch.seo_meta_description {
            self.seo.meta_description = Some(meta.clone());
        }
        if let Some(keyphrase) = &patch.focus_keyphrase {
            self.seo.focus_keyphrase = Some(keyphrase.clone());
        }
    }
}

/// Sparse update payload.
///
/// `None` leaves a field untouched; `Some("")` overwrites it with an empty
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seo_meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_keyphrase: Option<String>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.description.is_none()
            && self.seo_title.is_none()
            && self.seo_meta_description.is_none()
            && self.focus_keyphrase.is_none()
    }

    /// True if any SEO field is present
    pub fn touches_seo(&self) -> bool {
        self.seo_title.is_some()
            || self.seo_meta_description.is_some()
            || self.focus_keyphrase.is_some()
    }
}
