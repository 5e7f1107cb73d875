//! Action Dispatcher
//!
//! Turns one decoded [`Action`] into one user-facing response:
//!
//! ```text
//! Idle ─► Dispatching(action)
//!            ├─► Responded                      (list, missing name, reply)
//!            └─► Resolving ─► Executing ─► Responded
//!                      └────────────────► Responded   (suggestions / not found)
//! ```
//!
//! The catalog is fetched fresh for every action. Directory failures never
//! escape: read failures become a generic apology, write failures a message
//! naming the category. Nothing is retried.

use std::sync::Arc;

use tracing::{info, warn};

use crate::category::{Category, CategoryPatch};
use crate::config::{Credentials, ResolverConfig};
use crate::directory::CategoryDirectory;
use crate::intent::{self, Action, UpdateFields};
use crate::messages::{Locale, Messages};
use crate::resolver::{NameResolver, ResolutionResult};

/// Build the sparse patch for an update.
///
/// `description` applies whenever present, including the empty string.
/// `name`, `slug`, `meta_title`, `meta_description` and `focus_keyphrase`
/// apply only when non-blank; whitespace-only values count as absent.
pub fn build_patch(fields: &UpdateFields) -> CategoryPatch {
    fn non_blank(value: &Option<String>) -> Option<String> {
        value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
    }

    CategoryPatch {
        name: non_blank(&fields.name),
        slug: non_blank(&fields.slug),
        description: fields.description.clone(),
        seo_title: non_blank(&fields.meta_title),
        seo_meta_description: non_blank(&fields.meta_description),
        focus_keyphrase: non_blank(&fields.focus_keyphrase),
    }
}

/// Routes actions to the resolver and the category directory
#[derive(Clone)]
pub struct ActionDispatcher {
    directory: Arc<dyn CategoryDirectory>,
    resolver: NameResolver,
    messages: Messages,
}

impl ActionDispatcher {
    pub fn new(directory: Arc<dyn CategoryDirectory>) -> Self {
        Self {
            directory,
            resolver: NameResolver::default(),
            messages: Messages::default(),
        }
    }

    pub fn with_resolver(mut self, config: ResolverConfig) -> Self {
        self.resolver = NameResolver::new(config);
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.messages = Messages::new(locale);
        self
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Interpret raw LLM text and act on it.
    ///
    /// Returns `None` only for the silent branch (copy without a category
    /// name); every other path produces a message.
    pub async fn dispatch(&self, raw_llm_text: &str, credentials: &Credentials) -> Option<String> {
        self.execute(intent::parse(raw_llm_text), credentials).await
    }

    /// Act on an already decoded action
    pub async fn execute(&self, action: Action, credentials: &Credentials) -> Option<String> {
        if let Some(name) = action.name() {
            info!(
                action = name,
                backend = self.directory.backend_name(),
                "dispatching action"
            );
        }

        match action {
            Action::Reply(text) => Some(text),
            Action::ListCategories => Some(self.list_categories(credentials).await),
            Action::GetCategoryMetadata { category_name } => Some(match category_name {
                Some(name) => self.get_metadata(credentials, &name).await,
                None => self.messages.ask_category_name(),
            }),
            Action::UpdateCategoryMetadata {
                category_name,
                fields,
            } => Some(match category_name {
                Some(name) => self.update_metadata(credentials, &name, &fields).await,
                None => self.messages.ask_category_name(),
            }),
            Action::CopyMetaDescriptionToDescription { category_name } => match category_name {
                Some(name) => Some(self.copy_meta_description(credentials, &name).await),
                None => None,
            },
        }
    }

    async fn list_categories(&self, credentials: &Credentials) -> String {
        match self.directory.list_all(credentials).await {
            Ok(categories) => {
                let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
                self.messages.category_list(&names)
            }
            Err(e) => {
                warn!(error = %e, "listing categories failed");
                self.messages.connection_apology()
            }
        }
    }

    async fn get_metadata(&self, credentials: &Credentials, query: &str) -> String {
        match self.resolve(credentials, query).await {
            Ok(category) => self.messages.category_metadata(&category),
            Err(response) => response,
        }
    }

    async fn update_metadata(
        &self,
        credentials: &Credentials,
        query: &str,
        fields: &UpdateFields,
    ) -> String {
        let category = match self.resolve(credentials, query).await {
            Ok(category) => category,
            Err(response) => return response,
        };

        let patch = build_patch(fields);
        if patch.is_empty() {
            info!(category_id = category.id, "update has nothing to change");
            return self.messages.nothing_to_change(&category.name);
        }

        self.apply(credentials, &category, &patch)
            .await
            .map(|updated| self.messages.update_succeeded(&updated.name))
            .unwrap_or_else(|failure| failure)
    }

    async fn copy_meta_description(&self, credentials: &Credentials, query: &str) -> String {
        let category = match self.resolve(credentials, query).await {
            Ok(category) => category,
            Err(response) => return response,
        };

        let meta = match category.seo.meta_description.as_deref() {
            Some(meta) if !meta.trim().is_empty() => meta.to_string(),
            _ => return self.messages.no_meta_description(&category.name),
        };

        let patch = CategoryPatch {
            description: Some(meta),
            ..Default::default()
        };

        self.apply(credentials, &category, &patch)
            .await
            .map(|updated| self.messages.meta_description_copied(&updated.name))
            .unwrap_or_else(|failure| failure)
    }

    /// Fetch the catalog and resolve `query` to exactly one category.
    ///
    /// `Err` carries the terminal response: apology, suggestions, or not found.
    async fn resolve(&self, credentials: &Credentials, query: &str) -> Result<Category, String> {
        let categories = match self.directory.list_all(credentials).await {
            Ok(categories) => categories,
            Err(e) => {
                warn!(error = %e, "loading categories for resolution failed");
                return Err(self.messages.connection_apology());
            }
        };

        match self.resolver.resolve(&categories, query) {
            ResolutionResult::ExactMatch(category) => Ok(category),
            ResolutionResult::Suggestions(suggestions) if suggestions.is_empty() => {
                Err(self.messages.not_found(query))
            }
            ResolutionResult::Suggestions(suggestions) => {
                let names: Vec<&str> = suggestions.iter().map(|c| c.name.as_str()).collect();
                Err(self.messages.suggestions(query, &names))
            }
        }
    }

    /// Single write attempt. `Err` carries the failure message.
    async fn apply(
        &self,
        credentials: &Credentials,
        category: &Category,
        patch: &CategoryPatch,
    ) -> Result<Category, String> {
        self.directory
            .update(credentials, category.id, patch)
            .await
            .map_err(|e| {
                warn!(category_id = category.id, error = %e, "category update failed");
                self.messages.update_failed(&category.name)
            })
    }
}
