//! Category name resolution
//!
//! Two-phase lookup used by every category-addressing action:
//!
//! 1. Exact match - case-insensitive equality after Unicode NFKC folding and
//!    whitespace collapsing. First match in catalog order wins.
//! 2. Suggestions - Jaro-Winkler similarity (strsim) on a punctuation-folded
//!    form, boosted when one name contains the other starting at a word
//!    boundary. Ranked best first, filtered by a minimum score, truncated to
//!    a small limit.
//!
//! An exact match always suppresses suggestions. An empty suggestion list is
//! the "not found" outcome.

use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use crate::category::Category;
use crate::config::ResolverConfig;

/// Floor for a containment hit, before the length-ratio bonus
const CONTAINMENT_BASE: f64 = 0.85;

/// Outcome of resolving a user-supplied name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    ExactMatch(Category),
    /// Ranked candidates, best first. Empty means not found.
    Suggestions(Vec<Category>),
}

impl ResolutionResult {
    pub fn exact(&self) -> Option<&Category> {
        match self {
            ResolutionResult::ExactMatch(c) => Some(c),
            ResolutionResult::Suggestions(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolutionResult::Suggestions(s) if s.is_empty())
    }
}

/// Normalize a name for exact comparison: NFKC, lowercase, collapsed whitespace
pub fn normalize_name(s: &str) -> String {
    let folded: String = s.nfkc().collect();
    folded
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Looser form for similarity scoring: punctuation becomes whitespace
///
/// ```
/// use category_agent::resolver::fold_for_similarity;
///
/// assert_eq!(fold_for_similarity("T-Shirts & Tops"), "t shirts tops");
/// ```
pub fn fold_for_similarity(s: &str) -> String {
    let folded: String = s.nfkc().collect();
    let stripped: String = folded
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    stripped
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity between two folded names in 0.0..=1.0
pub fn similarity(query: &str, candidate: &str) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let jw = strsim::jaro_winkler(query, candidate);

    let (shorter, longer) = if query.chars().count() <= candidate.chars().count() {
        (query, candidate)
    } else {
        (candidate, query)
    };
    if starts_a_word_in(longer, shorter) {
        let ratio = shorter.chars().count() as f64 / longer.chars().count() as f64;
        let containment = CONTAINMENT_BASE + (1.0 - CONTAINMENT_BASE) * ratio;
        return jw.max(containment);
    }

    jw
}

/// True when `needle` occurs in `haystack` starting at a word boundary.
/// Both are folded, so words are separated by single spaces.
fn starts_a_word_in(haystack: &str, needle: &str) -> bool {
    haystack
        .match_indices(needle)
        .any(|(i, _)| i == 0 || haystack[..i].ends_with(' '))
}

/// Name resolver over a freshly fetched catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct NameResolver {
    config: ResolverConfig,
}

impl NameResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Resolve `query` against `categories`
    pub fn resolve(&self, categories: &[Category], query: &str) -> ResolutionResult {
        let wanted = normalize_name(query);
        if wanted.is_empty() {
            return ResolutionResult::Suggestions(vec![]);
        }

        if let Some(found) = categories.iter().find(|c| normalize_name(&c.name) == wanted) {
            debug!(query, category_id = found.id, "exact category match");
            return ResolutionResult::ExactMatch(found.clone());
        }

        let folded_query = fold_for_similarity(query);
        let mut scored: Vec<(&Category, f64)> = categories
            .iter()
            .map(|c| (c, similarity(&folded_query, &fold_for_similarity(&c.name))))
            .filter(|(_, score)| *score >= self.config.min_score)
            .collect();

        // Stable sort keeps catalog order among equal scores
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.config.max_suggestions);

        debug!(
            query,
            suggestions = scored.len(),
            top_score = scored.first().map(|(_, s)| *s).unwrap_or(0.0),
            "no exact category match"
        );

        ResolutionResult::Suggestions(scored.into_iter().map(|(c, _)| c.clone()).collect())
    }
}

/// Resolve with default limits
pub fn resolve(categories: &[Category], query: &str) -> ResolutionResult {
    NameResolver::default().resolve(categories, query)
}
