//! Serde types for one language's index document.
//!
//! The index file root is a JSON array of categories, each holding an ordered
//! list of templates. These types are shared by every stage (extract, diff,
//! fix, save) and must round-trip files losslessly: keys this tool doesn't
//! model are captured in flattened `extra` maps and written back untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One language's full index: an ordered sequence of categories.
pub type IndexDocument = Vec<Category>;

/// A gallery category and its templates.
///
/// `moduleName` is the stable, language-invariant identifier; `title` is
/// translated per language. Category matching joins on template-name overlap
/// rather than `moduleName` (see [`crate::matcher`]), but the field is
/// carried through every rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub module_name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Translated display title. Defaults to empty when absent so malformed
    /// entries still load; the reconciler falls back to the reference title.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_essential: Option<bool>,
    #[serde(default)]
    pub templates: Vec<Template>,
    /// Unmodeled keys, preserved verbatim across rewrites.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A single workflow template entry.
///
/// Structural fields (`media_type`, `media_subtype`, `thumbnail_variant`,
/// `models`, `date`) must be identical across all languages. Translatable
/// fields (`title`, `description`, `tutorial_url`, `tags`) are expected to
/// differ and are only ever filled, never overwritten, unless forced.
///
/// `name` is the global join key — unique across the whole document — but is
/// modeled as optional because historical data contains unnamed entries.
/// Those are excluded from matching and surfaced as warnings rather than
/// silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_variant: Option<String>,
    /// Model references. Entries are arbitrary JSON objects; comparison is
    /// element-wise and order-sensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutorial_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Unmodeled keys (e.g. computed `size`), preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
