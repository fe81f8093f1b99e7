//! Shared test utilities for the catalog-sync test suite.
//!
//! Provides document builders so tests construct reference/target pairs in a
//! line or two instead of hand-writing JSON, plus small lookup helpers over
//! rebuilt documents.

use crate::model::{Category, IndexDocument, Template};
use serde_json::Map;

// =========================================================================
// Document builders
// =========================================================================

/// A template with a name and a full, consistent set of structural fields.
///
/// Tests mutate individual fields to create mismatches.
pub fn named_template(name: &str) -> Template {
    Template {
        name: Some(name.to_string()),
        title: Some(format!("{name} title")),
        description: Some(format!("{name} description")),
        media_type: Some("image".to_string()),
        media_subtype: Some("webp".to_string()),
        thumbnail_variant: Some("compareSlider".to_string()),
        models: Some(vec![serde_json::json!({"name": format!("{name}.safetensors")})]),
        date: Some("2025-03-01".to_string()),
        tutorial_url: None,
        tags: Some(vec!["Image".to_string()]),
        extra: Map::new(),
    }
}

/// A category holding one [`named_template`] per name.
pub fn category(module_name: &str, template_names: &[&str]) -> Category {
    category_with(
        module_name,
        template_names.iter().map(|n| named_template(n)).collect(),
    )
}

/// A category around an explicit template list.
pub fn category_with(module_name: &str, templates: Vec<Template>) -> Category {
    Category {
        module_name: module_name.to_string(),
        kind: "workflow".to_string(),
        title: format!("{module_name} title"),
        category: None,
        icon: None,
        is_essential: None,
        templates,
        extra: Map::new(),
    }
}

// =========================================================================
// Document lookups — panic with a clear message on miss
// =========================================================================

/// Find a template by name anywhere in a document. Panics if not found.
pub fn find_template<'a>(document: &'a IndexDocument, name: &str) -> &'a Template {
    document
        .iter()
        .flat_map(|c| c.templates.iter())
        .find(|t| t.name.as_deref() == Some(name))
        .unwrap_or_else(|| {
            let names: Vec<&str> = template_names(document);
            panic!("template '{name}' not found. Available: {names:?}")
        })
}

/// All template names in document order (unnamed entries skipped).
pub fn template_names(document: &IndexDocument) -> Vec<&str> {
    document
        .iter()
        .flat_map(|c| c.templates.iter())
        .filter_map(|t| t.name.as_deref())
        .collect()
}

/// Template names within a single category, in order.
pub fn category_template_names(category: &Category) -> Vec<&str> {
    category
        .templates
        .iter()
        .filter_map(|t| t.name.as_deref())
        .collect()
}
