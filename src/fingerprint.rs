//! Structural extraction: the language-agnostic projection of a document.
//!
//! A template's [`StructuralFingerprint`] contains only the fields that must
//! be identical across every language, plus the name. Fingerprints exist for
//! equality comparison during reconciliation and are never persisted.
//!
//! Extraction also produces per-category summaries and data-quality
//! warnings. Two shapes of bad data are surfaced instead of silently
//! dropped:
//!
//! - templates with no `name` (they cannot participate in matching at all)
//! - duplicate names across categories (`name` is the global join key; on a
//!   duplicate the later entry wins in the fingerprint map, matching how the
//!   index generator resolves them)

use crate::model::{IndexDocument, Template};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// The five template fields required identical across all languages.
///
/// Everything diff and fix do to structural data is driven by iterating
/// [`StructuralField::ALL`], so adding a sixth field is a one-line change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralField {
    MediaType,
    MediaSubtype,
    ThumbnailVariant,
    Models,
    Date,
}

impl StructuralField {
    pub const ALL: [StructuralField; 5] = [
        StructuralField::MediaType,
        StructuralField::MediaSubtype,
        StructuralField::ThumbnailVariant,
        StructuralField::Models,
        StructuralField::Date,
    ];

    /// JSON key for this field, as it appears in index documents.
    pub fn key(&self) -> &'static str {
        match self {
            StructuralField::MediaType => "mediaType",
            StructuralField::MediaSubtype => "mediaSubtype",
            StructuralField::ThumbnailVariant => "thumbnailVariant",
            StructuralField::Models => "models",
            StructuralField::Date => "date",
        }
    }
}

impl fmt::Display for StructuralField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Projection of one template onto its structural fields.
///
/// `models` comparison is element-wise and order-sensitive: a benign
/// reordering by the index generator shows up as a mismatch. That is
/// intentional — reordering is otherwise invisible — but it is a known
/// source of false positives.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralFingerprint {
    pub name: String,
    pub media_type: Option<String>,
    pub media_subtype: Option<String>,
    pub thumbnail_variant: Option<String>,
    pub models: Option<Vec<Value>>,
    pub date: Option<String>,
}

impl StructuralFingerprint {
    fn of(name: &str, template: &Template) -> Self {
        StructuralFingerprint {
            name: name.to_string(),
            media_type: template.media_type.clone(),
            media_subtype: template.media_subtype.clone(),
            thumbnail_variant: template.thumbnail_variant.clone(),
            models: template.models.clone(),
            date: template.date.clone(),
        }
    }

    /// The value of one structural field as JSON, for comparison and display.
    /// Absent fields render as `null`.
    pub fn field_value(&self, field: StructuralField) -> Value {
        match field {
            StructuralField::MediaType => opt_str(&self.media_type),
            StructuralField::MediaSubtype => opt_str(&self.media_subtype),
            StructuralField::ThumbnailVariant => opt_str(&self.thumbnail_variant),
            StructuralField::Models => match &self.models {
                Some(models) => Value::Array(models.clone()),
                None => Value::Null,
            },
            StructuralField::Date => opt_str(&self.date),
        }
    }
}

fn opt_str(value: &Option<String>) -> Value {
    match value {
        Some(s) => Value::String(s.clone()),
        None => Value::Null,
    }
}

/// A data-quality problem found during extraction.
///
/// Warnings never stop a run and never fail it on their own; they are
/// rendered in the report so someone fixes the source data.
#[derive(Debug, Clone, PartialEq)]
pub enum DataWarning {
    /// A template with no `name` — excluded from all matching and diffing.
    UnnamedTemplate { category: String },
    /// Two templates share a name; the join key is supposed to be unique.
    DuplicateName {
        name: String,
        first_category: String,
        second_category: String,
    },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::UnnamedTemplate { category } => {
                write!(f, "template without a name in category \"{category}\"")
            }
            DataWarning::DuplicateName {
                name,
                first_category,
                second_category,
            } => write!(
                f,
                "duplicate template name \"{name}\" in \"{first_category}\" and \"{second_category}\""
            ),
        }
    }
}

/// Per-category roll-up used for reporting.
#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub module_name: String,
    pub title: String,
    pub kind: String,
    pub template_count: usize,
}

/// Everything extraction derives from one document.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Template name → structural fingerprint. BTreeMap so diff output is
    /// deterministic without a separate sort.
    pub fingerprints: BTreeMap<String, StructuralFingerprint>,
    pub categories: Vec<CategorySummary>,
    pub warnings: Vec<DataWarning>,
}

/// Build the fingerprint map and category summaries for a document.
pub fn extract(document: &IndexDocument) -> Extraction {
    let mut extraction = Extraction::default();
    // name → owning category title, for duplicate detection
    let mut seen: BTreeMap<String, String> = BTreeMap::new();

    for category in document {
        extraction.categories.push(CategorySummary {
            module_name: category.module_name.clone(),
            title: category.title.clone(),
            kind: category.kind.clone(),
            template_count: category.templates.len(),
        });

        let owner = if category.title.is_empty() {
            category.module_name.clone()
        } else {
            category.title.clone()
        };

        for template in &category.templates {
            let Some(name) = template.name.as_deref().filter(|n| !n.is_empty()) else {
                extraction.warnings.push(DataWarning::UnnamedTemplate {
                    category: owner.clone(),
                });
                continue;
            };

            if let Some(first) = seen.get(name) {
                extraction.warnings.push(DataWarning::DuplicateName {
                    name: name.to_string(),
                    first_category: first.clone(),
                    second_category: owner.clone(),
                });
            } else {
                seen.insert(name.to_string(), owner.clone());
            }

            // Later entries win on duplicates.
            extraction
                .fingerprints
                .insert(name.to_string(), StructuralFingerprint::of(name, template));
        }
    }

    extraction
}
