//! Diff computation and fix-mode document rewriting.
//!
//! Reconciliation answers two questions per language, always against the
//! English reference:
//!
//! 1. **Diff** (read-only): which templates are missing, which are extra,
//!    and which structural fields disagree?
//! 2. **Fix** (opt-in): what does a consistent version of this language's
//!    document look like, touching translated content as little as possible?
//!
//! # Fix rules
//!
//! - Missing templates are spliced in as full reference clones — English
//!   title and description included; translation is deferred to a human.
//! - Structural fields always mirror the reference, per field, document-wide.
//! - Translatable fields (`title`, `description`, `tutorialUrl`) are filled
//!   only when absent; the force-text flag upgrades title/description to an
//!   unconditional overwrite.
//! - Tags are additive-only: copied when the target has none, otherwise
//!   preserved even when the sets differ, unless the force-tags flag is set
//!   (equality is compared as sets; the overwrite is a full replace).
//! - Extra templates and extra categories are reported, never removed.
//! - Within every reconciled category, templates are emitted in reference
//!   order so review diffs stay small. Target-only extras follow the
//!   reference-ordered block in their original relative order.
//!
//! The fix never mutates its inputs: each rebuilt category gets a freshly
//! constructed template list, attached only once complete, and the caller
//! receives a whole new document.

use crate::fingerprint::{Extraction, StructuralField};
use crate::matcher;
use crate::model::{Category, IndexDocument, Template};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Switches controlling how far fix mode may intrude on translated content.
/// Both default off; they compose independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixOptions {
    /// Replace translated tags wholesale when the sets differ.
    pub force_tags: bool,
    /// Replace translated title/description with the reference text.
    pub force_text: bool,
}

/// One structural disagreement between reference and target.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralMismatch {
    pub template: String,
    pub field: StructuralField,
    pub reference_value: Value,
    pub current_value: Value,
}

/// Category counts differ between reference and target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCountMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// The diff for one non-reference language.
#[derive(Debug, Default)]
pub struct ReconciliationResult {
    /// Reference templates absent from the target, sorted by name.
    pub missing: Vec<String>,
    /// Target templates absent from the reference, sorted by name.
    pub extra: Vec<String>,
    pub mismatches: Vec<StructuralMismatch>,
    pub category_counts: Option<CategoryCountMismatch>,
}

impl ReconciliationResult {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.extra.is_empty()
            && self.mismatches.is_empty()
            && self.category_counts.is_none()
    }
}

/// Compare two extractions. Pure; order of output is deterministic because
/// fingerprint maps iterate sorted by name.
pub fn diff(reference: &Extraction, current: &Extraction) -> ReconciliationResult {
    let mut result = ReconciliationResult::default();

    for (name, reference_fp) in &reference.fingerprints {
        let Some(current_fp) = current.fingerprints.get(name) else {
            result.missing.push(name.clone());
            continue;
        };
        for field in StructuralField::ALL {
            let reference_value = reference_fp.field_value(field);
            let current_value = current_fp.field_value(field);
            if reference_value != current_value {
                result.mismatches.push(StructuralMismatch {
                    template: name.clone(),
                    field,
                    reference_value,
                    current_value,
                });
            }
        }
    }

    for name in current.fingerprints.keys() {
        if !reference.fingerprints.contains_key(name) {
            result.extra.push(name.clone());
        }
    }

    if reference.categories.len() != current.categories.len() {
        result.category_counts = Some(CategoryCountMismatch {
            expected: reference.categories.len(),
            actual: current.categories.len(),
        });
    }

    result
}

/// One change applied by fix mode. The run-level change manifest hands these
/// to the external change publisher, which needs additions and field fixes
/// distinguished to compose an accurate commit description.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    /// A missing template was spliced in from the reference.
    TemplateAdded { name: String, category: String },
    /// A whole reference category was cloned into the target.
    CategoryCloned { title: String, template_count: usize },
    /// A structural field was overwritten with the reference value.
    FieldSynced {
        template: String,
        field: StructuralField,
    },
    /// Reference tags copied onto a template that had none.
    TagsFilled { template: String },
    /// Translated tags replaced wholesale (force flag).
    TagsForced { template: String },
    /// A missing translatable field was filled with the reference text.
    TextFilled {
        template: String,
        field: &'static str,
    },
    /// A translated field was replaced with the reference text (force flag).
    TextForced {
        template: String,
        field: &'static str,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::TemplateAdded { name, category } => {
                write!(f, "added template \"{name}\" to {category}")
            }
            Change::CategoryCloned {
                title,
                template_count,
            } => write!(
                f,
                "added category \"{title}\" ({template_count} templates)"
            ),
            Change::FieldSynced { template, field } => write!(f, "synced {template}.{field}"),
            Change::TagsFilled { template } => write!(f, "filled tags on \"{template}\""),
            Change::TagsForced { template } => write!(f, "replaced tags on \"{template}\""),
            Change::TextFilled { template, field } => {
                write!(f, "filled {field} on \"{template}\"")
            }
            Change::TextForced { template, field } => {
                write!(f, "replaced {field} on \"{template}\"")
            }
        }
    }
}

/// A rewritten document plus the changes that produced it.
#[derive(Debug)]
pub struct FixOutcome {
    pub document: IndexDocument,
    pub changes: Vec<Change>,
}

impl FixOutcome {
    pub fn is_noop(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Rewrite a target document to restore consistency with the reference.
///
/// Two passes. The first walks reference categories in order, matching each
/// against the *original* target (matches are re-derived per category, never
/// cached, and a claimed target category is never matched twice) and
/// rebuilding matched categories' template lists; reference categories that
/// match nothing but own missing templates are cloned wholesale and
/// appended, deduplicated by reference title so repeated runs don't stack
/// copies. The second pass syncs structural and translatable fields
/// document-wide, so a template sitting in an unmatched category is still
/// repaired in place.
pub fn fix(reference: &IndexDocument, target: &IndexDocument, options: FixOptions) -> FixOutcome {
    let mut changes = Vec::new();

    let target_names: HashSet<&str> = target.iter().flat_map(named).collect();
    let missing: HashSet<&str> = reference
        .iter()
        .flat_map(named)
        .filter(|n| !target_names.contains(n))
        .collect();

    let mut document = target.clone();
    let mut claimed: HashSet<usize> = HashSet::new();
    // Missing names that found a home during the rebuild pass.
    let mut placed: HashSet<String> = HashSet::new();

    for reference_category in reference {
        if let Some(index) = matcher::find_match(reference_category, target, &claimed) {
            claimed.insert(index);
            document[index] = rebuild_category(
                reference_category,
                &target[index],
                &missing,
                &mut changes,
                &mut placed,
            );
        }
    }

    // Clone fallback for missing templates whose category matched nothing.
    let mut existing_titles: HashSet<String> =
        document.iter().map(|c| c.title.clone()).collect();
    for reference_category in reference {
        let owns_leftover = reference_category
            .templates
            .iter()
            .filter_map(|t| t.name.as_deref())
            .any(|n| missing.contains(n) && !placed.contains(n));
        if !owns_leftover || existing_titles.contains(&reference_category.title) {
            continue;
        }
        existing_titles.insert(reference_category.title.clone());
        for name in reference_category.templates.iter().filter_map(|t| t.name.as_deref()) {
            placed.insert(name.to_string());
        }
        changes.push(Change::CategoryCloned {
            title: reference_category.title.clone(),
            template_count: reference_category.templates.len(),
        });
        document.push(reference_category.clone());
    }

    // Field-level sync, document-wide. Freshly spliced clones are already
    // identical to the reference, so this records nothing for them.
    let reference_by_name: HashMap<&str, &Template> = reference
        .iter()
        .flat_map(|c| c.templates.iter())
        .filter_map(|t| t.name.as_deref().filter(|n| !n.is_empty()).map(|n| (n, t)))
        .collect();
    for category in &mut document {
        for template in &mut category.templates {
            let Some(name) = template.name.clone().filter(|n| !n.is_empty()) else {
                continue;
            };
            if let Some(reference_template) = reference_by_name.get(name.as_str()).copied() {
                sync_template(reference_template, template, &name, options, &mut changes);
            }
        }
    }

    FixOutcome { document, changes }
}

/// Non-empty template names of a category, borrowed.
fn named(category: &Category) -> impl Iterator<Item = &str> {
    category
        .templates
        .iter()
        .filter_map(|t| t.name.as_deref())
        .filter(|n| !n.is_empty())
}

/// Build the new template list for a matched category: reference order
/// first, then target-only extras in their original relative order.
/// Category-level structural fields come from the reference; the translated
/// title survives.
fn rebuild_category(
    reference: &Category,
    target: &Category,
    missing: &HashSet<&str>,
    changes: &mut Vec<Change>,
    placed: &mut HashSet<String>,
) -> Category {
    let by_name: HashMap<&str, &Template> = target
        .templates
        .iter()
        .filter_map(|t| t.name.as_deref().filter(|n| !n.is_empty()).map(|n| (n, t)))
        .collect();
    let reference_names: HashSet<&str> = named(reference).collect();

    let mut templates = Vec::with_capacity(reference.templates.len());
    for reference_template in &reference.templates {
        let Some(name) = reference_template.name.as_deref().filter(|n| !n.is_empty()) else {
            continue;
        };
        if let Some(existing) = by_name.get(name) {
            templates.push((*existing).clone());
        } else if missing.contains(name) {
            changes.push(Change::TemplateAdded {
                name: name.to_string(),
                category: reference.module_name.clone(),
            });
            placed.insert(name.to_string());
            templates.push(reference_template.clone());
        }
        // A reference name neither here nor missing lives in another target
        // category; it stays where the translators put it.
    }

    for template in &target.templates {
        let keep = match template.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => !reference_names.contains(name),
            None => true,
        };
        if keep {
            templates.push(template.clone());
        }
    }

    Category {
        module_name: reference.module_name.clone(),
        kind: reference.kind.clone(),
        title: if target.title.is_empty() {
            reference.title.clone()
        } else {
            target.title.clone()
        },
        category: reference.category.clone(),
        icon: reference.icon.clone(),
        is_essential: reference.is_essential,
        templates,
        extra: target.extra.clone(),
    }
}

/// Apply the per-field fix rules to one kept target template.
fn sync_template(
    reference: &Template,
    target: &mut Template,
    name: &str,
    options: FixOptions,
    changes: &mut Vec<Change>,
) {
    // Structural fields always mirror the reference, including removal when
    // the reference dropped a field — anything else leaves a residual
    // mismatch and breaks idempotence.
    if target.media_type != reference.media_type {
        target.media_type = reference.media_type.clone();
        changes.push(synced(name, StructuralField::MediaType));
    }
    if target.media_subtype != reference.media_subtype {
        target.media_subtype = reference.media_subtype.clone();
        changes.push(synced(name, StructuralField::MediaSubtype));
    }
    if target.thumbnail_variant != reference.thumbnail_variant {
        target.thumbnail_variant = reference.thumbnail_variant.clone();
        changes.push(synced(name, StructuralField::ThumbnailVariant));
    }
    if target.models != reference.models {
        target.models = reference.models.clone();
        changes.push(synced(name, StructuralField::Models));
    }
    if target.date != reference.date {
        target.date = reference.date.clone();
        changes.push(synced(name, StructuralField::Date));
    }

    // Tags: additive by default, full replace under the force flag. Set
    // comparison so order and duplicates don't trigger a rewrite.
    if let Some(reference_tags) = &reference.tags {
        if target.tags.is_none() {
            target.tags = Some(reference_tags.clone());
            changes.push(Change::TagsFilled {
                template: name.to_string(),
            });
        } else if options.force_tags {
            let differs = target
                .tags
                .as_ref()
                .is_some_and(|current| !same_tag_set(current, reference_tags));
            if differs {
                target.tags = Some(reference_tags.clone());
                changes.push(Change::TagsForced {
                    template: name.to_string(),
                });
            }
        }
    }

    fill_text(
        "title",
        &reference.title,
        &mut target.title,
        options.force_text,
        name,
        changes,
    );
    fill_text(
        "description",
        &reference.description,
        &mut target.description,
        options.force_text,
        name,
        changes,
    );
    // tutorialUrl is translatable too (localized docs exist) but has no
    // force flag: gap-fill only.
    fill_text(
        "tutorialUrl",
        &reference.tutorial_url,
        &mut target.tutorial_url,
        false,
        name,
        changes,
    );
}

fn synced(template: &str, field: StructuralField) -> Change {
    Change::FieldSynced {
        template: template.to_string(),
        field,
    }
}

fn same_tag_set(a: &[String], b: &[String]) -> bool {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a == b
}

/// Gap-fill a translatable field; overwrite only when `force` is set and the
/// values differ. A translated value present in the target is never removed,
/// even when the reference has none.
fn fill_text(
    field: &'static str,
    reference: &Option<String>,
    target: &mut Option<String>,
    force: bool,
    template: &str,
    changes: &mut Vec<Change>,
) {
    let Some(reference_value) = reference else {
        return;
    };
    match target {
        None => {
            *target = Some(reference_value.clone());
            changes.push(Change::TextFilled {
                template: template.to_string(),
                field,
            });
        }
        Some(current) if force && current != reference_value => {
            *current = reference_value.clone();
            changes.push(Change::TextForced {
                template: template.to_string(),
                field,
            });
        }
        _ => {}
    }
}
