//! # Catalog Sync
//!
//! Maintenance tool for a multi-language template catalog: an English
//! reference index (`index.json`) plus translated variants
//! (`index.<lang>.json`) that must stay structurally identical while their
//! translated text diverges.
//!
//! # Architecture: Load → Diff → Fix → Report
//!
//! Every run is a linear pipeline over in-memory documents:
//!
//! ```text
//! 1. Discover   templates/        →  reference + language files
//! 2. Extract    documents         →  structural fingerprints per template
//! 3. Reconcile  fingerprints      →  missing / extra / mismatch diff
//! 4. Fix        (opt-in)          →  rewritten language documents
//! 5. Report     results           →  stdout + exit status
//! ```
//!
//! The diff and fix stages are pure functions over already-loaded documents.
//! File I/O happens only at the edges (load everything first, write each
//! fixed document in a single call once it is fully built), so an
//! interrupted run never leaves a half-written index behind.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`model`] | Serde types for one language's index document |
//! | [`fingerprint`] | Structural projection of templates + data-quality warnings |
//! | [`matcher`] | Fuzzy category alignment via template-name overlap |
//! | [`reconcile`] | Diff computation and fix-mode document rewriting |
//! | [`store`] | Index file discovery, loading, and stable pretty-printed saving |
//! | [`run`] | Per-language orchestration, error accumulation, change manifest |
//! | [`report`] | Rendering of run results into the CLI report |
//!
//! # Design Decisions
//!
//! ## Structural vs. Translatable Fields
//!
//! A template's `mediaType`, `mediaSubtype`, `thumbnailVariant`, `models`,
//! and `date` must be byte-identical in every language — they drive the
//! gallery UI, not the copy. `title`, `description`, `tutorialUrl`, and
//! `tags` are expected to differ per language and are never overwritten
//! except to fill a gap (or when a force flag says otherwise). The split is
//! encoded once, in [`fingerprint::StructuralField`], and every comparison
//! and fix flows through it.
//!
//! ## Name-Overlap Category Matching
//!
//! Categories carry a stable `moduleName`, but historical language files
//! renamed modules freely, so the matcher joins categories by template-name
//! overlap instead: `|R ∩ T| / max(|R|, |T|)`, accepted at ≥ 0.5. The
//! denominator is `max`, not the union — deliberately asymmetric so a small
//! category fully contained in a large one still scores low. One matching
//! strategy is used everywhere; the exact `type`+`category` fallback the
//! original maintenance scripts grew is gone.
//!
//! ## Whole-Document Rewrites
//!
//! Fix mode never patches a document in place. Each reconciled category gets
//! a freshly built template list (reference order first, target-only extras
//! appended), and the file is replaced wholesale with stable 2-space
//! formatting. Rewrites are idempotent: fixing the fixer's own output is a
//! no-op, so repeated CI runs produce empty diffs.
//!
//! ## Report Once, Exit Once
//!
//! Nothing aborts mid-run except a missing reference document. Load
//! failures, write failures, and data-quality warnings are accumulated per
//! language and rendered together; the exit status is derived from the
//! complete picture.

pub mod fingerprint;
pub mod matcher;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod run;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
