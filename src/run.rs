//! Per-language orchestration: load, reconcile, optionally fix, accumulate.
//!
//! One run processes languages sequentially in a fixed (sorted) order. The
//! reference document is loaded once and treated as immutable; each
//! language's reconciliation is independent pure computation plus at most
//! one file write. Only a missing or unreadable reference aborts the run —
//! everything else (load failures, write failures, data-quality warnings)
//! is recorded on the language's outcome and processing continues, so the
//! final report always shows the complete picture.
//!
//! The run also assembles the input for the external change publisher: the
//! list of files actually modified plus per-language [`Change`] lists, which
//! distinguish template additions from structural field fixes so a commit
//! message can describe both accurately.

use crate::fingerprint::{self, DataWarning, Extraction};
use crate::model::IndexDocument;
use crate::reconcile::{self, Change, FixOptions, ReconciliationResult};
use crate::store::{self, StoreError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// What a run should do and where.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub templates_dir: PathBuf,
    /// `Some` enables fix mode; `None` is read-only validation.
    pub fix: Option<FixOptions>,
    /// Explicit language codes. Empty means "whatever index.<lang>.json
    /// files exist". Naming a language with no file is not an error: fix
    /// mode seeds it from an empty document and creates the file.
    pub languages: Vec<String>,
}

/// Why a run could not even start.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("cannot read templates directory {dir}: {source}")]
    Discovery {
        dir: PathBuf,
        #[source]
        source: StoreError,
    },
    #[error("reference index {path} not found — nothing to reconcile against")]
    MissingReference { path: PathBuf },
    #[error("cannot load reference index {path}: {source}")]
    UnreadableReference {
        path: PathBuf,
        #[source]
        source: StoreError,
    },
}

/// Everything that happened to one language.
#[derive(Debug)]
pub struct LanguageOutcome {
    pub language: String,
    pub file: PathBuf,
    /// `None` when the document failed to load.
    pub result: Option<ReconciliationResult>,
    pub load_error: Option<String>,
    pub warnings: Vec<DataWarning>,
    /// Fixes applied (fix mode only).
    pub changes: Vec<Change>,
    /// The fixed document was written back.
    pub written: bool,
    pub write_error: Option<String>,
}

impl LanguageOutcome {
    /// A language is clean when it loaded, its post-fix diff is empty, and
    /// any write succeeded. Data-quality warnings don't fail a language on
    /// their own.
    pub fn is_clean(&self) -> bool {
        self.load_error.is_none()
            && self.write_error.is_none()
            && self.result.as_ref().is_some_and(|r| r.is_clean())
    }
}

/// The complete result of one run, for rendering and exit-status decisions.
#[derive(Debug)]
pub struct RunReport {
    pub reference_file: PathBuf,
    pub reference_template_count: usize,
    pub reference_warnings: Vec<DataWarning>,
    pub fix_mode: bool,
    pub languages: Vec<LanguageOutcome>,
}

impl RunReport {
    /// Success indicator, usable directly as the exit status.
    pub fn is_clean(&self) -> bool {
        self.languages.iter().all(LanguageOutcome::is_clean)
    }

    /// Files modified by fix mode, for the change publisher. A language
    /// whose write failed is excluded — its on-disk file didn't change.
    pub fn modified_files(&self) -> Vec<&Path> {
        self.languages
            .iter()
            .filter(|l| l.written)
            .map(|l| l.file.as_path())
            .collect()
    }
}

/// Execute one full run over a templates directory.
pub fn run(options: &RunOptions) -> Result<RunReport, RunError> {
    let dir = &options.templates_dir;
    let discovery = store::discover(dir).map_err(|source| RunError::Discovery {
        dir: dir.clone(),
        source,
    })?;

    let reference_file = discovery
        .reference
        .clone()
        .ok_or_else(|| RunError::MissingReference {
            path: dir.join(store::REFERENCE_FILE),
        })?;
    let reference_document =
        store::load(&reference_file).map_err(|source| RunError::UnreadableReference {
            path: reference_file.clone(),
            source,
        })?;
    let reference = fingerprint::extract(&reference_document);

    // Sorted language → file map: discovered files, plus any explicitly
    // requested languages (which may not exist on disk yet).
    let mut files: BTreeMap<String, PathBuf> = discovery.languages;
    for language in &options.languages {
        files
            .entry(language.clone())
            .or_insert_with(|| store::language_file(dir, language));
    }

    let mut languages = Vec::with_capacity(files.len());
    for (language, file) in files {
        languages.push(process_language(
            language,
            file,
            &reference_document,
            &reference,
            options.fix,
        ));
    }

    Ok(RunReport {
        reference_file,
        reference_template_count: reference.fingerprints.len(),
        reference_warnings: reference.warnings.clone(),
        fix_mode: options.fix.is_some(),
        languages,
    })
}

fn process_language(
    language: String,
    file: PathBuf,
    reference_document: &IndexDocument,
    reference: &Extraction,
    fix: Option<FixOptions>,
) -> LanguageOutcome {
    let mut outcome = LanguageOutcome {
        language,
        file,
        result: None,
        load_error: None,
        warnings: Vec::new(),
        changes: Vec::new(),
        written: false,
        write_error: None,
    };

    // Absent file: not an error, reconcile against an empty document (all
    // reference templates missing; fix mode creates the file from scratch).
    let document = if outcome.file.exists() {
        match store::load(&outcome.file) {
            Ok(document) => document,
            Err(error) => {
                outcome.load_error = Some(error.to_string());
                return outcome;
            }
        }
    } else {
        Vec::new()
    };

    let extraction = fingerprint::extract(&document);
    outcome.warnings = extraction.warnings.clone();

    let Some(fix_options) = fix else {
        outcome.result = Some(reconcile::diff(reference, &extraction));
        return outcome;
    };

    let fixed = reconcile::fix(reference_document, &document, fix_options);
    outcome.changes = fixed.changes;

    if !outcome.changes.is_empty() {
        match store::save(&outcome.file, &fixed.document) {
            Ok(()) => outcome.written = true,
            Err(error) => outcome.write_error = Some(error.to_string()),
        }
    }

    // The reported diff is the residue after fixing: extra templates and
    // anything fix mode can't repair remain visible and fail the run.
    outcome.result = Some(reconcile::diff(
        reference,
        &fingerprint::extract(&fixed.document),
    ));
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::category;
    use std::fs;
    use tempfile::TempDir;

    fn write_doc(dir: &Path, name: &str, document: &IndexDocument) {
        let json = serde_json::to_string_pretty(document).unwrap();
        fs::write(dir.join(name), json).unwrap();
    }

    fn check_options(dir: &Path) -> RunOptions {
        RunOptions {
            templates_dir: dir.to_path_buf(),
            fix: None,
            languages: Vec::new(),
        }
    }

    #[test]
    fn missing_reference_is_fatal() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "index.fr.json", &vec![category("basic", &["t1"])]);

        let error = run(&check_options(tmp.path())).unwrap_err();
        assert!(matches!(error, RunError::MissingReference { .. }));
    }

    #[test]
    fn malformed_reference_is_fatal() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.json"), "{broken").unwrap();

        let error = run(&check_options(tmp.path())).unwrap_err();
        assert!(matches!(error, RunError::UnreadableReference { .. }));
    }

    #[test]
    fn malformed_language_recorded_others_continue() {
        let tmp = TempDir::new().unwrap();
        let reference = vec![category("basic", &["t1"])];
        write_doc(tmp.path(), "index.json", &reference);
        fs::write(tmp.path().join("index.fr.json"), "{broken").unwrap();
        write_doc(tmp.path(), "index.ja.json", &reference);

        let report = run(&check_options(tmp.path())).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.languages.len(), 2);

        let fr = &report.languages[0];
        assert_eq!(fr.language, "fr");
        assert!(fr.load_error.is_some());
        assert!(fr.result.is_none());

        let ja = &report.languages[1];
        assert!(ja.is_clean());
    }

    #[test]
    fn consistent_languages_report_clean() {
        let tmp = TempDir::new().unwrap();
        let reference = vec![category("basic", &["t1", "t2"])];
        write_doc(tmp.path(), "index.json", &reference);
        let mut fr = reference.clone();
        fr[0].templates[0].title = Some("Titre FR".to_string());
        write_doc(tmp.path(), "index.fr.json", &fr);

        let report = run(&check_options(tmp.path())).unwrap();
        assert!(report.is_clean());
        assert_eq!(report.reference_template_count, 2);
    }

    #[test]
    fn check_mode_never_writes() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "index.json", &vec![category("basic", &["t1", "t2"])]);
        write_doc(tmp.path(), "index.fr.json", &vec![category("basic", &["t1"])]);
        let before = fs::read_to_string(tmp.path().join("index.fr.json")).unwrap();

        let report = run(&check_options(tmp.path())).unwrap();
        assert!(!report.is_clean());
        assert!(report.modified_files().is_empty());
        let after = fs::read_to_string(tmp.path().join("index.fr.json")).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn fix_mode_writes_and_reports_residue() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "index.json", &vec![category("basic", &["t1", "t2"])]);
        write_doc(
            tmp.path(),
            "index.fr.json",
            &vec![category("basic", &["t1", "extra1"])],
        );

        let report = run(&RunOptions {
            templates_dir: tmp.path().to_path_buf(),
            fix: Some(FixOptions::default()),
            languages: Vec::new(),
        })
        .unwrap();

        let fr = &report.languages[0];
        assert!(fr.written);
        assert!(fr
            .changes
            .iter()
            .any(|c| matches!(c, Change::TemplateAdded { name, .. } if name == "t2")));

        // extra1 survives the fix and keeps the run unclean.
        let result = fr.result.as_ref().unwrap();
        assert!(result.missing.is_empty());
        assert_eq!(result.extra, vec!["extra1"]);
        assert!(!report.is_clean());
        assert_eq!(report.modified_files().len(), 1);
    }

    #[test]
    fn fix_mode_seeds_absent_language_from_empty_document() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "index.json", &vec![category("basic", &["t1"])]);

        let report = run(&RunOptions {
            templates_dir: tmp.path().to_path_buf(),
            fix: Some(FixOptions::default()),
            languages: vec!["ko".to_string()],
        })
        .unwrap();

        let ko = &report.languages[0];
        assert_eq!(ko.language, "ko");
        assert!(ko.written);
        assert!(ko.is_clean());

        let created = store::load(&store::language_file(tmp.path(), "ko")).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].module_name, "basic");
    }

    #[test]
    fn absent_language_in_check_mode_reports_everything_missing() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "index.json", &vec![category("basic", &["t1", "t2"])]);

        let report = run(&RunOptions {
            templates_dir: tmp.path().to_path_buf(),
            fix: None,
            languages: vec!["ko".to_string()],
        })
        .unwrap();

        let ko = &report.languages[0];
        assert!(ko.load_error.is_none());
        let result = ko.result.as_ref().unwrap();
        assert_eq!(result.missing, vec!["t1", "t2"]);
        assert!(!tmp.path().join("index.ko.json").exists());
    }

    #[test]
    fn fix_noop_leaves_file_untouched() {
        let tmp = TempDir::new().unwrap();
        let reference = vec![category("basic", &["t1"])];
        write_doc(tmp.path(), "index.json", &reference);
        // Deliberately odd formatting: a no-op fix must not rewrite it.
        let fr_path = tmp.path().join("index.fr.json");
        let compact = serde_json::to_string(&reference).unwrap();
        fs::write(&fr_path, &compact).unwrap();

        let report = run(&RunOptions {
            templates_dir: tmp.path().to_path_buf(),
            fix: Some(FixOptions::default()),
            languages: Vec::new(),
        })
        .unwrap();

        assert!(report.is_clean());
        assert!(report.modified_files().is_empty());
        assert_eq!(fs::read_to_string(&fr_path).unwrap(), compact);
    }

    #[test]
    fn unnamed_template_warning_surfaces_in_outcome() {
        let tmp = TempDir::new().unwrap();
        write_doc(tmp.path(), "index.json", &vec![category("basic", &["t1"])]);
        fs::write(
            tmp.path().join("index.fr.json"),
            r#"[{"moduleName":"basic","type":"workflow","title":"B","templates":[
                {"name":"t1","mediaType":"image","mediaSubtype":"webp",
                 "thumbnailVariant":"compareSlider",
                 "models":[{"name":"t1.safetensors"}],"date":"2025-03-01"},
                {"title":"no name"}
            ]}]"#,
        )
        .unwrap();

        let report = run(&check_options(tmp.path())).unwrap();
        let fr = &report.languages[0];
        assert_eq!(fr.warnings.len(), 1);
        assert!(matches!(fr.warnings[0], DataWarning::UnnamedTemplate { .. }));
        // Warnings alone don't fail the run.
        assert!(fr.is_clean());
    }
}
