//! Index file discovery, loading, and saving.
//!
//! A templates directory holds one reference index plus translated variants:
//!
//! ```text
//! templates/
//! ├── index.json             # English reference
//! ├── index.fr.json          # language variant (code between the dots)
//! ├── index.zh-TW.json
//! ├── index.schema.json      # JSON schema — not a language, skipped
//! └── *.json / *.webp        # per-template workflows and thumbnails
//! ```
//!
//! Saving replaces the whole file with stable 2-space-indented JSON, with
//! one deviation from `serde_json::to_string_pretty`: short arrays of plain
//! strings (tags and the like) are compacted onto a single line, matching
//! what the index generator emits so that fix-mode rewrites don't reformat
//! every tag list in the repository.

use crate::model::IndexDocument;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The English reference index file name.
pub const REFERENCE_FILE: &str = "index.json";

const INDEX_PREFIX: &str = "index.";
const INDEX_SUFFIX: &str = ".json";
const SCHEMA_FILE: &str = "index.schema.json";

/// A string-only array longer than this stays multi-line when saving.
const COMPACT_ARRAY_MAX: usize = 200;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Index files found in a templates directory.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Path of `index.json`, when present.
    pub reference: Option<PathBuf>,
    /// Language code → file path, sorted by code for a fixed iteration order.
    pub languages: BTreeMap<String, PathBuf>,
}

/// Scan a directory for the reference index and language variants.
///
/// Only file names are inspected; nothing is parsed here.
pub fn discover(dir: &Path) -> Result<Discovery, StoreError> {
    let mut discovery = Discovery::default();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name == SCHEMA_FILE {
            continue;
        }
        if name == REFERENCE_FILE {
            discovery.reference = Some(entry.path());
        } else if let Some(code) = language_code(name) {
            discovery.languages.insert(code.to_string(), entry.path());
        }
    }

    Ok(discovery)
}

/// Extract the language code from `index.<code>.json`, or `None` for
/// anything that doesn't follow the pattern.
fn language_code(file_name: &str) -> Option<&str> {
    let code = file_name
        .strip_prefix(INDEX_PREFIX)?
        .strip_suffix(INDEX_SUFFIX)?;
    if code.is_empty() { None } else { Some(code) }
}

/// Path of a language's index file, whether or not it exists yet.
pub fn language_file(dir: &Path, language: &str) -> PathBuf {
    dir.join(format!("{INDEX_PREFIX}{language}{INDEX_SUFFIX}"))
}

/// Load and parse one index document.
pub fn load(path: &Path) -> Result<IndexDocument, StoreError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a document, fully formatted, in a single call. The file is only
/// touched once the entire serialization succeeded.
pub fn save(path: &Path, document: &IndexDocument) -> Result<(), StoreError> {
    let formatted = to_pretty_json(document)?;
    fs::write(path, formatted)?;
    Ok(())
}

/// Render a document as 2-space-indented JSON with short string-only arrays
/// compacted onto one line.
pub fn to_pretty_json(document: &IndexDocument) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(document)?;
    let mut out = String::new();
    write_value(&mut out, &value, 0)?;
    out.push('\n');
    Ok(out)
}

fn write_value(out: &mut String, value: &Value, depth: usize) -> Result<(), serde_json::Error> {
    match value {
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            if let Some(compact) = compact_string_array(items)? {
                out.push_str(&compact);
            } else {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('\n');
                    push_indent(out, depth + 1);
                    write_value(out, item, depth + 1)?;
                }
                out.push('\n');
                push_indent(out, depth);
                out.push(']');
            }
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push('\n');
                push_indent(out, depth + 1);
                out.push_str(&serde_json::to_string(key)?);
                out.push_str(": ");
                write_value(out, item, depth + 1)?;
            }
            out.push('\n');
            push_indent(out, depth);
            out.push('}');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

/// Single-line rendering for arrays of plain strings, unless the result
/// would be unreasonably long. Arrays holding anything else stay multi-line.
fn compact_string_array(items: &[Value]) -> Result<Option<String>, serde_json::Error> {
    if !items.iter().all(Value::is_string) {
        return Ok(None);
    }
    let mut compact = String::from("[");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            compact.push_str(", ");
        }
        compact.push_str(&serde_json::to_string(item)?);
    }
    compact.push(']');
    if compact.len() > COMPACT_ARRAY_MAX {
        return Ok(None);
    }
    Ok(Some(compact))
}
