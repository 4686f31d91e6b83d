//! Identifier sanitization for user-authored labels
//!
//! Sheet names and column headers come straight from uploaded workbooks, so
//! they can contain anything: punctuation, mixed case, SQL keywords, or
//! nothing usable at all. Everything that ends up as a table or column name
//! goes through [`sanitize`] first.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

/// Prefix applied to sanitized identifiers that would otherwise collide with
/// a reserved word (or come out empty).
pub const RESERVED_PREFIX: &str = "excel_";

/// Namespace prefix for tables derived from sheet names, keeping them clear
/// of the fixed business tables.
pub const TABLE_PREFIX: &str = "project_";

/// Words a sanitized column name must never equal: SQL keywords, the fixed
/// linkage/timestamp columns present on every import table, and
/// aggregate-function names that show up as summary headers.
static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "id", "project_id", "user_id", "created_at", "updated_at",
        "total", "sum", "count", "avg", "min", "max", "select", "from", "where",
        "order", "group", "by", "having", "join", "left", "right", "inner",
        "outer", "on", "as", "and", "or", "not", "null", "true", "false",
        "index", "key", "primary", "foreign", "unique", "check", "default",
        "constraint", "table", "database", "schema", "view", "procedure",
        "function", "trigger", "sequence", "user", "password", "grant",
        "revoke", "commit", "rollback", "transaction", "lock", "deadlock",
    ]
    .into_iter()
    .collect()
});

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

static FILENAME_COUNTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(\d+\)\s*$").unwrap());

static FILENAME_FILLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+(in\s+)?(excel|data|file|sheet)\s*").unwrap());

/// Check whether an identifier is in the reserved-word set.
pub fn is_reserved(ident: &str) -> bool {
    RESERVED_WORDS.contains(ident)
}

/// Lower-case a label and reduce it to `[a-z0-9_]` without leading, trailing
/// or doubled underscores. Can come out empty or reserved; [`sanitize`] is
/// the safe entry point.
pub(crate) fn scrub(label: &str) -> String {
    NON_ALNUM
        .replace_all(&label.to_lowercase(), "_")
        .trim_matches('_')
        .to_string()
}

/// Turn an arbitrary human-authored label into a storage-legal identifier.
///
/// The result is never empty and never a reserved word: collisions get the
/// `excel_` prefix, so a header literally named "Total" becomes
/// `excel_total`. Pure and total, and idempotent: feeding the output back in
/// returns it unchanged.
pub fn sanitize(label: &str) -> String {
    let cleaned = scrub(label);
    if cleaned.is_empty() || is_reserved(&cleaned) {
        format!("{}{}", RESERVED_PREFIX, cleaned)
            .trim_end_matches('_')
            .to_string()
    } else {
        cleaned
    }
}

/// Derive the storage table name for a sheet. Deterministic: the same sheet
/// name always maps to the same table, which is what makes table reuse
/// across imports work.
pub fn table_name_for_sheet(sheet_name: &str) -> String {
    format!("{}{}", TABLE_PREFIX, sanitize(sheet_name))
}

/// Extract a project name from a workbook file name: drop the extension,
/// trailing download counters like "(1)", and filler words, then take the
/// first remaining word.
pub fn project_name_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let without_counter = FILENAME_COUNTER.replace(&stem, "");
    let cleaned = FILENAME_FILLER.replace_all(&without_counter, " ");

    cleaned
        .split_whitespace()
        .next()
        .map(|w| w.to_string())
        .unwrap_or_else(|| "Excel Import".to_string())
}
