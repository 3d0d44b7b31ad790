use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::table::ResultTable;

pub const ION_COLUMN: &str = "ion";
pub const ADDUCT_COLUMN: &str = "Adduct";
pub const INTENSITY_COLUMN: &str = "intensity";
pub const MAX_INTENSITY_COLUMN: &str = "maxIntensity";

static ADDUCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+[A-Za-z0-9]+").expect("valid adduct regex"));

/// First `+`-prefixed alphanumeric run of an ion formula, e.g. `"+Na"` for
/// `"C6H12O6+Na+"`.
pub fn extract_adduct(ion: &str) -> Option<&str> {
    ADDUCT_RE.find(ion).map(|found| found.as_str())
}

/// Adds `Adduct` from `ion`. Returns false when there is no `ion` column.
pub fn derive_adduct(table: &mut ResultTable) -> bool {
    table.derive_column(ION_COLUMN, ADDUCT_COLUMN, |value| {
        value
            .as_str()
            .and_then(extract_adduct)
            .map(|adduct| Value::String(adduct.to_string()))
            .unwrap_or(Value::Null)
    })
}

pub fn rename_intensity(table: &mut ResultTable) -> bool {
    table.rename_column(INTENSITY_COLUMN, MAX_INTENSITY_COLUMN)
}

pub fn derive_columns(table: &mut ResultTable) {
    derive_adduct(table);
    rename_intensity(table);
}
