use crate::domain::DatabaseDescriptor;

pub const ALL_DATABASES_FILE: &str = "all_databases.csv";

/// Output file name for an export.
///
/// `matched` holds the databases whose label starts with `database`.
pub fn output_filename(database: Option<&str>, matched: &[DatabaseDescriptor]) -> String {
    match (database, matched) {
        (None, _) => ALL_DATABASES_FILE.to_string(),
        (Some(name), [single]) => format!("{name}_{}.csv", single.version),
        (Some(name), _) => format!("{name}_all_versions.csv"),
    }
}
