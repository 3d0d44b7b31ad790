use tracing::warn;

use crate::domain::DatabaseDescriptor;

/// Outcome of matching user filters against a dataset's databases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// No database label starts with the requested name.
    NotFound {
        requested: String,
        available: Vec<DatabaseDescriptor>,
    },
    Resolved {
        /// Databases to fetch, in dataset order.
        selected: Vec<DatabaseDescriptor>,
        /// Databases whose label starts with the requested name. Empty when
        /// no name filter was given.
        matched: Vec<DatabaseDescriptor>,
        /// Several databases matched the name and no version was given.
        ambiguous: bool,
    },
}

/// Matches `database` by prefix against each descriptor's `"name version"`
/// label to decide whether the request is satisfiable, then selects by exact
/// name and, when given, exact version.
///
/// Prefix matching means `"KEGG"` also matches a `"KEGGv2 ..."` label.
pub fn resolve(
    databases: &[DatabaseDescriptor],
    database: Option<&str>,
    version: Option<&str>,
) -> Resolution {
    let matched = match database {
        Some(name) => {
            let matched = databases
                .iter()
                .filter(|db| db.label().starts_with(name))
                .cloned()
                .collect::<Vec<_>>();
            if matched.is_empty() {
                return Resolution::NotFound {
                    requested: name.to_string(),
                    available: databases.to_vec(),
                };
            }
            matched
        }
        None => Vec::new(),
    };

    let ambiguous = matched.len() > 1 && version.is_none();
    if ambiguous {
        let labels = matched
            .iter()
            .map(DatabaseDescriptor::label)
            .collect::<Vec<_>>();
        warn!(
            database = database.unwrap_or_default(),
            versions = ?labels,
            "multiple versions found, exporting all of them"
        );
    }

    let selected = databases
        .iter()
        .filter(|db| database.is_none_or(|name| db.name == name))
        .filter(|db| version.is_none_or(|ver| db.version == ver))
        .cloned()
        .collect::<Vec<_>>();

    if selected.is_empty() {
        warn!(
            database = database.unwrap_or_default(),
            version = version.unwrap_or_default(),
            "no database matches the exact name and version"
        );
    }

    Resolution::Resolved {
        selected,
        matched,
        ambiguous,
    }
}
