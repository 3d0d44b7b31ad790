use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Identifier of a METASPACE dataset, e.g. `2022-08-05_17h28m56s`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatasetId {
    type Err = ExportError;

    /// Accepts a bare id or a dataset URL such as
    /// `https://metaspace2020.org/dataset/2022-08-05_17h28m56s`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let id = match trimmed.split_once("://") {
            Some((_, rest)) => {
                let path = rest.split(['?', '#']).next().unwrap_or_default();
                let segments = path
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .collect::<Vec<_>>();
                // first segment is the host
                match segments.as_slice() {
                    [_, .., last] => *last,
                    _ => "",
                }
            }
            None => trimmed,
        };
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(ExportError::InvalidDatasetId(value.to_string()));
        }
        Ok(Self(id.to_string()))
    }
}

/// A molecular database attached to a dataset.
///
/// The textual form is `<id:name:version>`, which is how the service's
/// client libraries print database details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
}

impl DatabaseDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// `"name version"`, the string database filters are matched against.
    pub fn label(&self) -> String {
        format!("{} {}", self.name, self.version)
    }
}

impl fmt::Display for DatabaseDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}:{}:{}>", self.id, self.name, self.version)
    }
}

impl FromStr for DatabaseDescriptor {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts = value.trim().split(':').collect::<Vec<_>>();
        if parts.len() < 3 {
            return Err(ExportError::InvalidDescriptor(value.to_string()));
        }
        let id = parts[0].trim_start_matches('<').trim_end_matches('>');
        let name = parts[1].trim_end_matches('>');
        let version = parts[2].trim_end_matches('>');
        if name.is_empty() || version.is_empty() {
            return Err(ExportError::InvalidDescriptor(value.to_string()));
        }
        Ok(Self::new(id, name, version))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_bare_dataset_id() {
        let id: DatasetId = " 2022-08-05_17h28m56s ".parse().unwrap();
        assert_eq!(id.as_str(), "2022-08-05_17h28m56s");
    }

    #[test]
    fn parse_dataset_id_from_url() {
        let id: DatasetId = "https://metaspace2020.org/dataset/2022-08-05_17h28m56s/?tab=1"
            .parse()
            .unwrap();
        assert_eq!(id.as_str(), "2022-08-05_17h28m56s");
    }

    #[test]
    fn parse_dataset_id_invalid() {
        assert_matches!(
            "".parse::<DatasetId>().unwrap_err(),
            ExportError::InvalidDatasetId(_)
        );
        assert_matches!(
            "two words".parse::<DatasetId>().unwrap_err(),
            ExportError::InvalidDatasetId(_)
        );
        assert_matches!(
            "https://".parse::<DatasetId>().unwrap_err(),
            ExportError::InvalidDatasetId(_)
        );
    }

    #[test]
    fn parse_descriptor_repr() {
        let db: DatabaseDescriptor = "<22:HMDB:v4>".parse().unwrap();
        assert_eq!(db, DatabaseDescriptor::new("22", "HMDB", "v4"));
        assert_eq!(db.label(), "HMDB v4");
        assert_eq!(db.to_string(), "<22:HMDB:v4>");
    }

    #[test]
    fn parse_descriptor_strips_repeated_brackets() {
        let db: DatabaseDescriptor = "<6:KEGG:v1>>".parse().unwrap();
        assert_eq!(db.version, "v1");
    }

    #[test]
    fn parse_descriptor_invalid() {
        let err = "<22:HMDB>".parse::<DatabaseDescriptor>().unwrap_err();
        assert_matches!(err, ExportError::InvalidDescriptor(_));
    }
}
