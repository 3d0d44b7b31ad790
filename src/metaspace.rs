use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::ResolvedConfig;
use crate::domain::{DatabaseDescriptor, DatasetId};
use crate::error::ExportError;
use crate::table::ResultTable;

/// Columns of a result table, in the order the service's annotations map to.
pub const RESULT_COLUMNS: [&str; 16] = [
    "formula",
    "adduct",
    "chemMod",
    "neutralLoss",
    "ion",
    "mz",
    "msm",
    "fdr",
    "rhoSpatial",
    "rhoSpectral",
    "rhoChaos",
    "offSample",
    "offSampleProb",
    "moleculeNames",
    "moleculeIds",
    "intensity",
];

/// Upper bound on annotations requested per database in one call.
const ANNOTATION_LIMIT: u32 = 100_000;

const DATABASES_QUERY: &str = r#"
query DatasetDatabases($id: String!) {
  dataset(id: $id) {
    id
    databases { id name version }
  }
}
"#;

const ANNOTATIONS_QUERY: &str = r#"
query DatasetAnnotations($datasetFilter: DatasetFilter, $filter: AnnotationFilter, $limit: Int) {
  allAnnotations(datasetFilter: $datasetFilter, filter: $filter, limit: $limit) {
    sumFormula
    adduct
    chemMod
    neutralLoss
    ion
    mz
    msmScore
    fdrLevel
    rhoSpatial
    rhoSpectral
    rhoChaos
    offSample
    offSampleProb
    possibleCompounds { name information { databaseId } }
    isotopeImages { maxIntensity }
  }
}
"#;

pub trait MetaspaceClient: Send + Sync {
    fn database_details(
        &self,
        dataset: &DatasetId,
    ) -> Result<Vec<DatabaseDescriptor>, ExportError>;
    fn results(
        &self,
        dataset: &DatasetId,
        database: &DatabaseDescriptor,
    ) -> Result<ResultTable, ExportError>;
}

#[derive(Clone)]
pub struct MetaspaceHttpClient {
    client: Client,
    endpoint: String,
    fdr: f64,
    include_chem_mods: bool,
    include_neutral_losses: bool,
}

impl MetaspaceHttpClient {
    pub fn new(config: &ResolvedConfig) -> Result<Self, ExportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("metaspace-export/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ExportError::MetaspaceHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| ExportError::MetaspaceHttp(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            fdr: config.fdr,
            include_chem_mods: config.include_chem_mods,
            include_neutral_losses: config.include_neutral_losses,
        })
    }

    fn query<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, ExportError> {
        debug!(endpoint = %self.endpoint, "sending GraphQL request");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .map_err(|err| ExportError::MetaspaceHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let envelope: GraphQlResponse<T> = response
            .json()
            .map_err(|err| ExportError::MetaspaceHttp(err.to_string()))?;
        envelope.into_data()
    }

    /// Chem-mod and neutral-loss annotations are left out unless enabled.
    fn annotation_filter(&self, database_id: u64) -> Value {
        let mut filter = json!({ "databaseId": database_id, "fdrLevel": self.fdr });
        if !self.include_chem_mods {
            filter["hasChemMod"] = Value::Bool(false);
        }
        if !self.include_neutral_losses {
            filter["hasNeutralLoss"] = Value::Bool(false);
        }
        filter
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ExportError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "METASPACE request failed".to_string());
        Err(ExportError::MetaspaceStatus { status, message })
    }
}

impl MetaspaceClient for MetaspaceHttpClient {
    fn database_details(
        &self,
        dataset: &DatasetId,
    ) -> Result<Vec<DatabaseDescriptor>, ExportError> {
        let data: DatasetData = self.query(DATABASES_QUERY, json!({ "id": dataset.as_str() }))?;
        let dataset_node = data
            .dataset
            .ok_or_else(|| ExportError::DatasetNotFound(dataset.to_string()))?;
        Ok(dataset_node
            .databases
            .into_iter()
            .map(|db| DatabaseDescriptor::new(scalar_text(&db.id), db.name, db.version))
            .collect())
    }

    fn results(
        &self,
        dataset: &DatasetId,
        database: &DatabaseDescriptor,
    ) -> Result<ResultTable, ExportError> {
        let database_id = database
            .id
            .parse::<u64>()
            .map_err(|_| ExportError::InvalidDescriptor(database.to_string()))?;
        let variables = json!({
            "datasetFilter": { "ids": dataset.as_str() },
            "filter": self.annotation_filter(database_id),
            "limit": ANNOTATION_LIMIT,
        });
        let data: AnnotationsData = self.query(ANNOTATIONS_QUERY, variables)?;
        if hits_annotation_limit(data.all_annotations.len()) {
            warn!(
                dataset = %dataset,
                database = %database.label(),
                limit = ANNOTATION_LIMIT,
                "annotation limit reached, results for this database are incomplete"
            );
        }
        Ok(annotations_to_table(data.all_annotations))
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> GraphQlResponse<T> {
    fn into_data(self) -> Result<T, ExportError> {
        if !self.errors.is_empty() {
            let messages = self
                .errors
                .into_iter()
                .map(|err| err.message)
                .collect::<Vec<_>>();
            return Err(ExportError::GraphQl(messages.join("; ")));
        }
        self.data
            .ok_or_else(|| ExportError::GraphQl("response contained no data".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct DatasetData {
    dataset: Option<DatasetNode>,
}

#[derive(Debug, Deserialize)]
struct DatasetNode {
    #[serde(default)]
    databases: Vec<MolecularDbNode>,
}

#[derive(Debug, Deserialize)]
struct MolecularDbNode {
    id: Value,
    name: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotationsData {
    #[serde(default)]
    all_annotations: Vec<AnnotationNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationNode {
    pub sum_formula: Value,
    pub adduct: Value,
    pub chem_mod: Value,
    pub neutral_loss: Value,
    pub ion: Value,
    pub mz: Value,
    pub msm_score: Value,
    pub fdr_level: Value,
    pub rho_spatial: Value,
    pub rho_spectral: Value,
    pub rho_chaos: Value,
    pub off_sample: Value,
    pub off_sample_prob: Value,
    pub possible_compounds: Vec<CompoundNode>,
    pub isotope_images: Vec<IsotopeImageNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CompoundNode {
    pub name: String,
    pub information: Vec<CompoundInfoNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompoundInfoNode {
    pub database_id: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IsotopeImageNode {
    pub max_intensity: Value,
}

/// Flattens annotations into rows with [`RESULT_COLUMNS`].
pub fn annotations_to_table(annotations: Vec<AnnotationNode>) -> ResultTable {
    let mut table = ResultTable::with_columns(RESULT_COLUMNS);
    for annotation in annotations {
        let molecule_names = annotation
            .possible_compounds
            .iter()
            .map(|compound| Value::String(compound.name.clone()))
            .collect::<Vec<_>>();
        let molecule_ids = annotation
            .possible_compounds
            .iter()
            .flat_map(|compound| &compound.information)
            .map(|info| info.database_id.clone())
            .filter(|id| !id.is_null())
            .collect::<Vec<_>>();
        let intensity = annotation
            .isotope_images
            .first()
            .map(|image| image.max_intensity.clone())
            .unwrap_or(Value::Null);

        table.push_record([
            ("formula", annotation.sum_formula),
            ("adduct", annotation.adduct),
            ("chemMod", annotation.chem_mod),
            ("neutralLoss", annotation.neutral_loss),
            ("ion", annotation.ion),
            ("mz", annotation.mz),
            ("msm", annotation.msm_score),
            ("fdr", annotation.fdr_level),
            ("rhoSpatial", annotation.rho_spatial),
            ("rhoSpectral", annotation.rho_spectral),
            ("rhoChaos", annotation.rho_chaos),
            ("offSample", annotation.off_sample),
            ("offSampleProb", annotation.off_sample_prob),
            ("moleculeNames", Value::Array(molecule_names)),
            ("moleculeIds", Value::Array(molecule_ids)),
            ("intensity", intensity),
        ]);
    }
    table
}

/// A full page means the service may have held rows back.
pub fn hits_annotation_limit(count: usize) -> bool {
    count >= ANNOTATION_LIMIT as usize
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn graphql_errors_are_reported() {
        let envelope: GraphQlResponse<DatasetData> = serde_json::from_value(json!({
            "data": null,
            "errors": [{ "message": "Unauthorized" }, { "message": "try again" }]
        }))
        .unwrap();
        assert_matches!(
            envelope.into_data(),
            Err(ExportError::GraphQl(message)) if message == "Unauthorized; try again"
        );
    }

    #[test]
    fn full_page_is_flagged_as_truncated() {
        assert!(!hits_annotation_limit(0));
        assert!(!hits_annotation_limit(ANNOTATION_LIMIT as usize - 1));
        assert!(hits_annotation_limit(ANNOTATION_LIMIT as usize));
    }

    #[test]
    fn annotation_filter_excludes_chem_mods_and_neutral_losses_by_default() {
        let client = MetaspaceHttpClient::new(&ResolvedConfig::default()).unwrap();
        assert_eq!(
            client.annotation_filter(22),
            json!({
                "databaseId": 22,
                "fdrLevel": 0.1,
                "hasChemMod": false,
                "hasNeutralLoss": false,
            })
        );

        let config = ResolvedConfig {
            include_chem_mods: true,
            include_neutral_losses: true,
            ..ResolvedConfig::default()
        };
        let client = MetaspaceHttpClient::new(&config).unwrap();
        assert_eq!(
            client.annotation_filter(22),
            json!({ "databaseId": 22, "fdrLevel": 0.1 })
        );
    }

    #[test]
    fn string_and_numeric_database_ids_read_the_same() {
        assert_eq!(scalar_text(&json!(22)), "22");
        assert_eq!(scalar_text(&json!("22")), "22");
    }

    #[test]
    fn annotations_flatten_into_result_columns() {
        let data: AnnotationsData = serde_json::from_value(json!({
            "allAnnotations": [{
                "sumFormula": "C6H12O6",
                "adduct": "+Na",
                "ion": "C6H12O6+Na+",
                "mz": 203.0526,
                "msmScore": 0.91,
                "fdrLevel": 0.05,
                "possibleCompounds": [
                    { "name": "D-Glucose", "information": [{ "databaseId": "HMDB0000122" }] },
                    { "name": "Fructose", "information": [{ "databaseId": "HMDB0000660" }, {}] }
                ],
                "isotopeImages": [{ "maxIntensity": 5120.0 }, { "maxIntensity": 40.0 }]
            }]
        }))
        .unwrap();

        let table = annotations_to_table(data.all_annotations);

        assert_eq!(table.columns(), RESULT_COLUMNS);
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, "msm"), Some(&json!(0.91)));
        assert_eq!(
            table.cell(0, "moleculeNames"),
            Some(&json!(["D-Glucose", "Fructose"]))
        );
        assert_eq!(table.cell(0, "moleculeIds"), Some(&json!(["HMDB0000122", "HMDB0000660"])));
        assert_eq!(table.cell(0, "intensity"), Some(&json!(5120.0)));
        assert_eq!(table.cell(0, "chemMod"), Some(&Value::Null));
    }
}
