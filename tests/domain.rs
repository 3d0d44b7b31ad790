use assert_matches::assert_matches;

use metaspace_export::domain::{DatabaseDescriptor, DatasetId};
use metaspace_export::error::ExportError;
use metaspace_export::filename::output_filename;
use metaspace_export::resolver::{Resolution, resolve};

fn parse_all(reprs: &[&str]) -> Vec<DatabaseDescriptor> {
    reprs.iter().map(|repr| repr.parse().unwrap()).collect()
}

#[test]
fn parse_dataset_id_from_dataset_page() {
    let id: DatasetId = "https://metaspace2020.org/dataset/2022-08-05_17h28m56s"
        .parse()
        .unwrap();
    assert_eq!(id.as_str(), "2022-08-05_17h28m56s");
}

#[test]
fn descriptor_reprs_resolve_to_file_names() {
    let databases = parse_all(&["<22:HMDB:v4>", "<6:KEGG:v1>", "<38:KEGGv2:2021>"]);

    // "KEGG" also matches the "KEGGv2" label by prefix
    let resolution = resolve(&databases, Some("KEGG"), None);
    assert_matches!(
        resolution,
        Resolution::Resolved { selected, matched, ambiguous: true } => {
            assert_eq!(selected, vec![DatabaseDescriptor::new("6", "KEGG", "v1")]);
            assert_eq!(output_filename(Some("KEGG"), &matched), "KEGG_all_versions.csv");
        }
    );

    let resolution = resolve(&databases, Some("HMDB"), None);
    assert_matches!(
        resolution,
        Resolution::Resolved { matched, .. } => {
            assert_eq!(output_filename(Some("HMDB"), &matched), "HMDB_v4.csv");
        }
    );
}

#[test]
fn malformed_descriptor_is_rejected() {
    let err = "HMDB v4".parse::<DatabaseDescriptor>().unwrap_err();
    assert_matches!(err, ExportError::InvalidDescriptor(_));
}
