use std::fs;
use std::io;

use camino::Utf8Path;
use serde_json::Value;

use crate::error::ExportError;
use crate::table::ResultTable;

/// Writes `table` as comma-separated UTF-8 with a header row, replacing any
/// existing file at `path`.
pub fn write_csv(table: &ResultTable, path: &Utf8Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|err| ExportError::Filesystem(format!("create {parent}: {err}")))?;
    }
    let file = fs::File::create(path)
        .map_err(|err| ExportError::Filesystem(format!("create {path}: {err}")))?;
    write_to(table, file)
}

/// A table without columns produces an empty file.
pub fn write_to<W: io::Write>(table: &ResultTable, writer: W) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    if table.columns().is_empty() {
        wtr.flush()
            .map_err(|err| ExportError::Filesystem(err.to_string()))?;
        return Ok(());
    }
    wtr.write_record(table.columns())
        .map_err(|err| ExportError::Csv(err.to_string()))?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(render_cell))
            .map_err(|err| ExportError::Csv(err.to_string()))?;
    }
    wtr.flush()
        .map_err(|err| ExportError::Filesystem(err.to_string()))?;
    Ok(())
}

pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn table_without_columns_writes_nothing() {
        let mut buffer = Vec::new();
        write_to(&ResultTable::new(), &mut buffer).unwrap();
        assert!(buffer.is_empty());
    }

    #[test]
    fn renders_header_and_rows_without_index() {
        let mut table = ResultTable::new();
        table.push_record([
            ("formula", json!("C6H12O6")),
            ("mz", json!(203.05)),
            ("moleculeNames", json!(["glucose", "fructose, D-"])),
        ]);
        table.push_record([("formula", json!("C5H5N5"))]);

        let mut buffer = Vec::new();
        write_to(&table, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(
            text,
            "formula,mz,moleculeNames\n\
             C6H12O6,203.05,\"[\"\"glucose\"\",\"\"fructose, D-\"\"]\"\n\
             C5H5N5,,\n"
        );
    }
}
