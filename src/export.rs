//! File exports of search results.
//!
//! `/download` renders the same rows as `/search`, either as a JSON array or
//! as CSV, and sends them as an attachment.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::str::FromStr;

use crate::{Format, GatewayError, store::Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(()),
        }
    }
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => Format::Json.content_type(),
            ExportFormat::Csv => "text/csv",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Json => "data.json",
            ExportFormat::Csv => "data.csv",
        }
    }

    pub fn render(self, rows: &[Record]) -> Result<Vec<u8>, GatewayError> {
        match self {
            ExportFormat::Json => Format::Json.serialize(&rows),
            ExportFormat::Csv => Ok(to_csv(rows)?),
        }
    }

    /// Renders `rows` into a `200 OK` attachment response.
    pub fn attachment(self, rows: &[Record]) -> Result<Response, GatewayError> {
        let body = self.render(rows)?;
        let disposition = format!("attachment; filename=\"{}\"", self.file_name());
        Ok((
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.content_type().to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            body,
        )
            .into_response())
    }
}

/// Header row is every column seen across `rows`, in first-seen order.
fn header_row(rows: &[Record]) -> Vec<&str> {
    let mut columns: Vec<&str> = Vec::new();
    for key in rows.iter().flat_map(|row| row.keys()) {
        if !columns.contains(&key.as_str()) {
            columns.push(key.as_str());
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Writes `rows` as CSV with a header line. No rows yields an empty body.
pub fn to_csv(rows: &[Record]) -> Result<Vec<u8>, csv::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let columns = header_row(rows);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|c| cell(row.get(*c))))?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_export_format_from_str() {
        assert_eq!("csv".parse(), Ok(ExportFormat::Csv));
        assert_eq!("json".parse(), Ok(ExportFormat::Json));
        assert!("".parse::<ExportFormat>().is_err());
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert!("CSV".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_csv_nulls_are_empty_cells() {
        let rows = vec![
            record(json!({"antibody": "drugA", "target": "TNF"})),
            record(json!({"antibody": "lonelyMab", "target": null})),
        ];
        let csv = String::from_utf8(to_csv(&rows).unwrap()).unwrap();
        assert_eq!(csv, "antibody,target\ndrugA,TNF\nlonelyMab,\n");
    }

    #[test]
    fn test_csv_quotes_separators() {
        let rows = vec![record(json!({"immunogenicity_testing": "ELISA, \"bridging\""}))];
        let csv = String::from_utf8(to_csv(&rows).unwrap()).unwrap();
        assert_eq!(
            csv,
            "immunogenicity_testing\n\"ELISA, \"\"bridging\"\"\"\n"
        );
    }

    #[test]
    fn test_csv_non_string_values() {
        let rows = vec![record(json!({"n": 3, "ok": true}))];
        let csv = String::from_utf8(to_csv(&rows).unwrap()).unwrap();
        assert_eq!(csv, "n,ok\n3,true\n");
    }

    #[test]
    fn test_csv_empty_rows() {
        assert!(to_csv(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_header_covers_columns_missing_from_first_row() {
        let rows = vec![record(json!({"a": "1"})), record(json!({"a": "2", "b": "3"}))];
        let csv = String::from_utf8(to_csv(&rows).unwrap()).unwrap();
        assert_eq!(csv, "a,b\n1,\n2,3\n");
    }

    #[test]
    fn test_attachment_headers() {
        let response = ExportFormat::Csv.attachment(&[]).unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"data.csv\""
        );
    }
}
