use serde::Deserialize;

/// Response shape of `spreadsheets.values.get`.
///
/// The API omits `values` entirely when the requested range holds no data,
/// so it defaults to empty here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    pub range: Option<String>,
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_range() {
        let json = r#"{
            "range": "Sheet1!A1:Z999",
            "majorDimension": "ROWS",
            "values": [["Temperature", "Humidity Air"], ["24.5", "61"]]
        }"#;
        let range: ValueRange = serde_json::from_str(json).unwrap();
        assert_eq!(range.range.as_deref(), Some("Sheet1!A1:Z999"));
        assert_eq!(range.values.len(), 2);
        assert_eq!(range.values[1][0], "24.5");
    }

    #[test]
    fn missing_values_defaults_to_empty() {
        let json = r#"{"range": "Sheet1!A1:Z", "majorDimension": "ROWS"}"#;
        let range: ValueRange = serde_json::from_str(json).unwrap();
        assert!(range.values.is_empty());
    }
}
