use crate::tally::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceSource {
    /// "xlsx" or "csv". Guessed from the file extension if missing.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "headerRowIndex")]
    _header_row_index: Option<JSValue>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl ReferenceSource {
    /// The 1-based header row, if provided.
    pub fn header_row_index(&self) -> TallyResult<Option<usize>> {
        read_js_int(&self._header_row_index, "headerRowIndex")
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ScanSource {
    /// Only "text" (one code per line) is supported for now.
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "outputFormat")]
    pub output_format: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    #[serde(rename = "referenceSource")]
    pub reference_source: Option<ReferenceSource>,
    #[serde(rename = "scanSources", default)]
    pub scan_sources: Vec<ScanSource>,
    #[serde(rename = "manualCodes", default)]
    pub manual_codes: Vec<String>,
    #[serde(rename = "outputSettings")]
    pub output_settings: Option<OutputSettings>,
    #[serde(rename = "expectedReport")]
    pub expected_report: Option<String>,
}

pub fn read_config(path: &str) -> TallyResult<SessionConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: SessionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

// Numbers may be written as JSON numbers or as strings.
fn read_js_int(x: &Option<JSValue>, field: &str) -> TallyResult<Option<usize>> {
    match x {
        None | Some(JSValue::Null) => Ok(None),
        Some(JSValue::Number(n)) => n
            .as_u64()
            .map(|x| Some(x as usize))
            .context(ParsingJsonNumberSnafu { field }),
        Some(JSValue::String(s)) => s
            .trim()
            .parse::<usize>()
            .ok()
            .map(Some)
            .context(ParsingJsonNumberSnafu { field }),
        _ => None.context(ParsingJsonNumberSnafu { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let js = r#"{
            "referenceSource": {
                "provider": "xlsx",
                "filePath": "stock.xlsx",
                "headerRowIndex": "18",
                "excelWorksheetName": "Arkusz1"
            },
            "scanSources": [{ "provider": "text", "filePath": "a.txt" }, { "filePath": "b.txt" }],
            "manualCodes": ["X"],
            "outputSettings": { "outputPath": "out.csv" }
        }"#;
        let config: SessionConfig = serde_json::from_str(js).unwrap();
        let reference = config.reference_source.clone().unwrap();
        assert_eq!(reference.header_row_index().unwrap(), Some(18));
        assert_eq!(reference.excel_worksheet_name.as_deref(), Some("Arkusz1"));
        assert_eq!(config.scan_sources.len(), 2);
        assert_eq!(config.scan_sources[1].provider, None);
        assert_eq!(config.manual_codes, vec!["X".to_string()]);
        assert_eq!(
            config.output_settings.unwrap().output_path.as_deref(),
            Some("out.csv")
        );
        assert_eq!(config.expected_report, None);
    }

    #[test]
    fn minimal_config() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn header_row_index_forms() {
        let parse = |js: &str| -> ReferenceSource { serde_json::from_str(js).unwrap() };
        let r = parse(r#"{"filePath": "s.csv", "headerRowIndex": 3}"#);
        assert_eq!(r.header_row_index().unwrap(), Some(3));
        let r = parse(r#"{"filePath": "s.csv"}"#);
        assert_eq!(r.header_row_index().unwrap(), None);
        let r = parse(r#"{"filePath": "s.csv", "headerRowIndex": "third"}"#);
        assert!(matches!(
            r.header_row_index(),
            Err(TallyError::ParsingJsonNumber { .. })
        ));
        let r = parse(r#"{"filePath": "s.csv", "headerRowIndex": -1}"#);
        assert!(r.header_row_index().is_err());
    }
}
