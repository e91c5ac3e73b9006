//! Google Sheets sink.
//!
//! Talks to the Sheets v4 REST API with a blocking [`reqwest`] client. The
//! spreadsheet is located either by ID or by exact name through a Drive v3
//! file search, and the first worksheet is the publishing target.
//!
//! Authentication is a plain OAuth bearer token; obtaining it (service
//! account exchange, gcloud, ...) happens outside this crate.

use super::{SheetCell, SpreadsheetSink};
use crate::error::{PipelineError, Result};
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Default Sheets v4 endpoint.
const DEFAULT_SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Default Drive v3 files endpoint, used for name lookup.
const DEFAULT_DRIVE_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";

/// How to find the spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetTarget {
    /// Exact spreadsheet title, resolved through Drive search.
    Name(String),
    /// Spreadsheet ID as it appears in the document URL.
    Id(String),
}

/// Endpoint and transport settings.
#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    pub sheets_url: String,
    pub drive_url: String,
    pub timeout_secs: u64,
}

impl Default for GoogleSheetsConfig {
    fn default() -> Self {
        Self {
            sheets_url: DEFAULT_SHEETS_URL.to_string(),
            drive_url: DEFAULT_DRIVE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    major_dimension: &'static str,
    values: &'a [Vec<SheetCell>],
}

/// The first worksheet of a Google spreadsheet.
pub struct GoogleSheetsSink {
    client: Client,
    token: String,
    config: GoogleSheetsConfig,
    spreadsheet_id: String,
    worksheet: String,
    name: String,
}

impl GoogleSheetsSink {
    /// Resolve the spreadsheet and its first worksheet.
    ///
    /// # Errors
    ///
    /// [`PipelineError::SpreadsheetNotFound`] when no spreadsheet matches or
    /// it has no worksheets; [`PipelineError::Sheets`] on a rejected request.
    pub fn connect(
        token: impl Into<String>,
        target: SpreadsheetTarget,
        config: GoogleSheetsConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let token = token.into();

        let (spreadsheet_id, name) = match target {
            SpreadsheetTarget::Id(id) => (id.clone(), id),
            SpreadsheetTarget::Name(name) => {
                let id = find_by_name(&client, &token, &config.drive_url, &name)?;
                (id, name)
            }
        };

        let worksheet = first_worksheet(&client, &token, &config.sheets_url, &spreadsheet_id)?
            .ok_or_else(|| PipelineError::SpreadsheetNotFound(format!("{} (no worksheets)", name)))?;

        info!(
            "Connected to spreadsheet '{}' (worksheet '{}')",
            name, worksheet
        );

        Ok(Self {
            client,
            token,
            config,
            spreadsheet_id,
            worksheet,
            name,
        })
    }

    fn values_url(&self, range_suffix: &str) -> Result<Url> {
        let mut url = parse_url(&self.config.sheets_url)?;
        url.path_segments_mut()
            .map_err(|_| invalid_base(&self.config.sheets_url))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range_suffix);
        Ok(url)
    }
}

impl SpreadsheetSink for GoogleSheetsSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn clear(&mut self) -> Result<()> {
        let url = self.values_url(&format!("{}:clear", a1_range(&self.worksheet, None)))?;
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(&serde_json::json!({}))
            .send()?;
        check_status(response)?;
        debug!("Cleared worksheet '{}'", self.worksheet);
        Ok(())
    }

    fn write_rows(&mut self, rows: &[Vec<SheetCell>]) -> Result<()> {
        let url = self.values_url(&a1_range(&self.worksheet, Some("A1")))?;
        let body = ValueRange {
            major_dimension: "ROWS",
            values: rows,
        };
        let response = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&self.token)
            .json(&body)
            .send()?;
        check_status(response)?;
        debug!("Wrote {} rows to worksheet '{}'", rows.len(), self.worksheet);
        Ok(())
    }
}

fn find_by_name(client: &Client, token: &str, drive_url: &str, name: &str) -> Result<String> {
    let response = client
        .get(parse_url(drive_url)?)
        .query(&[
            ("q", drive_query(name).as_str()),
            ("fields", "files(id,name)"),
            ("pageSize", "1"),
        ])
        .bearer_auth(token)
        .send()?;
    let list: DriveFileList = check_status(response)?.json()?;

    list.files
        .into_iter()
        .next()
        .map(|file| file.id)
        .ok_or_else(|| PipelineError::SpreadsheetNotFound(name.to_string()))
}

fn first_worksheet(
    client: &Client,
    token: &str,
    sheets_url: &str,
    spreadsheet_id: &str,
) -> Result<Option<String>> {
    let mut url = parse_url(sheets_url)?;
    url.path_segments_mut()
        .map_err(|_| invalid_base(sheets_url))?
        .push(spreadsheet_id);

    let response = client
        .get(url)
        .query(&[("fields", "sheets.properties.title")])
        .bearer_auth(token)
        .send()?;

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Err(PipelineError::SpreadsheetNotFound(spreadsheet_id.to_string()));
    }
    let meta: SpreadsheetMeta = check_status(response)?.json()?;

    Ok(meta.sheets.into_iter().next().map(|s| s.properties.title))
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().unwrap_or_default();
    Err(PipelineError::Sheets {
        status: status.as_u16(),
        message,
    })
}

fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|_| invalid_base(raw))
}

fn invalid_base(raw: &str) -> PipelineError {
    PipelineError::InvalidConfig(format!("Invalid API base URL: {}", raw))
}

/// A1 notation for a worksheet, optionally narrowed to a cell range.
///
/// The worksheet title is always quoted, with embedded quotes doubled.
pub(crate) fn a1_range(worksheet: &str, cells: Option<&str>) -> String {
    let quoted = format!("'{}'", worksheet.replace('\'', "''"));
    match cells {
        Some(cells) => format!("{}!{}", quoted, cells),
        None => quoted,
    }
}

/// Drive search query matching a non-trashed spreadsheet by exact name.
pub(crate) fn drive_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, SPREADSHEET_MIME_TYPE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a1_range() {
        assert_eq!(a1_range("Sheet1", None), "'Sheet1'");
        assert_eq!(a1_range("Sheet1", Some("A1")), "'Sheet1'!A1");
        assert_eq!(a1_range("Arkusz 1", Some("A1")), "'Arkusz 1'!A1");
        assert_eq!(a1_range("Bob's", None), "'Bob''s'");
    }

    #[test]
    fn test_drive_query() {
        assert_eq!(
            drive_query("ASILab02"),
            "name = 'ASILab02' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false"
        );
        assert!(drive_query("it's").starts_with("name = 'it\\'s'"));
    }

    #[test]
    fn test_value_range_body() {
        let rows = vec![
            vec![SheetCell::text("Wiek"), SheetCell::text("Wykształcenie")],
            vec![SheetCell::Number(0.5), SheetCell::Integer(2)],
            vec![SheetCell::Empty, SheetCell::Integer(-1)],
        ];
        let body = ValueRange {
            major_dimension: "ROWS",
            values: &rows,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "majorDimension": "ROWS",
                "values": [["Wiek", "Wykształcenie"], [0.5, 2], ["", -1]]
            })
        );
        // RAW input stores exactly what is sent, so numbers must not be strings
        assert!(json["values"][1][0].is_number());
        assert!(json["values"][1][1].is_number());
    }

    #[test]
    fn test_connect_with_invalid_base_url() {
        let config = GoogleSheetsConfig {
            sheets_url: "not a url".to_string(),
            ..GoogleSheetsConfig::default()
        };
        let err = GoogleSheetsSink::connect("t", SpreadsheetTarget::Id("abc".into()), config)
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
