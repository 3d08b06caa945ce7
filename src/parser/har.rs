//! Minimal HAR 1.2 structures: only the fields the filter and export
//! engines read.

use serde::{Deserialize, Deserializer};

/// Root HAR document (top-level wrapper).
#[derive(Debug, Deserialize)]
pub struct HarDocument {
    pub log: HarLog,
}

#[derive(Debug, Deserialize)]
pub struct HarLog {
    pub entries: Vec<HarEntry>,
}

#[derive(Debug, Deserialize)]
pub struct HarEntry {
    #[serde(rename = "startedDateTime")]
    pub started_date_time: String,
    #[serde(default)]
    pub time: Option<f64>,
    pub request: HarRequest,
    pub response: HarResponse,
}

#[derive(Debug, Deserialize)]
pub struct HarRequest {
    pub url: String,
    #[serde(default)]
    pub method: String,
}

#[derive(Debug, Deserialize)]
pub struct HarResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default)]
    pub content: HarContent,
    #[serde(
        default,
        rename = "_transferSize",
        alias = "transferSize",
        deserialize_with = "lenient_size"
    )]
    pub transfer_size: Option<i64>,
    #[serde(default, rename = "bodySize", deserialize_with = "lenient_size")]
    pub body_size: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HarContent {
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
}

/// Byte counts written as integers or floats; fractions are truncated.
fn lenient_size<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite()).map(|v| v as i64))
}
