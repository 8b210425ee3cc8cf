//! Roster extraction through an external document service.
//!
//! Scanned class lists, photos and PDFs are sent to a service that reads
//! them and answers with structured rows. The service sits behind the
//! [`RosterExtractor`] trait so tests and other backends can stand in.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use booklend_core::{RosterRow, MAX_YEAR};
use serde::{Deserialize, Serialize};

use crate::config::ExtractorConfig;
use crate::{ImportError, ImportResult};

/// A row as returned by an extraction service, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMember {
    /// Name as read from the document.
    #[serde(default)]
    pub name: String,
    /// Year, if the service found one.
    #[serde(default)]
    pub year: Option<i64>,
    /// Class, if the service found one.
    #[serde(default, alias = "class")]
    pub class_name: Option<String>,
}

/// Turns a document into roster rows.
pub trait RosterExtractor: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Read the members from a base64-encoded document.
    ///
    /// Any transport or decoding problem is an
    /// [`ImportError::ExtractionFailed`].
    fn extract_members(
        &self,
        data_base64: &str,
        mime_type: &str,
    ) -> Result<Vec<ExtractedMember>, ImportError>;
}

/// Encode document bytes for [`RosterExtractor::extract_members`].
#[must_use]
pub fn encode_document(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Normalize service rows into roster rows.
///
/// Names and classes are upper-cased; a missing or zero year becomes 1. A
/// year outside 1-6 also becomes 1, with a warning. Rows without a usable
/// name are dropped with a warning.
#[must_use]
pub fn map_extracted(members: Vec<ExtractedMember>) -> ImportResult {
    let mut result = ImportResult::empty();
    for (i, member) in members.into_iter().enumerate() {
        let row = i + 1;
        if member.name.trim().chars().count() < 2 {
            result.warnings.push(format!("Row {row}: no usable name"));
            continue;
        }
        let year = match member.year {
            None | Some(0) => 1,
            Some(y) => match u8::try_from(y) {
                Ok(y) if y <= MAX_YEAR => y,
                _ => {
                    result
                        .warnings
                        .push(format!("Row {row}: invalid year {y}, using 1"));
                    1
                }
            },
        };
        result.rows.push(RosterRow::new(
            &member.name,
            year,
            member.class_name.as_deref().unwrap_or_default(),
        ));
    }
    result
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest<'a> {
    mime_type: &'a str,
    data: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExtractResponse {
    Wrapped { members: Vec<ExtractedMember> },
    Bare(Vec<ExtractedMember>),
}

/// Extraction service reached over HTTP.
///
/// Posts `{"mimeType", "data", "model"}` as JSON and accepts either a bare
/// array of rows or `{"members": [...]}`.
#[derive(Debug, Clone)]
pub struct HttpExtractor {
    config: ExtractorConfig,
}

impl HttpExtractor {
    /// Create an extractor for a configured endpoint.
    pub fn new(config: ExtractorConfig) -> Result<Self, ImportError> {
        if !config.is_enabled() {
            return Err(ImportError::ExtractionFailed(
                "no extractor endpoint configured".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }
}

impl RosterExtractor for HttpExtractor {
    fn name(&self) -> &str {
        "http"
    }

    fn extract_members(
        &self,
        data_base64: &str,
        mime_type: &str,
    ) -> Result<Vec<ExtractedMember>, ImportError> {
        let body = ExtractRequest {
            mime_type,
            data: data_base64,
            model: self.config.model.as_deref(),
        };
        let mut request = ureq::post(&self.config.endpoint).header("Accept", "application/json");
        if let Some(key) = self.config.api_key() {
            request = request.header("Authorization", &format!("Bearer {key}"));
        }

        tracing::info!(endpoint = %self.config.endpoint, mime_type, "requesting roster extraction");
        let mut response = request
            .send_json(&body)
            .map_err(|e| ImportError::ExtractionFailed(e.to_string()))?;
        let parsed: ExtractResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| ImportError::ExtractionFailed(format!("unreadable response: {e}")))?;

        let members = match parsed {
            ExtractResponse::Wrapped { members } | ExtractResponse::Bare(members) => members,
        };
        tracing::debug!(rows = members.len(), "extraction service answered");
        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booklend_core::NO_CLASS;

    // ===== Mapping Tests =====

    #[test]
    fn test_map_normalizes_rows() {
        let result = map_extracted(vec![
            ExtractedMember {
                name: "ali bin abu".to_string(),
                year: Some(3),
                class_name: Some("cerdik".to_string()),
            },
            ExtractedMember {
                name: "Siti".to_string(),
                year: None,
                class_name: None,
            },
        ]);
        assert_eq!(result.rows[0], RosterRow::new("ALI BIN ABU", 3, "CERDIK"));
        assert_eq!(result.rows[1].year, 1);
        assert_eq!(result.rows[1].class_name, NO_CLASS);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_map_flags_bad_rows() {
        let result = map_extracted(vec![
            ExtractedMember {
                name: " ".to_string(),
                ..ExtractedMember::default()
            },
            ExtractedMember {
                name: "Muthu".to_string(),
                year: Some(9),
                class_name: None,
            },
            ExtractedMember {
                name: "Chong".to_string(),
                year: Some(-1),
                class_name: None,
            },
        ]);
        assert_eq!(result.rows.len(), 2);
        assert!(result.rows.iter().all(|r| r.year == 1));
        assert_eq!(result.warnings.len(), 3);
    }

    // ===== Wire Format Tests =====

    #[test]
    fn test_response_shapes() {
        let bare: ExtractResponse =
            serde_json::from_str(r#"[{"name":"Ali","year":2,"className":"Amanah"}]"#).unwrap();
        let wrapped: ExtractResponse =
            serde_json::from_str(r#"{"members":[{"name":"Ali","class":"Amanah"}]}"#).unwrap();
        for parsed in [bare, wrapped] {
            let members = match parsed {
                ExtractResponse::Wrapped { members } | ExtractResponse::Bare(members) => members,
            };
            assert_eq!(members[0].class_name.as_deref(), Some("Amanah"));
        }
    }

    #[test]
    fn test_request_body() {
        let body = ExtractRequest {
            mime_type: "image/png",
            data: "AAAA",
            model: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"mimeType":"image/png","data":"AAAA"}"#
        );
    }

    #[test]
    fn test_encode_document() {
        assert_eq!(encode_document(b"roster"), "cm9zdGVy");
    }

    #[test]
    fn test_http_extractor_needs_endpoint() {
        assert!(HttpExtractor::new(ExtractorConfig::default()).is_err());
        let extractor = HttpExtractor::new(ExtractorConfig::new("http://127.0.0.1:9/x")).unwrap();
        assert_eq!(extractor.name(), "http");
    }
}
