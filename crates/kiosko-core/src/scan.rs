//! # QR Scan Payloads
//!
//! Labels printed for products carry a small JSON document:
//!
//! ```text
//! {"productoId":"550e8400-e29b-41d4-a716-446655440000","varianteId":"..."}
//! ```
//!
//! Older labels hold only the bare product UUID; both forms are accepted.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::{validate_uuid, ValidationResult};

/// What a scanned label points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ScanPayload {
    #[serde(rename = "productoId")]
    pub product_id: String,
    #[serde(rename = "varianteId", default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
}

impl ScanPayload {
    pub fn new(product_id: impl Into<String>, variant_id: Option<String>) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id,
        }
    }

    /// Parses raw scanner output.
    ///
    /// ## Example
    /// ```rust
    /// use kiosko_core::scan::ScanPayload;
    ///
    /// let id = "550e8400-e29b-41d4-a716-446655440000";
    /// assert_eq!(ScanPayload::parse(id).unwrap().product_id, id);
    /// assert!(ScanPayload::parse("hello").is_err());
    /// ```
    pub fn parse(raw: &str) -> ValidationResult<Self> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Err(ValidationError::required("scan"));
        }

        let payload = if raw.starts_with('{') {
            serde_json::from_str::<ScanPayload>(raw).map_err(|e| ValidationError::InvalidFormat {
                field: "scan".to_string(),
                reason: e.to_string(),
            })?
        } else {
            ScanPayload::new(raw, None)
        };

        validate_uuid("productoId", &payload.product_id)?;
        if let Some(variant_id) = &payload.variant_id {
            validate_uuid("varianteId", variant_id)?;
        }

        Ok(payload)
    }

    /// JSON form printed on labels.
    pub fn encode(&self) -> String {
        // Two string fields cannot fail to serialize
        serde_json::to_string(self).unwrap_or_default()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCT: &str = "550e8400-e29b-41d4-a716-446655440000";
    const VARIANT: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    #[test]
    fn test_parse_json_with_variant() {
        let raw = format!(r#"{{"productoId":"{}","varianteId":"{}"}}"#, PRODUCT, VARIANT);
        let payload = ScanPayload::parse(&raw).unwrap();
        assert_eq!(payload.product_id, PRODUCT);
        assert_eq!(payload.variant_id.as_deref(), Some(VARIANT));
    }

    #[test]
    fn test_parse_bare_uuid() {
        let payload = ScanPayload::parse(&format!("  {}\n", PRODUCT)).unwrap();
        assert_eq!(payload, ScanPayload::new(PRODUCT, None));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ScanPayload::parse("").is_err());
        assert!(ScanPayload::parse("{not json").is_err());
        assert!(ScanPayload::parse(r#"{"productoId":"abc"}"#).is_err());

        let bad_variant = format!(r#"{{"productoId":"{}","varianteId":"x"}}"#, PRODUCT);
        assert!(matches!(
            ScanPayload::parse(&bad_variant),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_encode_matches_label_format() {
        let plain = ScanPayload::new(PRODUCT, None).encode();
        assert_eq!(plain, format!(r#"{{"productoId":"{}"}}"#, PRODUCT));

        let with_variant = ScanPayload::new(PRODUCT, Some(VARIANT.to_string()));
        assert_eq!(ScanPayload::parse(&with_variant.encode()).unwrap(), with_variant);
    }
}
