//! Location records and normalization.
//!
//! Reference payloads arrive with inconsistent field names and casing
//! depending on which endpoint produced them. Everything is normalized into
//! [`LocationEntry`] at the edge; entries are immutable afterwards, and the
//! precomputed `search_text` is never recomputed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of administrative region an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    Province,
    District,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Province => "province",
            Self::District => "district",
        }
    }

    /// UI category label shown under a suggestion.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Province => "Province",
            Self::District => "City",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "province" => Some(Self::Province),
            "district" => Some(Self::District),
            _ => None,
        }
    }
}

/// A raw location record as delivered by the API.
///
/// Identifier and name fields vary by endpoint (`ProvinceCode` vs `code` vs
/// `Code`), so every spelling is accepted and resolution order is fixed in
/// [`LocationEntry::from_raw`]. Identifiers may arrive as JSON numbers or
/// strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocationRecord {
    #[serde(default, rename = "ProvinceCode")]
    pub province_code: Option<Value>,
    #[serde(default, rename = "DistrictCode")]
    pub district_code: Option<Value>,
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub id: Option<Value>,
    /// Uppercase `Code` field seen on legacy payloads; lowest priority.
    #[serde(default, rename = "Code")]
    pub legacy_code: Option<Value>,
    #[serde(default, alias = "Name")]
    pub name: Option<String>,
    #[serde(default, alias = "NameEn", alias = "nameEn")]
    pub name_en: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A normalized location suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationEntry {
    /// Opaque identifier, unique within its kind. Absent on malformed rows.
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub name: String,
    pub name_en: String,
    /// UI label; defaults to `name`.
    pub display_text: String,
    /// Category label ("Province" / "City").
    pub secondary_text: String,
    /// Lowercase concatenation of `name` and `name_en`, computed once here.
    pub search_text: String,
}

impl LocationEntry {
    /// Normalize a raw record of a known kind.
    ///
    /// Identifier resolution order: the kind-specific code field, then
    /// `code`, then `id`, then legacy `Code`.
    pub fn from_raw(kind: LocationKind, raw: &RawLocationRecord) -> Self {
        let kind_code = match kind {
            LocationKind::Province => raw.province_code.as_ref(),
            LocationKind::District => raw.district_code.as_ref(),
        };
        let id = kind_code
            .and_then(value_to_id)
            .or_else(|| raw.code.as_ref().and_then(value_to_id))
            .or_else(|| raw.id.as_ref().and_then(value_to_id))
            .or_else(|| raw.legacy_code.as_ref().and_then(value_to_id));

        let name = raw.name.clone().unwrap_or_default();
        let name_en = raw.name_en.clone().unwrap_or_default();
        let search_text = format!("{} {}", name, name_en).trim().to_lowercase();

        Self {
            id,
            kind,
            display_text: name.clone(),
            secondary_text: kind.label().to_string(),
            name,
            name_en,
            search_text,
        }
    }

    /// Normalize a record of unknown kind (popular/search payloads).
    ///
    /// An explicit `type` field wins; otherwise a record carrying a
    /// `ProvinceCode` or legacy `Code` is a province, everything else a
    /// district.
    pub fn from_record(raw: &RawLocationRecord) -> Self {
        let kind = raw
            .kind
            .as_deref()
            .and_then(LocationKind::from_str)
            .unwrap_or_else(|| {
                if raw.province_code.is_some() || raw.legacy_code.is_some() {
                    LocationKind::Province
                } else {
                    LocationKind::District
                }
            });
        Self::from_raw(kind, raw)
    }
}

fn value_to_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawLocationRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_province_id_resolution_order() {
        let raw = record(json!({ "ProvinceCode": "01", "code": "xx", "Name": "Hà Nội" }));
        let entry = LocationEntry::from_raw(LocationKind::Province, &raw);
        assert_eq!(entry.id.as_deref(), Some("01"));

        let raw = record(json!({ "code": 79, "id": "ignored", "Name": "Hồ Chí Minh" }));
        let entry = LocationEntry::from_raw(LocationKind::Province, &raw);
        assert_eq!(entry.id.as_deref(), Some("79"));

        let raw = record(json!({ "Code": "48", "Name": "Đà Nẵng" }));
        let entry = LocationEntry::from_raw(LocationKind::Province, &raw);
        assert_eq!(entry.id.as_deref(), Some("48"));
    }

    #[test]
    fn test_search_text_is_lowercase_concatenation() {
        let raw = record(json!({ "DistrictCode": 760, "Name": "Quận 1", "NameEn": "District 1" }));
        let entry = LocationEntry::from_raw(LocationKind::District, &raw);
        assert_eq!(entry.search_text, "quận 1 district 1");
        assert_eq!(entry.display_text, "Quận 1");
        assert_eq!(entry.secondary_text, "City");
    }

    #[test]
    fn test_missing_name_en_leaves_no_trailing_space() {
        let raw = record(json!({ "ProvinceCode": "01", "Name": "Hà Nội" }));
        let entry = LocationEntry::from_raw(LocationKind::Province, &raw);
        assert_eq!(entry.search_text, "hà nội");
    }

    #[test]
    fn test_generic_kind_inference() {
        let typed = record(json!({ "type": "district", "DistrictCode": 1, "Name": "Ba Đình" }));
        assert_eq!(LocationEntry::from_record(&typed).kind, LocationKind::District);

        let by_code = record(json!({ "ProvinceCode": "01", "Name": "Hà Nội" }));
        assert_eq!(LocationEntry::from_record(&by_code).kind, LocationKind::Province);

        let bare = record(json!({ "id": 5, "Name": "Hoàn Kiếm" }));
        assert_eq!(LocationEntry::from_record(&bare).kind, LocationKind::District);
    }
}
