//! In-memory reference dataset and local suggestion search.
//!
//! The dataset is populated exactly once by the reference loader and is
//! read-only afterwards. Search is a synchronous pure function: a linear
//! scan over the combined entries ranked by match quality.

use crate::models::LocationEntry;

/// The complete normalized reference data.
///
/// `all` is populated if and only if both halves loaded; there is no
/// partially-loaded state visible to callers.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    pub provinces: Vec<LocationEntry>,
    pub districts: Vec<LocationEntry>,
    /// Combined search sequence, provinces first.
    pub all: Vec<LocationEntry>,
}

impl ReferenceDataset {
    /// Build the dataset from both fully-loaded halves.
    pub fn from_parts(provinces: Vec<LocationEntry>, districts: Vec<LocationEntry>) -> Self {
        let mut all = Vec::with_capacity(provinces.len() + districts.len());
        all.extend(provinces.iter().cloned());
        all.extend(districts.iter().cloned());
        Self {
            provinces,
            districts,
            all,
        }
    }

    pub fn is_loaded(&self) -> bool {
        !self.all.is_empty()
    }

    /// Rank-ordered suggestions for `term`, truncated to `limit`.
    ///
    /// An entry matches when the lowercased term is a substring of its
    /// precomputed `search_text`, its `name`, or its `display_text`.
    /// Ordering: exact name equality first, then name prefix matches, then
    /// ascending name length in characters. The sort is stable, so entries
    /// of equal rank keep dataset order (provinces before districts).
    pub fn search(&self, term: &str, limit: usize) -> Vec<LocationEntry> {
        let term = term.trim().to_lowercase();
        if term.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut hits: Vec<&LocationEntry> = self
            .all
            .iter()
            .filter(|entry| {
                entry.search_text.contains(&term)
                    || entry.name.to_lowercase().contains(&term)
                    || entry.display_text.to_lowercase().contains(&term)
            })
            .collect();

        hits.sort_by_key(|entry| rank(entry, &term));

        hits.into_iter().take(limit).cloned().collect()
    }
}

/// Sort key for a matching entry: lower sorts first.
///
/// Length is counted in characters, not bytes; accented names would
/// otherwise tie or reorder on encoding width.
fn rank(entry: &LocationEntry, term: &str) -> (u8, u8, usize) {
    let name = entry.name.to_lowercase();
    let exact = if name == term { 0 } else { 1 };
    let prefix = if name.starts_with(term) { 0 } else { 1 };
    (exact, prefix, entry.name.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocationKind, RawLocationRecord};
    use serde_json::json;

    fn province(code: &str, name: &str, name_en: &str) -> LocationEntry {
        let raw: RawLocationRecord =
            serde_json::from_value(json!({ "ProvinceCode": code, "Name": name, "NameEn": name_en }))
                .unwrap();
        LocationEntry::from_raw(LocationKind::Province, &raw)
    }

    fn district(code: &str, name: &str) -> LocationEntry {
        let raw: RawLocationRecord =
            serde_json::from_value(json!({ "DistrictCode": code, "Name": name })).unwrap();
        LocationEntry::from_raw(LocationKind::District, &raw)
    }

    fn dataset() -> ReferenceDataset {
        ReferenceDataset::from_parts(
            vec![
                province("01", "Hà Nội", "Hanoi"),
                province("35", "Hà Nam", "Ha Nam"),
                province("42", "Hà Tĩnh", "Ha Tinh"),
                province("79", "Hồ Chí Minh", "Ho Chi Minh City"),
            ],
            vec![district("760", "Quận 1"), district("768", "Hà Đông")],
        )
    }

    #[test]
    fn test_prefix_matches_ordered_by_name_length() {
        let results = dataset().search("Hà", 10);
        let names: Vec<&str> = results.iter().map(|e| e.name.as_str()).collect();
        // Hà Nội and Hà Nam (6 chars) before Hà Tĩnh (7), Hà Đông after as a
        // district at equal length.
        assert_eq!(names, vec!["Hà Nội", "Hà Nam", "Hà Tĩnh", "Hà Đông"]);
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let data = ReferenceDataset::from_parts(
            vec![
                province("01", "Hà Nội", "Hanoi"),
                province("35", "Hà Nam", "Ha Nam"),
                province("99", "Hà", "Ha"),
            ],
            Vec::new(),
        );
        let results = data.search("hà", 10);
        assert_eq!(results[0].name, "Hà");
    }

    #[test]
    fn test_match_via_english_name() {
        let results = dataset().search("hanoi", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Hà Nội");
    }

    #[test]
    fn test_limit_truncates_after_sorting() {
        let results = dataset().search("Hà", 2);
        let names: Vec<&str> = results.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Hà Nội", "Hà Nam"]);
    }

    #[test]
    fn test_blank_term_and_zero_limit_return_empty() {
        assert!(dataset().search("   ", 10).is_empty());
        assert!(dataset().search("Hà", 0).is_empty());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let upper = dataset().search("QUẬN", 5);
        assert_eq!(upper.len(), 1);
        assert_eq!(upper[0].name, "Quận 1");
    }

    #[test]
    fn test_unloaded_dataset_matches_nothing() {
        let empty = ReferenceDataset::default();
        assert!(!empty.is_loaded());
        assert!(empty.search("Hà", 10).is_empty());
    }
}
