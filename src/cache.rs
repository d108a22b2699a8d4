//! Fingerprint-keyed cache for enriched search results.
//!
//! Pages of search results are enriched with images and review counts; the
//! cache memoizes those payloads per page so pagination within the same
//! query never refetches. There is no eviction: the owning search session
//! calls [`SearchCache::clear`] when the user issues a new top-level query.

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Mutex;

use serde_json::Value;
use tracing::debug;

/// Key-value store of enrichment payloads.
#[derive(Debug)]
pub struct SearchCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V: Clone> Default for SearchCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> SearchCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.lock().unwrap();
        let hit = entries.get(key).cloned();
        if hit.is_some() {
            debug!(key, "search cache hit");
        }
        hit
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.entries.lock().unwrap().insert(key.into(), value);
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    /// Drop every entry. Called when the enclosing search session changes,
    /// not on page or filter changes within the same query.
    pub fn clear(&self) {
        debug!("clearing search cache");
        self.entries.lock().unwrap().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key for a page of room listings.
///
/// Entity ids are sorted before joining: a permutation of the same ids
/// addresses the same entry. Returns `None` for an empty page.
pub fn room_cache_key<I: Display>(ids: &[I], filters: &Value) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let mut parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    parts.sort();
    Some(compose_key("room", &parts, filters))
}

/// Cache key for a page of auction listings.
///
/// Ids are joined in the given order: display order is part of identity
/// here, so a permutation addresses a different entry. Returns `None` for
/// an empty page.
pub fn auction_cache_key<I: Display>(ids: &[I], filters: &Value) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    Some(compose_key("auction", &parts, filters))
}

fn compose_key(prefix: &str, parts: &[String], filters: &Value) -> String {
    let fingerprint = filter_fingerprint(filters);
    if fingerprint.is_empty() {
        format!("{}_{}", prefix, parts.join("_"))
    } else {
        format!("{}_{}_{}", prefix, parts.join("_"), fingerprint)
    }
}

/// Deterministic fingerprint of a filter object.
///
/// Keys are sorted before serialization, so the result is independent of
/// property insertion order; characters outside `[A-Za-z0-9_.:-]` are
/// stripped to keep keys compact. Non-object or empty filters fingerprint
/// to the empty string.
pub fn filter_fingerprint(filters: &Value) -> String {
    let map = match filters {
        Value::Object(map) if !map.is_empty() => map,
        _ => return String::new(),
    };

    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut out = String::new();
    for key in keys {
        let value = &map[key.as_str()];
        let rendered = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !out.is_empty() {
            out.push('.');
        }
        out.push_str(key);
        out.push(':');
        out.push_str(&rendered);
    }
    out.retain(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_set_has_roundtrip() {
        let cache: SearchCache<Vec<&str>> = SearchCache::new();
        cache.set("room_1_2", vec!["a", "b"]);
        assert_eq!(cache.get("room_1_2"), Some(vec!["a", "b"]));
        assert!(cache.has("room_1_2"));
        assert!(!cache.has("unknown-key"));
        assert_eq!(cache.get("unknown-key"), None);
    }

    #[test]
    fn test_clear_drops_everything() {
        let cache: SearchCache<u32> = SearchCache::new();
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.has("a"));
    }

    #[test]
    fn test_room_keys_are_order_insensitive() {
        let filters = json!({ "minPrice": 100 });
        assert_eq!(
            room_cache_key(&[2, 1], &filters),
            room_cache_key(&[1, 2], &filters)
        );
    }

    #[test]
    fn test_auction_keys_preserve_order() {
        let filters = json!({});
        let forward = auction_cache_key(&["u2", "u1"], &filters);
        let reversed = auction_cache_key(&["u1", "u2"], &filters);
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_empty_id_list_has_no_key() {
        let none: &[u32] = &[];
        assert_eq!(room_cache_key(none, &json!({})), None);
        assert_eq!(auction_cache_key(none, &json!({})), None);
    }

    #[test]
    fn test_fingerprint_ignores_insertion_order() {
        let a = json!({ "checkIn": "2026-08-01", "guests": 2 });
        let b = json!({ "guests": 2, "checkIn": "2026-08-01" });
        assert_eq!(filter_fingerprint(&a), filter_fingerprint(&b));
        assert!(!filter_fingerprint(&a).is_empty());
    }

    #[test]
    fn test_fingerprint_strips_unsafe_characters() {
        let filters = json!({ "q": "phở & bún/chả?" });
        let fingerprint = filter_fingerprint(&filters);
        assert!(fingerprint
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')));
    }

    #[test]
    fn test_empty_filters_add_nothing_to_key() {
        assert_eq!(room_cache_key(&[7], &json!({})).unwrap(), "room_7");
        assert_eq!(
            auction_cache_key(&["a9"], &Value::Null).unwrap(),
            "auction_a9"
        );
    }

    #[test]
    fn test_numeric_ids_sort_lexicographically() {
        // Matches the reference behavior: ids are stringified before sorting.
        let key = room_cache_key(&[2, 10, 1], &json!({})).unwrap();
        assert_eq!(key, "room_1_10_2");
    }
}
