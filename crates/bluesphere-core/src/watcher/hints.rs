use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;

/// Location ids already hinted for this slot
pub type HintSet = BTreeSet<i64>;

/// A hint as stored by the server under `_read_hints_{team}_{slot}`.
///
/// Only the location matters here; the remaining fields are ignored.
#[derive(Debug, Deserialize)]
struct StoredHint {
    location: i64,
}

/// Parse the stored hint list.
///
/// `null` means the slot has never been hinted and yields `None`, which is
/// kept distinct from an empty list.
pub fn parse_hint_value(value: &Value) -> Result<Option<HintSet>> {
    if value.is_null() {
        return Ok(None);
    }
    let hints = Vec::<StoredHint>::deserialize(value)?;
    Ok(Some(hints.into_iter().map(|h| h.location).collect()))
}

/// Locally cached view of the server's location state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintCache {
    missing: BTreeSet<i64>,
    hinted: Option<HintSet>,
}

impl HintCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the missing locations with the list from `Connected`
    pub fn set_missing<I: IntoIterator<Item = i64>>(&mut self, locations: I) {
        self.missing = locations.into_iter().collect();
    }

    /// Replace the hinted locations.
    ///
    /// `None` means the server has no stored hint list yet, which is not the
    /// same as an empty list.
    pub fn set_hinted(&mut self, hinted: Option<HintSet>) {
        self.hinted = hinted;
    }

    pub fn missing(&self) -> &BTreeSet<i64> {
        &self.missing
    }

    /// Hinted locations, or `None` before the first hint list arrived
    pub fn hinted(&self) -> Option<&HintSet> {
        self.hinted.as_ref()
    }

    /// Missing locations not yet hinted, in ascending order
    pub fn hintable(&self) -> Vec<i64> {
        match &self.hinted {
            Some(hinted) => self.missing.difference(hinted).copied().collect(),
            None => self.missing.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_null_hints() {
        assert_eq!(parse_hint_value(&Value::Null).unwrap(), None);
    }

    #[test]
    fn test_parse_hint_list() {
        let value = json!([
            {"receiving_player": 1, "finding_player": 2, "location": 10, "item": 5,
             "found": false, "entrance": "", "item_flags": 1, "status": 0},
            {"location": 12},
        ]);
        let hints = parse_hint_value(&value).unwrap().unwrap();
        assert_eq!(hints, HintSet::from([10, 12]));
    }

    #[test]
    fn test_parse_empty_list_is_not_none() {
        assert_eq!(parse_hint_value(&json!([])).unwrap(), Some(HintSet::new()));
    }

    #[test]
    fn test_parse_malformed_hints() {
        assert!(parse_hint_value(&json!({"location": 1})).is_err());
        assert!(parse_hint_value(&json!([{"item": 1}])).is_err());
    }

    #[test]
    fn test_hintable_excludes_hinted() {
        let mut cache = HintCache::new();
        cache.set_missing([5, 1, 3, 4]);
        assert_eq!(cache.hintable(), vec![1, 3, 4, 5]);

        cache.set_hinted(Some(HintSet::from([3, 5, 99])));
        assert_eq!(cache.hintable(), vec![1, 4]);

        cache.set_hinted(None);
        assert_eq!(cache.hintable().len(), 4);
    }
}
