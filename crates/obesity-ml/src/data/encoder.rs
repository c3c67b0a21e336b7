//! Label encoding for categorical columns and the target.

use serde::{Deserialize, Serialize};

/// Bijective mapping between category strings and integer codes.
///
/// Codes are assigned in sorted order of the observed values, so the mapping
/// depends on exactly which values were seen at fit time. A fitted encoder
/// must therefore be persisted and reused, never refit, at inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    /// Known categories; the code of a category is its index here.
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on a set of observed values. Duplicates are collapsed.
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut classes: Vec<String> = values.into_iter().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    /// Known categories in code order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of known categories.
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Code for a value, or `None` if it was never seen at fit time.
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes.binary_search_by(|c| c.as_str().cmp(value)).ok()
    }

    /// Value for a code, or `None` if the code is out of range.
    pub fn decode(&self, code: usize) -> Option<&str> {
        self.classes.get(code).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_sorted_order() {
        let enc = LabelEncoder::fit(["no", "Sometimes", "Always", "Frequently", "no"]);
        assert_eq!(enc.classes(), &["Always", "Frequently", "Sometimes", "no"]);
        assert_eq!(enc.encode("Sometimes"), Some(2));
        assert_eq!(enc.encode("no"), Some(3));
        assert_eq!(enc.encode("never"), None);
    }

    #[test]
    fn decode_inverts_encode() {
        let enc = LabelEncoder::fit(["Male", "Female"]);
        for class in enc.classes() {
            let code = enc.encode(class).unwrap();
            assert_eq!(enc.decode(code), Some(class.as_str()));
        }
        assert_eq!(enc.decode(2), None);
    }

    #[test]
    fn survives_serde_roundtrip() {
        let enc = LabelEncoder::fit(["yes", "no"]);
        let json = serde_json::to_string(&enc).unwrap();
        let restored: LabelEncoder = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, enc);
    }
}
