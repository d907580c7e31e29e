//! Ordered unique-key parameter map.

use std::fmt;

use crate::error::ValidationError;

/// `key=value` parameters of a URI or header.
///
/// Keys are unique and keep their insertion order; inserting an existing
/// key replaces the value in place.
///
/// # Examples
///
/// ```
/// use sip_uri::Parameters;
///
/// let mut params: Parameters = [("maddr", "10.0.0.1"), ("lr", "")].into_iter().collect();
/// params.insert("maddr", "10.0.0.2");
/// assert_eq!(params.get("maddr"), Some("10.0.0.2"));
/// assert_eq!(params.to_string(), "maddr=10.0.0.2;lr=");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Parameters {
    entries: Vec<(String, String)>,
}

impl Parameters {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for a key, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Sets a value, returning the previous one.
    ///
    /// A new key is appended; an existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns an iterator over the parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rejects an empty key, or a key or value holding a reserved character.
    pub(crate) fn check_reserved(
        &self,
        key_reserved: &[char],
        value_reserved: &[char],
    ) -> Result<(), ValidationError> {
        match self
            .iter()
            .find(|(k, v)| k.is_empty() || k.contains(key_reserved) || v.contains(value_reserved))
        {
            Some((key, value)) => Err(ValidationError::InvalidParameter {
                key: key.to_string(),
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (k, v)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Parameters {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_order() {
        let mut params = Parameters::new();
        params.insert("z", "1");
        params.insert("a", "2");
        let items: Vec<_> = params.iter().collect();
        assert_eq!(items, vec![("z", "1"), ("a", "2")]);
    }

    #[test]
    fn insert_existing_key_replaces_in_place() {
        let mut params: Parameters = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.insert("a", "3"), Some("1".to_string()));
        assert_eq!(params.to_string(), "a=3;b=2");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn remove_returns_value() {
        let mut params: Parameters = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(params.remove("a"), Some("1".to_string()));
        assert_eq!(params.remove("a"), None);
        assert!(!params.contains_key("a"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn display_empty_values() {
        let params: Parameters = [("lr", ""), ("x", "y")].into_iter().collect();
        assert_eq!(params.to_string(), "lr=;x=y");
    }

    #[test]
    fn check_reserved_reports_first_offender() {
        let params: Parameters = [("a", "1"), ("b", "x;y"), ("", "z")].into_iter().collect();
        assert_eq!(
            params.check_reserved(&['='], &[';']),
            Err(ValidationError::InvalidParameter {
                key: "b".to_string(),
                value: "x;y".to_string()
            })
        );
        let params: Parameters = [("a", "1")].into_iter().collect();
        assert_eq!(params.check_reserved(&['='], &[';']), Ok(()));
    }

    #[test]
    fn empty_map() {
        let params = Parameters::new();
        assert!(params.is_empty());
        assert_eq!(params.get("tag"), None);
        assert_eq!(params.to_string(), "");
    }
}
