use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Multi-valued attributes of one directory record, keyed by attribute name.
///
/// Attribute names are matched case-insensitively, as LDAP does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dn: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, Vec<String>>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dn(dn: impl Into<String>) -> Self {
        Self {
            dn: Some(dn.into()),
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert, appending to any values already present.
    pub fn with(mut self, name: impl Into<String>, values: &[&str]) -> Self {
        self.insert(name, values.iter().map(|v| v.to_string()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, values: impl IntoIterator<Item = String>) {
        self.values.entry(name.into()).or_default().extend(values);
    }

    /// All values of `name`, empty when the attribute is absent.
    pub fn all(&self, name: &str) -> &[String] {
        self.values
            .get(name)
            .or_else(|| {
                self.values
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, values)| values)
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.all(name).first().map(String::as_str)
    }

    /// The value of `name` if it has exactly one.
    pub fn single(&self, name: &str) -> Option<&str> {
        match self.all(name) {
            [value] => Some(value.as_str()),
            _ => None,
        }
    }
}

impl From<BTreeMap<String, Vec<String>>> for AttributeMap {
    fn from(values: BTreeMap<String, Vec<String>>) -> Self {
        Self { dn: None, values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let attrs = AttributeMap::new().with("givenName", &["Ada"]);
        assert_eq!(attrs.first("givenname"), Some("Ada"));
        assert_eq!(attrs.first("GIVENNAME"), Some("Ada"));
        assert_eq!(attrs.all("givenName").len(), 1);
    }

    #[test]
    fn test_single_requires_exactly_one_value() {
        let attrs = AttributeMap::new()
            .with("department", &["Physics", "Chemistry"])
            .with("mail", &["a@example.org"]);
        assert_eq!(attrs.single("department"), None);
        assert_eq!(attrs.single("mail"), Some("a@example.org"));
        assert_eq!(attrs.single("sn"), None);
    }

    #[test]
    fn test_absent_attribute_is_empty() {
        let attrs = AttributeMap::with_dn("CN=abcd123,OU=People");
        assert!(attrs.all("memberOf").is_empty());
        assert_eq!(attrs.first("memberOf"), None);
        assert_eq!(attrs.dn.as_deref(), Some("CN=abcd123,OU=People"));
    }
}
