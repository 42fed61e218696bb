use async_trait::async_trait;
use uoa_core::constants::{ATTR_DISPLAY_NAME, ATTR_IDENTIFIER, ATTR_MEMBER_OF};
use uoa_core::AttributeMap;

use crate::traits::{Directory, DirectoryError, DirectoryResult};

/// Directory backed by a fixed list of records.
///
/// Uses the same matching rules as the LDAP filters: exact `cn`,
/// case-insensitive substring on `displayName` and exact `memberOf`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    entries: Vec<AttributeMap>,
}

impl InMemoryDirectory {
    pub fn new(entries: Vec<AttributeMap>) -> Self {
        Self { entries }
    }
}

impl FromIterator<AttributeMap> for InMemoryDirectory {
    fn from_iter<I: IntoIterator<Item = AttributeMap>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_by_identifier(&self, identifier: &str) -> DirectoryResult<Option<AttributeMap>> {
        let mut matches: Vec<&AttributeMap> = self
            .entries
            .iter()
            .filter(|entry| entry.all(ATTR_IDENTIFIER).iter().any(|cn| cn == identifier))
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop().cloned()),
            count => Err(DirectoryError::Ambiguous {
                identifier: identifier.to_string(),
                count,
            }),
        }
    }

    async fn search_by_name(&self, term: &str) -> DirectoryResult<Vec<AttributeMap>> {
        let term = term.to_lowercase();
        Ok(self
            .entries
            .iter()
            .filter(|entry| {
                entry
                    .all(ATTR_DISPLAY_NAME)
                    .iter()
                    .any(|name| name.to_lowercase().contains(&term))
            })
            .cloned()
            .collect())
    }

    async fn members_of_group(&self, group_dn: &str) -> DirectoryResult<Vec<AttributeMap>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| entry.all(ATTR_MEMBER_OF).iter().any(|dn| dn == group_dn))
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> InMemoryDirectory {
        [
            AttributeMap::with_dn("CN=abcd123,OU=People")
                .with("cn", &["abcd123"])
                .with("displayName", &["Ada Lovelace"])
                .with("memberOf", &["CN=Staff"]),
            AttributeMap::with_dn("CN=efgh456,OU=People")
                .with("cn", &["efgh456"])
                .with("displayName", &["Grace Hopper"])
                .with("memberOf", &["CN=Staff", "CN=Students"]),
            AttributeMap::with_dn("CN=dup,OU=People").with("cn", &["dup"]),
            AttributeMap::with_dn("CN=dup,OU=Other").with("cn", &["dup"]),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_find_by_identifier() {
        let dir = directory();
        let found = dir.find_by_identifier("abcd123").await.unwrap().unwrap();
        assert_eq!(found.first("displayName"), Some("Ada Lovelace"));
        assert!(dir.find_by_identifier("ABCD123").await.unwrap().is_none());
        assert!(dir.find_by_identifier("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_identifier_ambiguous() {
        let err = directory().find_by_identifier("dup").await.unwrap_err();
        assert!(matches!(err, DirectoryError::Ambiguous { count: 2, .. }));
    }

    #[tokio::test]
    async fn test_search_by_name_is_case_insensitive_substring() {
        let dir = directory();
        let found = dir.search_by_name("HOP").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].first("cn"), Some("efgh456"));
        assert!(dir.search_by_name("xyz").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_members_of_group() {
        let dir = directory();
        assert_eq!(dir.members_of_group("CN=Staff").await.unwrap().len(), 2);
        assert_eq!(dir.members_of_group("CN=Students").await.unwrap().len(), 1);
        assert!(dir.members_of_group("CN=staff").await.unwrap().is_empty());
    }
}
