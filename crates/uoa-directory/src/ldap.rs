//! LDAP directory backend
//!
//! Talks to Active Directory over LDAP v3 using `ldap3`. Every search uses
//! RFC 2696 paged results so large groups come back complete.

use std::time::Instant;

use async_trait::async_trait;
use ldap3::adapters::{Adapter, EntriesOnly, PagedResults};
use ldap3::{ldap_escape, Ldap, LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};
use uoa_core::constants::PERSON_ATTRIBUTES;
use uoa_core::{AttributeMap, LdapConfig};

use crate::traits::{Directory, DirectoryError, DirectoryResult};

impl From<LdapError> for DirectoryError {
    fn from(err: LdapError) -> Self {
        DirectoryError::SearchFailed(err.to_string())
    }
}

/// Filter selecting the person whose `cn` is `identifier`.
pub fn identifier_filter(identifier: &str) -> String {
    format!(
        "(&(cn={})(objectCategory=person)(objectClass=user))",
        ldap_escape(identifier)
    )
}

/// Filter selecting people whose display name contains `term`.
pub fn name_filter(term: &str) -> String {
    format!(
        "(&(displayName=*{}*)(objectCategory=person)(objectClass=user))",
        ldap_escape(term)
    )
}

pub fn group_filter(group_dn: &str) -> String {
    format!("(memberOf={})", ldap_escape(group_dn))
}

/// LDAP directory client
#[derive(Clone)]
pub struct LdapDirectory {
    ldap: Ldap,
    base_dn: String,
    page_size: i32,
}

impl LdapDirectory {
    /// Connect to the server in `config` and bind with its credentials.
    #[tracing::instrument(skip(config), fields(url = %config.url))]
    pub async fn connect(config: &LdapConfig) -> DirectoryResult<Self> {
        let username = config.username.as_deref().ok_or_else(|| {
            DirectoryError::ConfigError("LDAP username not configured".to_string())
        })?;
        let password = config.password.as_deref().ok_or_else(|| {
            DirectoryError::ConfigError("LDAP password not configured".to_string())
        })?;

        let start = Instant::now();
        let settings = LdapConnSettings::new().set_no_tls_verify(config.accept_invalid_certs);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &config.url)
            .await
            .map_err(|e| {
                DirectoryError::ConnectionFailed(format!("{}: {}", config.url, e))
            })?;
        ldap3::drive!(conn);

        ldap.simple_bind(username, password)
            .await
            .and_then(|res| res.success())
            .map_err(|e| DirectoryError::BindFailed(e.to_string()))?;

        tracing::info!(
            base_dn = %config.base_dn,
            duration_ms = start.elapsed().as_millis(),
            "LDAP bind successful"
        );

        Ok(Self {
            ldap,
            base_dn: config.base_dn.clone(),
            page_size: config.page_size,
        })
    }

    async fn search(&self, scope: Scope, filter: &str) -> DirectoryResult<Vec<AttributeMap>> {
        let start = Instant::now();
        let mut ldap = self.ldap.clone();

        let adapters: Vec<Box<dyn Adapter<_, _>>> = vec![
            Box::new(EntriesOnly::new()),
            Box::new(PagedResults::new(self.page_size)),
        ];
        let mut stream = ldap
            .streaming_search_with(
                adapters,
                &self.base_dn,
                scope,
                filter,
                PERSON_ATTRIBUTES.to_vec(),
            )
            .await?;

        let mut entries = Vec::new();
        while let Some(entry) = stream.next().await? {
            let entry = SearchEntry::construct(entry);
            entries.push(AttributeMap {
                dn: Some(entry.dn),
                values: entry.attrs.into_iter().collect(),
            });
        }
        stream.finish().await.success()?;

        tracing::debug!(
            filter = %filter,
            entries = entries.len(),
            duration_ms = start.elapsed().as_millis(),
            "LDAP search complete"
        );

        Ok(entries)
    }
}

#[async_trait]
impl Directory for LdapDirectory {
    #[tracing::instrument(skip(self))]
    async fn find_by_identifier(&self, identifier: &str) -> DirectoryResult<Option<AttributeMap>> {
        let mut entries = self
            .search(Scope::OneLevel, &identifier_filter(identifier))
            .await?;

        match entries.len() {
            0 => Ok(None),
            1 => Ok(entries.pop()),
            count => Err(DirectoryError::Ambiguous {
                identifier: identifier.to_string(),
                count,
            }),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn search_by_name(&self, term: &str) -> DirectoryResult<Vec<AttributeMap>> {
        self.search(Scope::Subtree, &name_filter(term)).await
    }

    #[tracing::instrument(skip(self))]
    async fn members_of_group(&self, group_dn: &str) -> DirectoryResult<Vec<AttributeMap>> {
        self.search(Scope::Subtree, &group_filter(group_dn)).await
    }

    async fn close(&self) -> DirectoryResult<()> {
        let mut ldap = self.ldap.clone();
        ldap.unbind().await?;
        tracing::debug!("LDAP connection unbound");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "ldap"
    }
}
