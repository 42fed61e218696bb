#[cfg(feature = "directory-ldap")]
use crate::LdapDirectory;
use crate::{Directory, DirectoryResult};
use std::sync::Arc;
use uoa_core::LdapConfig;

/// Create a directory client based on configuration
#[cfg(feature = "directory-ldap")]
pub async fn create_directory(config: &LdapConfig) -> DirectoryResult<Arc<dyn Directory>> {
    let directory = LdapDirectory::connect(config).await?;
    Ok(Arc::new(directory))
}

#[cfg(not(feature = "directory-ldap"))]
pub async fn create_directory(_config: &LdapConfig) -> DirectoryResult<Arc<dyn Directory>> {
    Err(crate::DirectoryError::ConfigError(
        "LDAP directory backend not available (directory-ldap feature not enabled)".to_string(),
    ))
}
