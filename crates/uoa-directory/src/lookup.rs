use uoa_core::{AppError, AppResult, AttributeMap, Person, PersonResolver};

use crate::traits::Directory;

/// Fetch the record for `identifier` and resolve it into a [`Person`].
///
/// A record that does not exist is reported as `NotFound`.
pub async fn lookup_person<'h>(
    directory: &dyn Directory,
    resolver: &PersonResolver<'h>,
    identifier: &str,
) -> AppResult<Person<'h>> {
    let attributes = directory
        .find_by_identifier(identifier)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("no directory entry for '{}'", identifier))
        })?;

    resolver.resolve_from_attributes(&attributes)
}

/// Resolve every record returned by a search, skipping the ones that cannot be
/// resolved.
pub fn resolve_all<'h>(resolver: &PersonResolver<'h>, records: &[AttributeMap]) -> Vec<Person<'h>> {
    records
        .iter()
        .filter_map(|attrs| match resolver.resolve_from_attributes(attrs) {
            Ok(person) => Some(person),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping directory record");
                None
            }
        })
        .collect()
}
