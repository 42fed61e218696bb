use std::fmt;

use serde::Serialize;

use super::UnitSummary;
use crate::constants::FEDERATED_DOMAIN;
use crate::hierarchy::{NodeId, OrgHierarchy, OrgUnit};

/// Roles derived from membership of the well-known directory groups
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoleFlags {
    pub staff: bool,
    pub student: bool,
    pub postgraduate: bool,
    pub doctoral_student: bool,
    pub contractor: bool,
}

/// A person resolved from one directory record.
///
/// Borrows the hierarchy the affiliations point into; the person itself is
/// cheap and short-lived, one per query.
#[derive(Debug, Clone)]
pub struct Person<'h> {
    pub identifier: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Free-text department from the directory. Often stale or ambiguous.
    pub department: String,
    pub memberships: Vec<String>,
    pub roles: RoleFlags,
    affiliations: Vec<NodeId>,
    hierarchy: &'h OrgHierarchy,
}

impl<'h> Person<'h> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        identifier: String,
        first_name: String,
        last_name: String,
        email: String,
        department: String,
        memberships: Vec<String>,
        roles: RoleFlags,
        affiliations: Vec<NodeId>,
        hierarchy: &'h OrgHierarchy,
    ) -> Self {
        Self {
            identifier,
            first_name,
            last_name,
            email,
            department,
            memberships,
            roles,
            affiliations,
            hierarchy,
        }
    }

    /// Username used for federated (Tuakiri) logins.
    pub fn federated_username(&self) -> String {
        format!("{}@{}", self.identifier, FEDERATED_DOMAIN)
    }

    pub fn affiliation_ids(&self) -> &[NodeId] {
        &self.affiliations
    }

    /// Highest-level units this person belongs to.
    pub fn affiliations(&self) -> impl Iterator<Item = &'h OrgUnit> + '_ {
        let hierarchy = self.hierarchy;
        self.affiliations.iter().map(move |&node| hierarchy.unit(node))
    }

    pub fn hierarchy(&self) -> &'h OrgHierarchy {
        self.hierarchy
    }

    pub fn summary(&self) -> PersonSummary {
        PersonSummary {
            identifier: self.identifier.clone(),
            federated_username: self.federated_username(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
            roles: self.roles,
            affiliations: self
                .affiliations
                .iter()
                .map(|&node| {
                    let unit = self.hierarchy.unit(node);
                    AffiliationSummary {
                        code: unit.id().to_string(),
                        name: unit.display_name().to_string(),
                        path: self
                            .hierarchy
                            .path_from_root(node)
                            .into_iter()
                            .map(|step| self.hierarchy.unit(step).summary())
                            .collect(),
                    }
                })
                .collect(),
        }
    }
}

impl fmt::Display for Person<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.federated_username(),
            self.first_name,
            self.last_name
        )
    }
}

/// One affiliation together with its chain of parents
#[derive(Debug, Clone, Serialize)]
pub struct AffiliationSummary {
    pub code: String,
    pub name: String,
    pub path: Vec<UnitSummary>,
}

/// Owned, serialisable view of a [`Person`]
#[derive(Debug, Clone, Serialize)]
pub struct PersonSummary {
    pub identifier: String,
    pub federated_username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub roles: RoleFlags,
    pub affiliations: Vec<AffiliationSummary>,
}
