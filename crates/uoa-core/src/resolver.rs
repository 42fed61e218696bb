//! Person resolution
//!
//! Turns the raw attributes of a directory record into a [`Person`]: role flags
//! from exact membership of well-known groups, and affiliations from the unit
//! codes embedded in membership DNs, reduced to their highest-level units.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{
    ATTR_DEPARTMENT, ATTR_GIVEN_NAME, ATTR_IDENTIFIER, ATTR_MAIL, ATTR_MEMBER_OF, ATTR_SURNAME,
    CONTRACTOR_GROUP, DOCTORAL_STUDENT_GROUP, PLACEHOLDER_MAIL_DOMAIN, POSTGRAD_GROUP,
    STAFF_GROUP, STUDENT_GROUP, UNIT_MEMBERSHIP_PATTERN, UNKNOWN_VALUE,
};
use crate::error::{AppError, AppResult};
use crate::hierarchy::{NodeId, OrgHierarchy};
use crate::models::{AttributeMap, Person, RoleFlags};

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(UNIT_MEMBERSHIP_PATTERN).expect("built-in membership pattern is valid")
});

/// Fully-qualified DNs of the groups that define each role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGroups {
    pub staff: String,
    pub student: String,
    pub postgraduate: String,
    pub doctoral_student: String,
    pub contractor: String,
}

impl Default for RoleGroups {
    fn default() -> Self {
        Self {
            staff: STAFF_GROUP.to_string(),
            student: STUDENT_GROUP.to_string(),
            postgraduate: POSTGRAD_GROUP.to_string(),
            doctoral_student: DOCTORAL_STUDENT_GROUP.to_string(),
            contractor: CONTRACTOR_GROUP.to_string(),
        }
    }
}

impl RoleGroups {
    /// Each flag is set iff its group DN appears verbatim in `memberships`.
    pub fn flags<S: AsRef<str>>(&self, memberships: &[S]) -> RoleFlags {
        let member_of = |group: &str| memberships.iter().any(|m| m.as_ref() == group);
        RoleFlags {
            staff: member_of(&self.staff),
            student: member_of(&self.student),
            postgraduate: member_of(&self.postgraduate),
            doctoral_student: member_of(&self.doctoral_student),
            contractor: member_of(&self.contractor),
        }
    }
}

/// Extracts the organisational unit code from a membership DN.
#[derive(Debug, Clone)]
pub struct MembershipPattern {
    regex: Regex,
}

impl Default for MembershipPattern {
    fn default() -> Self {
        Self {
            regex: DEFAULT_PATTERN.clone(),
        }
    }
}

impl MembershipPattern {
    /// Use a custom pattern; its first capture group must be the unit code.
    pub fn new(pattern: &str) -> AppResult<Self> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 2 {
            return Err(AppError::Config(format!(
                "membership pattern '{}' has no capture group",
                pattern
            )));
        }
        Ok(Self { regex })
    }

    /// The unit code of `membership`, or `None` if the DN is not a unit group.
    pub fn unit_code<'a>(&self, membership: &'a str) -> Option<&'a str> {
        self.regex
            .captures(membership)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Resolves directory records against a shared, read-only hierarchy.
#[derive(Debug, Clone)]
pub struct PersonResolver<'h> {
    hierarchy: &'h OrgHierarchy,
    roles: RoleGroups,
    pattern: MembershipPattern,
}

impl<'h> PersonResolver<'h> {
    pub fn new(hierarchy: &'h OrgHierarchy) -> Self {
        Self {
            hierarchy,
            roles: RoleGroups::default(),
            pattern: MembershipPattern::default(),
        }
    }

    pub fn with_roles(mut self, roles: RoleGroups) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_pattern(mut self, pattern: MembershipPattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn hierarchy(&self) -> &'h OrgHierarchy {
        self.hierarchy
    }

    /// Highest-level units matching the unit codes found in `memberships`.
    ///
    /// DNs that are not unit groups and codes missing from the hierarchy are
    /// skipped silently.
    pub fn affiliations<S: AsRef<str>>(&self, memberships: &[S]) -> Vec<NodeId> {
        let codes: Vec<&str> = memberships
            .iter()
            .filter_map(|m| self.pattern.unit_code(m.as_ref()))
            .collect();
        self.hierarchy.high_level_units(&codes)
    }

    /// Build a [`Person`] from one directory record.
    ///
    /// The identifier (`cn`) and given name are required. Everything else falls
    /// back: surname and department to `n/a`, mail to a placeholder address.
    pub fn resolve_from_attributes(&self, attrs: &AttributeMap) -> AppResult<Person<'h>> {
        let record = attrs.dn.clone().unwrap_or_else(|| "<unknown>".to_string());
        let identifier = attrs
            .first(ATTR_IDENTIFIER)
            .ok_or_else(|| AppError::MissingAttribute {
                attribute: ATTR_IDENTIFIER.to_string(),
                record,
            })?
            .to_string();
        let first_name = attrs
            .first(ATTR_GIVEN_NAME)
            .ok_or_else(|| AppError::MissingAttribute {
                attribute: ATTR_GIVEN_NAME.to_string(),
                record: identifier.clone(),
            })?
            .to_string();

        let last_name = attrs.first(ATTR_SURNAME).unwrap_or(UNKNOWN_VALUE).to_string();
        let email = attrs
            .first(ATTR_MAIL)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}@{}", identifier, PLACEHOLDER_MAIL_DOMAIN));
        let department = attrs
            .single(ATTR_DEPARTMENT)
            .unwrap_or(UNKNOWN_VALUE)
            .to_string();

        let memberships = attrs.all(ATTR_MEMBER_OF).to_vec();
        let roles = self.roles.flags(&memberships);
        let affiliations = self.affiliations(&memberships);

        tracing::debug!(
            identifier = %identifier,
            memberships = memberships.len(),
            affiliations = affiliations.len(),
            "Resolved person"
        );

        Ok(Person::new(
            identifier,
            first_name,
            last_name,
            email,
            department,
            memberships,
            roles,
            affiliations,
            self.hierarchy,
        ))
    }
}
