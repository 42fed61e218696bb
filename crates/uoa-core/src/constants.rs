//! Fixed identifiers of the University of Auckland directory and config layout.

/// Display name of the hierarchy root; the departments workbook only carries its id.
pub const ROOT_DISPLAY_NAME: &str = "University of Auckland";

/// Name of the worksheet holding the department table.
pub const DEPARTMENTS_SHEET: &str = "Data";

pub const DEFAULT_LDAP_URL: &str = "ldaps://uoa.auckland.ac.nz";
pub const DEFAULT_BASE_DN: &str = "ou=People,dc=UoA,dc=auckland,dc=ac,dc=nz";
pub const DEFAULT_PAGE_SIZE: i32 = 1000;

/// Attributes requested for every person lookup.
pub const PERSON_ATTRIBUTES: [&str; 6] = ["cn", "givenName", "department", "sn", "mail", "memberOf"];

// Directory attribute names
pub const ATTR_IDENTIFIER: &str = "cn";
pub const ATTR_GIVEN_NAME: &str = "givenName";
pub const ATTR_SURNAME: &str = "sn";
pub const ATTR_MAIL: &str = "mail";
pub const ATTR_DEPARTMENT: &str = "department";
pub const ATTR_MEMBER_OF: &str = "memberOf";
pub const ATTR_DISPLAY_NAME: &str = "displayName";

/// Membership DNs that carry an organisational unit code in their CN.
pub const UNIT_MEMBERSHIP_PATTERN: &str =
    r"^CN=([A-Z]*)\.uos,OU=uos,OU=Groups,DC=UoA,DC=auckland,DC=ac,DC=nz$";

pub const STAFF_GROUP: &str = "CN=UniStaff.ec,OU=ec,OU=Groups,DC=UoA,DC=auckland,DC=ac,DC=nz";
pub const STUDENT_GROUP: &str = "CN=Enrolled.ec,OU=ec,OU=Groups,DC=UoA,DC=auckland,DC=ac,DC=nz";
pub const POSTGRAD_GROUP: &str =
    "CN=Postgraduate.psrwi,OU=psrwi,OU=Groups,DC=UoA,DC=auckland,DC=ac,DC=nz";
pub const DOCTORAL_STUDENT_GROUP: &str =
    "CN=doctoralstudent.psrwi,OU=psrwi,OU=Groups,DC=UoA,DC=auckland,DC=ac,DC=nz";
pub const CONTRACTOR_GROUP: &str =
    "CN=Contractor.psrwi,OU=psrwi,OU=Groups,DC=UoA,DC=auckland,DC=ac,DC=nz";

// Person fallbacks
pub const UNKNOWN_VALUE: &str = "n/a";
pub const FEDERATED_DOMAIN: &str = "auckland.ac.nz";
pub const PLACEHOLDER_MAIL_DOMAIN: &str = "aucklanduni.ac.nz";

// Configuration layout
pub const CONF_FOLDER_NAME: &str = "uoa-groups";
pub const CONF_FILE_NAME: &str = "config";
pub const CONF_DEPARTMENTS_FILE_NAME: &str = "departments.xlsx";
pub const CONF_SYSTEM_DIR: &str = "/etc/uoa-groups";
pub const ENV_PREFIX: &str = "UOA";
