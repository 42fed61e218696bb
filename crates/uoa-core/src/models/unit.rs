use serde::{Deserialize, Serialize};

/// Code and display name of one organisational unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSummary {
    pub name: String,
    pub code: String,
}

/// A division with all units below it flattened into `departments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionExport {
    pub name: String,
    pub code: String,
    pub departments: Vec<UnitSummary>,
}

/// JSON shape of the complete hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyExport {
    pub name: String,
    pub code: String,
    pub divisions: Vec<DivisionExport>,
}
