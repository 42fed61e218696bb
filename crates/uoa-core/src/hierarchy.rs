//! Organisational hierarchy
//!
//! The University is modelled as a rooted tree of organisational units
//! (university, division, department, sub-department, unit). The tree is built
//! once from the departments table and is read-only afterwards, so it can be
//! shared freely between lookups.
//!
//! Units live in an arena owned by [`OrgHierarchy`]. Children are held as
//! indices in insertion order and the parent link is a plain index back into the
//! arena, so there is exactly one ownership path for every unit.

use std::fmt;

use crate::error::{AppError, AppResult};
use crate::models::{DivisionExport, HierarchyExport, UnitSummary};

/// Index of a unit inside the [`OrgHierarchy`] that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

const ROOT: NodeId = NodeId(0);

/// One node of the organisational tree.
#[derive(Debug, Clone)]
pub struct OrgUnit {
    id: String,
    display_name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    depth: usize,
}

impl OrgUnit {
    /// Short code of the unit as stored in the departments table (e.g. `SCI`).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Distance from the root; the root itself has depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn summary(&self) -> UnitSummary {
        UnitSummary {
            name: self.display_name.clone(),
            code: self.id.clone(),
        }
    }
}

impl fmt::Display for OrgUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.display_name)
    }
}

/// Two units are the same unit iff their ids match, regardless of display name.
pub fn same_unit(a: &OrgUnit, b: &OrgUnit) -> bool {
    a.id == b.id
}

/// One row of the departments table.
///
/// `root_id` is the level-1 code and must be identical on every row. `levels`
/// holds the (id, name) pairs for levels 2 and below; the first pair with an
/// empty id ends the row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyRow {
    pub root_id: String,
    pub levels: Vec<(String, String)>,
}

impl HierarchyRow {
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            levels: Vec::new(),
        }
    }

    /// Append the next level below the last one.
    pub fn level(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.levels.push((id.into(), name.into()));
        self
    }
}

/// The organisational tree, rooted at the University.
#[derive(Debug, Clone)]
pub struct OrgHierarchy {
    units: Vec<OrgUnit>,
}

impl OrgHierarchy {
    /// Create a hierarchy holding only the root unit.
    pub fn new(root_id: impl Into<String>, root_name: impl Into<String>) -> Self {
        Self {
            units: vec![OrgUnit {
                id: root_id.into(),
                display_name: root_name.into(),
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
        }
    }

    /// Build the hierarchy from the rows of the departments table.
    ///
    /// The root id is taken from the first row and every following row must
    /// carry the same level-1 code. Each row contributes its levels in order
    /// until the first blank id. After a unit is added it is looked up again by
    /// id from the root, ignoring case; if that lookup does not lead back to the
    /// unit just placed, the table is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Structural`] when:
    /// - the table has no rows, or the first row has no level-1 code
    /// - a row's level-1 code differs from the first row's
    /// - the same code appears under two different parents
    /// - two codes under one parent differ only in case
    pub fn build<I>(rows: I, root_name: &str) -> AppResult<Self>
    where
        I: IntoIterator<Item = HierarchyRow>,
    {
        let mut rows = rows.into_iter();
        let first = rows
            .next()
            .ok_or_else(|| AppError::Structural("departments table has no rows".to_string()))?;

        let root_id = first.root_id.trim().to_string();
        if root_id.is_empty() {
            return Err(AppError::Structural(
                "first row has no level-1 code".to_string(),
            ));
        }

        let mut hierarchy = Self::new(root_id, root_name);
        let mut row_count = 0;

        for (index, row) in std::iter::once(first).chain(rows).enumerate() {
            hierarchy.insert_row(index + 1, &row)?;
            row_count += 1;
        }

        tracing::info!(
            root = %hierarchy.unit(ROOT).id,
            rows = row_count,
            units = hierarchy.len(),
            "Organisational hierarchy loaded"
        );

        Ok(hierarchy)
    }

    fn insert_row(&mut self, row_number: usize, row: &HierarchyRow) -> AppResult<()> {
        let root_id = row.root_id.trim();
        if root_id != self.unit(ROOT).id {
            return Err(AppError::Structural(format!(
                "row {}: level-1 code '{}' does not match root '{}'",
                row_number,
                root_id,
                self.unit(ROOT).id
            )));
        }

        let mut current = ROOT;
        for (offset, (id, name)) in row.levels.iter().enumerate() {
            let level = offset + 2;
            let id = id.trim();
            if id.is_empty() {
                break;
            }
            let name = match name.trim() {
                "" => id,
                name => name,
            };

            let node = self.add_child(current, id, name);

            let found = self.find_by_id(id, true).ok_or_else(|| {
                AppError::Structural(format!(
                    "row {}: level-{} unit '{}' missing after insert",
                    row_number, level, id
                ))
            })?;

            if found != node && self.unit(found).parent == Some(current) {
                return Err(AppError::Structural(format!(
                    "row {}: level-{} unit '{}' differs only in case from '{}' under '{}'",
                    row_number,
                    level,
                    id,
                    self.unit(found).id,
                    self.unit(current).id,
                )));
            }

            if found != node {
                return Err(AppError::Structural(format!(
                    "row {}: level-{} unit '{}' placed under '{}' but already exists under '{}'",
                    row_number,
                    level,
                    id,
                    self.unit(current).id,
                    self.unit(found)
                        .parent
                        .map(|p| self.unit(p).id.as_str())
                        .unwrap_or("<none>"),
                )));
            }

            current = node;
        }

        Ok(())
    }

    /// Add a child under `parent` unless a child with the same id already exists there.
    fn add_child(&mut self, parent: NodeId, id: &str, name: &str) -> NodeId {
        if let Some(existing) = self
            .unit(parent)
            .children
            .iter()
            .copied()
            .find(|&child| self.unit(child).id == id)
        {
            return existing;
        }

        let node = NodeId(self.units.len());
        let depth = self.unit(parent).depth + 1;
        self.units.push(OrgUnit {
            id: id.to_string(),
            display_name: name.to_string(),
            parent: Some(parent),
            children: Vec::new(),
            depth,
        });
        self.units[parent.0].children.push(node);

        tracing::debug!(unit = %id, parent = %self.unit(parent).id, depth, "Adding unit");

        node
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// Access a unit. `node` must come from this hierarchy.
    pub fn unit(&self, node: NodeId) -> &OrgUnit {
        &self.units[node.0]
    }

    /// Number of units, including the root.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Always false: a hierarchy has at least its root.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Depth-first walk over the whole tree, parents before children.
    pub fn iter(&self) -> DepthFirst<'_> {
        self.iter_from(ROOT)
    }

    /// Depth-first walk over `node` and everything below it.
    pub fn iter_from(&self, node: NodeId) -> DepthFirst<'_> {
        DepthFirst {
            hierarchy: self,
            stack: vec![node],
        }
    }

    /// First unit in depth-first order whose id equals `id`.
    pub fn find_by_id(&self, id: &str, ignore_case: bool) -> Option<NodeId> {
        self.iter().find(|&node| {
            let unit_id = &self.unit(node).id;
            if ignore_case {
                unit_id.to_lowercase() == id.to_lowercase()
            } else {
                unit_id == id
            }
        })
    }

    /// Every unit whose id or display name contains `term`, in depth-first order.
    pub fn find_matching(&self, term: &str, ignore_case: bool) -> Vec<NodeId> {
        let term = if ignore_case {
            term.to_lowercase()
        } else {
            term.to_string()
        };

        self.iter()
            .filter(|&node| {
                let unit = self.unit(node);
                if ignore_case {
                    unit.id.to_lowercase().contains(&term)
                        || unit.display_name.to_lowercase().contains(&term)
                } else {
                    unit.id.contains(&term) || unit.display_name.contains(&term)
                }
            })
            .collect()
    }

    /// True iff `ancestor` is a strict ancestor of `node`.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.unit(node).parent;
        while let Some(parent) = current {
            if same_unit(self.unit(parent), self.unit(ancestor)) {
                return true;
            }
            current = self.unit(parent).parent;
        }
        false
    }

    /// Drop every unit that sits below another unit of the same input.
    ///
    /// Survivors keep their input order. Duplicated entries are tolerated.
    pub fn filter_to_highest_level(&self, nodes: &[NodeId]) -> Vec<NodeId> {
        nodes
            .iter()
            .copied()
            .filter(|&node| {
                !nodes
                    .iter()
                    .any(|&other| self.is_descendant_of(node, other))
            })
            .collect()
    }

    /// Look up each code by exact id, ignore unknown codes and reduce the rest
    /// to the highest-level units.
    pub fn high_level_units<S: AsRef<str>>(&self, codes: &[S]) -> Vec<NodeId> {
        let nodes: Vec<NodeId> = codes
            .iter()
            .filter_map(|code| {
                let found = self.find_by_id(code.as_ref(), false);
                if found.is_none() {
                    tracing::debug!(code = %code.as_ref(), "Unit code not in hierarchy, skipping");
                }
                found
            })
            .collect();

        self.filter_to_highest_level(&nodes)
    }

    /// Chain of units from the root down to `node`, inclusive.
    pub fn path_from_root(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut current = self.unit(node).parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.unit(parent).parent;
        }
        path.reverse();
        path
    }

    /// The whole tree, one `ID (Name)` per line, indented two spaces per level.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        for node in self.iter() {
            let unit = self.unit(node);
            out.push_str(&"  ".repeat(unit.depth));
            out.push_str(&unit.to_string());
            out.push('\n');
        }
        out
    }

    /// The path from the root to `node`, each step indented one level further.
    pub fn render_path(&self, node: NodeId, prefix: &str) -> String {
        let mut out = String::new();
        let mut indent = prefix.to_string();
        for step in self.path_from_root(node) {
            out.push_str(&indent);
            out.push_str(&self.unit(step).to_string());
            out.push('\n');
            indent.push_str("  ");
        }
        out
    }

    /// Divisions with every unit below them flattened into one department list.
    pub fn export(&self) -> HierarchyExport {
        let root = self.unit(ROOT);
        let divisions = root
            .children
            .iter()
            .map(|&division| {
                let unit = self.unit(division);
                DivisionExport {
                    name: unit.display_name.clone(),
                    code: unit.id.clone(),
                    departments: self
                        .iter_from(division)
                        .skip(1)
                        .map(|dep| self.unit(dep).summary())
                        .collect(),
                }
            })
            .collect();

        HierarchyExport {
            name: root.display_name.clone(),
            code: root.id.clone(),
            divisions,
        }
    }
}

/// Depth-first iterator over a hierarchy, children in insertion order.
pub struct DepthFirst<'a> {
    hierarchy: &'a OrgHierarchy,
    stack: Vec<NodeId>,
}

impl Iterator for DepthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.hierarchy.unit(node).children.iter().rev().copied());
        Some(node)
    }
}
