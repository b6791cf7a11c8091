//! Column metadata models.

use serde::Serialize;

/// Per-column descriptor as reported by a driver. The name is always the
/// first element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ColumnDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }
}

/// How a cursor exposes the column names of its last result set.
///
/// Some drivers keep a dedicated list of names, others only a sequence of
/// descriptors. The executor normalizes both into `Vec<String>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnShape {
    Names(Vec<String>),
    Descriptions(Vec<ColumnDescription>),
}

impl ColumnShape {
    /// Flatten into one ordered sequence of column names.
    pub fn into_names(self) -> Vec<String> {
        match self {
            Self::Names(names) => names,
            Self::Descriptions(descriptions) => descriptions.into_iter().map(|d| d.name).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Names(names) => names.len(),
            Self::Descriptions(descriptions) => descriptions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ColumnShape {
    fn default() -> Self {
        Self::Descriptions(Vec::new())
    }
}

/// Semantic category of a declared column type, deciding which summary
/// statistics apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCategory {
    /// COUNT, MAX, MIN, AVG, SUM
    Numeric,
    /// COUNT, MAX, MIN
    Temporal,
    Other,
}

/// A table column as described by catalog metadata (`SHOW COLUMNS`,
/// `information_schema.columns`, `PRAGMA table_info`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub declared_type: String,
    /// Primary key or part of a multi-column key
    pub is_key: bool,
    pub category: ColumnCategory,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>, is_key: bool) -> Self {
        let declared_type = declared_type.into();
        let category = crate::db::types::categorize_declared_type(&declared_type);
        Self {
            name: name.into(),
            declared_type,
            is_key,
            category,
        }
    }

    /// Whether summary statistics should be generated for this column.
    ///
    /// Skips names containing `_id` (any case), key columns, columns that are
    /// neither numeric nor date/time, and columns outside `allow_list` when one
    /// is given.
    pub fn wants_summary(&self, allow_list: Option<&[&str]>) -> bool {
        if self.name.to_lowercase().contains("_id") || self.is_key {
            return false;
        }
        if self.category == ColumnCategory::Other {
            return false;
        }
        match allow_list {
            Some(allowed) if !allowed.is_empty() => allowed.contains(&self.name.as_str()),
            _ => true,
        }
    }
}
