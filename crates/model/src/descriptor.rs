// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Structural descriptors for reflected tables
//!
//! This module defines the types a reflector produces when probing a
//! live database: column descriptors, constraint descriptors, and the
//! table entry that owns them. Entries are immutable once reflected;
//! the catalog stores and serializes them but never mutates them.

use serde::{Deserialize, Serialize};

/// Identity/generation specification of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityKind {
    Always,
    ByDefault,
}

impl IdentityKind {
    /// Render the identity clause as SQL
    pub fn as_sql(&self) -> &'static str {
        match self {
            IdentityKind::Always => "generated always as identity",
            IdentityKind::ByDefault => "generated by default as identity",
        }
    }
}

/// Referential action attached to a foreign key constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    /// Render the action as SQL
    pub fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "no action",
            ReferentialAction::Restrict => "restrict",
            ReferentialAction::Cascade => "cascade",
            ReferentialAction::SetNull => "set null",
            ReferentialAction::SetDefault => "set default",
        }
    }
}

/// One column pair of a foreign key: local column referencing a column
/// of the referenced table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnPair {
    pub local: String,
    pub referenced: String,
}

impl ColumnPair {
    pub fn new(local: impl Into<String>, referenced: impl Into<String>) -> Self {
        Self {
            local: local.into(),
            referenced: referenced.into(),
        }
    }
}

/// Descriptor for a reflected column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Native data type text as reported by the database
    pub data_type: String,
    /// Whether the column rejects NULL
    pub not_null: bool,
    /// Identity/generation clause, if any
    pub identity: Option<IdentityKind>,
    /// Default value (as SQL expression string)
    pub default: Option<String>,
}

impl ColumnDescriptor {
    /// Create a new column descriptor with builder pattern
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            not_null: false,
            identity: None,
            default: None,
        }
    }

    /// Builder method: mark the column NOT NULL
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Builder method: set the identity clause
    pub fn with_identity(mut self, identity: IdentityKind) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Builder method: set the default expression
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Descriptor for a reflected constraint
///
/// Serialized with an internal `type` tag so the structured-document
/// form carries `{type, name, ...kind-specific fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConstraintDescriptor {
    PrimaryKey {
        name: String,
        columns: Vec<String>,
    },
    Unique {
        name: String,
        columns: Vec<String>,
    },
    Check {
        name: String,
        condition: String,
    },
    ForeignKey {
        name: String,
        columns: Vec<ColumnPair>,
        referenced_table: String,
        on_update: ReferentialAction,
        on_delete: ReferentialAction,
    },
}

impl ConstraintDescriptor {
    /// Constraint name regardless of kind
    pub fn name(&self) -> &str {
        match self {
            ConstraintDescriptor::PrimaryKey { name, .. }
            | ConstraintDescriptor::Unique { name, .. }
            | ConstraintDescriptor::Check { name, .. }
            | ConstraintDescriptor::ForeignKey { name, .. } => name,
        }
    }
}

/// A reflected table: ordered columns plus constraints
///
/// Owned by exactly one schema registry once discovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    /// Table name as reported by reflection (possibly schema-qualified)
    pub name: String,
    /// Column definitions in ordinal position order
    pub columns: Vec<ColumnDescriptor>,
    /// Table constraints
    pub constraints: Vec<ConstraintDescriptor>,
}

impl TableEntry {
    /// Create a new table entry with builder pattern
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Builder method: set columns
    pub fn with_columns(mut self, columns: Vec<ColumnDescriptor>) -> Self {
        self.columns = columns;
        self
    }

    /// Builder method: set constraints
    pub fn with_constraints(mut self, constraints: Vec<ConstraintDescriptor>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get the primary key constraint, if the table declares one
    pub fn primary_key(&self) -> Option<&ConstraintDescriptor> {
        self.constraints
            .iter()
            .find(|c| matches!(c, ConstraintDescriptor::PrimaryKey { .. }))
    }
}
