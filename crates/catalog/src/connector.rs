// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Capability traits for the external connection and reflector
//!
//! The catalog never bundles a database driver. Callers supply a
//! connector implementing either the blocking or the suspending
//! capability below, plus a reflector that knows how to turn catalog
//! queries into structural table descriptors. Connection handles are
//! scoped: the engine drops them on every exit path of the operation
//! that opened them.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use metamap_model::TableEntry;

use crate::error::CatalogResult;

/// Named parameters bound to a discovery query
pub type QueryParams = BTreeMap<String, String>;

/// A single result row with named text columns
///
/// The discovery core only ever reads the `schema_name` column; typed
/// decoding of anything else belongs to the reflector.
#[derive(Debug, Clone, Default)]
pub struct Row {
    columns: Vec<(String, String)>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: append a named column
    pub fn with_column(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.columns.push((name.into(), value.into()));
        self
    }

    /// Value of the named column, if present
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// A scoped blocking connection handle
///
/// Released by drop; implementations tear the connection down there.
pub trait SyncConnection: Send {
    /// Execute a parameterized statement and collect the result rows
    fn execute(&mut self, query: &str, params: &QueryParams) -> CatalogResult<Vec<Row>>;
}

/// Blocking work delegated onto a connection, used to bridge the
/// inherently synchronous reflector into the suspending variant
pub type SyncWork<'a> = Box<dyn FnOnce(&mut dyn SyncConnection) -> CatalogResult<()> + Send + 'a>;

/// A scoped suspending connection handle
///
/// Suspension points are `execute` and `run_sync`; the handle itself
/// is released by drop, like its blocking counterpart.
#[async_trait]
pub trait AsyncConnection: Send {
    /// Execute a parameterized statement and collect the result rows
    async fn execute(&mut self, query: &str, params: &QueryParams) -> CatalogResult<Vec<Row>>;

    /// Run a blocking unit of work against a synchronous view of this
    /// connection
    ///
    /// Reflection is synchronous by nature, so the suspending discovery
    /// path hands the reflect step here as a one-shot delegated call
    /// instead of re-implementing it.
    async fn run_sync(&mut self, work: SyncWork<'_>) -> CatalogResult<()>;
}

/// Factory for blocking connections: the capability a blocking engine owns
pub trait SyncConnector: Send + Sync {
    /// Database identifier used for engine-name resolution, if the
    /// connection exposes one
    fn database_name(&self) -> Option<String>;

    /// Open a scoped connection
    fn connect(&self) -> CatalogResult<Box<dyn SyncConnection>>;

    /// The reflector paired with this connection's dialect
    fn reflector(&self) -> Arc<dyn SchemaReflector>;
}

/// Factory for suspending connections: the capability an async engine owns
#[async_trait]
pub trait AsyncConnector: Send + Sync {
    /// Database identifier used for engine-name resolution, if the
    /// connection exposes one
    fn database_name(&self) -> Option<String>;

    /// Open a scoped connection
    async fn connect(&self) -> CatalogResult<Box<dyn AsyncConnection>>;

    /// The reflector paired with this connection's dialect
    fn reflector(&self) -> Arc<dyn SchemaReflector>;
}

/// Schema-scoped namespace a reflector populates
///
/// Table keys are stored exactly as the reflector reports them, which
/// may be schema-qualified; the owning schema registry strips the
/// qualification afterwards.
#[derive(Debug, Clone)]
pub struct ReflectionWorkspace {
    schema: String,
    tables: BTreeMap<String, TableEntry>,
}

impl ReflectionWorkspace {
    /// Create an empty workspace scoped to one schema
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            tables: BTreeMap::new(),
        }
    }

    /// The schema this workspace is scoped to
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Record a reflected table under its reported (possibly
    /// qualified) name, replacing any prior entry
    pub fn add_table(&mut self, name: impl Into<String>, entry: TableEntry) {
        self.tables.insert(name.into(), entry);
    }

    /// Reflected tables keyed as reported
    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableEntry)> {
        self.tables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of reflected tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the workspace has been populated
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Populates a workspace with table descriptors from a live connection
///
/// Synchronous by nature; the suspending discovery path bridges it via
/// [`AsyncConnection::run_sync`].
pub trait SchemaReflector: Send + Sync {
    /// Probe the database for the workspace's schema and record every
    /// table found there
    fn reflect(
        &self,
        conn: &mut dyn SyncConnection,
        workspace: &mut ReflectionWorkspace,
    ) -> CatalogResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_named_lookup() {
        let row = Row::new()
            .with_column("schema_name", "public")
            .with_column("owner", "postgres");
        assert_eq!(row.get("schema_name"), Some("public"));
        assert_eq!(row.get("owner"), Some("postgres"));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_workspace_overwrites_duplicate_keys() {
        let mut workspace = ReflectionWorkspace::new("public");
        workspace.add_table("public.users", TableEntry::new("users"));
        workspace.add_table("public.users", TableEntry::new("users"));
        assert_eq!(workspace.len(), 1);
        assert_eq!(workspace.schema(), "public");
    }
}
