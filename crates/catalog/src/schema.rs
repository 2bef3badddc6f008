// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Schema-level registry
//!
//! A [`MetaSchema`] tracks the tables discovered within one schema of
//! one engine. Discovery is reflection followed by reindexing: the
//! reflector fills the schema's private workspace with raw descriptors
//! keyed as the database reports them, and reindexing re-registers
//! each entry under its unqualified table name.
//!
//! One struct serves both discovery variants. Everything except the
//! reflect step is shared; the blocking path calls the reflector on an
//! open connection directly, while the suspending path bridges the
//! same call through [`AsyncConnection::run_sync`].
//!
//! [`AsyncConnection::run_sync`]: crate::connector::AsyncConnection::run_sync

use std::fmt;

use tracing::debug;

use metamap_model::TableEntry;

use crate::connector::{AsyncConnector, ReflectionWorkspace, SyncConnection, SyncConnector};
use crate::error::{CatalogResult, ItemKind};
use crate::registry::Registry;

/// Registry of tables within one schema of one engine
#[derive(Debug, Clone)]
pub struct MetaSchema {
    name: String,
    workspace: ReflectionWorkspace,
    tables: Registry<TableEntry>,
}

impl MetaSchema {
    /// Create an empty schema registry
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            workspace: ReflectionWorkspace::new(name.clone()),
            tables: Registry::new(ItemKind::Table),
            name,
        }
    }

    /// Schema name, unique within the owning engine
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The discovered tables, keyed by unqualified table name
    pub fn tables(&self) -> &Registry<TableEntry> {
        &self.tables
    }

    /// Look up a discovered table by unqualified name
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` with `ItemKind::Table` when no
    /// such table was discovered.
    pub fn table(&self, name: &str) -> CatalogResult<&TableEntry> {
        self.tables.get(name)
    }

    /// Register a table directly, replacing any prior entry
    pub fn register_table(&mut self, name: impl Into<String>, entry: TableEntry) {
        self.tables.insert(name, entry);
    }

    /// The private workspace reflection populates
    pub fn workspace(&self) -> &ReflectionWorkspace {
        &self.workspace
    }

    /// Re-register every reflected table under its unqualified name
    ///
    /// Keys prefixed with `"<schema>."` are stored under the suffix;
    /// anything else is stored unchanged. The stripping is
    /// prefix-based, not presence-based, so a same-named default
    /// schema that reflects unqualified keys is left alone. Must run
    /// strictly after reflection.
    pub fn reindex_tables(&mut self) {
        let prefix = format!("{}.", self.name);
        let reflected: Vec<(String, TableEntry)> = self
            .workspace
            .tables()
            .map(|(key, entry)| (key.to_string(), entry.clone()))
            .collect();
        for (key, entry) in reflected {
            let unqualified = key.strip_prefix(&prefix).unwrap_or(&key).to_string();
            self.tables.insert(unqualified, entry);
        }
    }

    /// Discover tables over a blocking connection: reflect, then reindex
    ///
    /// Re-running discovery re-issues the reflection queries and
    /// overwrites prior entries; nothing is deduplicated or skipped.
    pub fn discover(&mut self, connector: &dyn SyncConnector) -> CatalogResult<()> {
        debug!("reflecting tables in schema {}", self.name);
        let reflector = connector.reflector();
        {
            let mut conn = connector.connect()?;
            reflector.reflect(conn.as_mut(), &mut self.workspace)?;
        }
        self.reindex_tables();
        debug!("schema {} holds {} tables", self.name, self.tables.len());
        Ok(())
    }

    /// Discover tables over a suspending connection
    ///
    /// The reflector is synchronous by nature, so the reflect step is
    /// delegated through the connection's `run_sync` bridge; the rest
    /// is identical to the blocking path.
    pub async fn discover_async(&mut self, connector: &dyn AsyncConnector) -> CatalogResult<()> {
        debug!("reflecting tables in schema {}", self.name);
        let reflector = connector.reflector();
        {
            let mut conn = connector.connect().await?;
            let workspace = &mut self.workspace;
            conn.run_sync(Box::new(move |sync_conn: &mut dyn SyncConnection| {
                reflector.reflect(sync_conn, workspace)
            }))
            .await?;
        }
        self.reindex_tables();
        debug!("schema {} holds {} tables", self.name, self.tables.len());
        Ok(())
    }
}

impl fmt::Display for MetaSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MetaSchema({}).({})",
            self.name,
            self.tables.list_item_keys().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reindex_strips_schema_prefix() {
        let mut schema = MetaSchema::new("sales");
        schema
            .workspace
            .add_table("sales.orders", TableEntry::new("orders"));
        schema.reindex_tables();
        assert!(schema.table("orders").is_ok());
        assert!(schema.table("sales.orders").is_err());
    }

    #[test]
    fn test_reindex_keeps_unqualified_keys() {
        let mut schema = MetaSchema::new("public");
        schema
            .workspace
            .add_table("orders", TableEntry::new("orders"));
        schema.reindex_tables();
        assert!(schema.table("orders").is_ok());
    }

    #[test]
    fn test_reindex_is_prefix_based_not_presence_based() {
        // A key merely containing the schema name elsewhere is untouched.
        let mut schema = MetaSchema::new("sales");
        schema
            .workspace
            .add_table("presales.leads", TableEntry::new("leads"));
        schema.reindex_tables();
        assert!(schema.table("presales.leads").is_ok());
    }

    #[test]
    fn test_table_miss_has_table_kind() {
        let schema = MetaSchema::new("public");
        let err = schema.table("ghost").unwrap_err();
        assert!(matches!(
            err,
            crate::error::CatalogError::NotFound {
                kind: ItemKind::Table,
                ..
            }
        ));
    }

    #[test]
    fn test_display_lists_sorted_tables() {
        let mut schema = MetaSchema::new("public");
        schema.register_table("orders", TableEntry::new("orders"));
        schema.register_table("invoices", TableEntry::new("invoices"));
        assert_eq!(
            schema.to_string(),
            "MetaSchema(public).(invoices, orders)"
        );
    }
}
