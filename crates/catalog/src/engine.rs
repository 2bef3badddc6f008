// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine-level registry
//!
//! A meta engine tracks the schemata of one physical database
//! connection. Discovery lists schema names through a parameterized
//! query against `information_schema.schemata`, filters out excluded
//! names on the database side, registers a [`MetaSchema`] per kept
//! name, and cascades discovery into each.
//!
//! Two variants exist: [`MetaEngine`] reaches the connection through
//! the blocking capability, [`AsyncMetaEngine`] through the suspending
//! one. All non-I/O logic (name resolution, query building, exclusion
//! filtering, schema registration) is shared in [`EngineCore`]; the
//! variants differ only in the methods that actually touch the
//! database.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::connector::{
    AsyncConnection, AsyncConnector, QueryParams, Row, SyncConnection, SyncConnector,
};
use crate::error::{CatalogError, CatalogResult, ItemKind};
use crate::registry::Registry;
use crate::schema::MetaSchema;

/// Default exclusion patterns, filtering PostgreSQL system schemata
/// out of discovery
///
/// Each entry maps a query parameter name to a regex pattern; schema
/// names matching any pattern are rejected by the discovery query.
pub fn default_exclusions() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("expr_1".to_string(), "^pg_".to_string()),
        ("expr_2".to_string(), "^information_schema".to_string()),
    ])
}

/// Non-I/O engine state shared by both discovery variants
#[derive(Debug)]
pub(crate) struct EngineCore {
    name: String,
    exclusions: BTreeMap<String, String>,
    schemata: Registry<MetaSchema>,
}

impl EngineCore {
    fn new(name: String) -> Self {
        Self {
            name,
            exclusions: default_exclusions(),
            schemata: Registry::new(ItemKind::Schema),
        }
    }

    /// Resolve the engine name from the caller override or the
    /// connection's own database identifier
    ///
    /// An explicit non-empty override wins verbatim.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Configuration` when neither source
    /// yields a name.
    pub(crate) fn resolve_engine_name(
        override_name: Option<&str>,
        database_name: Option<String>,
    ) -> CatalogResult<String> {
        match override_name {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => database_name
                .filter(|name| !name.is_empty())
                .ok_or_else(|| {
                    CatalogError::Configuration(
                        "cannot detect engine name from connection, specify one at registration"
                            .to_string(),
                    )
                }),
        }
    }

    fn register_schema(&mut self, name: &str) {
        self.schemata.insert(name, MetaSchema::new(name));
    }

    /// Build the parameterized schema-listing query
    ///
    /// One `schema_name !~ :<param>` predicate per exclusion entry,
    /// AND-joined; `true` when no exclusions are configured so the
    /// query stays well-formed.
    fn build_discovery_query(&self) -> (String, QueryParams) {
        let predicate = if self.exclusions.is_empty() {
            "true".to_string()
        } else {
            self.exclusions
                .keys()
                .map(|param| format!("schema_name !~ :{param}"))
                .collect::<Vec<_>>()
                .join(" and ")
        };
        let sql =
            format!("select schema_name from information_schema.schemata where {predicate}");
        (sql, self.exclusions.clone())
    }

    /// Collect the `schema_name` column in result order
    fn collect_schema_names(rows: Vec<Row>) -> Vec<String> {
        rows.iter()
            .filter_map(|row| row.get("schema_name"))
            .map(str::to_string)
            .collect()
    }
}

macro_rules! core_accessors {
    () => {
        /// Engine name, unique within the owning catalog root
        pub fn name(&self) -> &str {
            &self.core.name
        }

        /// The discovered schemata, keyed by schema name
        pub fn schemata(&self) -> &Registry<MetaSchema> {
            &self.core.schemata
        }

        /// Look up a discovered schema by name
        pub fn schema(&self, name: &str) -> CatalogResult<&MetaSchema> {
            self.core.schemata.get(name)
        }

        /// Look up a discovered schema for mutation
        pub fn schema_mut(&mut self, name: &str) -> CatalogResult<&mut MetaSchema> {
            self.core.schemata.get_mut(name)
        }

        /// Create-or-replace a child schema registry
        pub fn register_schema(&mut self, name: &str) {
            self.core.register_schema(name);
        }

        /// The configured exclusion patterns
        pub fn exclusions(&self) -> &BTreeMap<String, String> {
            &self.core.exclusions
        }

        /// Add or replace an exclusion pattern under a parameter name
        pub fn set_exclusion(&mut self, param: impl Into<String>, pattern: impl Into<String>) {
            self.core.exclusions.insert(param.into(), pattern.into());
        }

        /// Drop every exclusion pattern, so discovery keeps all schemata
        pub fn clear_exclusions(&mut self) {
            self.core.exclusions.clear();
        }

        /// Build the parameterized schema-listing query
        pub fn build_discovery_query(&self) -> (String, QueryParams) {
            self.core.build_discovery_query()
        }
    };
}

/// Engine registry over a blocking connection
pub struct MetaEngine {
    core: EngineCore,
    connector: Box<dyn SyncConnector>,
}

impl MetaEngine {
    /// Create an engine registry for a blocking connector
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Configuration` when no name was supplied
    /// and the connector exposes no database identifier.
    pub fn new(
        connector: Box<dyn SyncConnector>,
        engine_name: Option<&str>,
    ) -> CatalogResult<Self> {
        let name = EngineCore::resolve_engine_name(engine_name, connector.database_name())?;
        Ok(Self {
            core: EngineCore::new(name),
            connector,
        })
    }

    core_accessors!();

    /// A general-purpose connection for caller queries
    ///
    /// The handle is scoped to the caller: it is released when dropped.
    pub fn session(&self) -> CatalogResult<Box<dyn SyncConnection>> {
        self.connector.connect()
    }

    /// List the engine's schema names, minus exclusions
    ///
    /// Opens a scoped connection, runs the discovery query, and
    /// returns the `schema_name` column in result order. The
    /// connection is released on every exit path.
    pub fn list_schemas(&self) -> CatalogResult<Vec<String>> {
        let (query, params) = self.core.build_discovery_query();
        let mut conn = self.connector.connect()?;
        let rows = conn.execute(&query, &params)?;
        Ok(EngineCore::collect_schema_names(rows))
    }

    /// Probe the engine for schemata and cascade discovery into each
    ///
    /// Cascading follows the order the query returned the names, not
    /// alphabetical order. A connection or query failure aborts the
    /// remaining discovery; schemata registered before the failure
    /// stay registered.
    pub fn discover(&mut self) -> CatalogResult<()> {
        let schemata = self.list_schemas()?;
        debug!(
            "discovered {} schemata in engine {}",
            schemata.len(),
            self.core.name
        );
        for name in &schemata {
            self.core.register_schema(name);
            let schema = self.core.schemata.get_mut(name)?;
            schema.discover(self.connector.as_ref())?;
        }
        Ok(())
    }
}

impl fmt::Display for MetaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MetaEngine({}).({})",
            self.core.name,
            self.core.schemata.list_item_keys().join(", ")
        )
    }
}

/// Engine registry over a suspending connection
///
/// Identical to [`MetaEngine`] except that `list_schemas` and the
/// cascaded schema discovery suspend the calling task instead of
/// blocking the thread.
pub struct AsyncMetaEngine {
    core: EngineCore,
    connector: Box<dyn AsyncConnector>,
}

impl AsyncMetaEngine {
    /// Create an engine registry for a suspending connector
    pub fn new(
        connector: Box<dyn AsyncConnector>,
        engine_name: Option<&str>,
    ) -> CatalogResult<Self> {
        let name = EngineCore::resolve_engine_name(engine_name, connector.database_name())?;
        Ok(Self {
            core: EngineCore::new(name),
            connector,
        })
    }

    core_accessors!();

    /// A general-purpose connection for caller queries
    ///
    /// The handle is scoped to the caller: it is released when dropped.
    pub async fn session(&self) -> CatalogResult<Box<dyn AsyncConnection>> {
        self.connector.connect().await
    }

    /// List the engine's schema names, minus exclusions
    pub async fn list_schemas(&self) -> CatalogResult<Vec<String>> {
        let (query, params) = self.core.build_discovery_query();
        let mut conn = self.connector.connect().await?;
        let rows = conn.execute(&query, &params).await?;
        Ok(EngineCore::collect_schema_names(rows))
    }

    /// Probe the engine for schemata and cascade discovery into each
    ///
    /// Sequential within the engine: the single connection object is
    /// not assumed safe for concurrent use.
    pub async fn discover(&mut self) -> CatalogResult<()> {
        let schemata = self.list_schemas().await?;
        debug!(
            "discovered {} schemata in engine {}",
            schemata.len(),
            self.core.name
        );
        for name in &schemata {
            self.core.register_schema(name);
            let schema = self.core.schemata.get_mut(name)?;
            schema.discover_async(self.connector.as_ref()).await?;
        }
        Ok(())
    }
}

impl fmt::Display for AsyncMetaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AsyncMetaEngine({}).({})",
            self.core.name,
            self.core.schemata.list_item_keys().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_name_override_wins() {
        let name =
            EngineCore::resolve_engine_name(Some("reporting"), Some("orders_db".to_string()))
                .unwrap();
        assert_eq!(name, "reporting");
    }

    #[test]
    fn test_resolve_name_falls_back_to_database() {
        let name = EngineCore::resolve_engine_name(None, Some("orders_db".to_string())).unwrap();
        assert_eq!(name, "orders_db");
    }

    #[test]
    fn test_resolve_name_empty_override_falls_back() {
        let name = EngineCore::resolve_engine_name(Some(""), Some("orders_db".to_string())).unwrap();
        assert_eq!(name, "orders_db");
    }

    #[test]
    fn test_resolve_name_fails_without_sources() {
        let err = EngineCore::resolve_engine_name(None, None).unwrap_err();
        assert!(matches!(err, CatalogError::Configuration(_)));
    }

    #[test]
    fn test_discovery_query_with_default_exclusions() {
        let core = EngineCore::new("orders_db".to_string());
        let (sql, params) = core.build_discovery_query();
        assert_eq!(
            sql,
            "select schema_name from information_schema.schemata \
             where schema_name !~ :expr_1 and schema_name !~ :expr_2"
        );
        assert_eq!(params.get("expr_1").map(String::as_str), Some("^pg_"));
        assert_eq!(
            params.get("expr_2").map(String::as_str),
            Some("^information_schema")
        );
    }

    #[test]
    fn test_discovery_query_without_exclusions() {
        let mut core = EngineCore::new("orders_db".to_string());
        core.exclusions.clear();
        let (sql, params) = core.build_discovery_query();
        assert_eq!(
            sql,
            "select schema_name from information_schema.schemata where true"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_collect_schema_names_preserves_result_order() {
        let rows = vec![
            Row::new().with_column("schema_name", "zoo"),
            Row::new().with_column("schema_name", "alpha"),
            Row::new().with_column("other", "ignored"),
        ];
        assert_eq!(
            EngineCore::collect_schema_names(rows),
            vec!["zoo".to_string(), "alpha".to_string()]
        );
    }

    #[test]
    fn test_register_schema_replaces() {
        let mut core = EngineCore::new("orders_db".to_string());
        core.register_schema("public");
        core.register_schema("public");
        assert_eq!(core.schemata.len(), 1);
    }
}
