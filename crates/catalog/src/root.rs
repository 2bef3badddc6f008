// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog root
//!
//! [`MetaMeta`] tracks engine registries across possibly many physical
//! connections. Registration is the single polymorphism point of the
//! catalog: the caller hands over an [`EngineLink`] variant tag, and
//! the root instantiates the matching blocking or suspending engine
//! once, at registration time. Everything downstream dispatches on the
//! stored [`EngineEntry`].

use std::fmt;

use tracing::info;

use crate::connector::{AsyncConnector, SyncConnector};
use crate::engine::{AsyncMetaEngine, MetaEngine};
use crate::error::{CatalogResult, ItemKind};
use crate::registry::Registry;
use crate::schema::MetaSchema;

/// Connection capability handed to [`MetaMeta::register_engine`]
///
/// The variant tag decides which engine variant the root instantiates.
pub enum EngineLink {
    /// A connector whose calls block the calling thread
    Sync(Box<dyn SyncConnector>),
    /// A connector whose calls suspend the calling task
    Async(Box<dyn AsyncConnector>),
}

/// A registered engine, in whichever variant registration chose
pub enum EngineEntry {
    Sync(MetaEngine),
    Async(AsyncMetaEngine),
}

impl EngineEntry {
    /// Engine name, unique within the catalog root
    pub fn name(&self) -> &str {
        match self {
            EngineEntry::Sync(engine) => engine.name(),
            EngineEntry::Async(engine) => engine.name(),
        }
    }

    /// The engine's discovered schemata
    pub fn schemata(&self) -> &Registry<MetaSchema> {
        match self {
            EngineEntry::Sync(engine) => engine.schemata(),
            EngineEntry::Async(engine) => engine.schemata(),
        }
    }

    /// Look up a discovered schema by name
    pub fn schema(&self, name: &str) -> CatalogResult<&MetaSchema> {
        self.schemata().get(name)
    }

    /// The blocking engine, if registration chose that variant
    pub fn as_sync(&self) -> Option<&MetaEngine> {
        match self {
            EngineEntry::Sync(engine) => Some(engine),
            EngineEntry::Async(_) => None,
        }
    }

    /// The blocking engine for mutation (discovery)
    pub fn as_sync_mut(&mut self) -> Option<&mut MetaEngine> {
        match self {
            EngineEntry::Sync(engine) => Some(engine),
            EngineEntry::Async(_) => None,
        }
    }

    /// The suspending engine, if registration chose that variant
    pub fn as_async(&self) -> Option<&AsyncMetaEngine> {
        match self {
            EngineEntry::Async(engine) => Some(engine),
            EngineEntry::Sync(_) => None,
        }
    }

    /// The suspending engine for mutation (discovery)
    pub fn as_async_mut(&mut self) -> Option<&mut AsyncMetaEngine> {
        match self {
            EngineEntry::Async(engine) => Some(engine),
            EngineEntry::Sync(_) => None,
        }
    }
}

// The boxed connectors carry no Debug, so report variant and name.
impl fmt::Debug for EngineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEntry::Sync(engine) => f.debug_tuple("Sync").field(&engine.name()).finish(),
            EngineEntry::Async(engine) => f.debug_tuple("Async").field(&engine.name()).finish(),
        }
    }
}

impl fmt::Display for EngineEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineEntry::Sync(engine) => engine.fmt(f),
            EngineEntry::Async(engine) => engine.fmt(f),
        }
    }
}

/// Registry of engines across many physical connections
///
/// Created empty; engines are added only through
/// [`register_engine`](MetaMeta::register_engine) and never removed.
pub struct MetaMeta {
    engines: Registry<EngineEntry>,
}

impl MetaMeta {
    /// Create an empty catalog root
    pub fn new() -> Self {
        Self {
            engines: Registry::new(ItemKind::Engine),
        }
    }

    /// The registered engines, keyed by resolved engine name
    pub fn engines(&self) -> &Registry<EngineEntry> {
        &self.engines
    }

    /// Look up a registered engine by name
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` with `ItemKind::Engine` when
    /// no engine is registered under `name`.
    pub fn engine(&self, name: &str) -> CatalogResult<&EngineEntry> {
        self.engines.get(name)
    }

    /// Look up a registered engine for mutation (discovery)
    pub fn engine_mut(&mut self, name: &str) -> CatalogResult<&mut EngineEntry> {
        self.engines.get_mut(name)
    }

    /// Register a connection with the catalog root
    ///
    /// The engine variant matches the link's variant tag. The entry is
    /// stored under the resolved name: the explicit `engine_name` if
    /// given, otherwise the connector's database identifier.
    /// Registering under an existing name replaces the prior engine.
    /// Registration does not trigger discovery.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Configuration` when no name can be
    /// resolved.
    pub fn register_engine(
        &mut self,
        link: EngineLink,
        engine_name: Option<&str>,
    ) -> CatalogResult<()> {
        let entry = match link {
            EngineLink::Sync(connector) => EngineEntry::Sync(MetaEngine::new(connector, engine_name)?),
            EngineLink::Async(connector) => {
                EngineEntry::Async(AsyncMetaEngine::new(connector, engine_name)?)
            }
        };
        info!("registered engine {}", entry.name());
        self.engines.insert(entry.name().to_string(), entry);
        Ok(())
    }
}

impl Default for MetaMeta {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MetaMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetaMeta.({})", self.engines.list_item_keys().join(", "))
    }
}
