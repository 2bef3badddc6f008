// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metamap - Catalog Layer
//!
//! This crate provides the discovery-and-registry engine of metamap:
//! given one or more database connections, it discovers the schemata
//! and tables each connection exposes and builds an in-memory tree
//! mirroring that structure.
//!
//! ## Architecture
//!
//! The catalog is a three-level tree of registries:
//!
//! - [`MetaMeta`]: the root, tracking engines across connections
//! - [`MetaEngine`] / [`AsyncMetaEngine`]: one physical connection,
//!   tracking its schemata
//! - [`MetaSchema`]: one schema, tracking its reflected tables
//!
//! Connections and reflection are external capabilities supplied by
//! the caller through the traits in [`connector`]; the catalog itself
//! bundles no database driver. The blocking and suspending variants
//! share all non-I/O logic and differ only in how the schema-listing
//! query and the reflect step reach the connection.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use metamap_catalog::{EngineLink, MetaMeta};
//!
//! let mut root = MetaMeta::new();
//! root.register_engine(EngineLink::Sync(Box::new(connector)), None)?;
//! let engine = root.engine_mut("orders_db")?.as_sync_mut().unwrap();
//! engine.discover()?;
//! for name in engine.schemata().keys() {
//!     println!("{name}");
//! }
//! ```
//!
//! Discovered trees serialize into a structured YAML document
//! ([`document`]) and into DDL statements ([`ddl`]).

pub mod connector;
pub mod ddl;
pub mod document;
pub mod engine;
pub mod error;
pub mod registry;
pub mod root;
pub mod schema;

// Re-exports
pub use connector::{
    AsyncConnection, AsyncConnector, QueryParams, ReflectionWorkspace, Row, SchemaReflector,
    SyncConnection, SyncConnector, SyncWork,
};
pub use document::ObjectDocument;
pub use engine::{AsyncMetaEngine, MetaEngine, default_exclusions};
pub use error::{CatalogError, CatalogResult, ItemKind};
pub use registry::Registry;
pub use root::{EngineEntry, EngineLink, MetaMeta};
pub use schema::MetaSchema;
