// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for catalog operations
//!
//! This module defines the error types used throughout the catalog layer.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// The kind of item a registry tracks
///
/// Lookup misses carry the kind so callers can tell "no such engine"
/// from "no such table" without parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Engine,
    Schema,
    Table,
    Item,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ItemKind::Engine => "engine",
            ItemKind::Schema => "schema",
            ItemKind::Table => "table",
            ItemKind::Item => "item",
        };
        f.write_str(kind)
    }
}

/// Errors that can occur during catalog operations
#[derive(Debug, Error, Clone, Serialize)]
pub enum CatalogError {
    /// A registry lookup missed
    #[error("no {kind} named '{name}' was found")]
    NotFound { kind: ItemKind, name: String },

    /// Invalid catalog configuration
    #[error("invalid catalog configuration: {0}")]
    Configuration(String),

    /// Failed to open or query the external connection
    #[error("connection failed: {0}")]
    Connection(String),

    /// The reflector failed while probing a schema
    #[error("schema reflection failed: {0}")]
    Reflection(String),

    /// Failed to serialize catalog data or write an output sink
    #[error("failed to serialize catalog data: {0}")]
    Serialization(String),
}
