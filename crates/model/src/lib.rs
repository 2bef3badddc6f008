// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metamap - Reflected Data Model
//!
//! This crate provides the structural descriptors that reflection
//! produces: tables, columns, and constraints. The types are:
//! - Driver-agnostic (the data type is carried as the native type text)
//! - Immutable once reflected
//! - Serializable with serde for the structured-document output

pub mod descriptor;

// Re-export commonly used types
pub use descriptor::{
    ColumnDescriptor, ColumnPair, ConstraintDescriptor, IdentityKind, ReferentialAction,
    TableEntry,
};
