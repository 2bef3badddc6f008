// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Structured-document serialization
//!
//! Serializes a discovered tree into nested `{object_type, name,
//! objects}` records, recursively for database, schema, and table
//! nodes. Table nodes carry the reflected columns and constraints
//! instead of child objects. Documents round-trip through YAML (and
//! any other serde format) without losing structure.

use serde::{Deserialize, Serialize};

use metamap_model::{ColumnDescriptor, ConstraintDescriptor, TableEntry};

use crate::engine::{AsyncMetaEngine, MetaEngine};
use crate::error::{CatalogError, CatalogResult};
use crate::registry::Registry;
use crate::root::EngineEntry;
use crate::schema::MetaSchema;

/// One node of the structured-document form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
pub enum ObjectDocument {
    Database {
        name: String,
        objects: Vec<ObjectDocument>,
    },
    Schema {
        name: String,
        objects: Vec<ObjectDocument>,
    },
    Table {
        name: String,
        columns: Vec<ColumnDescriptor>,
        constraints: Vec<ConstraintDescriptor>,
    },
}

impl ObjectDocument {
    /// Object name regardless of node type
    pub fn name(&self) -> &str {
        match self {
            ObjectDocument::Database { name, .. }
            | ObjectDocument::Schema { name, .. }
            | ObjectDocument::Table { name, .. } => name,
        }
    }

    /// Child objects of a database or schema node
    pub fn objects(&self) -> &[ObjectDocument] {
        match self {
            ObjectDocument::Database { objects, .. } | ObjectDocument::Schema { objects, .. } => {
                objects
            }
            ObjectDocument::Table { .. } => &[],
        }
    }

    /// Render the document as YAML
    pub fn to_yaml(&self) -> CatalogResult<String> {
        serde_yaml::to_string(self).map_err(|e| CatalogError::Serialization(e.to_string()))
    }

    /// Parse a document from YAML
    pub fn from_yaml(text: &str) -> CatalogResult<Self> {
        serde_yaml::from_str(text).map_err(|e| CatalogError::Serialization(e.to_string()))
    }
}

/// Document node for one reflected table
pub fn table_document(name: &str, entry: &TableEntry) -> ObjectDocument {
    ObjectDocument::Table {
        name: name.to_string(),
        columns: entry.columns.clone(),
        constraints: entry.constraints.clone(),
    }
}

/// Document node for one discovered schema
pub fn schema_document(schema: &MetaSchema) -> ObjectDocument {
    ObjectDocument::Schema {
        name: schema.name().to_string(),
        objects: schema
            .tables()
            .iter()
            .map(|(name, entry)| table_document(name, entry))
            .collect(),
    }
}

/// Document node for one engine's discovered tree
pub fn engine_document(name: &str, schemata: &Registry<MetaSchema>) -> ObjectDocument {
    ObjectDocument::Database {
        name: name.to_string(),
        objects: schemata.values().map(schema_document).collect(),
    }
}

impl MetaSchema {
    /// Structured-document form of this schema's discovered tree
    pub fn to_document(&self) -> ObjectDocument {
        schema_document(self)
    }
}

impl MetaEngine {
    /// Structured-document form of this engine's discovered tree
    pub fn to_document(&self) -> ObjectDocument {
        engine_document(self.name(), self.schemata())
    }
}

impl AsyncMetaEngine {
    /// Structured-document form of this engine's discovered tree
    pub fn to_document(&self) -> ObjectDocument {
        engine_document(self.name(), self.schemata())
    }
}

impl EngineEntry {
    /// Structured-document form of this engine's discovered tree
    pub fn to_document(&self) -> ObjectDocument {
        engine_document(self.name(), self.schemata())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamap_model::ColumnDescriptor;

    fn sample_schema() -> MetaSchema {
        let mut schema = MetaSchema::new("public");
        schema.register_table(
            "users",
            TableEntry::new("users")
                .with_columns(vec![
                    ColumnDescriptor::new("id", "bigint").not_null(),
                    ColumnDescriptor::new("email", "text").not_null(),
                ])
                .with_constraints(vec![ConstraintDescriptor::PrimaryKey {
                    name: "users_pkey".to_string(),
                    columns: vec!["id".to_string()],
                }]),
        );
        schema
    }

    #[test]
    fn test_schema_document_shape() {
        let doc = sample_schema().to_document();
        assert_eq!(doc.name(), "public");
        assert_eq!(doc.objects().len(), 1);
        match &doc.objects()[0] {
            ObjectDocument::Table {
                name,
                columns,
                constraints,
            } => {
                assert_eq!(name, "users");
                assert_eq!(columns.len(), 2);
                assert_eq!(constraints.len(), 1);
            }
            other => panic!("expected a table node, got {other:?}"),
        }
    }

    #[test]
    fn test_yaml_round_trip_preserves_tree() {
        let doc = ObjectDocument::Database {
            name: "orders_db".to_string(),
            objects: vec![sample_schema().to_document()],
        };
        let yaml = doc.to_yaml().unwrap();
        let back = ObjectDocument::from_yaml(&yaml).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn test_object_type_tags() {
        let doc = sample_schema().to_document();
        let yaml = doc.to_yaml().unwrap();
        assert!(yaml.contains("object_type: schema"));
        assert!(yaml.contains("object_type: table"));
    }
}
