// Copyright (c) 2025 Metamap Team
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # DDL emission
//!
//! Renders a discovered tree as data-definition statements able to
//! recreate the structure elsewhere: a create-database statement and
//! connect directive for an engine, a create-schema statement and
//! search-path statement per schema, and a native create-table
//! statement per table.
//!
//! Everything is a free function over the catalog's own types; output
//! goes to a caller-supplied sink, flushed on every exit path, or to
//! a named `.sql` file through the `*_file` variants.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use metamap_model::{ColumnDescriptor, ConstraintDescriptor, TableEntry};

use crate::error::{CatalogError, CatalogResult};
use crate::registry::Registry;
use crate::schema::MetaSchema;

fn sink_err(e: std::io::Error) -> CatalogError {
    CatalogError::Serialization(e.to_string())
}

// Flush regardless of how the write went, then surface the first error.
fn flush_on_exit(out: &mut dyn Write, result: CatalogResult<()>) -> CatalogResult<()> {
    let flushed = out.flush().map_err(sink_err);
    result?;
    flushed
}

fn column_ddl(column: &ColumnDescriptor) -> String {
    let mut parts = vec![column.name.clone(), column.data_type.clone()];
    if column.not_null {
        parts.push("not null".to_string());
    }
    if let Some(identity) = column.identity {
        parts.push(identity.as_sql().to_string());
    }
    if let Some(default) = &column.default {
        parts.push(format!("default {default}"));
    }
    parts.join(" ")
}

fn constraint_ddl(constraint: &ConstraintDescriptor) -> String {
    match constraint {
        ConstraintDescriptor::PrimaryKey { name, columns } => {
            format!("constraint {name} primary key ({})", columns.join(", "))
        }
        ConstraintDescriptor::Unique { name, columns } => {
            format!("constraint {name} unique ({})", columns.join(", "))
        }
        ConstraintDescriptor::Check { name, condition } => {
            format!("constraint {name} check ({condition})")
        }
        ConstraintDescriptor::ForeignKey {
            name,
            columns,
            referenced_table,
            on_update,
            on_delete,
        } => {
            let local: Vec<&str> = columns.iter().map(|p| p.local.as_str()).collect();
            let referenced: Vec<&str> = columns.iter().map(|p| p.referenced.as_str()).collect();
            format!(
                "constraint {name} foreign key ({}) references {referenced_table} ({}) \
                 on update {} on delete {}",
                local.join(", "),
                referenced.join(", "),
                on_update.as_sql(),
                on_delete.as_sql()
            )
        }
    }
}

fn emit_table(
    out: &mut dyn Write,
    schema: &str,
    name: &str,
    entry: &TableEntry,
) -> CatalogResult<()> {
    let lines: Vec<String> = entry
        .columns
        .iter()
        .map(column_ddl)
        .chain(entry.constraints.iter().map(constraint_ddl))
        .map(|line| format!("    {line}"))
        .collect();
    writeln!(out, "create table {schema}.{name} (").map_err(sink_err)?;
    writeln!(out, "{}", lines.join(",\n")).map_err(sink_err)?;
    writeln!(out, ");").map_err(sink_err)?;
    Ok(())
}

fn emit_schema(out: &mut dyn Write, schema: &MetaSchema) -> CatalogResult<()> {
    writeln!(out, "create schema if not exists {};", schema.name()).map_err(sink_err)?;
    writeln!(out, "set search_path to {};", schema.name()).map_err(sink_err)?;
    for (name, entry) in schema.tables().iter() {
        writeln!(out).map_err(sink_err)?;
        emit_table(out, schema.name(), name, entry)?;
    }
    Ok(())
}

fn emit_engine(
    out: &mut dyn Write,
    name: &str,
    schemata: &Registry<MetaSchema>,
) -> CatalogResult<()> {
    writeln!(out, "create database {name};").map_err(sink_err)?;
    writeln!(out, "\\connect {name}").map_err(sink_err)?;
    for schema in schemata.values() {
        writeln!(out).map_err(sink_err)?;
        emit_schema(out, schema)?;
    }
    Ok(())
}

/// Write the create-table statement for one reflected table
///
/// The sink is flushed on every exit path, including after a failed
/// write.
pub fn write_table_ddl(
    out: &mut dyn Write,
    schema: &str,
    name: &str,
    entry: &TableEntry,
) -> CatalogResult<()> {
    let result = emit_table(out, schema, name, entry);
    flush_on_exit(out, result)
}

/// Write one schema block: create-schema, search-path, then a
/// create-table statement per discovered table
///
/// The sink is flushed on every exit path.
pub fn write_schema_ddl(out: &mut dyn Write, schema: &MetaSchema) -> CatalogResult<()> {
    let result = emit_schema(out, schema);
    flush_on_exit(out, result)
}

/// Write a whole engine block: create-database, connect directive,
/// then one block per discovered schema
///
/// The sink is flushed on every exit path.
pub fn write_engine_ddl(
    out: &mut dyn Write,
    name: &str,
    schemata: &Registry<MetaSchema>,
) -> CatalogResult<()> {
    let result = emit_engine(out, name, schemata);
    flush_on_exit(out, result)
}

fn write_to_file<F>(path: PathBuf, write: F) -> CatalogResult<PathBuf>
where
    F: FnOnce(&mut dyn Write) -> CatalogResult<()>,
{
    let file = File::create(&path).map_err(sink_err)?;
    let mut out = BufWriter::new(file);
    // The sink-form writers flush the buffered writer themselves.
    write(&mut out)?;
    Ok(path)
}

/// Write an engine's DDL to `<engine-name>.sql` under `dir`
pub fn write_engine_ddl_file(
    dir: &Path,
    name: &str,
    schemata: &Registry<MetaSchema>,
) -> CatalogResult<PathBuf> {
    write_to_file(dir.join(format!("{name}.sql")), |out| {
        write_engine_ddl(out, name, schemata)
    })
}

/// Write a standalone schema's DDL to `<schema-name>.sql` under `dir`
pub fn write_schema_ddl_file(dir: &Path, schema: &MetaSchema) -> CatalogResult<PathBuf> {
    write_to_file(dir.join(format!("{}.sql", schema.name())), |out| {
        write_schema_ddl(out, schema)
    })
}

/// Write a standalone table's DDL to `<table-name>.sql` under `dir`
pub fn write_table_ddl_file(
    dir: &Path,
    schema: &str,
    name: &str,
    entry: &TableEntry,
) -> CatalogResult<PathBuf> {
    write_to_file(dir.join(format!("{name}.sql")), |out| {
        write_table_ddl(out, schema, name, entry)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use metamap_model::{ColumnPair, IdentityKind, ReferentialAction};

    fn orders_table() -> TableEntry {
        TableEntry::new("orders")
            .with_columns(vec![
                ColumnDescriptor::new("id", "bigint")
                    .not_null()
                    .with_identity(IdentityKind::Always),
                ColumnDescriptor::new("user_id", "bigint").not_null(),
                ColumnDescriptor::new("status", "character varying(20)")
                    .with_default("'pending'"),
            ])
            .with_constraints(vec![
                ConstraintDescriptor::PrimaryKey {
                    name: "orders_pkey".to_string(),
                    columns: vec!["id".to_string()],
                },
                ConstraintDescriptor::ForeignKey {
                    name: "orders_user_id_fkey".to_string(),
                    columns: vec![ColumnPair::new("user_id", "id")],
                    referenced_table: "users".to_string(),
                    on_update: ReferentialAction::NoAction,
                    on_delete: ReferentialAction::Cascade,
                },
            ])
    }

    fn render_table() -> String {
        let mut out = Vec::new();
        write_table_ddl(&mut out, "public", "orders", &orders_table()).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_table_ddl_statement() {
        let ddl = render_table();
        assert!(ddl.starts_with("create table public.orders (\n"));
        assert!(ddl.contains("    id bigint not null generated always as identity,\n"));
        assert!(ddl.contains("    status character varying(20) default 'pending',\n"));
        assert!(ddl.contains("    constraint orders_pkey primary key (id),\n"));
        assert!(ddl.contains(
            "    constraint orders_user_id_fkey foreign key (user_id) references users (id) \
             on update no action on delete cascade\n"
        ));
        assert!(ddl.ends_with(");\n"));
    }

    #[test]
    fn test_schema_ddl_prelude() {
        let mut schema = MetaSchema::new("public");
        schema.register_table("orders", orders_table());
        let mut out = Vec::new();
        write_schema_ddl(&mut out, &schema).unwrap();
        let ddl = String::from_utf8(out).unwrap();
        assert!(ddl.starts_with(
            "create schema if not exists public;\nset search_path to public;\n"
        ));
        assert!(ddl.contains("create table public.orders ("));
    }

    #[test]
    fn test_engine_ddl_prelude() {
        let mut schemata = Registry::new(crate::error::ItemKind::Schema);
        schemata.insert("public", MetaSchema::new("public"));
        let mut out = Vec::new();
        write_engine_ddl(&mut out, "orders_db", &schemata).unwrap();
        let ddl = String::from_utf8(out).unwrap();
        assert!(ddl.starts_with("create database orders_db;\n\\connect orders_db\n"));
        assert!(ddl.contains("create schema if not exists public;"));
    }

    #[test]
    fn test_engine_ddl_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let schemata = Registry::new(crate::error::ItemKind::Schema);
        let path = write_engine_ddl_file(dir.path(), "orders_db", &schemata).unwrap();
        assert_eq!(path.file_name().unwrap(), "orders_db.sql");
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("create database orders_db;"));
    }

    /// Sink that counts writes and flushes, optionally refusing writes
    struct CountingSink {
        written: usize,
        flushes: usize,
        fail_writes: bool,
    }

    impl CountingSink {
        fn new() -> Self {
            Self {
                written: 0,
                flushes: 0,
                fail_writes: false,
            }
        }
    }

    impl Write for CountingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.fail_writes {
                return Err(std::io::Error::other("sink refused"));
            }
            self.written += buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    #[test]
    fn test_sink_flushed_after_write() {
        let mut schemata = Registry::new(crate::error::ItemKind::Schema);
        schemata.insert("public", MetaSchema::new("public"));
        let mut sink = CountingSink::new();
        write_engine_ddl(&mut sink, "orders_db", &schemata).unwrap();
        assert!(sink.written > 0);
        assert_eq!(sink.flushes, 1);
    }

    #[test]
    fn test_sink_flushed_after_write_error() {
        let mut sink = CountingSink::new();
        sink.fail_writes = true;
        let err = write_table_ddl(&mut sink, "public", "orders", &orders_table()).unwrap_err();
        assert!(matches!(err, CatalogError::Serialization(_)));
        assert_eq!(sink.flushes, 1);
    }
}
