//! CSV output for the five tables.

use std::fs::File;
use std::io::Write;

use csv::{Writer, WriterBuilder};
use serde::Serialize;
use tracing::debug;

use crate::config::OutputPaths;
use crate::error::Result;
use crate::record::{ShapedElement, Table};

/// One CSV writer per table. Header rows are written on construction, so an
/// input with no nodes or ways still produces five well-formed files.
pub struct CsvTables<W: Write> {
    nodes: Writer<W>,
    node_tags: Writer<W>,
    ways: Writer<W>,
    way_nodes: Writer<W>,
    way_tags: Writer<W>,
}

fn table_writer<W: Write>(table: Table, inner: W) -> Result<Writer<W>> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
    writer.write_record(table.fields())?;
    Ok(writer)
}

impl CsvTables<File> {
    /// Creates (or truncates) every table file, creating the directories as needed.
    pub fn create(paths: &OutputPaths) -> Result<Self> {
        let open = |table: Table| -> Result<File> {
            let path = paths.path(table);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            debug!(table = table.label(), path = %path.display(), "opening output file");
            Ok(File::create(path)?)
        };

        CsvTables::new(
            open(Table::Nodes)?,
            open(Table::NodeTags)?,
            open(Table::Ways)?,
            open(Table::WayNodes)?,
            open(Table::WayTags)?,
        )
    }
}

impl<W: Write> CsvTables<W> {
    pub fn new(nodes: W, node_tags: W, ways: W, way_nodes: W, way_tags: W) -> Result<Self> {
        Ok(CsvTables {
            nodes: table_writer(Table::Nodes, nodes)?,
            node_tags: table_writer(Table::NodeTags, node_tags)?,
            ways: table_writer(Table::Ways, ways)?,
            way_nodes: table_writer(Table::WayNodes, way_nodes)?,
            way_tags: table_writer(Table::WayTags, way_tags)?,
        })
    }

    /// Appends every row of one shaped element to its tables.
    pub fn write(&mut self, element: &ShapedElement) -> Result<()> {
        match element {
            ShapedElement::Node { node, tags } => {
                self.nodes.serialize(node)?;
                write_all(&mut self.node_tags, tags)
            }
            ShapedElement::Way { way, nodes, tags } => {
                self.ways.serialize(way)?;
                write_all(&mut self.way_nodes, nodes)?;
                write_all(&mut self.way_tags, tags)
            }
        }
    }

    pub fn flush(&mut self) -> Result<()> {
        for writer in [
            &mut self.nodes,
            &mut self.node_tags,
            &mut self.ways,
            &mut self.way_nodes,
            &mut self.way_tags,
        ] {
            writer.flush()?;
        }
        Ok(())
    }

    /// Flushes and hands back the underlying writers in table order.
    pub fn into_inner(mut self) -> Result<[W; 5]> {
        self.flush()?;
        Ok([
            into_inner(self.nodes)?,
            into_inner(self.node_tags)?,
            into_inner(self.ways)?,
            into_inner(self.way_nodes)?,
            into_inner(self.way_tags)?,
        ])
    }
}

fn write_all<W: Write, T: Serialize>(writer: &mut Writer<W>, rows: &[T]) -> Result<()> {
    for row in rows {
        writer.serialize(row)?;
    }
    Ok(())
}

fn into_inner<W: Write>(writer: Writer<W>) -> Result<W> {
    writer
        .into_inner()
        .map_err(|err| err.into_error().into())
}
