use std::path::Path;

use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Row, Table};
use contract_gen::generator::{
  document::{DocumentCache, FsLoader},
  operation_registry::OperationRegistry,
  orchestrator::{GeneratorConfig, Orchestrator},
  types::GeneratedType,
};

use crate::ui::{Colors, colors::table_color, term_width};

fn table(colors: &Colors, headers: &[&str]) -> Table {
  let mut table = Table::new();
  table
    .load_preset("  ── ──            ")
    .set_content_arrangement(ContentArrangement::Dynamic)
    .set_width(term_width());

  let mut row = Row::new();
  for header in headers {
    row.add_cell(Cell::new(header).fg(table_color(colors.label())));
  }
  table.set_header(row);
  table
}

/// Prints every operation with the method identifier it compiles to. No
/// schema is resolved, so this works on contracts that do not compile fully.
pub async fn list_operations(input: &Path, colors: &Colors) -> anyhow::Result<()> {
  let mut cache = DocumentCache::new(FsLoader);
  let root = cache.open(input)?;
  let registry = OperationRegistry::from_document(&root, &mut cache)?;

  let mut operations = registry.operations().collect::<Vec<_>>();
  operations.sort_by(|a, b| a.stable_id.cmp(&b.stable_id));

  let mut table = table(colors, &["OPERATION ID", "METHOD", "PATH"]);
  for entry in operations {
    let mut row = Row::new();
    row.add_cell(
      Cell::new(&entry.stable_id)
        .fg(table_color(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(
      Cell::new(entry.method.as_str())
        .fg(table_color(colors.accent()))
        .set_alignment(CellAlignment::Right),
    );
    row.add_cell(Cell::new(&entry.path).fg(table_color(colors.primary())));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}

/// Prints every named type together with the position it was declared at.
pub async fn list_types(input: &Path, all_schemas: bool, colors: &Colors) -> anyhow::Result<()> {
  let config = GeneratorConfig::builder().all_schemas(all_schemas).build();
  let model = Orchestrator::new(input, config).compile()?;

  let mut table = table(colors, &["TYPE", "KIND", "DECLARED AT"]);
  for (id, name) in &model.names {
    let kind = match model.type_of(id) {
      Some(GeneratedType::Named { validated: true, .. }) => "object",
      Some(GeneratedType::Named { validated: false, .. }) => "enum",
      _ => "other",
    };

    let mut row = Row::new();
    row.add_cell(
      Cell::new(name)
        .fg(table_color(colors.value()))
        .add_attribute(Attribute::Bold),
    );
    row.add_cell(Cell::new(kind).fg(table_color(colors.accent())));
    row.add_cell(Cell::new(id.position().pointer()).fg(table_color(colors.primary())));
    table.add_row(row);
  }

  println!("{table}");
  Ok(())
}
