pub mod document;
pub mod errors;
pub mod metrics;
pub mod naming;
pub mod operation_registry;
pub mod operations;
pub mod orchestrator;
pub mod position;
pub mod schema;
pub(crate) mod schema_graph;
pub(crate) mod schema_parser;
pub mod schema_resolver;
pub(crate) mod type_resolver;
pub mod types;

#[cfg(test)]
mod tests;
