pub mod identifiers;
pub mod operations;
pub mod registry;
pub mod type_names;

#[cfg(test)]
mod tests;
