pub mod generate;
pub mod list;

pub use generate::{GenerateConfig, generate_model};
pub use list::{list_operations, list_types};
