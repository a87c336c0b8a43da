mod operations;
mod support;
mod type_resolver;
