pub mod builder;
pub mod file;
