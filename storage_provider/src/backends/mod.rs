//! Storage backend implementations.

pub mod blob;
pub mod dynamo;
pub mod file;
pub mod table;
