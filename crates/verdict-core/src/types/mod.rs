//! Type system for verdict
//!
//! This module contains the runtime type system including:
//! - Value types
//! - The fixed field schema of the transaction fact

pub mod schema;
pub mod value;

pub use schema::{FactField, FieldType};
pub use value::Value;
