pub mod ast;
pub mod casing;
pub mod error;
pub mod parser;

pub use ast::{Condition, DeclaredType, FieldPath, FieldTypes, OrderDirection, OrderKey, Predicate};
pub use error::ParseError;
pub use parser::parse_predicate;
