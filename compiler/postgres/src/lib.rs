//! PostgreSQL backend for nestql: compiles field selections, predicate trees and
//! ordering over a JSONB payload column into one SELECT statement.

pub mod config;
pub mod denormalized;
pub mod error;
pub mod extractor;
pub mod literal;
pub mod operators;
pub mod sql_builder;
pub mod where_clause;

pub use config::{CompilerConfig, DistanceMethod};
pub use denormalized::resolve_denormalized;
pub use error::CompileError;
pub use operators::{FieldExpr, OperatorRegistry, OperatorStrategy};
pub use sql_builder::{CompileRequest, OutputMode, QueryCompiler, WhereInput};
