//! # sqlgen
//!
//! Generate Go struct definitions from MySQL table metadata
//!
//! This crate provides a CLI tool and library for reading table metadata
//! from `information_schema` and generating one typed declaration per table.

pub mod codegen;
pub mod config;
pub mod error;
pub mod introspect;
pub mod pipeline;
pub mod schema;

pub mod prelude {
    pub use crate::codegen::{
        CodeGenConfig, CodeGenerator, DeclarationWriter, Gofmt, GoGenerator, OverwritePrompt,
        SourceFormatter, WriteOutcome,
    };
    pub use crate::config::{ConnectionOverrides, DbConfig};
    pub use crate::error::SqlgenError;
    pub use crate::introspect::{Introspector, TableFilter};
    pub use crate::pipeline::{BatchSummary, Pipeline, TableOutcome, TableReport};
    pub use crate::schema::{Column, KeyRole, Table};
}

#[cfg(feature = "mysql")]
pub use introspect::MysqlIntrospector;
