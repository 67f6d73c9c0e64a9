//! # ODBC row fetching
//!
//! This library implements the row fetch and type marshaling core of an ODBC based SQL
//! driver: iterating the rows of a result set, advancing to the next result set produced
//! by the same statement execution and classifying the native storage type of each
//! projected column, without forcing a fetch.
//!
//! Statement preparation and execution, parameter binding and connection management are
//! the callers responsibility. The cursor drives any implementation of
//! [`handles::Statement`]; [`handles::StmtHandle`] implements it for raw ODBC statement
//! handles.

mod column;
mod cursor;
mod error;
mod scalar_kind;
mod value;

pub mod handles;

pub use self::{
    column::Column,
    cursor::RowCursor,
    error::Error,
    scalar_kind::{SQL_SS_TIME2, ScalarKind, scalar_kind},
    value::Value,
};
// Reexports
/// Reexport `odbc-sys` as sys to enable applications to always use the same version as
/// this crate.
pub use odbc_sys as sys;
pub use widestring::{U16Str, U16String};
