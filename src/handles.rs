//! Abstraction over the native ODBC layer, as far as the row fetch core needs it. The
//! central piece is the [`Statement`] trait which names the handful of primitives driven
//! by the cursor. Every primitive reports one of exactly three outcomes: success, no
//! more data, or error with retrievable diagnostics.

mod buffer;
mod column_description;
mod diagnostics;
mod indicator;
mod logging;
mod sql_result;
mod statement;

pub use self::{
    column_description::ColumnDescription,
    diagnostics::{DiagnosticResult, Diagnostics, Record, State},
    indicator::Indicator,
    logging::log_diagnostics,
    sql_result::{ExtSqlReturn, SqlResult},
    statement::{Statement, StmtHandle},
};
