use odbc_sys::Timestamp;

/// An owned value extracted from a single field of the current row.
///
/// Which variants show up in a column is determined by the columns
/// [`crate::ScalarKind`]: integers of any width widen into [`Value::Int`], both floating
/// point widths into [`Value::Float`], narrow and wide character data into
/// [`Value::Text`]. `NULL` fields yield [`Value::Null`] regardless of the columns kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The field holds no value.
    #[default]
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    Timestamp(Timestamp),
    /// Binary data, and values of columns whose type code is unknown to this crate.
    Bytes(Vec<u8>),
}
