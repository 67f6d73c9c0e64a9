use std::{mem::size_of, ptr::read_unaligned};

use odbc_sys::{CDataType, SqlDataType, Timestamp};

use crate::{
    error::Error,
    handles::{ColumnDescription, Indicator, Statement},
    scalar_kind::SQL_SS_TIME2,
    value::Value,
};

// SQL type codes as plain integers, so the decision table below can also name codes
// which have no constant in [`SqlDataType`].
const SQL_CHAR: i16 = SqlDataType::CHAR.0;
const SQL_VARCHAR: i16 = SqlDataType::VARCHAR.0;
const SQL_LONG_VARCHAR: i16 = SqlDataType::EXT_LONG_VARCHAR.0;
const SQL_W_CHAR: i16 = SqlDataType::EXT_W_CHAR.0;
const SQL_W_VARCHAR: i16 = SqlDataType::EXT_W_VARCHAR.0;
const SQL_W_LONG_VARCHAR: i16 = SqlDataType::EXT_W_LONG_VARCHAR.0;
const SQL_DECIMAL: i16 = SqlDataType::DECIMAL.0;
const SQL_NUMERIC: i16 = SqlDataType::NUMERIC.0;
const SQL_SMALLINT: i16 = SqlDataType::SMALLINT.0;
const SQL_INTEGER: i16 = SqlDataType::INTEGER.0;
const SQL_REAL: i16 = SqlDataType::REAL.0;
const SQL_FLOAT: i16 = SqlDataType::FLOAT.0;
const SQL_DOUBLE: i16 = SqlDataType::DOUBLE.0;
const SQL_BIT: i16 = SqlDataType::EXT_BIT.0;
const SQL_TINYINT: i16 = SqlDataType::EXT_TINY_INT.0;
const SQL_BIGINT: i16 = SqlDataType::EXT_BIG_INT.0;
const SQL_BINARY: i16 = SqlDataType::EXT_BINARY.0;
const SQL_VARBINARY: i16 = SqlDataType::EXT_VAR_BINARY.0;
const SQL_LONG_VARBINARY: i16 = SqlDataType::EXT_LONG_VAR_BINARY.0;
const SQL_DATE: i16 = SqlDataType::DATE.0;
const SQL_TIME: i16 = SqlDataType::TIME.0;
const SQL_TIMESTAMP: i16 = SqlDataType::TIMESTAMP.0;
const SQL_GUID: i16 = SqlDataType::EXT_GUID.0;
// Legacy ODBC 2.x codes for date and time. Some drivers still report these.
const SQL_DATETIME_OLD: i16 = 9;
const SQL_TIME_OLD: i16 = 10;
const SQL_TIMESTAMP_OLD: i16 = 11;

/// A single bound output column of the current result set.
///
/// Binding happens once per result set. It records the columns name, decides the
/// extraction strategy based on the native type the data source reports and allocates
/// the transfer buffer the strategy needs. Values are then pulled row by row through
/// [`Self::value`].
pub struct Column {
    name: String,
    /// Type code the column has been bound with. For most columns this is the C type of
    /// the transfer buffer, but driver specific codes like [`SQL_SS_TIME2`] and codes
    /// unknown to this crate are recorded verbatim, so the scalar category reported for
    /// the column can stay faithful to the source.
    storage_kind: i16,
    buffer: ColumnBuffer,
}

impl Column {
    /// Binds every output column of the statements current result set. The column
    /// vector is derived from the statements metadata, left to right.
    pub fn bind_all<S: Statement>(statement: &mut S) -> Result<Vec<Self>, Error> {
        let num_cols: u16 = statement
            .num_result_cols()
            .into_result(&*statement)?
            .try_into()
            .expect("Column count must be non-negative.");
        // Reuse one description between metadata calls. 128 characters ought to avoid a
        // second call for most column names out there.
        let mut description = ColumnDescription {
            name: Vec::with_capacity(128),
            data_type: 0,
        };
        let mut columns = Vec::with_capacity(num_cols as usize);
        for column_number in 1..=num_cols {
            statement
                .describe_col(column_number, &mut description)
                .into_result(&*statement)?;
            columns.push(Self::from_description(&description));
        }
        Ok(columns)
    }

    /// Chooses the extraction strategy for a column based on the native type reported
    /// by the data source.
    pub fn from_description(description: &ColumnDescription) -> Self {
        let (storage_kind, buffer) = match description.data_type {
            SQL_BIT => (CDataType::Bit as i16, ColumnBuffer::fixed(CDataType::Bit, 1)),
            SQL_TINYINT | SQL_SMALLINT | SQL_INTEGER => (
                CDataType::SLong as i16,
                ColumnBuffer::fixed(CDataType::SLong, size_of::<i32>()),
            ),
            SQL_BIGINT => (
                CDataType::SBigInt as i16,
                ColumnBuffer::fixed(CDataType::SBigInt, size_of::<i64>()),
            ),
            SQL_REAL | SQL_FLOAT | SQL_DOUBLE => (
                CDataType::Double as i16,
                ColumnBuffer::fixed(CDataType::Double, size_of::<f64>()),
            ),
            SQL_DATE | SQL_TIME | SQL_TIMESTAMP | SQL_DATETIME_OLD | SQL_TIME_OLD
            | SQL_TIMESTAMP_OLD => (
                CDataType::TypeTimestamp as i16,
                ColumnBuffer::fixed(CDataType::TypeTimestamp, size_of::<Timestamp>()),
            ),
            SQL_GUID => (
                CDataType::Guid as i16,
                ColumnBuffer::fixed(CDataType::Guid, 16),
            ),
            // Numeric types without a loss free representation in a fixed width
            // buffer are transferred as their text rendition.
            SQL_DECIMAL | SQL_NUMERIC | SQL_CHAR | SQL_VARCHAR | SQL_LONG_VARCHAR => {
                (CDataType::Char as i16, ColumnBuffer::chunked(CDataType::Char))
            }
            SQL_W_CHAR | SQL_W_VARCHAR | SQL_W_LONG_VARCHAR => {
                (CDataType::WChar as i16, ColumnBuffer::chunked(CDataType::WChar))
            }
            SQL_BINARY | SQL_VARBINARY | SQL_LONG_VARBINARY => (
                CDataType::Binary as i16,
                ColumnBuffer::chunked(CDataType::Binary),
            ),
            // SQL Server transfers `TIME` columns with a binary encoding. The values
            // are extracted like any other binary column, but the original code is
            // recorded so the column reports a timestamp rather than raw bytes.
            SQL_SS_TIME2 => (SQL_SS_TIME2, ColumnBuffer::chunked(CDataType::Binary)),
            // No more specific strategy known for this code. Raw binary transfer at
            // least hands the application the value unaltered.
            other => (other, ColumnBuffer::chunked(CDataType::Binary)),
        };
        Self {
            name: description.name_to_string(),
            storage_kind,
            buffer,
        }
    }

    /// Name of the column as reported by the data source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type code recorded for this column at bind time. Input to
    /// [`crate::scalar_kind`].
    pub fn storage_kind(&self) -> i16 {
        self.storage_kind
    }

    /// Extracts the value of this column for the current row. `column_number` starts
    /// at `1` and must be the position this column has been bound at.
    pub fn value<S: Statement>(
        &mut self,
        statement: &mut S,
        column_number: u16,
    ) -> Result<Value, Error> {
        match &mut self.buffer {
            ColumnBuffer::Fixed(buffer) => buffer.fetch_value(statement, column_number),
            ColumnBuffer::Chunked(buffer) => buffer.fetch_value(statement, column_number),
        }
    }
}

/// Transfer buffer of a bound column. Fixed size types are fetched with a single call,
/// variable sized types are drained in chunks.
enum ColumnBuffer {
    Fixed(FixedBuffer),
    Chunked(ChunkedBuffer),
}

impl ColumnBuffer {
    fn fixed(c_type: CDataType, size: usize) -> Self {
        ColumnBuffer::Fixed(FixedBuffer {
            c_type,
            buffer: vec![0; size],
        })
    }

    fn chunked(c_type: CDataType) -> Self {
        ColumnBuffer::Chunked(ChunkedBuffer {
            c_type,
            chunk: vec![0; ChunkedBuffer::CHUNK_SIZE],
        })
    }
}

/// Preallocated buffer for types whose transfer size is known at bind time.
struct FixedBuffer {
    c_type: CDataType,
    buffer: Vec<u8>,
}

impl FixedBuffer {
    fn fetch_value<S: Statement>(
        &mut self,
        statement: &mut S,
        column_number: u16,
    ) -> Result<Value, Error> {
        let indicator = statement
            .get_data(column_number, self.c_type, &mut self.buffer)
            .into_result(&*statement)?;
        if indicator.is_null() {
            return Ok(Value::Null);
        }
        Ok(self.interpret_bytes())
    }

    /// Reinterprets the fetched bytes according to the C type of the buffer.
    fn interpret_bytes(&self) -> Value {
        let bytes = self.buffer.as_slice();
        match self.c_type {
            CDataType::Bit => Value::Bool(bytes[0] != 0),
            CDataType::SLong => {
                let value = i32::from_ne_bytes(bytes.try_into().unwrap());
                Value::Int(value as i64)
            }
            CDataType::SBigInt => Value::Int(i64::from_ne_bytes(bytes.try_into().unwrap())),
            CDataType::Double => Value::Float(f64::from_ne_bytes(bytes.try_into().unwrap())),
            CDataType::TypeTimestamp => {
                // The driver wrote a `Timestamp` into the buffer. The buffer carries no
                // alignment guarantee, so read unaligned.
                let timestamp = unsafe { read_unaligned(bytes.as_ptr() as *const Timestamp) };
                Value::Timestamp(timestamp)
            }
            // GUIDs surface as their 16 raw bytes.
            _ => Value::Bytes(bytes.to_owned()),
        }
    }
}

/// Buffer for variable sized types. The value is drained with repeated calls, each
/// transferring up to one chunk of payload.
struct ChunkedBuffer {
    c_type: CDataType,
    chunk: Vec<u8>,
}

impl ChunkedBuffer {
    /// Transfer size of a single chunk, including room for terminating zeroes.
    const CHUNK_SIZE: usize = 4096;

    /// Number of zero bytes the driver appends to each chunk of character data.
    fn terminating_zeroes(&self) -> usize {
        match self.c_type {
            CDataType::Char => 1,
            CDataType::WChar => 2,
            _ => 0,
        }
    }

    fn fetch_value<S: Statement>(
        &mut self,
        statement: &mut S,
        column_number: u16,
    ) -> Result<Value, Error> {
        let terminating_zeroes = self.terminating_zeroes();
        // Payload bytes a single chunk can hold.
        let capacity = Self::CHUNK_SIZE - terminating_zeroes;
        let mut accumulated: Vec<u8> = Vec::new();
        loop {
            let result = statement.get_data(column_number, self.c_type, &mut self.chunk);
            let Some(indicator) = result.into_result_option(&*statement)? else {
                // The value has been drained completely by the previous calls.
                break;
            };
            match indicator {
                Indicator::Null => return Ok(Value::Null),
                // Driver does not know the total length. Take a full chunk of payload
                // and ask again. The final chunk answers with its remaining length.
                Indicator::NoTotal => accumulated.extend_from_slice(&self.chunk[..capacity]),
                // `length` is the size of the data still available before this call,
                // truncation included.
                Indicator::Length(length) if length > capacity => {
                    accumulated.extend_from_slice(&self.chunk[..capacity]);
                }
                Indicator::Length(length) => {
                    accumulated.extend_from_slice(&self.chunk[..length]);
                    break;
                }
            }
        }
        Ok(self.interpret_bytes(accumulated))
    }

    /// Decodes the accumulated payload according to the C type of the buffer.
    fn interpret_bytes(&self, bytes: Vec<u8>) -> Value {
        match self.c_type {
            CDataType::Char => Value::Text(String::from_utf8_lossy(&bytes).into_owned()),
            CDataType::WChar => {
                let utf16: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_ne_bytes(pair.try_into().unwrap()))
                    .collect();
                let text = widestring::decode_utf16(utf16.iter().copied())
                    .map(|result| result.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect();
                Value::Text(text)
            }
            _ => Value::Bytes(bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use odbc_sys::{CDataType, SqlDataType};

    use super::Column;
    use crate::{
        ScalarKind,
        handles::ColumnDescription,
        scalar_kind::{SQL_SS_TIME2, scalar_kind},
    };

    fn description(name: &str, data_type: i16) -> ColumnDescription {
        ColumnDescription {
            name: name.encode_utf16().collect(),
            data_type,
        }
    }

    #[test]
    fn integer_column_is_bound_as_32_bit_int() {
        let column = Column::from_description(&description("id", SqlDataType::INTEGER.0));
        assert_eq!("id", column.name());
        assert_eq!(CDataType::SLong as i16, column.storage_kind());
        assert_eq!(ScalarKind::NullableInt, scalar_kind(column.storage_kind()));
    }

    #[test]
    fn decimal_column_is_transferred_as_text() {
        let column = Column::from_description(&description("price", SqlDataType::DECIMAL.0));
        assert_eq!(CDataType::Char as i16, column.storage_kind());
        assert_eq!(
            ScalarKind::NullableString,
            scalar_kind(column.storage_kind())
        );
    }

    /// SQL Servers `TIME` columns keep their driver specific code, so the scalar
    /// category reported for them is a timestamp despite the binary transfer.
    #[test]
    fn sql_server_time_keeps_its_code() {
        let column = Column::from_description(&description("start", SQL_SS_TIME2));
        assert_eq!(SQL_SS_TIME2, column.storage_kind());
        assert_eq!(
            ScalarKind::NullableTimestamp,
            scalar_kind(column.storage_kind())
        );
    }

    /// Codes this crate knows nothing about are recorded verbatim and extracted as raw
    /// binary data.
    #[test]
    fn unknown_code_is_recorded_verbatim() {
        let column = Column::from_description(&description("exotic", -360));
        assert_eq!(-360, column.storage_kind());
        assert_eq!(ScalarKind::Unknown, scalar_kind(column.storage_kind()));
    }
}
