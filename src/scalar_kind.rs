use odbc_sys::CDataType;

/// Driver specific type code emitted by Microsoft SQL Server for `TIME` columns. The
/// driver transfers these values with a binary encoding, so they are extracted like any
/// other binary column, but their content is a point in time and applications should
/// scan them as such.
pub const SQL_SS_TIME2: i16 = -154;

// C type codes a column may have been bound with. `scalar_kind` matches on plain
// integers since the storage kind of a column may also hold codes which have no
// counterpart in [`CDataType`], like [`SQL_SS_TIME2`].
const C_BIT: i16 = CDataType::Bit as i16;
const C_S_TINY_INT: i16 = CDataType::STinyInt as i16;
const C_U_TINY_INT: i16 = CDataType::UTinyInt as i16;
const C_S_SHORT: i16 = CDataType::SShort as i16;
const C_U_SHORT: i16 = CDataType::UShort as i16;
const C_S_LONG: i16 = CDataType::SLong as i16;
const C_U_LONG: i16 = CDataType::ULong as i16;
const C_S_BIG_INT: i16 = CDataType::SBigInt as i16;
const C_U_BIG_INT: i16 = CDataType::UBigInt as i16;
const C_FLOAT: i16 = CDataType::Float as i16;
const C_DOUBLE: i16 = CDataType::Double as i16;
const C_CHAR: i16 = CDataType::Char as i16;
const C_W_CHAR: i16 = CDataType::WChar as i16;
const C_BINARY: i16 = CDataType::Binary as i16;
const C_TYPE_DATE: i16 = CDataType::TypeDate as i16;
const C_TYPE_TIME: i16 = CDataType::TypeTime as i16;
const C_TYPE_TIMESTAMP: i16 = CDataType::TypeTimestamp as i16;
const C_GUID: i16 = CDataType::Guid as i16;

// Legacy ODBC 2.x date and time codes. Old drivers may still bind with these.
const C_DATE: i16 = 9;
const C_TIME: i16 = 10;
const C_TIMESTAMP: i16 = 11;

/// Scalar categories a fetched value can be scanned as. Applications use this to decide
/// which variant of [`crate::Value`] to expect for a column before fetching any rows.
///
/// Every category is nullable. ODBC reports the absence of a value through the length
/// indicator rather than the type, so `NULL` can show up in a column of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Signed integers up to 64 bit.
    NullableInt,
    /// 32 or 64 bit floating point numbers.
    NullableFloat,
    /// Narrow or wide character data.
    NullableString,
    /// Boolean values transferred as a single bit.
    NullableBool,
    /// Dates, times and timestamps, including SQL Servers `TIME` columns which are
    /// transferred with a binary encoding.
    NullableTimestamp,
    /// Binary data without further interpretation.
    RawBytes,
    /// The column has been bound with a type code this crate knows no scalar category
    /// for. Its values are still extracted as raw bytes.
    Unknown,
}

/// Maps the storage kind recorded for a column at bind time to the scalar category its
/// values can be scanned as.
///
/// Total over all inputs and free of side effects. Codes outside the known set yield
/// [`ScalarKind::Unknown`] rather than an error, since drivers are free to invent codes.
pub fn scalar_kind(storage_kind: i16) -> ScalarKind {
    match storage_kind {
        C_BIT => ScalarKind::NullableBool,
        C_S_TINY_INT | C_U_TINY_INT | C_S_SHORT | C_U_SHORT | C_S_LONG | C_U_LONG
        | C_S_BIG_INT | C_U_BIG_INT => ScalarKind::NullableInt,
        C_FLOAT | C_DOUBLE => ScalarKind::NullableFloat,
        C_CHAR | C_W_CHAR => ScalarKind::NullableString,
        C_DATE | C_TIME | C_TIMESTAMP | C_TYPE_DATE | C_TYPE_TIME | C_TYPE_TIMESTAMP | C_GUID
        | SQL_SS_TIME2 => ScalarKind::NullableTimestamp,
        C_BINARY => ScalarKind::RawBytes,
        _ => ScalarKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use odbc_sys::CDataType;
    use test_case::test_case;

    use super::{SQL_SS_TIME2, ScalarKind, scalar_kind};

    #[test_case(CDataType::Bit, ScalarKind::NullableBool; "bit")]
    #[test_case(CDataType::STinyInt, ScalarKind::NullableInt; "signed tiny int")]
    #[test_case(CDataType::UTinyInt, ScalarKind::NullableInt; "unsigned tiny int")]
    #[test_case(CDataType::SShort, ScalarKind::NullableInt; "signed short")]
    #[test_case(CDataType::UShort, ScalarKind::NullableInt; "unsigned short")]
    #[test_case(CDataType::SLong, ScalarKind::NullableInt; "signed long")]
    #[test_case(CDataType::ULong, ScalarKind::NullableInt; "unsigned long")]
    #[test_case(CDataType::SBigInt, ScalarKind::NullableInt; "signed big int")]
    #[test_case(CDataType::UBigInt, ScalarKind::NullableInt; "unsigned big int")]
    #[test_case(CDataType::Float, ScalarKind::NullableFloat; "float")]
    #[test_case(CDataType::Double, ScalarKind::NullableFloat; "double")]
    #[test_case(CDataType::Char, ScalarKind::NullableString; "narrow character")]
    #[test_case(CDataType::WChar, ScalarKind::NullableString; "wide character")]
    #[test_case(CDataType::TypeDate, ScalarKind::NullableTimestamp; "date")]
    #[test_case(CDataType::TypeTime, ScalarKind::NullableTimestamp; "time")]
    #[test_case(CDataType::TypeTimestamp, ScalarKind::NullableTimestamp; "timestamp")]
    #[test_case(CDataType::Binary, ScalarKind::RawBytes; "binary")]
    #[test_case(CDataType::Guid, ScalarKind::NullableTimestamp; "guid")]
    fn kind_of_c_type(c_type: CDataType, expected: ScalarKind) {
        assert_eq!(expected, scalar_kind(c_type as i16));
    }

    /// SQL Servers `TIME` columns are transferred with a binary encoding, yet their
    /// content is a point in time and must be announced as such.
    #[test]
    fn sql_server_time_is_a_timestamp() {
        assert_eq!(ScalarKind::NullableTimestamp, scalar_kind(SQL_SS_TIME2));
    }

    /// Legacy ODBC 2.x codes for date and time still map to timestamps.
    #[test_case(9; "legacy date")]
    #[test_case(10; "legacy time")]
    #[test_case(11; "legacy timestamp")]
    fn legacy_date_time_codes(code: i16) {
        assert_eq!(ScalarKind::NullableTimestamp, scalar_kind(code));
    }

    /// Codes without a known category must not cause a panic.
    #[test]
    fn unknown_code_yields_unknown_kind() {
        assert_eq!(ScalarKind::Unknown, scalar_kind(-9999));
        // Repeated calls with the same input yield the same category.
        assert_eq!(scalar_kind(-9999), scalar_kind(-9999));
    }
}
