use std::char::REPLACEMENT_CHARACTER;

use widestring::decode_utf16;

/// Native description of a single column of a result set, as reported by the data
/// source when binding column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnDescription {
    /// Name of the column, encoded as UTF-16. The buffer is reused between metadata
    /// calls to avoid repeated allocations.
    pub name: Vec<u16>,
    /// Native SQL type code of the column. Kept as the raw code, since data sources may
    /// report driver specific codes outside the standard set.
    pub data_type: i16,
}

impl ColumnDescription {
    /// Converts the UTF-16 encoded column name into a string. Invalid encodings are
    /// replaced with the replacement character.
    pub fn name_to_string(&self) -> String {
        decode_utf16(self.name.iter().copied())
            .map(|decoding_result| decoding_result.unwrap_or(REPLACEMENT_CHARACTER))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::ColumnDescription;

    #[test]
    fn name_decoding() {
        let description = ColumnDescription {
            name: "title".encode_utf16().collect(),
            data_type: 12,
        };
        assert_eq!("title", description.name_to_string());
    }
}
