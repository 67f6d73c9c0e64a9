use std::{char::REPLACEMENT_CHARACTER, fmt};

use odbc_sys::SQLSTATE_SIZE;
use widestring::decode_utf16;

/// A buffer large enough to hold an SQLSTATE code for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct State(pub [u8; SQLSTATE_SIZE]);

impl State {
    /// Drops the terminating zero and narrows the wide characters ODBC diagnostics
    /// report the state with.
    pub fn from_chars_with_nul(code: &[u16; SQLSTATE_SIZE + 1]) -> Self {
        let mut ascii = [0; SQLSTATE_SIZE];
        for (index, letter) in code[..SQLSTATE_SIZE].iter().copied().enumerate() {
            ascii[index] = letter as u8;
        }
        State(ascii)
    }

    /// View status code as string slice for displaying. Must always succeed as ODBC
    /// status codes always consist of ASCII characters.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap()
    }
}

/// Result of [`Diagnostics::diagnostic_record`].
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticResult {
    /// A five-character SQLSTATE code for the requested record. The first two characters
    /// indicate the class, the next three the subclass.
    pub state: State,
    /// Native error code specific to the data source.
    pub native_error: i32,
    /// The length of the diagnostic message reported by ODBC (excluding the terminating
    /// zero).
    pub text_length: i16,
}

/// Report diagnostics from the last call to a native function using a handle.
///
/// Diagnostic state is typically overwritten by the next native call on the same handle,
/// so records must be retrieved immediately after the failing call.
pub trait Diagnostics {
    /// Retrieves the current values of multiple fields of a diagnostic record containing
    /// error, warning and status information.
    ///
    /// # Arguments
    ///
    /// * `rec_number` - Indicates the status record from which the application seeks
    ///   information. Status records are numbered from 1. Implementations panic for
    ///   values < 1.
    /// * `message_text` - Buffer in which to return the diagnostic message text. If the
    ///   number of characters to return is greater than the buffer length, the message is
    ///   truncated; compare the buffer length to [`DiagnosticResult::text_length`] to
    ///   detect this.
    ///
    /// # Result
    ///
    /// `None` if `rec_number` was greater than the number of diagnostic records that
    /// exist for the handle, or if no records are available at all.
    fn diagnostic_record(
        &self,
        rec_number: i16,
        message_text: &mut [u16],
    ) -> Option<DiagnosticResult>;

    /// Like [`Self::diagnostic_record`], but if the message does not fit in the buffer,
    /// the buffer is grown and the record extracted again.
    fn diagnostic_record_vec(
        &self,
        rec_number: i16,
        message_text: &mut Vec<u16>,
    ) -> Option<DiagnosticResult> {
        // Use all the memory available in the buffer, but don't allocate any extra.
        let cap = message_text.capacity();
        message_text.resize(cap, 0);

        self.diagnostic_record(rec_number, message_text)
            .map(|mut result| {
                let mut text_length: usize = result.text_length.try_into().unwrap();

                if text_length > message_text.len() {
                    // The buffer was too small to hold the requested diagnostic message.
                    // Resize with +1 to account for the terminating zero and extract the
                    // record again. Should be a success this time if the driver isn't
                    // buggy.
                    message_text.resize(text_length + 1, 0);
                    result = self.diagnostic_record(rec_number, message_text).unwrap();
                }

                // Some drivers pad the message with null-chars (which is still a valid C
                // string, but not a valid Rust string).
                while text_length > 0 && message_text[text_length - 1] == 0 {
                    text_length -= 1;
                }
                message_text.resize(text_length, 0);

                result
            })
    }
}

impl<D> Diagnostics for &mut D
where
    D: Diagnostics + ?Sized,
{
    fn diagnostic_record(
        &self,
        rec_number: i16,
        message_text: &mut [u16],
    ) -> Option<DiagnosticResult> {
        (**self).diagnostic_record(rec_number, message_text)
    }
}

/// A diagnostic record as captured from a native handle after a failing call.
///
/// The `std::error::Error` description only holds the message. Use `std::fmt::Display`
/// to retrieve status code and native error code, too.
#[derive(Default)]
pub struct Record {
    /// SQLSTATE of the record.
    pub state: State,
    /// Error code returned by the driver manager or driver.
    pub native_error: i32,
    /// Buffer containing the error message. The buffer already has the correct size, and
    /// there is no terminating zero at the end.
    pub message: Vec<u16>,
}

impl Record {
    /// Creates an empty diagnostic record with at least the specified capacity for the
    /// message. A size different from zero may save a second native call when filling
    /// the record.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            message: Vec::with_capacity(capacity),
            ..Default::default()
        }
    }

    /// Fill this record from any diagnostics providing handle.
    ///
    /// # Return
    ///
    /// `true` if a record has been found, `false` if not.
    pub fn fill_from(&mut self, handle: &(impl Diagnostics + ?Sized), record_number: i16) -> bool {
        match handle.diagnostic_record_vec(record_number, &mut self.message) {
            Some(result) => {
                self.state = result.state;
                self.native_error = result.native_error;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message: String = decode_utf16(self.message.iter().copied())
            .map(|result| result.unwrap_or(REPLACEMENT_CHARACTER))
            .collect();

        write!(
            f,
            "State: {}, Native error: {}, Message: {}",
            self.state.as_str(),
            self.native_error,
            message,
        )
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, State};

    #[test]
    fn formatting() {
        let message = "[Microsoft][ODBC Driver Manager] Function sequence error"
            .encode_utf16()
            .collect();
        let rec = Record {
            state: State(*b"HY010"),
            message,
            ..Record::default()
        };

        assert_eq!(
            format!("{rec}"),
            "State: HY010, Native error: 0, Message: [Microsoft][ODBC Driver Manager] \
             Function sequence error"
        );
    }
}
