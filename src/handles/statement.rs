use std::marker::PhantomData;

use odbc_sys::{
    CDataType, HDbc, HStmt, HandleType, Len, Pointer, SQLCloseCursor, SQLDescribeColW,
    SQLFetch, SQLGetData, SQLGetDiagRecW, SQLMoreResults, SQLNumResultCols, SQLSTATE_SIZE,
    SqlDataType, SqlReturn, ULen,
};

use super::{
    buffer::{clamp_small_int, mut_buf_ptr},
    column_description::ColumnDescription,
    diagnostics::{DiagnosticResult, Diagnostics, State},
    indicator::Indicator,
    sql_result::{ExtSqlReturn, SqlResult},
};

/// Native primitives the row fetch core drives on a statement in cursor state.
///
/// Every method reports its outcome as [`SqlResult`], so callers can distinguish
/// success, end of data and error for each individual call. [`StmtHandle`] implements
/// this trait on top of a raw ODBC statement handle; test code may provide scripted
/// implementations instead.
pub trait Statement: Diagnostics {
    /// Advances the cursor to the next row of the current result set.
    /// [`SqlResult::NoData`] signals the result set is exhausted.
    fn fetch(&mut self) -> SqlResult<()>;

    /// Probes for another result set produced by the same statement execution.
    /// [`SqlResult::NoData`] signals there is none.
    fn more_results(&mut self) -> SqlResult<()>;

    /// Number of columns projected by the current result set.
    fn num_result_cols(&mut self) -> SqlResult<i16>;

    /// Fetches name and native type of a column. `column_number` starts at `1`, `0` is
    /// the bookmark column.
    fn describe_col(
        &mut self,
        column_number: u16,
        column_description: &mut ColumnDescription,
    ) -> SqlResult<()>;

    /// Reads (a part of) the value of a column of the current row into `buffer`,
    /// converted to the given C type. Repeated calls drain variable sized values;
    /// [`SqlResult::NoData`] signals the value has already been drained completely. The
    /// indicator reports the length of the data still available before this call, or
    /// its absence.
    fn get_data(
        &mut self,
        column_number: u16,
        target_type: CDataType,
        buffer: &mut [u8],
    ) -> SqlResult<Indicator>;

    /// Gives up the cursor state of the statement, allowing it to be reused.
    fn close_cursor(&mut self) -> SqlResult<()>;
}

impl<S> Statement for &mut S
where
    S: Statement + ?Sized,
{
    fn fetch(&mut self) -> SqlResult<()> {
        (**self).fetch()
    }

    fn more_results(&mut self) -> SqlResult<()> {
        (**self).more_results()
    }

    fn num_result_cols(&mut self) -> SqlResult<i16> {
        (**self).num_result_cols()
    }

    fn describe_col(
        &mut self,
        column_number: u16,
        column_description: &mut ColumnDescription,
    ) -> SqlResult<()> {
        (**self).describe_col(column_number, column_description)
    }

    fn get_data(
        &mut self,
        column_number: u16,
        target_type: CDataType,
        buffer: &mut [u8],
    ) -> SqlResult<Indicator> {
        (**self).get_data(column_number, target_type, buffer)
    }

    fn close_cursor(&mut self) -> SqlResult<()> {
        (**self).close_cursor()
    }
}

/// Wraps a valid (i.e. successfully allocated) ODBC statement handle in cursor state.
///
/// The statement remains owned by whoever allocated it; dropping this wrapper does not
/// free the handle.
pub struct StmtHandle<'c> {
    parent: PhantomData<&'c HDbc>,
    handle: HStmt,
}

impl<'c> StmtHandle<'c> {
    /// # Safety
    ///
    /// `handle` must be a valid statement handle in cursor state, and must not be freed
    /// while this wrapper is alive.
    pub unsafe fn new(handle: HStmt) -> Self {
        Self {
            handle,
            parent: PhantomData,
        }
    }

    /// The raw underlying statement handle.
    pub fn as_sys(&self) -> HStmt {
        self.handle
    }
}

impl Diagnostics for StmtHandle<'_> {
    fn diagnostic_record(
        &self,
        rec_number: i16,
        message_text: &mut [u16],
    ) -> Option<DiagnosticResult> {
        // Diagnostic records in ODBC are indexed starting with 1
        assert!(rec_number > 0);

        // The total number of characters (excluding the terminating NULL) available to
        // return in `message_text`.
        let mut text_length = 0;
        let mut state = [0; SQLSTATE_SIZE + 1];
        let mut native_error = 0;
        let ret = unsafe {
            SQLGetDiagRecW(
                HandleType::Stmt,
                self.handle.as_handle(),
                rec_number,
                state.as_mut_ptr(),
                &mut native_error,
                mut_buf_ptr(message_text),
                clamp_small_int(message_text.len()),
                &mut text_length,
            )
        };

        let result = DiagnosticResult {
            state: State::from_chars_with_nul(&state),
            native_error,
            text_length,
        };

        match ret {
            SqlReturn::SUCCESS | SqlReturn::SUCCESS_WITH_INFO => Some(result),
            SqlReturn::NO_DATA => None,
            SqlReturn::ERROR => panic!("rec_number argument of diagnostics must be > 0."),
            unexpected => panic!("SQLGetDiagRecW returned: {unexpected:?}"),
        }
    }
}

impl Statement for StmtHandle<'_> {
    fn fetch(&mut self) -> SqlResult<()> {
        unsafe { SQLFetch(self.handle) }.into_sql_result("SQLFetch")
    }

    fn more_results(&mut self) -> SqlResult<()> {
        unsafe { SQLMoreResults(self.handle) }.into_sql_result("SQLMoreResults")
    }

    fn num_result_cols(&mut self) -> SqlResult<i16> {
        let mut out = 0;
        unsafe { SQLNumResultCols(self.handle, &mut out) }
            .into_sql_result("SQLNumResultCols")
            .on_success(|| out)
    }

    fn describe_col(
        &mut self,
        column_number: u16,
        column_description: &mut ColumnDescription,
    ) -> SqlResult<()> {
        let name = &mut column_description.name;
        // Use the maximum available capacity.
        name.resize(name.capacity(), 0);
        let mut name_length: i16 = 0;
        let mut data_type = SqlDataType::UNKNOWN_TYPE;
        let mut column_size: ULen = 0;
        let mut decimal_digits: i16 = 0;
        let mut nullable = odbc_sys::Nullability::UNKNOWN;

        let result = unsafe {
            SQLDescribeColW(
                self.handle,
                column_number,
                mut_buf_ptr(name),
                clamp_small_int(name.len()),
                &mut name_length,
                &mut data_type,
                &mut column_size,
                &mut decimal_digits,
                &mut nullable,
            )
        }
        .into_sql_result("SQLDescribeColW");

        if result.is_err() {
            return result;
        }

        if name_length + 1 > clamp_small_int(name.len()) {
            // Buffer is too small to hold the name, retry with a larger one
            name.resize(name_length as usize + 1, 0);
            self.describe_col(column_number, column_description)
        } else {
            name.resize(name_length as usize, 0);
            column_description.data_type = data_type.0;
            result
        }
    }

    fn get_data(
        &mut self,
        column_number: u16,
        target_type: CDataType,
        buffer: &mut [u8],
    ) -> SqlResult<Indicator> {
        let mut indicator: Len = 0;
        let buffer_length: Len = buffer.len().try_into().unwrap();
        unsafe {
            SQLGetData(
                self.handle,
                column_number,
                target_type,
                mut_buf_ptr(buffer) as Pointer,
                buffer_length,
                &mut indicator,
            )
        }
        .into_sql_result("SQLGetData")
        .on_success(|| Indicator::from_isize(indicator))
    }

    fn close_cursor(&mut self) -> SqlResult<()> {
        unsafe { SQLCloseCursor(self.handle) }.into_sql_result("SQLCloseCursor")
    }
}
