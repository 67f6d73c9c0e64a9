use odbc_sys::SqlReturn;

/// Outcome of a call into the native ODBC layer. Variants hold the same meaning as the
/// constants associated with [`SqlReturn`]. This type may hold results, but it is still
/// the responsibility of the caller to fetch and handle the diagnostics in case of an
/// error.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlResult<T> {
    /// The function has been executed successfully.
    Success(T),
    /// The function has been executed successfully. There have been warnings.
    SuccessWithInfo(T),
    /// No more data is available. For a fetch this means the result set is exhausted,
    /// for a result set advance it means no further result set exists.
    NoData,
    /// The function returned an error state. Check diagnostics.
    Error {
        /// Name of the native API call which caused the error. This helps interpreting
        /// the associated diagnostics if the error is bubbled all the way up to the end
        /// users output, but the context is lost.
        function: &'static str,
    },
}

impl SqlResult<()> {
    /// Append a return value to a successful result.
    pub fn on_success<F, T>(self, f: F) -> SqlResult<T>
    where
        F: FnOnce() -> T,
    {
        self.map(|()| f())
    }
}

impl<T> SqlResult<T> {
    /// `true` if variant is [`SqlResult::Error`].
    pub fn is_err(&self) -> bool {
        matches!(self, SqlResult::Error { .. })
    }

    /// Applies `f` to any value wrapped in `Success` or `SuccessWithInfo`.
    pub fn map<U, F>(self, f: F) -> SqlResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            SqlResult::Success(v) => SqlResult::Success(f(v)),
            SqlResult::SuccessWithInfo(v) => SqlResult::SuccessWithInfo(f(v)),
            SqlResult::Error { function } => SqlResult::Error { function },
            SqlResult::NoData => SqlResult::NoData,
        }
    }
}

/// Translates a raw [`SqlReturn`] into [`SqlResult`], attaching the name of the native
/// function call for error reporting.
pub trait ExtSqlReturn {
    fn into_sql_result(self, function_name: &'static str) -> SqlResult<()>;
}

impl ExtSqlReturn for SqlReturn {
    fn into_sql_result(self, function: &'static str) -> SqlResult<()> {
        match self {
            SqlReturn::SUCCESS => SqlResult::Success(()),
            SqlReturn::SUCCESS_WITH_INFO => SqlResult::SuccessWithInfo(()),
            SqlReturn::NO_DATA => SqlResult::NoData,
            SqlReturn::ERROR => SqlResult::Error { function },
            r => panic!("Unexpected return value '{r:?}' for ODBC function '{function}'"),
        }
    }
}
