use std::{mem::ManuallyDrop, ptr, thread::panicking};

use crate::{
    column::Column,
    error::Error,
    handles::Statement,
    scalar_kind::{ScalarKind, scalar_kind},
    value::Value,
};

/// Iterates the rows and result sets produced by a statement execution.
///
/// A cursor always has a current result set whose columns are bound, starting with the
/// first one produced by the execution. [`Self::next`] moves through the rows of the
/// current result set, [`Self::next_result_set`] advances to the following one and
/// rebinds. The statement may be owned or mutably borrowed, anything implementing
/// [`Statement`] works.
pub struct RowCursor<S: Statement> {
    statement: S,
    columns: Vec<Column>,
}

impl<S: Statement> RowCursor<S> {
    /// Creates a cursor over a statement which has produced at least one result set,
    /// binding the columns of the first one.
    pub fn new(mut statement: S) -> Result<Self, Error> {
        let columns = Column::bind_all(&mut statement)?;
        Ok(Self { statement, columns })
    }

    /// Number of columns in the current result set.
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Names of the columns of the current result set, left to right. Answered from the
    /// metadata bound at result set start, without a native call.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    /// Scalar category the values of the column at the (zero based) `index` can be
    /// scanned as. Answered without a native call.
    ///
    /// Panics if `index` is out of bounds.
    pub fn scalar_kind(&self, index: usize) -> ScalarKind {
        scalar_kind(self.columns[index].storage_kind())
    }

    /// Scalar categories of all columns of the current result set, left to right.
    pub fn scalar_kinds(&self) -> impl Iterator<Item = ScalarKind> + '_ {
        self.columns
            .iter()
            .map(|column| scalar_kind(column.storage_kind()))
    }

    /// Advances to the next row of the current result set and extracts its fields into
    /// `dest`.
    ///
    /// `Ok(true)` means a row has been written to `dest`. `Ok(false)` means the result
    /// set is exhausted; repeated calls keep answering `Ok(false)`. Extraction stops at
    /// the shorter of `dest` and the column set. If extracting an individual field
    /// fails, the error names the position of the offending column and the contents of
    /// `dest` are unspecified.
    pub fn next(&mut self, dest: &mut [Value]) -> Result<bool, Error> {
        let has_row = self.statement.fetch().into_result_bool(&self.statement)?;
        if !has_row {
            return Ok(false);
        }
        for (index, (column, field)) in self.columns.iter_mut().zip(dest.iter_mut()).enumerate() {
            // ODBC numbers columns starting at 1, `0` is the bookmark column.
            let column_number = index as u16 + 1;
            *field = column
                .value(&mut self.statement, column_number)
                .map_err(|error| Error::Column {
                    ordinal: index as u16,
                    source: Box::new(error),
                })?;
        }
        Ok(true)
    }

    /// `true` if the statement execution may have produced further result sets.
    ///
    /// ODBC offers no way to know without advancing, so this answers optimistically.
    /// The authoritative answer is the return value of [`Self::next_result_set`].
    pub fn has_next_result_set(&self) -> bool {
        true
    }

    /// Advances the cursor to the next result set produced by the statement execution.
    ///
    /// `Ok(true)` means the cursor now iterates the following result set and its
    /// columns have been rebound. `Ok(false)` means there is none; the current column
    /// set stays bound in that case, as it does if rebinding fails.
    pub fn next_result_set(&mut self) -> Result<bool, Error> {
        let has_more = self
            .statement
            .more_results()
            .into_result_bool(&self.statement)?;
        if !has_more {
            return Ok(false);
        }
        let columns = Column::bind_all(&mut self.statement)?;
        self.columns = columns;
        Ok(true)
    }

    /// Gives up the cursor state of the statement and reports any native error doing
    /// so. Consumes the cursor, so the statement can not be closed twice through it.
    pub fn close(self) -> Result<(), Error> {
        // Disarm `drop`, then move the fields out so they are still released exactly
        // once.
        let this = ManuallyDrop::new(self);
        let mut statement = unsafe { ptr::read(&this.statement) };
        let _columns = unsafe { ptr::read(&this.columns) };
        statement.close_cursor().into_result(&statement)
    }
}

impl<S: Statement> Drop for RowCursor<S> {
    fn drop(&mut self) {
        if let Err(error) = self.statement.close_cursor().into_result(&self.statement) {
            // Avoid panicking, if we already have a panic. We don't want to mask the
            // original error.
            if !panicking() {
                panic!("Unexpected error closing cursor: {error:?}")
            }
        }
    }
}
