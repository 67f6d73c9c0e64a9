use log::{Level, warn};

use super::{Diagnostics, Record};

/// Inspects all diagnostic records of a native handle and logs their text messages at
/// warn level. Placeholder characters are printed for messages which cannot be
/// converted to UTF-8.
pub fn log_diagnostics(handle: &(impl Diagnostics + ?Sized)) {
    if log::max_level() < Level::Warn {
        // Early return to save the work of creating all these log records in case we
        // would not log anything.
        return;
    }

    let mut rec = Record::with_capacity(512);
    let mut rec_number = 1;

    // Log results, while there are diagnostic records
    while rec.fill_from(handle, rec_number) {
        warn!("{rec}");
        // Prevent overflow. Some fetch calls can cause diagnostic messages for each
        // row, so exhausting `i16` is not that unlikely to happen.
        if rec_number == i16::MAX {
            warn!("Too many diagnostic records were generated. Not all could be logged.");
            break;
        }
        rec_number += 1;
    }
}
