use odbc_sys::{NO_TOTAL, NULL_DATA};

/// Indicates existence and length of a value.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Indicator {
    /// Field does not exist
    Null,
    /// Field exists, but its length has not been reported by the driver.
    NoTotal,
    /// Field exists. Value indicates the number of bytes required to store the value. In
    /// case of truncated data, this is the true length of the data, before truncation
    /// occurred.
    Length(usize),
}

impl Indicator {
    /// Creates an indicator from an `isize` indicator value returned by ODBC.
    pub fn from_isize(indicator: isize) -> Self {
        match indicator {
            NULL_DATA => Indicator::Null,
            NO_TOTAL => Indicator::NoTotal,
            other => Indicator::Length(
                other
                    .try_into()
                    .expect("Length indicator must be non-negative."),
            ),
        }
    }

    /// Only `true` if the indicator is the equivalent of [`odbc_sys::NULL_DATA`],
    /// indicating a non-existing value.
    pub fn is_null(self) -> bool {
        matches!(self, Indicator::Null)
    }

    /// If the indicator is [`Indicator::Length`] this is [`Some`].
    pub fn length(self) -> Option<usize> {
        if let Indicator::Length(len) = self {
            Some(len)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Indicator;

    #[test]
    fn from_negative_sentinels() {
        assert_eq!(Indicator::Null, Indicator::from_isize(odbc_sys::NULL_DATA));
        assert_eq!(
            Indicator::NoTotal,
            Indicator::from_isize(odbc_sys::NO_TOTAL)
        );
        assert_eq!(Indicator::Length(42), Indicator::from_isize(42));
    }
}
