//! Certificate validity windows measured in calendar years.

use crate::error::{MktlsError, Result};
use openssl::asn1::Asn1Time;
use time::{Month, OffsetDateTime};

/// `NotBefore`/`NotAfter` pair for one certificate.
///
/// Both ends are truncated to whole seconds, which is the resolution X.509
/// stores, so `not_after - not_before` is exactly the requested number of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
}

impl ValidityWindow {
    /// Window starting now and ending `years` calendar years later.
    pub fn years_from_now(years: u32) -> Result<Self> {
        Self::years_from(OffsetDateTime::now_utc(), years)
    }

    /// Window starting at `start` and ending `years` calendar years later.
    ///
    /// February 29 rolls over to March 1 when the target year is not a leap year.
    pub fn years_from(start: OffsetDateTime, years: u32) -> Result<Self> {
        let out_of_range = || MktlsError::ValidityOutOfRange { years, start };

        let not_before = start.replace_nanosecond(0).map_err(|_| out_of_range())?;
        let target_year = i32::try_from(years)
            .ok()
            .and_then(|years| not_before.year().checked_add(years))
            .ok_or_else(out_of_range)?;

        let not_after = match not_before.replace_year(target_year) {
            Ok(date) => date,
            Err(_) if not_before.month() == Month::February && not_before.day() == 29 => not_before
                .replace_day(1)
                .and_then(|date| date.replace_month(Month::March))
                .and_then(|date| date.replace_year(target_year))
                .map_err(|_| out_of_range())?,
            Err(_) => return Err(out_of_range()),
        };

        Ok(Self {
            not_before,
            not_after,
        })
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    pub(crate) fn not_before_asn1(&self) -> Result<Asn1Time> {
        Asn1Time::from_unix(self.not_before.unix_timestamp())
            .map_err(MktlsError::encoding("failed to create not_before"))
    }

    pub(crate) fn not_after_asn1(&self) -> Result<Asn1Time> {
        Asn1Time::from_unix(self.not_after.unix_timestamp())
            .map_err(MktlsError::encoding("failed to create not_after"))
    }
}
