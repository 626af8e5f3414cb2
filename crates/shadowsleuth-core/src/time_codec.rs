/// Timestamp conversions between the shadow copy listing, file-system
/// epochs, and the report's human-readable format.
///
/// Listing timestamps look like `9/28/2022 3:40:12 PM` (US order, 12-hour
/// clock). Report timestamps look like `28/09/2022 15:40:12`. Epoch values
/// are whole Unix seconds; sub-second precision is dropped everywhere.
use crate::error::TimeError;
use chrono::{DateTime, Local, LocalResult, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

/// Format of the creation time in the snapshot listing.
pub const LISTING_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/// Format of every timestamp written to a report.
pub const REPORT_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Format of the date part of a report timestamp.
pub const REPORT_DATE_FORMAT: &str = "%d/%m/%Y";

/// Number of 100 ns FILETIME ticks per second.
const FILETIME_TICKS_PER_SEC: u64 = 10_000_000;

/// Seconds between 1601-01-01 (FILETIME epoch) and 1970-01-01 (Unix epoch).
const FILETIME_UNIX_OFFSET_SECS: i64 = 11_644_473_600;

/// Time zone in which wall-clock strings are read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    #[default]
    Local,
    Utc,
}

/// Stateless converter bound to one [`Zone`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeCodec {
    zone: Zone,
}

impl TimeCodec {
    pub fn new(zone: Zone) -> Self {
        Self { zone }
    }

    /// Parse a listing timestamp into Unix seconds.
    ///
    /// A wall-clock time that occurs twice (DST fall-back) resolves to the
    /// earlier instant; one that never occurs (spring-forward gap) fails.
    pub fn to_epoch(&self, listing: &str) -> Result<i64, TimeError> {
        let trimmed = listing.trim();
        let naive = NaiveDateTime::parse_from_str(trimmed, LISTING_FORMAT).map_err(|e| {
            TimeError::Format {
                input: trimmed.to_string(),
                reason: e.to_string(),
            }
        })?;
        let resolved = match self.zone {
            Zone::Local => earliest(Local.from_local_datetime(&naive)),
            Zone::Utc => earliest(Utc.from_local_datetime(&naive)),
        };
        resolved.ok_or(TimeError::Conversion {
            value: naive.and_utc().timestamp(),
        })
    }

    /// Render Unix seconds as `DD/MM/YYYY hh:mm:ss` (24-hour clock).
    pub fn epoch_to_human(&self, epoch: i64) -> Result<String, TimeError> {
        let utc = DateTime::<Utc>::from_timestamp(epoch, 0)
            .ok_or(TimeError::Conversion { value: epoch })?;
        let rendered = match self.zone {
            Zone::Local => utc.with_timezone(&Local).format(REPORT_FORMAT).to_string(),
            Zone::Utc => utc.format(REPORT_FORMAT).to_string(),
        };
        Ok(rendered)
    }
}

fn earliest<Tz: TimeZone>(result: LocalResult<DateTime<Tz>>) -> Option<i64> {
    result.earliest().map(|dt| dt.timestamp())
}

/// Convert a Windows FILETIME (100 ns ticks since 1601-01-01) to Unix seconds.
///
/// A zero FILETIME means "not recorded" and is rejected rather than
/// rendered as 1601.
pub fn filetime_to_epoch(ticks: u64) -> Result<i64, TimeError> {
    if ticks == 0 {
        return Err(TimeError::Conversion { value: 0 });
    }
    let secs = (ticks / FILETIME_TICKS_PER_SEC) as i64;
    Ok(secs - FILETIME_UNIX_OFFSET_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> TimeCodec {
        TimeCodec::new(Zone::Utc)
    }

    #[test]
    fn listing_timestamp_to_epoch() {
        assert_eq!(utc().to_epoch("01/01/2023 10:00:00 AM").unwrap(), 1_672_567_200);
        assert_eq!(utc().to_epoch("01/01/2023 10:00:00 PM").unwrap(), 1_672_610_400);
    }

    #[test]
    fn unpadded_listing_fields_are_accepted() {
        let padded = utc().to_epoch("09/28/2022 03:40:12 PM").unwrap();
        let bare = utc().to_epoch("9/28/2022 3:40:12 PM").unwrap();
        assert_eq!(padded, bare);
    }

    #[test]
    fn midnight_and_noon_follow_12_hour_rules() {
        let midnight = utc().to_epoch("01/02/2023 12:00:00 AM").unwrap();
        let noon = utc().to_epoch("01/02/2023 12:00:00 PM").unwrap();
        assert_eq!(noon - midnight, 12 * 3600);
        assert_eq!(utc().epoch_to_human(midnight).unwrap(), "02/01/2023 00:00:00");
    }

    #[test]
    fn malformed_listing_timestamp_is_a_format_error() {
        for bad in ["", "2023-01-01 10:00:00", "13/01/2023 10:00:00 AM", "01/01/2023 10:00:00"] {
            match utc().to_epoch(bad) {
                Err(TimeError::Format { .. }) => {}
                other => panic!("expected format error for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn epoch_renders_day_first() {
        assert_eq!(utc().epoch_to_human(0).unwrap(), "01/01/1970 00:00:00");
        assert_eq!(utc().epoch_to_human(1_672_567_200).unwrap(), "01/01/2023 10:00:00");
    }

    #[test]
    fn out_of_range_epoch_is_a_conversion_error() {
        assert_eq!(
            utc().epoch_to_human(i64::MAX),
            Err(TimeError::Conversion { value: i64::MAX })
        );
    }

    #[test]
    fn listing_and_report_agree_on_the_calendar_moment() {
        let codec = utc();
        let epoch = codec.to_epoch("02/01/2023 10:00:00 AM").unwrap();
        assert_eq!(codec.epoch_to_human(epoch).unwrap(), "01/02/2023 10:00:00");
    }

    #[test]
    fn local_zone_round_trips_through_listing_format() {
        let codec = TimeCodec::new(Zone::Local);
        let epoch = codec.to_epoch("06/15/2023 11:30:00 AM").unwrap();
        assert_eq!(codec.epoch_to_human(epoch).unwrap(), "15/06/2023 11:30:00");
    }

    #[test]
    fn filetime_conversion() {
        assert_eq!(filetime_to_epoch(116_444_736_000_000_000).unwrap(), 0);
        assert_eq!(filetime_to_epoch(116_444_736_019_999_999).unwrap(), 1);
        assert!(filetime_to_epoch(0).is_err());
    }
}
