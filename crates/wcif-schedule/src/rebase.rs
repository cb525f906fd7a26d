//! Rebasing a venue's activities onto a new timezone.
//!
//! When an organizer changes a venue's timezone, every activity keeps the
//! wall-clock time it displayed (4pm stays 4pm) while its UTC offset, and so
//! its absolute instant, changes to match the new zone. This is a
//! reinterpretation of the local numerals, not an instant conversion.
//!
//! Unlike [`crate::rescale`], this walks the full activity tree: activities
//! at every depth are rewritten.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use log::debug;

use crate::error::Result;
use crate::timestamp::parse_timezone;
use crate::tree::for_each_activity_mut;
use crate::wcif::Venue;

/// Return a copy of `venue` with every activity rebased from `old_timezone`
/// to the venue's current `timezone`.
///
/// `venue.timezone` must already hold the new zone; `old_timezone` is the
/// zone the venue had before the edit.
///
/// # Errors
///
/// Returns [`crate::ScheduleError::InvalidTimezone`] if either zone name is
/// not a valid IANA timezone (the empty name included).
///
/// # Examples
///
/// ```
/// use wcif_schedule::{format_timestamp, parse_timestamp, rebase_venue_timezone};
/// use wcif_schedule::{Activity, Room, Venue};
///
/// let lunch = Activity {
///     id: 1,
///     name: "Lunch".to_string(),
///     activity_code: "other-lunch".to_string(),
///     start_time: parse_timestamp("2026-05-02T12:00:00+02:00").unwrap(),
///     end_time: parse_timestamp("2026-05-02T13:00:00+02:00").unwrap(),
///     child_activities: vec![],
///     scramble_set_id: None,
///     extensions: vec![],
/// };
/// let venue = Venue {
///     id: 1,
///     name: "Main Venue".to_string(),
///     country_iso2: "JP".to_string(),
///     latitude_microdegrees: 35_689_487,
///     longitude_microdegrees: 139_691_706,
///     timezone: "Asia/Tokyo".to_string(),
///     rooms: vec![Room {
///         id: 1,
///         name: "Main Room".to_string(),
///         color: "#304a96".to_string(),
///         activities: vec![lunch],
///         extensions: vec![],
///     }],
///     extensions: vec![],
/// };
///
/// // Lunch was entered while the venue was set to Paris; it stays at noon.
/// let rebased = rebase_venue_timezone("Europe/Paris", &venue).unwrap();
/// let lunch = &rebased.rooms[0].activities[0];
/// assert_eq!(format_timestamp(&lunch.start_time), "2026-05-02T12:00:00+09:00");
/// ```
pub fn rebase_venue_timezone(old_timezone: &str, venue: &Venue) -> Result<Venue> {
    let old_tz = parse_timezone(old_timezone)?;
    let new_tz = parse_timezone(&venue.timezone)?;

    let mut venue = venue.clone();
    let mut rewritten = 0;
    for room in &mut venue.rooms {
        rewritten += for_each_activity_mut(&mut room.activities, &mut |activity| {
            activity.start_time = rebase_timestamp(&activity.start_time, &old_tz, &new_tz);
            activity.end_time = rebase_timestamp(&activity.end_time, &old_tz, &new_tz);
        });
    }

    debug!(
        "rebased {} activities of venue {} from {} to {}",
        rewritten, venue.id, old_tz, new_tz
    );
    Ok(venue)
}

/// Read `timestamp`'s wall-clock fields in `old_tz` and encode the same
/// fields in `new_tz`.
///
/// Wall-clock times that occur twice in `new_tz` resolve to the earlier
/// instant. Times skipped by a spring-forward transition are pushed forward
/// by the length of the gap.
pub fn rebase_timestamp(
    timestamp: &DateTime<FixedOffset>,
    old_tz: &Tz,
    new_tz: &Tz,
) -> DateTime<FixedOffset> {
    let wall_clock = timestamp.with_timezone(old_tz).naive_local();
    localize(new_tz, wall_clock).fixed_offset()
}

fn localize(tz: &Tz, wall_clock: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&wall_clock) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            // Read the numerals with the offset in force before the gap.
            let before = tz
                .offset_from_utc_datetime(&(wall_clock - chrono::Duration::days(1)))
                .fix();
            let utc = wall_clock - chrono::Duration::seconds(i64::from(before.local_minus_utc()));
            tz.from_utc_datetime(&utc)
        }
    }
}
