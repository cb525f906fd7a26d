//! Property tests for the rescale and rebase engines.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use proptest::prelude::*;
use wcif_schedule::{
    parse_timezone, rebase_timestamp, rebase_venue_timezone, rescale_activity, Activity, Room,
    Venue,
};

/// Zones without DST or offset changes since 2000, so every wall-clock time
/// maps to exactly one instant in each of them.
const FIXED_ZONES: [&str; 6] = [
    "UTC",
    "Asia/Tokyo",
    "Asia/Kolkata",
    "Asia/Kathmandu",
    "America/Phoenix",
    "Australia/Brisbane",
];

fn base() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2026, 5, 2, 8, 0, 0)
        .unwrap()
        .fixed_offset()
}

fn at(millis: i64) -> DateTime<FixedOffset> {
    base() + chrono::Duration::milliseconds(millis)
}

fn activity(id: u32, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Activity {
    Activity {
        id,
        name: format!("Activity {id}"),
        activity_code: "333-r1".to_string(),
        start_time: start,
        end_time: end,
        child_activities: vec![],
        scramble_set_id: None,
        extensions: vec![],
    }
}

/// Child windows as (start, end) offsets inside `[0, old_duration]`.
fn children_within(old_duration: i64) -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((0..=old_duration, 0..=old_duration), 0..6).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_rescaled_children_stay_in_parent_window(
        (old_duration, children) in (1i64..100_000_000).prop_flat_map(|d| (Just(d), children_within(d))),
        new_start in -100_000_000i64..100_000_000,
        new_duration in 0i64..100_000_000,
    ) {
        let mut original = activity(1, at(0), at(old_duration));
        original.child_activities = children
            .iter()
            .enumerate()
            .map(|(i, (s, e))| activity(i as u32 + 2, at(*s), at(*e)))
            .collect();
        let updated = Activity {
            start_time: at(new_start),
            end_time: at(new_start + new_duration),
            ..original.clone()
        };

        let result = rescale_activity(&original, updated).unwrap();
        let rate = new_duration as f64 / old_duration as f64;
        for (child, (s, e)) in result.child_activities.iter().zip(&children) {
            let start = (child.start_time - at(new_start)).num_milliseconds();
            let end = (child.end_time - at(new_start)).num_milliseconds();
            prop_assert!(start >= 0);
            prop_assert!(end <= new_duration + 1);
            prop_assert!(start <= end);
            let exact = (e - s) as f64 * rate;
            prop_assert!(((end - start) as f64 - exact).abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn prop_identity_window_is_lossless(
        (old_duration, children) in (1i64..100_000_000).prop_flat_map(|d| (Just(d), children_within(d))),
    ) {
        let mut original = activity(1, at(0), at(old_duration));
        original.child_activities = children
            .iter()
            .enumerate()
            .map(|(i, (s, e))| activity(i as u32 + 2, at(*s), at(*e)))
            .collect();
        let result = rescale_activity(&original, original.clone()).unwrap();
        prop_assert_eq!(result, original);
    }

    #[test]
    fn prop_rebase_round_trip(
        millis in 946_684_800_000i64..2_051_222_400_000,
        a in 0usize..FIXED_ZONES.len(),
        b in 0usize..FIXED_ZONES.len(),
    ) {
        let start = Utc.timestamp_millis_opt(millis).unwrap().fixed_offset();
        let end = start + chrono::Duration::hours(1);
        let mut parent = activity(1, start, end);
        parent.child_activities = vec![activity(2, start, end)];
        let venue = Venue {
            id: 1,
            name: "Venue".to_string(),
            country_iso2: "JP".to_string(),
            latitude_microdegrees: 0,
            longitude_microdegrees: 0,
            timezone: FIXED_ZONES[a].to_string(),
            rooms: vec![Room {
                id: 1,
                name: "Room".to_string(),
                color: "#304a96".to_string(),
                activities: vec![parent],
                extensions: vec![],
            }],
            extensions: vec![],
        };

        let moved = Venue { timezone: FIXED_ZONES[b].to_string(), ..venue.clone() };
        let there = rebase_venue_timezone(FIXED_ZONES[a], &moved).unwrap();
        let returned = Venue { timezone: FIXED_ZONES[a].to_string(), ..there };
        let back = rebase_venue_timezone(FIXED_ZONES[b], &returned).unwrap();
        prop_assert_eq!(back, venue);
    }

    #[test]
    fn prop_rebase_keeps_wall_clock(
        millis in 946_684_800_000i64..2_051_222_400_000,
        a in 0usize..FIXED_ZONES.len(),
        b in 0usize..FIXED_ZONES.len(),
    ) {
        let old_tz = parse_timezone(FIXED_ZONES[a]).unwrap();
        let new_tz = parse_timezone(FIXED_ZONES[b]).unwrap();
        let ts = Utc.timestamp_millis_opt(millis).unwrap().fixed_offset();
        let rebased = rebase_timestamp(&ts, &old_tz, &new_tz);
        prop_assert_eq!(
            rebased.with_timezone(&new_tz).naive_local(),
            ts.with_timezone(&old_tz).naive_local()
        );
    }
}
