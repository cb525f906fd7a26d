//! Proportional rescaling of child activities when their parent moves or is
//! resized.
//!
//! Children are repositioned as fractional offsets into the parent's window.
//! Both offsets of a child are measured from the *original* parent start,
//! scaled by `new_duration / old_duration`, and floored independently, so a
//! rescaled child can be up to one millisecond shorter than the exact
//! proportional value. Existing schedules depend on that rounding; keep it.
//!
//! Only direct children are rewritten. Grandchildren keep their times.
//! Rescaled children are written at UTC.

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use log::debug;

use crate::error::{Result, ScheduleError};
use crate::timestamp::millis_between;
use crate::wcif::{Activity, ActivityId, Room};

/// Rewrite the direct children of `updated` so they follow its new window.
///
/// `original` is the activity as currently stored; `updated` is the same
/// activity (same id) carrying the new start/end chosen by the organizer,
/// with its children still holding their old times.
///
/// # Arguments
///
/// * `original` - The stored activity, whose window defines the old scale
/// * `updated` - The edited activity carrying the new window
///
/// # Errors
///
/// Returns [`ScheduleError::ZeroDurationWindow`] if `original` has a
/// zero-length window, [`ScheduleError::InvertedWindow`] if either window
/// ends before it starts, and [`ScheduleError::OutOfRange`] if a child would
/// land outside the range of representable timestamps.
///
/// # Examples
///
/// ```
/// use wcif_schedule::{parse_timestamp, rescale_activity, Activity};
///
/// let ts = |s: &str| parse_timestamp(s).unwrap();
/// let group = Activity {
///     id: 2,
///     name: "3x3x3 Cube, Round 1, Group 1".to_string(),
///     activity_code: "333-r1-g1".to_string(),
///     start_time: ts("2026-05-02T08:00:00Z"),
///     end_time: ts("2026-05-02T08:30:00Z"),
///     child_activities: vec![],
///     scramble_set_id: None,
///     extensions: vec![],
/// };
/// let round = Activity {
///     id: 1,
///     name: "3x3x3 Cube, Round 1".to_string(),
///     activity_code: "333-r1".to_string(),
///     start_time: ts("2026-05-02T08:00:00Z"),
///     end_time: ts("2026-05-02T09:00:00Z"),
///     child_activities: vec![group],
///     scramble_set_id: None,
///     extensions: vec![],
/// };
///
/// // Twice as long, starting at noon: the first half-hour group becomes an hour.
/// let updated = Activity {
///     start_time: ts("2026-05-02T12:00:00Z"),
///     end_time: ts("2026-05-02T14:00:00Z"),
///     ..round.clone()
/// };
/// let rescaled = rescale_activity(&round, updated).unwrap();
/// assert_eq!(rescaled.child_activities[0].start_time, ts("2026-05-02T12:00:00Z"));
/// assert_eq!(rescaled.child_activities[0].end_time, ts("2026-05-02T13:00:00Z"));
/// ```
pub fn rescale_activity(original: &Activity, updated: Activity) -> Result<Activity> {
    let old_duration = original.duration_millis();
    if old_duration == 0 {
        return Err(ScheduleError::ZeroDurationWindow {
            activity_id: original.id,
        });
    }
    if old_duration < 0 {
        return Err(ScheduleError::InvertedWindow {
            activity_id: original.id,
        });
    }
    let new_duration = updated.duration_millis();
    if new_duration < 0 {
        return Err(ScheduleError::InvertedWindow {
            activity_id: updated.id,
        });
    }

    let length_rate = new_duration as f64 / old_duration as f64;
    let anchor = updated.start_time.with_timezone(&Utc);
    let out_of_range = ScheduleError::OutOfRange {
        activity_id: updated.id,
    };
    let mut updated = updated;
    for child in &mut updated.child_activities {
        let start_offset = scaled_offset(original, &child.start_time, length_rate);
        let end_offset = scaled_offset(original, &child.end_time, length_rate);
        child.start_time = shifted(anchor, start_offset).ok_or_else(|| out_of_range.clone())?;
        child.end_time = shifted(anchor, end_offset).ok_or_else(|| out_of_range.clone())?;
    }

    debug!(
        "rescaled activity {}: rate {} over {} child activities",
        updated.id,
        length_rate,
        updated.child_activities.len()
    );
    Ok(updated)
}

/// Replace the room's activity having `updated.id` with `updated`, after
/// rescaling its children. The activity keeps its position in the room.
///
/// # Errors
///
/// Returns [`ScheduleError::ActivityNotFound`] if the room has no top-level
/// activity with that id, plus any error from [`rescale_activity`].
pub fn apply_activity_edit(room: &Room, updated: Activity) -> Result<Room> {
    let index = room
        .activity_index(updated.id)
        .ok_or(ScheduleError::ActivityNotFound {
            activity_id: updated.id,
            room_id: room.id,
        })?;
    let rescaled = rescale_activity(&room.activities[index], updated)?;

    let mut room = room.clone();
    room.activities[index] = rescaled;
    Ok(room)
}

/// Move or resize a top-level activity to `[start, end]`, dragging its
/// children along.
pub fn move_activity(
    room: &Room,
    activity_id: ActivityId,
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Result<Room> {
    let original = room
        .activities
        .iter()
        .find(|a| a.id == activity_id)
        .ok_or(ScheduleError::ActivityNotFound {
            activity_id,
            room_id: room.id,
        })?;
    let updated = Activity {
        start_time: start,
        end_time: end,
        ..original.clone()
    };
    apply_activity_edit(room, updated)
}

/// Offset of `at` from the original start, scaled and floored to whole
/// milliseconds. `None` when the product does not fit in an `i64`.
fn scaled_offset(original: &Activity, at: &DateTime<FixedOffset>, length_rate: f64) -> Option<i64> {
    let offset = millis_between(&original.start_time, at);
    let scaled = (offset as f64 * length_rate).floor();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range.
    if !scaled.is_finite() || scaled < i64::MIN as f64 || scaled >= i64::MAX as f64 {
        return None;
    }
    Some(scaled as i64)
}

fn shifted(anchor: DateTime<Utc>, offset: Option<i64>) -> Option<DateTime<FixedOffset>> {
    let delta = TimeDelta::try_milliseconds(offset?)?;
    anchor.checked_add_signed(delta).map(|dt| dt.fixed_offset())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::{format_timestamp, parse_timestamp};

    fn base() -> DateTime<FixedOffset> {
        parse_timestamp("2026-05-02T08:00:00Z").unwrap()
    }

    fn at(millis: i64) -> DateTime<FixedOffset> {
        base() + chrono::Duration::milliseconds(millis)
    }

    fn activity(id: ActivityId, start: i64, end: i64, children: Vec<Activity>) -> Activity {
        Activity {
            id,
            name: format!("Activity {id}"),
            activity_code: format!("333-r{id}"),
            start_time: at(start),
            end_time: at(end),
            child_activities: children,
            scramble_set_id: None,
            extensions: vec![],
        }
    }

    fn with_window(activity: &Activity, start: i64, end: i64) -> Activity {
        Activity {
            start_time: at(start),
            end_time: at(end),
            ..activity.clone()
        }
    }

    fn room(activities: Vec<Activity>) -> Room {
        Room {
            id: 7,
            name: "Main Room".to_string(),
            color: "#304a96".to_string(),
            activities,
            extensions: vec![],
        }
    }

    #[test]
    fn test_scale_by_two() {
        let original = activity(1, 0, 100, vec![activity(2, 10, 20, vec![])]);
        let result = rescale_activity(&original, with_window(&original, 0, 200)).unwrap();
        let child = &result.child_activities[0];
        assert_eq!(child.start_time, at(20));
        assert_eq!(child.end_time, at(40));
    }

    #[test]
    fn test_identity_window_keeps_children() {
        let original = activity(
            1,
            0,
            3_600_000,
            vec![activity(2, 0, 1_234_567, vec![]), activity(3, 1_234_567, 3_600_000, vec![])],
        );
        let result = rescale_activity(&original, original.clone()).unwrap();
        assert_eq!(result, original);
    }

    #[test]
    fn test_move_translates_children() {
        let hour = 3_600_000;
        let original = activity(
            1,
            0,
            hour,
            vec![activity(2, 0, hour / 2, vec![]), activity(3, hour / 2, hour, vec![])],
        );
        let result =
            rescale_activity(&original, with_window(&original, 2 * hour, 3 * hour)).unwrap();
        assert_eq!(result.child_activities[0].start_time, at(2 * hour));
        assert_eq!(result.child_activities[0].end_time, at(2 * hour + hour / 2));
        assert_eq!(result.child_activities[1].start_time, at(2 * hour + hour / 2));
        assert_eq!(result.child_activities[1].end_time, at(3 * hour));
    }

    #[test]
    fn test_offsets_are_floored_independently() {
        let original = activity(1, 0, 300, vec![activity(2, 100, 200, vec![])]);
        let result = rescale_activity(&original, with_window(&original, 0, 100)).unwrap();
        let child = &result.child_activities[0];
        // 100/3 and 200/3 are each floored, leaving a 33ms child.
        assert_eq!(child.start_time, at(33));
        assert_eq!(child.end_time, at(66));
    }

    #[test]
    fn test_negative_offsets_floor_downward() {
        let original = activity(1, 0, 100, vec![activity(2, -3, 20, vec![])]);
        let result = rescale_activity(&original, with_window(&original, 0, 150)).unwrap();
        assert_eq!(result.child_activities[0].start_time, at(-5));
        assert_eq!(result.child_activities[0].end_time, at(30));
    }

    #[test]
    fn test_children_are_written_at_utc() {
        let original = activity(1, 0, 1000, vec![activity(2, 0, 500, vec![])]);
        let updated = Activity {
            start_time: parse_timestamp("2026-05-02T10:00:00+02:00").unwrap(),
            end_time: parse_timestamp("2026-05-02T10:00:01+02:00").unwrap(),
            ..original.clone()
        };
        let result = rescale_activity(&original, updated).unwrap();
        let child = &result.child_activities[0];
        assert_eq!(child.start_time.offset().local_minus_utc(), 0);
        assert_eq!(child.start_time, at(0));
        assert_eq!(child.end_time, at(500));
        assert_eq!(format_timestamp(&child.end_time), "2026-05-02T08:00:00.500Z");
        // the parent keeps the offset it was given
        assert_eq!(result.start_time.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_child_beyond_time_range_is_rejected() {
        let year = 365 * 24 * 3_600_000;
        let original = activity(1, 0, 1, vec![activity(2, year, year + 1, vec![])]);
        let err = rescale_activity(&original, with_window(&original, 0, year)).unwrap_err();
        assert_eq!(err, ScheduleError::OutOfRange { activity_id: 1 });
    }

    #[test]
    fn test_shift_past_datetime_bounds_is_none() {
        let anchor = base().with_timezone(&Utc);
        assert_eq!(shifted(anchor, Some(1_000_000_000_000_000_000)), None);
        assert_eq!(shifted(anchor, None), None);
        assert_eq!(shifted(anchor, Some(500)), Some(at(500)));
    }

    #[test]
    fn test_grandchildren_are_not_rescaled() {
        let grandchild = activity(3, 10, 20, vec![]);
        let original = activity(1, 0, 100, vec![activity(2, 0, 50, vec![grandchild.clone()])]);
        let result = rescale_activity(&original, with_window(&original, 0, 200)).unwrap();
        let child = &result.child_activities[0];
        assert_eq!(child.end_time, at(100));
        assert_eq!(child.child_activities[0], grandchild);
    }

    #[test]
    fn test_zero_duration_original_is_rejected() {
        let original = activity(1, 50, 50, vec![activity(2, 50, 50, vec![])]);
        let err = rescale_activity(&original, with_window(&original, 0, 100)).unwrap_err();
        assert_eq!(err, ScheduleError::ZeroDurationWindow { activity_id: 1 });
    }

    #[test]
    fn test_zero_duration_updated_collapses_children() {
        let original = activity(1, 0, 100, vec![activity(2, 10, 90, vec![])]);
        let result = rescale_activity(&original, with_window(&original, 40, 40)).unwrap();
        assert_eq!(result.child_activities[0].start_time, at(40));
        assert_eq!(result.child_activities[0].end_time, at(40));
    }

    #[test]
    fn test_inverted_updated_window_is_rejected() {
        let original = activity(1, 0, 100, vec![]);
        let err = rescale_activity(&original, with_window(&original, 100, 0)).unwrap_err();
        assert_eq!(err, ScheduleError::InvertedWindow { activity_id: 1 });
    }

    #[test]
    fn test_apply_edit_keeps_position() {
        let room = room(vec![
            activity(1, 0, 100, vec![]),
            activity(2, 100, 200, vec![activity(3, 100, 150, vec![])]),
            activity(4, 200, 300, vec![]),
        ]);
        let updated = with_window(&room.activities[1], 100, 300);
        let result = apply_activity_edit(&room, updated).unwrap();
        let ids: Vec<_> = result.activities.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert_eq!(result.activities[1].end_time, at(300));
        assert_eq!(result.activities[1].child_activities[0].end_time, at(200));
    }

    #[test]
    fn test_apply_edit_unknown_activity() {
        let room = room(vec![activity(1, 0, 100, vec![])]);
        let err = apply_activity_edit(&room, activity(9, 0, 100, vec![])).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::ActivityNotFound {
                activity_id: 9,
                room_id: 7
            }
        );
    }

    #[test]
    fn test_apply_edit_does_not_search_children() {
        let room = room(vec![activity(1, 0, 100, vec![activity(2, 0, 50, vec![])])]);
        let err = apply_activity_edit(&room, activity(2, 0, 100, vec![])).unwrap_err();
        assert!(matches!(err, ScheduleError::ActivityNotFound { activity_id: 2, .. }));
    }

    #[test]
    fn test_move_activity() {
        let room = room(vec![activity(1, 0, 100, vec![activity(2, 50, 100, vec![])])]);
        let result = move_activity(&room, 1, at(1000), at(1200)).unwrap();
        let moved = &result.activities[0];
        assert_eq!(moved.start_time, at(1000));
        assert_eq!(moved.child_activities[0].start_time, at(1100));
        assert_eq!(moved.child_activities[0].end_time, at(1200));
        // the input room is untouched
        assert_eq!(room.activities[0].start_time, at(0));
    }
}
