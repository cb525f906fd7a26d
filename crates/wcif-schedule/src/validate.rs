//! Consistency report for a schedule document.
//!
//! Nothing here is enforced by the engines; the report lets a caller see
//! where a document drifted from the shape the editor expects.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::timestamp::parse_timezone;
use crate::tree::with_nested_activities;
use crate::wcif::{Activity, ActivityId, RoomId, Schedule, VenueId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleIssue {
    DuplicateVenueId { venue_id: VenueId },
    DuplicateRoomId { venue_id: VenueId, room_id: RoomId },
    DuplicateActivityId { activity_id: ActivityId },
    InvertedWindow { activity_id: ActivityId },
    ChildOutsideParent { parent_id: ActivityId, child_id: ActivityId },
    InvalidTimezone { venue_id: VenueId, timezone: String },
}

impl fmt::Display for ScheduleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleIssue::DuplicateVenueId { venue_id } => {
                write!(f, "venue id {venue_id} is used more than once")
            }
            ScheduleIssue::DuplicateRoomId { venue_id, room_id } => {
                write!(f, "room id {room_id} is used more than once in venue {venue_id}")
            }
            ScheduleIssue::DuplicateActivityId { activity_id } => {
                write!(f, "activity id {activity_id} is used more than once")
            }
            ScheduleIssue::InvertedWindow { activity_id } => {
                write!(f, "activity {activity_id} ends before it starts")
            }
            ScheduleIssue::ChildOutsideParent {
                parent_id,
                child_id,
            } => write!(
                f,
                "activity {child_id} is not within the window of its parent {parent_id}"
            ),
            ScheduleIssue::InvalidTimezone { venue_id, timezone } => {
                write!(f, "venue {venue_id} has unknown timezone '{timezone}'")
            }
        }
    }
}

pub fn validate_schedule(schedule: &Schedule) -> Vec<ScheduleIssue> {
    let mut issues = Vec::new();
    let mut venue_ids = HashSet::new();
    let mut activity_ids = HashSet::new();

    for venue in &schedule.venues {
        if !venue_ids.insert(venue.id) {
            issues.push(ScheduleIssue::DuplicateVenueId { venue_id: venue.id });
        }
        if !venue.timezone.is_empty() && parse_timezone(&venue.timezone).is_err() {
            issues.push(ScheduleIssue::InvalidTimezone {
                venue_id: venue.id,
                timezone: venue.timezone.clone(),
            });
        }

        let mut room_ids = HashSet::new();
        for room in &venue.rooms {
            if !room_ids.insert(room.id) {
                issues.push(ScheduleIssue::DuplicateRoomId {
                    venue_id: venue.id,
                    room_id: room.id,
                });
            }
            for activity in with_nested_activities(&room.activities) {
                if !activity_ids.insert(activity.id) {
                    issues.push(ScheduleIssue::DuplicateActivityId {
                        activity_id: activity.id,
                    });
                }
                check_activity(activity, &mut issues);
            }
        }
    }
    issues
}

fn check_activity(activity: &Activity, issues: &mut Vec<ScheduleIssue>) {
    if activity.end_time < activity.start_time {
        issues.push(ScheduleIssue::InvertedWindow {
            activity_id: activity.id,
        });
    }
    for child in &activity.child_activities {
        if !activity.contains_window(child) {
            issues.push(ScheduleIssue::ChildOutsideParent {
                parent_id: activity.id,
                child_id: child.id,
            });
        }
    }
}
