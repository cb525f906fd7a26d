//! Traversal over the nested activity tree of a room.

use crate::wcif::{Activity, ActivityId, Schedule};

/// All activities at every depth, level by level: the given activities
/// first, then all their children, then all grandchildren, and so on.
pub fn with_nested_activities(activities: &[Activity]) -> Vec<&Activity> {
    let mut all = Vec::new();
    let mut level: Vec<&Activity> = activities.iter().collect();
    while !level.is_empty() {
        let next = level
            .iter()
            .copied()
            .flat_map(|a| a.child_activities.iter())
            .collect();
        all.extend(level);
        level = next;
    }
    all
}

/// Apply `f` to every activity at every depth. Returns how many were visited.
pub fn for_each_activity_mut<F>(activities: &mut [Activity], f: &mut F) -> usize
where
    F: FnMut(&mut Activity),
{
    let mut visited = 0;
    for activity in activities.iter_mut() {
        f(activity);
        visited += 1 + for_each_activity_mut(&mut activity.child_activities, f);
    }
    visited
}

/// Every activity of the schedule, across all venues and rooms.
pub fn schedule_activities(schedule: &Schedule) -> Vec<&Activity> {
    schedule
        .venues
        .iter()
        .flat_map(|v| v.rooms.iter())
        .flat_map(|r| with_nested_activities(&r.activities))
        .collect()
}

/// Largest activity id anywhere in the schedule.
pub fn max_activity_id(schedule: &Schedule) -> Option<ActivityId> {
    schedule_activities(schedule).iter().map(|a| a.id).max()
}
