//! The WCIF schedule document: venues, rooms and nested activities.
//!
//! Field names on the wire follow the WCIF camelCase convention. Extension
//! blobs are carried through untouched.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::timestamp::{self, millis_between};

pub type VenueId = u32;
pub type RoomId = u32;
pub type ActivityId = u32;

/// The schedule section of a competition's WCIF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_days: Option<u32>,
    #[serde(default)]
    pub venues: Vec<Venue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub id: VenueId,
    pub name: String,
    #[serde(default)]
    pub country_iso2: String,
    pub latitude_microdegrees: i32,
    pub longitude_microdegrees: i32,
    /// IANA timezone name, or empty while the organizer has not picked one.
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub extensions: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub extensions: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    pub activity_code: String,
    #[serde(with = "timestamp::rfc3339")]
    pub start_time: DateTime<FixedOffset>,
    #[serde(with = "timestamp::rfc3339")]
    pub end_time: DateTime<FixedOffset>,
    #[serde(default)]
    pub child_activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scramble_set_id: Option<u32>,
    #[serde(default)]
    pub extensions: Vec<serde_json::Value>,
}

impl Schedule {
    pub fn venue(&self, id: VenueId) -> Option<&Venue> {
        self.venues.iter().find(|v| v.id == id)
    }

    pub fn venue_mut(&mut self, id: VenueId) -> Option<&mut Venue> {
        self.venues.iter_mut().find(|v| v.id == id)
    }
}

impl Venue {
    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.iter_mut().find(|r| r.id == id)
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        to_degrees(self.latitude_microdegrees)
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        to_degrees(self.longitude_microdegrees)
    }
}

impl Room {
    /// Position of the top-level activity with the given id.
    pub fn activity_index(&self, id: ActivityId) -> Option<usize> {
        self.activities.iter().position(|a| a.id == id)
    }
}

impl Activity {
    /// Length of the activity window in milliseconds.
    pub fn duration_millis(&self) -> i64 {
        millis_between(&self.start_time, &self.end_time)
    }

    pub fn contains_window(&self, other: &Activity) -> bool {
        self.start_time <= other.start_time && other.end_time <= self.end_time
    }
}

/// Convert degrees to integer microdegrees, truncating toward zero.
pub fn to_microdegrees(degrees: f64) -> i32 {
    (degrees * 1e6).trunc() as i32
}

pub fn to_degrees(microdegrees: i32) -> f64 {
    f64::from(microdegrees) / 1e6
}
