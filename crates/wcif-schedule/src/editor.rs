//! An editing session over one competition's schedule.
//!
//! The session owns the working document, the last saved snapshot and the
//! list of activity codes already placed on a calendar. Every edit either
//! succeeds completely or returns an error and leaves the document as it was.

use chrono::{DateTime, FixedOffset};
use log::{info, warn};
use serde::Deserialize;

use crate::activity_code::ActivityCode;
use crate::error::{Result, ScheduleError};
use crate::persistence::{PersistenceError, SchedulePayload, SchedulePersistence};
use crate::rebase::rebase_venue_timezone;
use crate::rescale::{apply_activity_edit, move_activity};
use crate::timestamp::parse_timezone;
use crate::tree::{max_activity_id, schedule_activities};
use crate::wcif::{
    to_microdegrees, Activity, ActivityId, Room, RoomId, Schedule, Venue, VenueId,
};

/// Values given to venues and rooms created during a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorDefaults {
    pub venue_name: String,
    pub country_iso2: String,
    pub latitude_microdegrees: i32,
    pub longitude_microdegrees: i32,
    pub room_name: String,
    pub room_color: String,
}

impl Default for EditorDefaults {
    fn default() -> Self {
        Self {
            venue_name: "New Venue".to_string(),
            country_iso2: String::new(),
            latitude_microdegrees: 0,
            longitude_microdegrees: 0,
            room_name: "Room's name".to_string(),
            room_color: "#304a96".to_string(),
        }
    }
}

/// An activity about to be placed in a room.
#[derive(Debug, Clone)]
pub struct NewActivity {
    /// Reuse this id instead of allocating a fresh one.
    pub id: Option<ActivityId>,
    pub name: String,
    pub activity_code: String,
    /// Explicit window. Without one the activity is placed after another.
    pub window: Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)>,
}

#[derive(Debug, Clone)]
pub struct EditSession {
    competition_id: String,
    schedule: Schedule,
    saved: Schedule,
    used_activity_codes: Vec<String>,
    defaults: EditorDefaults,
}

impl EditSession {
    pub fn new(competition_id: impl Into<String>, schedule: Schedule, defaults: EditorDefaults) -> Self {
        let used_activity_codes = schedule
            .venues
            .iter()
            .flat_map(|v| v.rooms.iter())
            .flat_map(|r| r.activities.iter())
            .map(|a| a.activity_code.clone())
            .collect();
        Self {
            competition_id: competition_id.into(),
            saved: schedule.clone(),
            schedule,
            used_activity_codes,
            defaults,
        }
    }

    pub fn competition_id(&self) -> &str {
        &self.competition_id
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn into_schedule(self) -> Schedule {
        self.schedule
    }

    pub fn used_activity_codes(&self) -> &[String] {
        &self.used_activity_codes
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.schedule != self.saved
    }

    /// Send the whole document to `store`. The saved snapshot only moves
    /// forward when the store accepts it.
    pub fn save(&mut self, store: &dyn SchedulePersistence) -> std::result::Result<(), PersistenceError> {
        let payload = SchedulePayload {
            schedule: self.schedule.clone(),
        };
        match store.replace_schedule(&self.competition_id, &payload) {
            Ok(()) => {
                info!("saved schedule of {}", self.competition_id);
                self.saved = payload.schedule;
                Ok(())
            }
            Err(e) => {
                warn!("failed to save schedule of {}: {}", self.competition_id, e);
                Err(e)
            }
        }
    }

    // ── Venues ──────────────────────────────────────────────────────────

    pub fn add_venue(&mut self) -> VenueId {
        let id = self.schedule.venues.iter().map(|v| v.id).max().unwrap_or(0) + 1;
        self.schedule.venues.push(Venue {
            id,
            name: self.defaults.venue_name.clone(),
            country_iso2: self.defaults.country_iso2.clone(),
            latitude_microdegrees: self.defaults.latitude_microdegrees,
            longitude_microdegrees: self.defaults.longitude_microdegrees,
            timezone: String::new(),
            rooms: Vec::new(),
            extensions: Vec::new(),
        });
        info!("added venue {id}");
        id
    }

    /// Remove a venue with all its rooms and activities.
    pub fn remove_venue(&mut self, venue_id: VenueId) -> Result<Venue> {
        let index = self
            .schedule
            .venues
            .iter()
            .position(|v| v.id == venue_id)
            .ok_or(ScheduleError::VenueNotFound(venue_id))?;
        let venue = self.schedule.venues.remove(index);
        for room in &venue.rooms {
            self.forget_codes(room);
        }
        info!("removed venue {venue_id} ({})", venue.name);
        Ok(venue)
    }

    /// Replace a venue wholesale, keeping its position. A timezone change
    /// rebases the venue's activities like [`EditSession::set_venue_timezone`].
    pub fn update_venue(&mut self, updated: Venue) -> Result<()> {
        let venue_id = updated.id;
        let old_timezone = self.venue(venue_id)?.timezone.clone();
        let updated = self.retimed(&old_timezone, updated)?;
        *self.venue_mut(venue_id)? = updated;
        Ok(())
    }

    pub fn rename_venue(&mut self, venue_id: VenueId, name: &str) -> Result<()> {
        self.venue_mut(venue_id)?.name = name.to_string();
        Ok(())
    }

    pub fn set_venue_country(&mut self, venue_id: VenueId, country_iso2: &str) -> Result<()> {
        self.venue_mut(venue_id)?.country_iso2 = country_iso2.to_string();
        Ok(())
    }

    /// Move the venue to the given coordinates in degrees. Returns whether
    /// the stored microdegrees changed.
    pub fn set_venue_location(&mut self, venue_id: VenueId, latitude: f64, longitude: f64) -> Result<bool> {
        let venue = self.venue_mut(venue_id)?;
        let lat = to_microdegrees(latitude);
        let lng = to_microdegrees(longitude);
        if venue.latitude_microdegrees == lat && venue.longitude_microdegrees == lng {
            return Ok(false);
        }
        venue.latitude_microdegrees = lat;
        venue.longitude_microdegrees = lng;
        Ok(true)
    }

    /// Change a venue's timezone, keeping the displayed local time of every
    /// activity in it.
    pub fn set_venue_timezone(&mut self, venue_id: VenueId, timezone: &str) -> Result<()> {
        let current = self.venue(venue_id)?;
        let old_timezone = current.timezone.clone();
        let updated = Venue {
            timezone: timezone.to_string(),
            ..current.clone()
        };
        let updated = self.retimed(&old_timezone, updated)?;
        *self.venue_mut(venue_id)? = updated;
        Ok(())
    }

    fn retimed(&self, old_timezone: &str, updated: Venue) -> Result<Venue> {
        if updated.timezone == old_timezone {
            return Ok(updated);
        }
        if !updated.timezone.is_empty() {
            parse_timezone(&updated.timezone)?;
        }
        if old_timezone.is_empty() || updated.timezone.is_empty() {
            warn!(
                "venue {} timezone changed from '{}' to '{}': activity times left as they are",
                updated.id, old_timezone, updated.timezone
            );
            return Ok(updated);
        }
        info!(
            "venue {} timezone changed from {} to {}",
            updated.id, old_timezone, updated.timezone
        );
        rebase_venue_timezone(old_timezone, &updated)
    }

    // ── Rooms ───────────────────────────────────────────────────────────

    pub fn add_room(&mut self, venue_id: VenueId) -> Result<RoomId> {
        let room_name = self.defaults.room_name.clone();
        let room_color = self.defaults.room_color.clone();
        let venue = self.venue_mut(venue_id)?;
        let id = venue.rooms.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        venue.rooms.push(Room {
            id,
            name: room_name,
            color: room_color,
            activities: Vec::new(),
            extensions: Vec::new(),
        });
        venue.rooms.sort_by_key(|r| r.id);
        info!("added room {id} to venue {venue_id}");
        Ok(id)
    }

    pub fn remove_room(&mut self, venue_id: VenueId, room_id: RoomId) -> Result<Room> {
        let venue = self.venue_mut(venue_id)?;
        let index = venue
            .rooms
            .iter()
            .position(|r| r.id == room_id)
            .ok_or(ScheduleError::RoomNotFound { venue_id, room_id })?;
        let room = venue.rooms.remove(index);
        self.forget_codes(&room);
        info!("removed room {room_id} ({}) from venue {venue_id}", room.name);
        Ok(room)
    }

    pub fn rename_room(&mut self, venue_id: VenueId, room_id: RoomId, name: &str) -> Result<()> {
        self.room_mut(venue_id, room_id)?.name = name.to_string();
        Ok(())
    }

    pub fn set_room_color(&mut self, venue_id: VenueId, room_id: RoomId, color: &str) -> Result<()> {
        self.room_mut(venue_id, room_id)?.color = color.to_string();
        Ok(())
    }

    // ── Activities ──────────────────────────────────────────────────────

    /// Place a new top-level activity in a room.
    ///
    /// Without an explicit window, the activity starts when `after` ends and
    /// lasts the default duration of its code. With neither, nothing is
    /// added and `Ok(None)` is returned. A requested id must not be used
    /// anywhere else in the schedule.
    pub fn add_activity(
        &mut self,
        venue_id: VenueId,
        room_id: RoomId,
        new: NewActivity,
        after: Option<ActivityId>,
    ) -> Result<Option<ActivityId>> {
        let room = self.room(venue_id, room_id)?;
        let code = ActivityCode::parse(&new.activity_code)?;

        let (start_time, end_time) = match (new.window, after) {
            (Some(window), _) => window,
            (None, Some(previous_id)) => {
                let previous = room
                    .activities
                    .iter()
                    .find(|a| a.id == previous_id)
                    .ok_or(ScheduleError::ActivityNotFound {
                        activity_id: previous_id,
                        room_id,
                    })?;
                let start = previous.end_time;
                (start, start + code.default_duration())
            }
            (None, None) => return Ok(None),
        };

        let id = match new.id {
            Some(id) if schedule_activities(&self.schedule).iter().any(|a| a.id == id) => {
                return Err(ScheduleError::DuplicateActivityId(id));
            }
            Some(id) => id,
            None => max_activity_id(&self.schedule).unwrap_or(0) + 1,
        };
        if end_time < start_time {
            return Err(ScheduleError::InvertedWindow { activity_id: id });
        }
        let is_event = matches!(code, ActivityCode::Event { .. });
        if is_event && room.activities.iter().any(|a| a.activity_code == new.activity_code) {
            return Err(ScheduleError::DuplicateActivityCode {
                code: new.activity_code,
                room_id,
            });
        }

        self.room_mut(venue_id, room_id)?.activities.push(Activity {
            id,
            name: new.name,
            activity_code: new.activity_code.clone(),
            start_time,
            end_time,
            child_activities: Vec::new(),
            scramble_set_id: None,
            extensions: Vec::new(),
        });
        info!("added activity {id} ({}) to room {room_id}", new.activity_code);
        self.used_activity_codes.push(new.activity_code);
        Ok(Some(id))
    }

    /// Remove a top-level activity and release its code.
    pub fn remove_activity(
        &mut self,
        venue_id: VenueId,
        room_id: RoomId,
        activity_id: ActivityId,
    ) -> Result<Activity> {
        let room = self.room(venue_id, room_id)?;
        let index = room
            .activity_index(activity_id)
            .ok_or(ScheduleError::ActivityNotFound {
                activity_id,
                room_id,
            })?;
        let code = &room.activities[index].activity_code;
        let code_index = self
            .used_activity_codes
            .iter()
            .position(|c| c == code)
            .ok_or_else(|| ScheduleError::UntrackedActivityCode(code.clone()))?;

        self.used_activity_codes.remove(code_index);
        let activity = self.room_mut(venue_id, room_id)?.activities.remove(index);
        info!("removed activity {activity_id} ({}) from room {room_id}", activity.activity_code);
        Ok(activity)
    }

    /// Replace an activity with an edited copy, rescaling its children to
    /// its new window.
    pub fn edit_activity(&mut self, venue_id: VenueId, room_id: RoomId, updated: Activity) -> Result<()> {
        let room = apply_activity_edit(self.room(venue_id, room_id)?, updated)?;
        *self.room_mut(venue_id, room_id)? = room;
        Ok(())
    }

    /// Move or resize an activity, dragging its children along.
    pub fn move_activity(
        &mut self,
        venue_id: VenueId,
        room_id: RoomId,
        activity_id: ActivityId,
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    ) -> Result<()> {
        let room = move_activity(self.room(venue_id, room_id)?, activity_id, start, end)?;
        *self.room_mut(venue_id, room_id)? = room;
        info!("moved activity {activity_id} in room {room_id}");
        Ok(())
    }

    // ── Lookup ──────────────────────────────────────────────────────────

    pub fn venue(&self, venue_id: VenueId) -> Result<&Venue> {
        self.schedule
            .venue(venue_id)
            .ok_or(ScheduleError::VenueNotFound(venue_id))
    }

    fn venue_mut(&mut self, venue_id: VenueId) -> Result<&mut Venue> {
        self.schedule
            .venue_mut(venue_id)
            .ok_or(ScheduleError::VenueNotFound(venue_id))
    }

    pub fn room(&self, venue_id: VenueId, room_id: RoomId) -> Result<&Room> {
        self.venue(venue_id)?
            .room(room_id)
            .ok_or(ScheduleError::RoomNotFound { venue_id, room_id })
    }

    fn room_mut(&mut self, venue_id: VenueId, room_id: RoomId) -> Result<&mut Room> {
        self.venue_mut(venue_id)?
            .room_mut(room_id)
            .ok_or(ScheduleError::RoomNotFound { venue_id, room_id })
    }

    fn forget_codes(&mut self, room: &Room) {
        for activity in &room.activities {
            if let Some(i) = self
                .used_activity_codes
                .iter()
                .position(|c| *c == activity.activity_code)
            {
                self.used_activity_codes.remove(i);
            }
        }
    }
}
