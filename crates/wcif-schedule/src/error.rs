//! Error types for schedule editing operations.

use thiserror::Error;

use crate::wcif::{ActivityId, RoomId, VenueId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Activity {activity_id} not found in room {room_id}")]
    ActivityNotFound { activity_id: ActivityId, room_id: RoomId },

    #[error("Activity id {0} is already used in the schedule")]
    DuplicateActivityId(ActivityId),

    #[error("Activity code '{code}' is already scheduled in room {room_id}")]
    DuplicateActivityCode { code: String, room_id: RoomId },

    #[error("Activity code '{0}' is not in the used activity codes")]
    UntrackedActivityCode(String),

    #[error("Activity {activity_id} has a zero-length window and cannot be rescaled")]
    ZeroDurationWindow { activity_id: ActivityId },

    #[error("Activity {activity_id} ends before it starts")]
    InvertedWindow { activity_id: ActivityId },

    #[error("Activity {activity_id} cannot be rescaled: a child would fall outside the representable time range")]
    OutOfRange { activity_id: ActivityId },

    #[error("Venue {0} not found")]
    VenueNotFound(VenueId),

    #[error("Room {room_id} not found in venue {venue_id}")]
    RoomNotFound { venue_id: VenueId, room_id: RoomId },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Invalid activity code: {0}")]
    InvalidActivityCode(String),
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
