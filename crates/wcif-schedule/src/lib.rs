//! # wcif-schedule
//!
//! Venue, room and activity schedule editing for WCIF (World Competition
//! Interchange Format) documents.
//!
//! The two engines are pure value-to-value transforms: they take a snapshot
//! of part of the document and return a rewritten copy, leaving the caller
//! to commit it.
//!
//! ## Modules
//!
//! - [`wcif`] — The schedule document: venues, rooms, nested activities
//! - [`rescale`] — Proportional rescale/move of child activities when a parent window changes
//! - [`rebase`] — Rebasing a venue's activities onto a new timezone, keeping wall-clock time
//! - [`tree`] — Traversal of the nested activity tree
//! - [`timestamp`] — RFC 3339 parsing/formatting and timezone lookup
//! - [`activity_code`] — WCIF activity codes and default durations
//! - [`editor`] — Editing session: venues, rooms, activities, unsaved changes, save
//! - [`persistence`] — The "replace schedule" collaborator
//! - [`validate`] — Consistency report for a document
//! - [`error`] — Error types

pub mod activity_code;
pub mod editor;
pub mod error;
pub mod persistence;
pub mod rebase;
pub mod rescale;
pub mod timestamp;
pub mod tree;
pub mod validate;
pub mod wcif;

pub use activity_code::{default_duration, ActivityCode};
pub use editor::{EditSession, EditorDefaults, NewActivity};
pub use error::{Result, ScheduleError};
pub use persistence::{
    JsonFileStore, PersistenceError, SchedulePayload, SchedulePersistence, WriterStore,
};
pub use rebase::{rebase_timestamp, rebase_venue_timezone};
pub use rescale::{apply_activity_edit, move_activity, rescale_activity};
pub use timestamp::{format_timestamp, parse_timestamp, parse_timezone};
pub use validate::{validate_schedule, ScheduleIssue};
pub use wcif::{
    to_degrees, to_microdegrees, Activity, ActivityId, Room, RoomId, Schedule, Venue, VenueId,
};
