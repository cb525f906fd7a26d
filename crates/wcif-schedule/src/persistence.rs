//! The "replace schedule" collaborator.
//!
//! A save sends the whole schedule, keyed by competition id, and either
//! succeeds or fails. Retrying is the store's business.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wcif::Schedule;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Rejected by store: {0}")]
    Rejected(String),
}

/// Body of a "replace schedule" request: `{ "schedule": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePayload {
    pub schedule: Schedule,
}

pub trait SchedulePersistence {
    fn replace_schedule(
        &self,
        competition_id: &str,
        payload: &SchedulePayload,
    ) -> Result<(), PersistenceError>;
}

/// Stores each competition's payload as `<dir>/<competition_id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, competition_id: &str) -> PathBuf {
        self.dir.join(format!("{competition_id}.json"))
    }
}

impl SchedulePersistence for JsonFileStore {
    fn replace_schedule(
        &self,
        competition_id: &str,
        payload: &SchedulePayload,
    ) -> Result<(), PersistenceError> {
        if competition_id.is_empty() || competition_id.contains(['/', '\\']) {
            return Err(PersistenceError::Rejected(format!(
                "invalid competition id '{competition_id}'"
            )));
        }
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(payload)?;
        fs::write(self.path_for(competition_id), json)?;
        Ok(())
    }
}

/// Writes the payload as pretty JSON to any writer, e.g. stdout.
pub struct WriterStore<W: Write> {
    writer: Mutex<W>,
}

impl<W: Write> WriterStore<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write> SchedulePersistence for WriterStore<W> {
    fn replace_schedule(
        &self,
        _competition_id: &str,
        payload: &SchedulePayload,
    ) -> Result<(), PersistenceError> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| PersistenceError::Rejected("writer lock poisoned".to_string()))?;
        serde_json::to_writer_pretty(&mut *writer, payload)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
