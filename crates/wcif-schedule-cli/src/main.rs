mod config;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use log::info;
use wcif_schedule::{
    parse_timestamp, validate_schedule, EditSession, JsonFileStore, Schedule, SchedulePersistence,
    WriterStore,
};

/// Edit WCIF competition schedules.
///
/// Reads a schedule (or a `{"schedule": ...}` payload), applies one edit and
/// writes the resulting payload to stdout or to `<store-dir>/<competition>.json`.
#[derive(Parser)]
#[command(name = "wcif-schedule", version)]
struct Cli {
    /// Schedule JSON to read, "-" for stdin
    #[arg(short, long, default_value = "-", global = true)]
    input: String,

    /// Save into this directory instead of printing to stdout
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Competition id used as the save key (overrides the config file)
    #[arg(long, global = true)]
    competition: Option<String>,

    /// Configuration file (default: wcif-schedule.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Move or resize an activity; its child activities follow proportionally
    MoveActivity {
        #[arg(long)]
        venue: u32,
        #[arg(long)]
        room: u32,
        #[arg(long)]
        activity: u32,
        #[arg(long, value_parser = parse_timestamp)]
        start: DateTime<FixedOffset>,
        #[arg(long, value_parser = parse_timestamp)]
        end: DateTime<FixedOffset>,
    },
    /// Change a venue's timezone, keeping activities at the same local time
    SetTimezone {
        #[arg(long)]
        venue: u32,
        #[arg(long)]
        timezone: String,
    },
    /// Add a room to a venue
    AddRoom {
        #[arg(long)]
        venue: u32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Report inconsistencies in the schedule
    Validate,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let schedule = read_schedule(&cli.input)?;

    let competition_id = cli.competition.unwrap_or(config.competition_id);
    let mut session = EditSession::new(competition_id, schedule, config.defaults);

    match cli.command {
        Command::MoveActivity {
            venue,
            room,
            activity,
            start,
            end,
        } => session.move_activity(venue, room, activity, start, end)?,
        Command::SetTimezone { venue, timezone } => {
            session.set_venue_timezone(venue, &timezone)?
        }
        Command::AddRoom { venue, name, color } => {
            let room = session.add_room(venue)?;
            if let Some(name) = name {
                session.rename_room(venue, room, &name)?;
            }
            if let Some(color) = color {
                session.set_room_color(venue, room, &color)?;
            }
        }
        Command::Validate => return Ok(report(session.schedule())),
    }

    if !session.has_unsaved_changes() {
        info!("no changes to {}", session.competition_id());
    }
    let store: Box<dyn SchedulePersistence> = match cli.store_dir {
        Some(dir) => Box::new(JsonFileStore::new(dir)),
        None => Box::new(WriterStore::new(io::stdout())),
    };
    session
        .save(store.as_ref())
        .context("failed to save schedule")?;
    Ok(ExitCode::SUCCESS)
}

fn report(schedule: &Schedule) -> ExitCode {
    let issues = validate_schedule(schedule);
    for issue in &issues {
        println!("{issue}");
    }
    if issues.is_empty() {
        println!("ok");
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}

/// Read either a bare schedule or a `{"schedule": ...}` payload.
fn read_schedule(input: &str) -> Result<Schedule> {
    let raw = if input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?
    };

    let mut value: serde_json::Value = serde_json::from_str(&raw).context("input is not JSON")?;
    if let Some(schedule) = value.get_mut("schedule").map(serde_json::Value::take) {
        value = schedule;
    }
    serde_json::from_value(value).context("input is not a WCIF schedule")
}
