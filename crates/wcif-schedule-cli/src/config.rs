use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use wcif_schedule::EditorDefaults;

const DEFAULT_CONFIG_FILE: &str = "wcif-schedule.toml";

#[derive(Debug, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_competition_id")]
    pub competition_id: String,
    #[serde(default)]
    pub defaults: EditorDefaults,
}

fn default_competition_id() -> String {
    "schedule".to_string()
}

/// Merge the TOML file (if present) with `WCIF_SCHEDULE_*` variables.
/// Nested keys use `__`, e.g. `WCIF_SCHEDULE_DEFAULTS__ROOM_COLOR`.
pub fn load(path: Option<&Path>) -> Result<CliConfig, figment::Error> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    Figment::new()
        .merge(Toml::file(file))
        .merge(Env::prefixed("WCIF_SCHEDULE_").split("__"))
        .extract()
}
