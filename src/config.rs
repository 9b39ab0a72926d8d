use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::models::Tool;

pub const DEFAULT_CONFIG_PATH: &str = "perfdata.toml";

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Config {
    pub data_file: PathBuf,
    pub repo_url: String,
    pub suite: String,
    pub tool: Tool,
    pub max_items: Option<NonZeroUsize>,
    pub alert_threshold: f64,
    pub fail_on_alert: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("dev/bench/data.js"),
            repo_url: String::new(),
            suite: "Language Compiler Benchmark".into(),
            tool: Tool::CustomSmallerIsBetter,
            max_items: None,
            alert_threshold: 2.0,
            fail_on_alert: false,
        }
    }
}

/// Defaults, then the TOML file, then `PERFDATA_*` environment variables.
pub fn figment(path: &Path) -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PERFDATA_"))
}

pub fn get_config(path: &Path) -> Result<Config, figment::Error> {
    figment(path).extract()
}
