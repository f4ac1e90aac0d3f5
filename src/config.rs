// src/config.rs
use std::env;
use std::path::PathBuf;

use crate::error::{DashboardError, DashboardResult};

pub const DATA_DIR_VAR: &str = "COVID_DASHBOARD_DATA_DIR";
pub const CONFIRMED_VAR: &str = "COVID_DASHBOARD_CONFIRMED";
pub const DEATHS_VAR: &str = "COVID_DASHBOARD_DEATHS";
pub const VACCINATIONS_VAR: &str = "COVID_DASHBOARD_VACCINATIONS";
pub const THEME_VAR: &str = "COVID_DASHBOARD_THEME";

/// Where the datasets live and how the window starts up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub confirmed_file: String,
    pub deaths_file: String,
    pub vaccinations_file: String,
    pub dark_mode: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            confirmed_file: "confirmed.csv".to_string(),
            deaths_file: "deaths.csv".to_string(),
            vaccinations_file: "vaccinations.csv".to_string(),
            dark_mode: true,
        }
    }
}

impl Config {
    /// Reads overrides from the process environment and command line.
    pub fn from_env() -> DashboardResult<Self> {
        let data_dir_arg = env::args().nth(1);
        Self::from_lookup(|key| env::var(key).ok(), data_dir_arg)
    }

    /// Builds a config from an arbitrary variable lookup. A positional
    /// `data_dir_arg` wins over the data directory variable.
    pub fn from_lookup<F>(lookup: F, data_dir_arg: Option<String>) -> DashboardResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(dir) = data_dir_arg.or_else(|| lookup(DATA_DIR_VAR)) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup(CONFIRMED_VAR) {
            config.confirmed_file = file;
        }
        if let Some(file) = lookup(DEATHS_VAR) {
            config.deaths_file = file;
        }
        if let Some(file) = lookup(VACCINATIONS_VAR) {
            config.vaccinations_file = file;
        }
        if let Some(theme) = lookup(THEME_VAR) {
            config.dark_mode = match theme.trim().to_lowercase().as_str() {
                "dark" => true,
                "light" => false,
                other => {
                    return Err(DashboardError::Config(format!(
                        "{THEME_VAR} must be 'dark' or 'light', got '{other}'"
                    )))
                }
            };
        }

        Ok(config)
    }

    pub fn confirmed_path(&self) -> PathBuf {
        self.data_dir.join(&self.confirmed_file)
    }

    pub fn deaths_path(&self) -> PathBuf {
        self.data_dir.join(&self.deaths_file)
    }

    pub fn vaccinations_path(&self) -> PathBuf {
        self.data_dir.join(&self.vaccinations_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None, None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.confirmed_path(), PathBuf::from("data/confirmed.csv"));
    }

    #[test]
    fn test_env_overrides() {
        let lookup = lookup_from(&[
            (DATA_DIR_VAR, "/srv/covid"),
            (VACCINATIONS_VAR, "owid.csv"),
            (THEME_VAR, "Light"),
        ]);
        let config = Config::from_lookup(lookup, None).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/covid"));
        assert_eq!(config.vaccinations_path(), PathBuf::from("/srv/covid/owid.csv"));
        assert_eq!(config.deaths_file, "deaths.csv");
        assert!(!config.dark_mode);
    }

    #[test]
    fn test_argument_beats_env() {
        let lookup = lookup_from(&[(DATA_DIR_VAR, "/srv/covid")]);
        let config = Config::from_lookup(lookup, Some("./local".to_string())).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./local"));
    }

    #[test]
    fn test_invalid_theme() {
        let lookup = lookup_from(&[(THEME_VAR, "sepia")]);
        let err = Config::from_lookup(lookup, None).unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
