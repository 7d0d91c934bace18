use crate::config::toml_config::TomlConfig;
use crate::domain::model::LatLng;
use crate::utils::error::{BoardError, Result};
use crate::utils::validation::validate_coordinates;
use clap::Parser;
use std::str::FromStr;

/// 命令列重播的使用者動作
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Select(String),
    Focus(String),
    Inject,
    Refetch,
    Close,
    Center(LatLng),
}

impl FromStr for Action {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self> {
        let (verb, arg) = match s.split_once(':') {
            Some((verb, arg)) => (verb, Some(arg.trim())),
            None => (s, None),
        };

        let invalid = |reason: &str| BoardError::InvalidConfigValueError {
            field: "action".to_string(),
            value: s.to_string(),
            reason: reason.to_string(),
        };

        match (verb.trim(), arg) {
            ("select", Some(id)) if !id.is_empty() => Ok(Action::Select(id.to_string())),
            ("focus", Some(id)) if !id.is_empty() => Ok(Action::Focus(id.to_string())),
            ("inject", None) => Ok(Action::Inject),
            ("refetch", None) => Ok(Action::Refetch),
            ("close", None) => Ok(Action::Close),
            ("center", Some(coords)) => {
                let (lat, lng) = coords
                    .split_once(',')
                    .ok_or_else(|| invalid("expected center:<lat>,<lng>"))?;
                let lat = lat.trim().parse().map_err(|_| invalid("latitude is not a number"))?;
                let lng = lng.trim().parse().map_err(|_| invalid("longitude is not a number"))?;
                validate_coordinates("action.center", lat, lng)?;
                Ok(Action::Center(LatLng::new(lat, lng)))
            }
            _ => Err(invalid(
                "expected select:<id>, focus:<id>, inject, refetch, close or center:<lat>,<lng>",
            )),
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "place-board")]
#[command(about = "Headless map board: pins, bounds-fit and reverse-geocoded popups")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long, env = "MAPS_API_KEY")]
    pub maps_api_key: Option<String>,

    #[arg(long, env = "GEOCODING_API_KEY")]
    pub geocoding_api_key: Option<String>,

    #[arg(long)]
    pub geocoding_endpoint: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    /// Actions to replay, e.g. `select:doe inject refetch`
    pub actions: Vec<Action>,
}

impl CliConfig {
    /// 載入 TOML（若有）並套用命令列覆蓋
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(key) = &self.maps_api_key {
            config.credentials.maps_api_key = key.clone();
        }
        if let Some(key) = &self.geocoding_api_key {
            config.credentials.geocoding_api_key = key.clone();
        }
        if let Some(endpoint) = &self.geocoding_endpoint {
            config.geocoding.endpoint = endpoint.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actions() {
        assert_eq!("select:doe".parse::<Action>().unwrap(), Action::Select("doe".to_string()));
        assert_eq!("focus: doe2".parse::<Action>().unwrap(), Action::Focus("doe2".to_string()));
        assert_eq!("inject".parse::<Action>().unwrap(), Action::Inject);
        assert_eq!("refetch".parse::<Action>().unwrap(), Action::Refetch);
        assert_eq!("close".parse::<Action>().unwrap(), Action::Close);
        assert_eq!(
            "center:-33.5,19.25".parse::<Action>().unwrap(),
            Action::Center(LatLng::new(-33.5, 19.25))
        );
    }

    #[test]
    fn test_parse_invalid_actions() {
        assert!("select".parse::<Action>().is_err());
        assert!("select:".parse::<Action>().is_err());
        assert!("inject:doe".parse::<Action>().is_err());
        assert!("center:abc,1".parse::<Action>().is_err());
        assert!("center:1".parse::<Action>().is_err());
        assert!("center:nan,1".parse::<Action>().is_err());
        assert!("center:1,inf".parse::<Action>().is_err());
        assert!("center:95,1".parse::<Action>().is_err());
        assert!("teleport".parse::<Action>().is_err());
    }

    #[test]
    fn test_cli_overrides_credentials() {
        let cli = CliConfig::parse_from([
            "place-board",
            "--maps-api-key",
            "m",
            "--geocoding-api-key",
            "g",
            "--geocoding-endpoint",
            "http://localhost:9999/geo",
            "select:doe",
            "inject",
        ]);

        let config = cli.resolve().unwrap();
        assert_eq!(config.credentials.maps_api_key, "m");
        assert_eq!(config.credentials.geocoding_api_key, "g");
        assert_eq!(config.geocoding.endpoint, "http://localhost:9999/geo");
        assert_eq!(cli.actions, vec![Action::Select("doe".to_string()), Action::Inject]);
    }
}
