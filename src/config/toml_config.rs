use crate::adapters::geocoding::DEFAULT_GEOCODING_ENDPOINT;
use crate::domain::model::{LatLng, MarkerSize, Place};
use crate::utils::error::{BoardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub map: MapConfig,
    /// 取代示範資料的地點清單
    pub places: Option<Vec<PlaceConfig>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub maps_api_key: String,
    #[serde(default)]
    pub geocoding_api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    pub language: Option<String>,
    pub region: Option<String>,
    pub timeout_seconds: Option<u64>,
}

fn default_endpoint() -> String {
    DEFAULT_GEOCODING_ENDPOINT.to_string()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            language: None,
            region: None,
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapConfig {
    pub initial_center: Option<LatLng>,
    pub selected_marker_size: Option<MarkerSize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceConfig {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(BoardError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| BoardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MAPS_API_KEY})，未設定的變數視為空字串
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| BoardError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!("Environment variable {} is not set", var_name);
                String::new()
            })
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("geocoding.endpoint", &self.geocoding.endpoint)?;

        if let Some(center) = self.map.initial_center {
            validation::validate_coordinates("map.initial_center", center.lat, center.lng)?;
        }

        if let Some(size) = self.map.selected_marker_size {
            validation::validate_positive_number("map.selected_marker_size.width", size.width, 1)?;
            validation::validate_positive_number(
                "map.selected_marker_size.height",
                size.height,
                1,
            )?;
        }

        if let Some(places) = &self.places {
            let mut seen = std::collections::HashSet::new();
            for place in places {
                if !seen.insert(place.id.as_str()) {
                    return Err(BoardError::DuplicatePlaceError {
                        id: place.id.clone(),
                    });
                }
                validation::validate_coordinates(
                    &format!("places.{}", place.id),
                    place.lat,
                    place.lng,
                )?;
            }
        }

        validation::warn_if_blank("credentials.maps_api_key", &self.credentials.maps_api_key);
        validation::warn_if_blank(
            "credentials.geocoding_api_key",
            &self.credentials.geocoding_api_key,
        );
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.geocoding.timeout_seconds.map(Duration::from_secs)
    }

    pub fn selected_marker_size(&self) -> MarkerSize {
        self.map.selected_marker_size.unwrap_or(MarkerSize::SELECTED)
    }

    pub fn initial_center(&self) -> LatLng {
        self.map.initial_center.unwrap_or_default()
    }

    pub fn places(&self) -> Option<Vec<Place>> {
        self.places.as_ref().map(|places| {
            places
                .iter()
                .map(|p| Place::new(p.id.clone(), p.name.clone(), LatLng::new(p.lat, p.lng)))
                .collect()
        })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[credentials]
maps_api_key = "maps-key"
geocoding_api_key = "geo-key"

[geocoding]
endpoint = "https://geo.example.com/json"
language = "en"
timeout_seconds = 10

[map]
initial_center = { lat = -33.7, lng = 19.5 }
selected_marker_size = { width = 60, height = 40 }

[[places]]
id = "office"
name = "Office"
lat = -26.2
lng = 28.0
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.credentials.geocoding_api_key, "geo-key");
        assert_eq!(config.geocoding.endpoint, "https://geo.example.com/json");
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.initial_center(), LatLng::new(-33.7, 19.5));
        assert_eq!(
            config.selected_marker_size(),
            MarkerSize {
                width: 60,
                height: 40
            }
        );
        let places = config.places().unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].id, "office");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.geocoding.endpoint, DEFAULT_GEOCODING_ENDPOINT);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.selected_marker_size(), MarkerSize::SELECTED);
        assert!(config.places().is_none());
        // 空的憑證只會警告
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PLACE_BOARD_TEST_GEO_KEY", "from-env");

        let toml_content = r#"
[credentials]
geocoding_api_key = "${PLACE_BOARD_TEST_GEO_KEY}"
maps_api_key = "${PLACE_BOARD_TEST_UNSET_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.credentials.geocoding_api_key, "from-env");
        assert_eq!(config.credentials.maps_api_key, "");

        std::env::remove_var("PLACE_BOARD_TEST_GEO_KEY");
    }

    #[test]
    fn test_config_validation() {
        let bad_endpoint = TomlConfig::from_toml_str(
            r#"
[geocoding]
endpoint = "invalid-url"
"#,
        )
        .unwrap();
        assert!(bad_endpoint.validate().is_err());

        let zero_marker = TomlConfig::from_toml_str(
            r#"
[map]
selected_marker_size = { width = 0, height = 50 }
"#,
        )
        .unwrap();
        assert!(zero_marker.validate().is_err());

        let duplicate_places = TomlConfig::from_toml_str(
            r#"
[[places]]
id = "a"
name = "A"
lat = 1.0
lng = 1.0

[[places]]
id = "a"
name = "A again"
lat = 2.0
lng = 2.0
"#,
        )
        .unwrap();
        assert!(matches!(
            duplicate_places.validate(),
            Err(BoardError::DuplicatePlaceError { .. })
        ));
    }

    #[test]
    fn test_nan_coordinates_are_rejected() {
        let nan_place = TomlConfig::from_toml_str(
            r#"
[[places]]
id = "a"
name = "A"
lat = nan
lng = 1.0
"#,
        )
        .unwrap();
        assert!(matches!(
            nan_place.validate(),
            Err(BoardError::InvalidConfigValueError { .. })
        ));

        let nan_center = TomlConfig::from_toml_str(
            r#"
[map]
initial_center = { lat = 0.0, lng = nan }
"#,
        )
        .unwrap();
        assert!(nan_center.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("[credentials\nmaps_api_key = ");
        assert!(matches!(result, Err(BoardError::ConfigError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[credentials]
maps_api_key = "file-key"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.credentials.maps_api_key, "file-key");
    }
}
