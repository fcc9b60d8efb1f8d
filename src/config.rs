use crate::catalog::DEFAULT_CITY;
use crate::error::AppError;
use crate::models::VehicleProfile;
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "bharat-ev-cost";
pub const HOME_ENV: &str = "BHARAT_EV_COST_HOME";
const ENV_PREFIX: &str = "BHARAT_EV_COST";

pub fn normalize_vehicle_id(id: &str) -> String {
    id.trim().to_ascii_lowercase()
}

fn app_home_dir() -> Result<PathBuf, AppError> {
    if let Ok(custom) = std::env::var(HOME_ENV) {
        return Ok(PathBuf::from(custom));
    }

    if let Some(dirs) = ProjectDirs::from("in", "bharatevcost", APP_NAME) {
        let candidate = dirs.data_local_dir().to_path_buf();
        if fs::create_dir_all(&candidate).is_ok() {
            return Ok(candidate);
        }
    }

    let cwd = std::env::current_dir()?;
    Ok(cwd.join(".bharat-ev-cost"))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_city: String,
    pub native_share: bool,
    pub output_dir: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
    pub bold_font_path: Option<PathBuf>,
    pub logo_path: Option<PathBuf>,
    pub vehicles: Vec<VehicleProfile>,
    pub city_overrides: Vec<CityOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityOverride {
    pub city: String,
    #[serde(default)]
    pub tariff: Option<f64>,
    #[serde(default)]
    pub petrol: Option<f64>,
    #[serde(default)]
    pub discom: Option<String>,
    #[serde(default)]
    pub updated: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.into(),
            native_share: true,
            output_dir: None,
            font_path: None,
            bold_font_path: None,
            logo_path: None,
            vehicles: vec![],
            city_overrides: vec![],
        }
    }
}

pub fn config_dir() -> Result<PathBuf, AppError> {
    Ok(app_home_dir()?.join("config"))
}

pub fn data_dir() -> Result<PathBuf, AppError> {
    Ok(app_home_dir()?.join("data"))
}

pub fn config_path() -> Result<PathBuf, AppError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Where downloaded cards land unless `output_dir` says otherwise.
pub fn card_dir(cfg: &AppConfig) -> Result<PathBuf, AppError> {
    match &cfg.output_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(data_dir()?.join("cards")),
    }
}

pub fn ensure_dirs() -> Result<(), AppError> {
    fs::create_dir_all(config_dir()?)?;
    fs::create_dir_all(data_dir()?)?;
    Ok(())
}

fn normalize_config(config: &mut AppConfig) -> bool {
    let mut changed = false;

    let city = config.default_city.trim();
    if city != config.default_city {
        config.default_city = city.to_string();
        changed = true;
    }
    if config.default_city.is_empty() {
        config.default_city = DEFAULT_CITY.into();
        changed = true;
    }

    // Later entries win over earlier ones with the same id.
    let mut vehicles: Vec<VehicleProfile> = Vec::new();
    for mut vehicle in std::mem::take(&mut config.vehicles) {
        let normalized = normalize_vehicle_id(&vehicle.id);
        if normalized != vehicle.id {
            vehicle.id = normalized;
            changed = true;
        }
        if let Some(pos) = vehicles.iter().position(|v| v.id == vehicle.id) {
            vehicles.remove(pos);
            changed = true;
        }
        vehicles.push(vehicle);
    }
    config.vehicles = vehicles;

    let mut overrides: Vec<CityOverride> = Vec::new();
    for mut ov in std::mem::take(&mut config.city_overrides) {
        let trimmed = ov.city.trim();
        if trimmed != ov.city {
            ov.city = trimmed.to_string();
            changed = true;
        }
        if let Some(pos) = overrides
            .iter()
            .position(|o| o.city.eq_ignore_ascii_case(&ov.city))
        {
            overrides.remove(pos);
            changed = true;
        }
        overrides.push(ov);
    }
    config.city_overrides = overrides;

    changed
}

fn read_layered(path: &Path) -> Result<AppConfig, AppError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;
    Ok(settings.try_deserialize()?)
}

pub fn load_config() -> Result<AppConfig, AppError> {
    let path = config_path()?;
    let mut parsed = read_layered(&path)?;
    let normalized = normalize_config(&mut parsed);

    // Persist normalized file content only; environment layers stay transient.
    if normalized && path.exists() {
        let raw_str = fs::read_to_string(&path)?;
        let mut on_disk: AppConfig = toml::from_str(&raw_str)?;
        if normalize_config(&mut on_disk) {
            save_config(&on_disk)?;
        }
    }

    Ok(parsed)
}

pub fn save_config(config: &AppConfig) -> Result<(), AppError> {
    ensure_dirs()?;
    let path = config_path()?;
    let raw = toml::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

pub fn ensure_initialized() -> Result<(), AppError> {
    ensure_dirs()?;
    let cfg_path = config_path()?;
    if !Path::new(&cfg_path).exists() {
        save_config(&AppConfig::default())?;
    }
    Ok(())
}
