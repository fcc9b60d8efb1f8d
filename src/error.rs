use crate::cost::CostError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("unknown vehicle '{0}'. Run `bharat-ev-cost vehicles` to list ids.")]
    UnknownVehicle(String),

    #[error("unknown city '{0}'. Run `bharat-ev-cost cities` to list presets.")]
    UnknownCity(String),

    #[error("select a daily distance first (--km or --custom-km)")]
    MissingDistance,

    #[error(transparent)]
    Cost(#[from] CostError),

    #[error("an export is already in progress")]
    ExportBusy,

    #[error("font error: {0}")]
    Font(String),

    #[error("share failed: {0}")]
    Share(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error(transparent)]
    Settings(#[from] config::ConfigError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
}
