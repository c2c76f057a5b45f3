use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tile layer file {path}: {source}")]
    LayersFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tile layer file: {0}")]
    LayersFileParse(#[from] serde_yaml::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid year filter: {0:?}")]
    InvalidYear(String),

    #[error("invalid maximum distance: {0}")]
    InvalidMaxDistance(f64),

    #[error("unknown tile layer: {0}")]
    UnknownLayer(String),

    #[error("a map instance is already attached")]
    MapAlreadyAttached,

    #[error("invalid GeoJSON overlay: {0}")]
    InvalidOverlay(#[from] serde_json::Error),
}
