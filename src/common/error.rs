use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Waypoint {waypoint} is not part of any registered path")]
    WaypointNotFound { waypoint: u32 },

    #[error("Path {path} is not usable: {reason}")]
    DegeneratePath { path: usize, reason: String },

    #[error("Unknown path: {path}")]
    UnknownPath { path: usize },

    #[error("Lane {lane} is out of range for path {path} with {lane_count} lanes")]
    InvalidLane {
        path: usize,
        lane: usize,
        lane_count: usize,
    },

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Event sink error: {0}")]
    EventSink(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
