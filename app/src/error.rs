use greenhouse_core::error::ReadingError;
use std::error;
use std::fmt;
use thiserror::Error;

/// Column a plant lookup was keyed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantKey {
    Id(i32),
    Name(std::string::String),
    Threshold(i32),
}

impl fmt::Display for PlantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlantKey::Id(id) => write!(f, "id {}", id),
            PlantKey::Name(name) => write!(f, "name {:?}", name),
            PlantKey::Threshold(threshold) => write!(f, "watered soil moisture {}", threshold),
        }
    }
}

#[derive(Debug, Error)]
pub enum DBError {
    #[error(transparent)]
    SQLError(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Did not find plant with {0}")]
    PlantNotFound(PlantKey),
    #[error("Plant name {0:?} is ambiguous, it matches {1} plants")]
    AmbiguousMatch(std::string::String, u64),
}

impl DBError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DBError::PlantNotFound(_))
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid value for {0}: {1:?}")]
    InvalidField(&'static str, std::string::String),
    #[error("A plant named {0:?} already exists")]
    DuplicatePlant(std::string::String),
    #[error("Request timed out after {0}ms")]
    Timeout(u128),
}

#[derive(Debug)]
pub enum ObserverError {
    User(Box<dyn error::Error + Send + Sync>),
    Internal(Box<dyn error::Error + Send + Sync>),
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObserverError::User(err) => write!(f, "{}", err),
            ObserverError::Internal(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for ObserverError {}

impl ObserverError {
    pub fn is_user(&self) -> bool {
        matches!(self, ObserverError::User(_))
    }
}

impl From<DBError> for ObserverError {
    fn from(err: DBError) -> Self {
        match err {
            DBError::PlantNotFound(_) | DBError::AmbiguousMatch(_, _) => {
                ObserverError::User(Box::from(err))
            }
            DBError::SQLError(_) | DBError::Migration(_) => ObserverError::Internal(Box::from(err)),
        }
    }
}

impl From<ReadingError> for ObserverError {
    fn from(err: ReadingError) -> Self {
        ObserverError::User(Box::from(err))
    }
}

impl From<ApiError> for ObserverError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Timeout(_) => ObserverError::Internal(Box::from(err)),
            _ => ObserverError::User(Box::from(err)),
        }
    }
}
