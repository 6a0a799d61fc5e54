use platform_api::ApiError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("{0}")]
    NotFound(String),
    #[error("ID mismatch")]
    IdMismatch,
    #[error("{0}")]
    InvalidInput(String),
    #[error("invalid username or password")]
    Unauthorized,
    #[error("database error: {0}")]
    Db(DbErr),
}

pub type HrResult<T> = Result<T, HrError>;

impl HrError {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }
}

impl From<DbErr> for HrError {
    fn from(err: DbErr) -> Self {
        match err {
            // The row vanished between load and save.
            DbErr::RecordNotUpdated => Self::NotFound("record no longer exists".into()),
            DbErr::RecordNotFound(what) => Self::NotFound(what),
            other => Self::Db(other),
        }
    }
}

impl From<HrError> for ApiError {
    fn from(err: HrError) -> Self {
        match err {
            HrError::NotFound(what) => ApiError::NotFound(what),
            HrError::IdMismatch => ApiError::InvalidInput("ID mismatch".into()),
            HrError::InvalidInput(message) => ApiError::InvalidInput(message),
            HrError::Unauthorized => ApiError::Unauthorized,
            HrError::Db(db) => ApiError::internal(anyhow::Error::new(db)),
        }
    }
}
