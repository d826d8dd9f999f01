use thiserror::Error;

/// Failure of a domain operation.
///
/// Everything except [`ServiceError::Database`] is an expected outcome and maps to a 4xx
/// response; database failures are faults and surface as a generic 500.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("Request was throttled. Expected available in {retry_after} seconds.")]
    RateLimited { retry_after: i64 },

    #[error("database error: {0}")]
    Database(sea_orm::DbErr),
}

impl From<sea_orm::DbErr> for ServiceError {
    /// Unique-key violations lose a race with a concurrent writer; report them as conflicts.
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict("A record with these values already exists.".to_string())
            }
            _ => Self::Database(e),
        }
    }
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    /// HTTP status used when this error reaches a client.
    ///
    /// Conflicts are reported as 400 to stay compatible with existing web clients.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Forbidden(_) => 403,
            Self::Conflict(_) | Self::Validation(_) => 400,
            Self::Unauthenticated(_) => 401,
            Self::RateLimited { .. } => 429,
            Self::Database(_) => 500,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::Validation(_) => "validation_error",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::RateLimited { .. } => "rate_limited",
            Self::Database(_) => "internal_error",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_))
    }

    /// Message that is safe to show to a client.
    pub fn public_message(&self) -> String {
        if self.is_internal() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(ServiceError::not_found("x").status(), 404);
        assert_eq!(ServiceError::forbidden("x").status(), 403);
        assert_eq!(ServiceError::conflict("x").status(), 400);
        assert_eq!(ServiceError::validation("x").status(), 400);
        assert_eq!(ServiceError::unauthenticated("x").status(), 401);
        assert_eq!(ServiceError::RateLimited { retry_after: 3 }.status(), 429);
    }

    #[test]
    fn database_errors_hide_details() {
        let err = ServiceError::from(sea_orm::DbErr::Custom("disk on fire".to_string()));
        assert_eq!(err.status(), 500);
        assert_eq!(err.code(), "internal_error");
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("disk on fire"));
    }
}
