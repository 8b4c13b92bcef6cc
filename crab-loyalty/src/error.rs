//! Unified service-layer error type for crab-loyalty
//!
//! `ServiceError` bridges DB-layer and outbound HTTP errors (`sqlx::Error`,
//! `QuickBooksError`, `BoxError`) and the API-layer error (`AppError`), so
//! services can use `?` and handlers can return it directly.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::BoxError;
use crate::quickbooks::QuickBooksError;

/// Service-layer error
///
/// - `Db`: Database/infrastructure errors (auto-logged, mapped to InternalError)
/// - `App`: Business-rule errors (transparent pass-through to client)
#[derive(Debug)]
pub enum ServiceError {
    /// Database or infrastructure error (sqlx, serde, etc.)
    Db(BoxError),
    /// Business-rule error (already an AppError with the correct ErrorCode)
    App(AppError),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::Db(e) => write!(f, "{e}"),
            ServiceError::App(e) => write!(f, "{}", e.message),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<QuickBooksError> for ServiceError {
    fn from(e: QuickBooksError) -> Self {
        let code = match &e {
            QuickBooksError::Http(_) => ErrorCode::NetworkError,
            QuickBooksError::TokenRefresh(_) => ErrorCode::QuickBooksTokenRefreshFailed,
            QuickBooksError::Api { .. } | QuickBooksError::Decode(_) => {
                ErrorCode::QuickBooksApiError
            }
        };
        tracing::warn!(error = %e, "QuickBooks call failed");
        ServiceError::App(AppError::with_message(code, e.to_string()))
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

/// Convenience type alias for service-layer results
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_errors_become_internal() {
        let err = ServiceError::Db("connection reset".into());
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::InternalError);
        assert_eq!(app.message, "Internal server error");
    }

    #[test]
    fn app_errors_pass_through() {
        let err: ServiceError = AppError::new(ErrorCode::CreditAlreadyUsed).into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::CreditAlreadyUsed);
    }

    #[test]
    fn quickbooks_errors_map_to_integration_codes() {
        let err: ServiceError = QuickBooksError::Api {
            status: 400,
            body: "bad query".into(),
        }
        .into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::QuickBooksApiError);

        let err: ServiceError = QuickBooksError::TokenRefresh("invalid_grant".into()).into();
        let app: AppError = err.into();
        assert_eq!(app.code, ErrorCode::QuickBooksTokenRefreshFailed);
    }
}
