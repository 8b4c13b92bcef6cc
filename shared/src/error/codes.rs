//! Unified error codes for the loyalty back office
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Customer errors
//! - 4xxx: Order errors
//! - 5xxx: Credit errors
//! - 6xxx: Discount / points errors
//! - 7xxx: Contact list errors
//! - 8xxx: QuickBooks integration errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller is not authenticated
    NotAuthenticated = 1001,
    /// OAuth state missing, unknown or already consumed
    OAuthStateInvalid = 1002,
    /// OAuth state older than the allowed window
    OAuthStateExpired = 1003,
    /// Webhook signature missing or wrong
    WebhookSignatureInvalid = 1004,

    // ==================== 3xxx: Customer ====================
    CustomerNotFound = 3001,
    CustomerPhoneExists = 3002,
    CustomerEmailExists = 3003,

    // ==================== 4xxx: Order ====================
    OrderNotFound = 4001,
    OrderNoPending = 4002,

    // ==================== 5xxx: Credit ====================
    CreditNotFound = 5001,
    CreditAlreadyUsed = 5002,
    CreditInactive = 5003,
    CreditExpired = 5004,
    CreditBelowMinimum = 5005,
    CreditNotOwned = 5006,
    CreditUsedCannotRevoke = 5007,

    // ==================== 6xxx: Discount / Points ====================
    DiscountCodeNotFound = 6001,
    DiscountCodeExists = 6002,
    DiscountCodeInactive = 6003,
    DiscountCodeExpired = 6004,
    DiscountCodeNotAssigned = 6005,
    DiscountCodeUsageLimit = 6006,
    DiscountRuleNotFound = 6101,
    PointsRuleNotFound = 6201,

    // ==================== 7xxx: Contact list ====================
    ContactListNotFound = 7001,
    ContactListNotSyncable = 7002,

    // ==================== 8xxx: QuickBooks ====================
    QuickBooksNotConfigured = 8001,
    QuickBooksNotConnected = 8002,
    QuickBooksApiError = 8003,
    QuickBooksTokenRefreshFailed = 8004,

    // ==================== 9xxx: System ====================
    InternalError = 9001,
    DatabaseError = 9002,
    NetworkError = 9003,
    TimeoutError = 9004,
    ConfigError = 9005,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::OAuthStateInvalid => "Invalid or already used OAuth state",
            ErrorCode::OAuthStateExpired => "OAuth state has expired",
            ErrorCode::WebhookSignatureInvalid => "Invalid webhook signature",

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::CustomerPhoneExists => "Customer phone already exists",
            ErrorCode::CustomerEmailExists => "Customer email already exists",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderNoPending => "Customer has no pending order",

            // Credit
            ErrorCode::CreditNotFound => "Credit not found",
            ErrorCode::CreditAlreadyUsed => "Credit has already been used",
            ErrorCode::CreditInactive => "Credit is no longer active",
            ErrorCode::CreditExpired => "Credit has expired",
            ErrorCode::CreditBelowMinimum => "Order total is below the credit minimum",
            ErrorCode::CreditNotOwned => "Credit does not belong to this customer",
            ErrorCode::CreditUsedCannotRevoke => "A used credit cannot be revoked",

            // Discount / Points
            ErrorCode::DiscountCodeNotFound => "Discount code not found",
            ErrorCode::DiscountCodeExists => "Discount code already exists",
            ErrorCode::DiscountCodeInactive => "Discount code is not active",
            ErrorCode::DiscountCodeExpired => "Discount code has expired",
            ErrorCode::DiscountCodeNotAssigned => "Discount code is not assigned to this customer",
            ErrorCode::DiscountCodeUsageLimit => "Discount code usage limit reached",
            ErrorCode::DiscountRuleNotFound => "Discount rule not found",
            ErrorCode::PointsRuleNotFound => "Points rule not found",

            // Contact list
            ErrorCode::ContactListNotFound => "Contact list not found",
            ErrorCode::ContactListNotSyncable => "Contact list has no sync filter",

            // QuickBooks
            ErrorCode::QuickBooksNotConfigured => "QuickBooks integration is not configured",
            ErrorCode::QuickBooksNotConnected => "QuickBooks is not connected",
            ErrorCode::QuickBooksApiError => "QuickBooks API request failed",
            ErrorCode::QuickBooksTokenRefreshFailed => "QuickBooks token refresh failed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::OAuthStateInvalid),
            1003 => Ok(ErrorCode::OAuthStateExpired),
            1004 => Ok(ErrorCode::WebhookSignatureInvalid),

            // Customer
            3001 => Ok(ErrorCode::CustomerNotFound),
            3002 => Ok(ErrorCode::CustomerPhoneExists),
            3003 => Ok(ErrorCode::CustomerEmailExists),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::OrderNoPending),

            // Credit
            5001 => Ok(ErrorCode::CreditNotFound),
            5002 => Ok(ErrorCode::CreditAlreadyUsed),
            5003 => Ok(ErrorCode::CreditInactive),
            5004 => Ok(ErrorCode::CreditExpired),
            5005 => Ok(ErrorCode::CreditBelowMinimum),
            5006 => Ok(ErrorCode::CreditNotOwned),
            5007 => Ok(ErrorCode::CreditUsedCannotRevoke),

            // Discount / Points
            6001 => Ok(ErrorCode::DiscountCodeNotFound),
            6002 => Ok(ErrorCode::DiscountCodeExists),
            6003 => Ok(ErrorCode::DiscountCodeInactive),
            6004 => Ok(ErrorCode::DiscountCodeExpired),
            6005 => Ok(ErrorCode::DiscountCodeNotAssigned),
            6006 => Ok(ErrorCode::DiscountCodeUsageLimit),
            6101 => Ok(ErrorCode::DiscountRuleNotFound),
            6201 => Ok(ErrorCode::PointsRuleNotFound),

            // Contact list
            7001 => Ok(ErrorCode::ContactListNotFound),
            7002 => Ok(ErrorCode::ContactListNotSyncable),

            // QuickBooks
            8001 => Ok(ErrorCode::QuickBooksNotConfigured),
            8002 => Ok(ErrorCode::QuickBooksNotConnected),
            8003 => Ok(ErrorCode::QuickBooksApiError),
            8004 => Ok(ErrorCode::QuickBooksTokenRefreshFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::OAuthStateInvalid.code(), 1002);
        assert_eq!(ErrorCode::WebhookSignatureInvalid.code(), 1004);
        assert_eq!(ErrorCode::CustomerNotFound.code(), 3001);
        assert_eq!(ErrorCode::CreditAlreadyUsed.code(), 5002);
        assert_eq!(ErrorCode::CreditBelowMinimum.code(), 5005);
        assert_eq!(ErrorCode::DiscountCodeNotAssigned.code(), 6005);
        assert_eq!(ErrorCode::ContactListNotFound.code(), 7001);
        assert_eq!(ErrorCode::QuickBooksNotConnected.code(), 8002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_roundtrips_every_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::ValidationFailed,
            ErrorCode::OAuthStateExpired,
            ErrorCode::CustomerEmailExists,
            ErrorCode::OrderNoPending,
            ErrorCode::CreditUsedCannotRevoke,
            ErrorCode::DiscountCodeUsageLimit,
            ErrorCode::PointsRuleNotFound,
            ErrorCode::ContactListNotSyncable,
            ErrorCode::QuickBooksTokenRefreshFailed,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(6007), Err(InvalidErrorCode(6007)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::CreditExpired).unwrap();
        assert_eq!(json, "5004");

        let code: ErrorCode = serde_json::from_str("8001").unwrap();
        assert_eq!(code, ErrorCode::QuickBooksNotConfigured);

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display_and_message() {
        assert_eq!(format!("{}", ErrorCode::CreditNotFound), "5001");
        assert_eq!(ErrorCode::CreditNotFound.message(), "Credit not found");
        assert_eq!(
            format!("{}", InvalidErrorCode(42)),
            "invalid error code: 42"
        );
    }
}
