//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 3xxx: Customer errors
/// - 4xxx: Order errors
/// - 5xxx: Credit errors
/// - 6xxx: Discount / points errors
/// - 7xxx: Contact list errors
/// - 8xxx: Integration errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx, 2xxx reserved)
    Auth,
    /// Customer errors (3xxx)
    Customer,
    /// Order errors (4xxx)
    Order,
    /// Credit errors (5xxx)
    Credit,
    /// Discount and points errors (6xxx)
    Discount,
    /// Contact list errors (7xxx)
    Contact,
    /// External integration errors (8xxx)
    Integration,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..3000 => Self::Auth,
            3000..4000 => Self::Customer,
            4000..5000 => Self::Order,
            5000..6000 => Self::Credit,
            6000..7000 => Self::Discount,
            7000..8000 => Self::Contact,
            8000..9000 => Self::Integration,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Customer => "customer",
            Self::Order => "order",
            Self::Credit => "credit",
            Self::Discount => "discount",
            Self::Contact => "contact",
            Self::Integration => "integration",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1004), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Customer);
        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Credit);
        assert_eq!(ErrorCategory::from_code(6201), ErrorCategory::Discount);
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::Contact);
        assert_eq!(ErrorCategory::from_code(8003), ErrorCategory::Integration);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(
            ErrorCode::WebhookSignatureInvalid.category(),
            ErrorCategory::Auth
        );
        assert_eq!(ErrorCode::CreditExpired.category(), ErrorCategory::Credit);
        assert_eq!(
            ErrorCode::QuickBooksApiError.category(),
            ErrorCategory::Integration
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&ErrorCategory::Integration).unwrap();
        assert_eq!(json, "\"integration\"");
        let category: ErrorCategory = serde_json::from_str("\"credit\"").unwrap();
        assert_eq!(category, ErrorCategory::Credit);
    }
}
