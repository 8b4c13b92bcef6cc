//! Customer Model

use serde::{Deserialize, Serialize};

/// Customer type (会员类型)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerType {
    Regular,
    Gc,
    Designer,
    Wholesale,
    Other,
}

impl CustomerType {
    pub const ALL: [CustomerType; 5] = [
        CustomerType::Regular,
        CustomerType::Gc,
        CustomerType::Designer,
        CustomerType::Wholesale,
        CustomerType::Other,
    ];

    /// Stored TEXT value
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Gc => "GC",
            Self::Designer => "DESIGNER",
            Self::Wholesale => "WHOLESALE",
            Self::Other => "OTHER",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value))
    }
}

impl std::fmt::Display for CustomerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub customer_type: CustomerType,
    /// Running sum of the points ledger
    pub points: i64,
    pub custom_discount_code: Option<String>,
    /// Overrides the type-based member discount when set (percent)
    pub custom_discount_rate: Option<f64>,
    /// QuickBooks Customer.Id
    pub quickbooks_id: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create customer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerCreate {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub custom_discount_code: Option<String>,
    pub custom_discount_rate: Option<f64>,
    pub notes: Option<String>,
}

/// Update customer payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub customer_type: Option<CustomerType>,
    pub custom_discount_code: Option<String>,
    pub custom_discount_rate: Option<f64>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_type_wire_format() {
        let json = serde_json::to_string(&CustomerType::Gc).unwrap();
        assert_eq!(json, "\"GC\"");
        let t: CustomerType = serde_json::from_str("\"WHOLESALE\"").unwrap();
        assert_eq!(t, CustomerType::Wholesale);
    }

    #[test]
    fn customer_type_parse_is_case_insensitive() {
        assert_eq!(CustomerType::parse("designer"), Some(CustomerType::Designer));
        assert_eq!(CustomerType::parse("REGULAR"), Some(CustomerType::Regular));
        assert_eq!(CustomerType::parse("vip"), None);
    }
}
