//! Counter-side discount helper: customer lookup with applicable benefits,
//! and discount-code validation for an order.

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{CreditStatus, CreditWithCustomer, Customer, DiscountCode};
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;
use crate::marketing::eligibility::check_discount_code;
use crate::marketing::member_rate::member_discount_rate;
use crate::money::{to_decimal, to_f64, validate_amount};

/// Shortest accepted lookup query
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBenefits {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_discount_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_redemption_rate: Option<f64>,
    /// Currency value of the customer's points
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_value: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub discount_codes: Vec<DiscountCode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub credits: Vec<CreditWithCustomer>,
}

impl CustomerBenefits {
    pub fn not_found() -> Self {
        Self {
            found: false,
            customer: None,
            member_discount_percent: None,
            points_redemption_rate: None,
            points_value: None,
            discount_codes: Vec::new(),
            credits: Vec::new(),
        }
    }
}

pub fn validate_query(q: &str) -> Result<&str, AppError> {
    let q = q.trim();
    if q.chars().count() < MIN_QUERY_LEN {
        return Err(AppError::validation(format!(
            "Query must be at least {MIN_QUERY_LEN} characters"
        ))
        .with_detail("field", "q"));
    }
    Ok(q)
}

/// Find a customer by phone, email, custom code or name prefix and collect
/// what they can use right now
pub async fn lookup(pool: &PgPool, q: &str) -> ServiceResult<CustomerBenefits> {
    let q = validate_query(q)?;
    let Some(customer) = db::customers::lookup(pool, q).await? else {
        return Ok(CustomerBenefits::not_found());
    };

    let now = shared::util::now_millis();
    let settings = db::settings::get(pool).await?;
    let rules = db::discount_rules::list_active(pool).await?;
    let rate = member_discount_rate(
        customer.customer_type,
        customer.custom_discount_rate,
        &rules,
        &settings,
    );
    let discount_codes = db::discount_codes::codes_for_customer(pool, customer.id, now).await?;
    let credits = db::credits::list_for_customer(pool, customer.id)
        .await?
        .into_iter()
        .filter(|c| c.status == CreditStatus::Available)
        .collect();
    let points_value = to_f64(
        to_decimal(settings.points_redemption_rate) * rust_decimal::Decimal::from(customer.points),
    );

    Ok(CustomerBenefits {
        found: true,
        member_discount_percent: Some(rate),
        points_redemption_rate: Some(settings.points_redemption_rate),
        points_value: Some(points_value),
        customer: Some(customer),
        discount_codes,
        credits,
    })
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCodeRequest {
    pub code: String,
    pub customer_id: Option<i64>,
    pub order_amount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<DiscountCode>,
    /// Discount on `orderAmount`, when given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn validate_code(pool: &PgPool, req: &ValidateCodeRequest) -> ServiceResult<CodeValidation> {
    if let Some(amount) = req.order_amount {
        validate_amount(amount, "orderAmount")?;
    }
    let code = db::discount_codes::find_by_code(pool, &req.code).await?;
    let is_assigned = match (&code, req.customer_id) {
        (Some(code), Some(customer_id)) => {
            db::discount_codes::is_assigned(pool, code.id, customer_id).await?
        }
        _ => false,
    };
    let now = shared::util::now_millis();

    Ok(
        match check_discount_code(code.as_ref(), req.customer_id, is_assigned, now) {
            Ok(code) => CodeValidation {
                valid: true,
                discount_amount: req.order_amount.map(|amount| {
                    to_f64(
                        to_decimal(amount) * to_decimal(code.discount_percent)
                            / rust_decimal::Decimal::ONE_HUNDRED,
                    )
                }),
                discount_code: Some(code.clone()),
                error_code: None,
                message: None,
            },
            Err(e) => CodeValidation {
                valid: false,
                discount_code: None,
                discount_amount: None,
                error_code: Some(e.code),
                message: Some(e.message),
            },
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_length_is_checked_after_trimming() {
        assert_eq!(validate_query("  jo ").unwrap(), "jo");
        assert!(validate_query(" j ").is_err());
        assert!(validate_query("").is_err());
    }

    #[test]
    fn not_found_serializes_minimal() {
        let json = serde_json::to_value(CustomerBenefits::not_found()).unwrap();
        assert_eq!(json, serde_json::json!({ "found": false }));
    }
}
