//! Credit use, validation and revocation

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{CreditUsage, CustomerCredit};
use sqlx::PgPool;

use crate::db;
use crate::error::ServiceResult;
use crate::marketing::eligibility::check_credit;
use crate::money::{to_decimal, to_f64, validate_amount};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCreditRequest {
    pub order_total: f64,
    pub order_id: Option<i64>,
    /// When set, the credit must belong to this customer
    pub customer_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UseCreditResult {
    pub credit: CustomerCredit,
    pub usage: CreditUsage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditValidation {
    pub valid: bool,
    /// Amount the credit would take off this order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicable_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CreditValidation {
    fn from_check(result: Result<&CustomerCredit, AppError>, order_total: f64) -> Self {
        match result {
            Ok(credit) => Self {
                valid: true,
                applicable_amount: Some(applicable_amount(credit.amount, order_total)),
                error_code: None,
                message: None,
            },
            Err(e) => Self {
                valid: false,
                applicable_amount: None,
                error_code: Some(e.code),
                message: Some(e.message),
            },
        }
    }
}

/// A credit never takes more than the order total
pub fn applicable_amount(credit_amount: f64, order_total: f64) -> f64 {
    to_f64(to_decimal(credit_amount).min(to_decimal(order_total)))
}

fn check_owner(credit: &CustomerCredit, customer_id: Option<i64>) -> Result<(), AppError> {
    match customer_id {
        Some(id) if id != credit.customer_id => Err(AppError::new(ErrorCode::CreditNotOwned)),
        _ => Ok(()),
    }
}

/// Check a credit against an order total without using it
pub async fn validate_credit(
    pool: &PgPool,
    id: i64,
    order_total: f64,
) -> ServiceResult<CreditValidation> {
    validate_amount(order_total, "orderTotal")?;
    let credit = db::credits::find_by_id(pool, id).await?;
    let now = shared::util::now_millis();
    Ok(CreditValidation::from_check(
        check_credit(credit.as_ref(), order_total, now),
        order_total,
    ))
}

/// Use a credit on an order. Exactly one concurrent caller can succeed.
pub async fn use_credit(
    pool: &PgPool,
    id: i64,
    req: &UseCreditRequest,
) -> ServiceResult<UseCreditResult> {
    validate_amount(req.order_total, "orderTotal")?;
    let now = shared::util::now_millis();

    let current = db::credits::find_by_id(pool, id).await?;
    let credit = check_credit(current.as_ref(), req.order_total, now)?;
    check_owner(credit, req.customer_id)?;
    let amount_applied = applicable_amount(credit.amount, req.order_total);

    match db::credits::use_credit(pool, id, req.order_total, amount_applied, req.order_id, now)
        .await?
    {
        Some((credit, usage)) => {
            tracing::info!(
                credit_id = credit.id,
                customer_id = credit.customer_id,
                amount_applied,
                "Credit used"
            );
            Ok(UseCreditResult { credit, usage })
        }
        None => {
            // Lost a race: report what the credit looks like now
            let latest = db::credits::find_by_id(pool, id).await?;
            check_credit(latest.as_ref(), req.order_total, now)?;
            Err(AppError::new(ErrorCode::CreditAlreadyUsed).into())
        }
    }
}

pub async fn revoke(pool: &PgPool, id: i64) -> ServiceResult<CustomerCredit> {
    if let Some(credit) = db::credits::revoke(pool, id).await? {
        tracing::info!(credit_id = id, "Credit revoked");
        return Ok(credit);
    }
    match db::credits::find_by_id(pool, id).await? {
        None => Err(AppError::new(ErrorCode::CreditNotFound).into()),
        Some(_) => Err(AppError::new(ErrorCode::CreditUsedCannotRevoke).into()),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRevokeResult {
    pub batch_id: String,
    pub revoked: u64,
}

/// Revoke the unused credits of a batch; used ones are left alone
pub async fn revoke_batch(pool: &PgPool, batch_id: &str) -> ServiceResult<BatchRevokeResult> {
    let revoked = db::credits::revoke_batch(pool, batch_id).await?;
    tracing::info!(batch_id, revoked, "Credit batch revoked");
    Ok(BatchRevokeResult {
        batch_id: batch_id.to_string(),
        revoked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::CreditSource;

    fn credit() -> CustomerCredit {
        CustomerCredit {
            id: 1,
            customer_id: 10,
            amount: 20.0,
            min_order_amount: 100.0,
            source: CreditSource::Promotion,
            batch_id: "b1".into(),
            description: None,
            is_active: true,
            is_used: false,
            used_at: None,
            expires_at: None,
            created_at: 0,
        }
    }

    #[test]
    fn applicable_amount_is_capped_by_total() {
        assert_eq!(applicable_amount(20.0, 150.0), 20.0);
        assert_eq!(applicable_amount(20.0, 12.5), 12.5);
    }

    #[test]
    fn validation_reports_first_failure() {
        let c = credit();
        let ok = CreditValidation::from_check(check_credit(Some(&c), 150.0, 1), 150.0);
        assert!(ok.valid);
        assert_eq!(ok.applicable_amount, Some(20.0));

        let low = CreditValidation::from_check(check_credit(Some(&c), 99.99, 1), 99.99);
        assert!(!low.valid);
        assert_eq!(low.error_code, Some(ErrorCode::CreditBelowMinimum));

        let used = CustomerCredit {
            is_used: true,
            ..credit()
        };
        let result = CreditValidation::from_check(check_credit(Some(&used), 99.99, 1), 99.99);
        assert_eq!(result.error_code, Some(ErrorCode::CreditAlreadyUsed));
    }

    #[test]
    fn ownership_check() {
        let c = credit();
        assert!(check_owner(&c, None).is_ok());
        assert!(check_owner(&c, Some(10)).is_ok());
        assert_eq!(
            check_owner(&c, Some(11)).unwrap_err().code,
            ErrorCode::CreditNotOwned
        );
    }
}
