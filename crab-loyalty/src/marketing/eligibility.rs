//! Credit and discount-code eligibility
//!
//! Checks run in a fixed order; the first failing condition is reported.

use shared::error::{AppError, ErrorCode};
use shared::models::{CreditStatus, CustomerCredit, DiscountCode, DiscountCodeType};

use crate::money::to_decimal;

fn is_expired(expires_at: Option<i64>, now: i64) -> bool {
    expires_at.is_some_and(|at| at <= now)
}

/// Credit eligibility: not found, used, inactive, expired, below minimum
pub fn check_credit(
    credit: Option<&CustomerCredit>,
    order_total: f64,
    now: i64,
) -> Result<&CustomerCredit, AppError> {
    let credit = credit.ok_or_else(|| AppError::new(ErrorCode::CreditNotFound))?;
    if credit.is_used {
        return Err(AppError::new(ErrorCode::CreditAlreadyUsed));
    }
    if !credit.is_active {
        return Err(AppError::new(ErrorCode::CreditInactive));
    }
    if is_expired(credit.expires_at, now) {
        return Err(AppError::new(ErrorCode::CreditExpired));
    }
    if to_decimal(order_total) < to_decimal(credit.min_order_amount) {
        return Err(AppError::with_message(
            ErrorCode::CreditBelowMinimum,
            format!(
                "Order total {order_total:.2} is below the minimum of {:.2}",
                credit.min_order_amount
            ),
        )
        .with_detail("minOrderAmount", credit.min_order_amount));
    }
    Ok(credit)
}

/// Display status: Used > Revoked > Expired > Available
pub fn credit_status(credit: &CustomerCredit, now: i64) -> CreditStatus {
    if credit.is_used {
        CreditStatus::Used
    } else if !credit.is_active {
        CreditStatus::Revoked
    } else if is_expired(credit.expires_at, now) {
        CreditStatus::Expired
    } else {
        CreditStatus::Available
    }
}

/// Discount code eligibility: not found, inactive, expired, usage limit,
/// then exclusive codes require the owner or an assignment.
pub fn check_discount_code(
    code: Option<&DiscountCode>,
    customer_id: Option<i64>,
    is_assigned: bool,
    now: i64,
) -> Result<&DiscountCode, AppError> {
    let code = code.ok_or_else(|| AppError::new(ErrorCode::DiscountCodeNotFound))?;
    if !code.is_active {
        return Err(AppError::new(ErrorCode::DiscountCodeInactive));
    }
    if is_expired(code.expires_at, now) {
        return Err(AppError::new(ErrorCode::DiscountCodeExpired));
    }
    if code.max_uses.is_some_and(|max| code.usage_count >= max) {
        return Err(AppError::new(ErrorCode::DiscountCodeUsageLimit));
    }
    if code.code_type == DiscountCodeType::Exclusive {
        let is_owner = customer_id.is_some() && code.owner_customer_id == customer_id;
        if !is_owner && !is_assigned {
            return Err(AppError::new(ErrorCode::DiscountCodeNotAssigned));
        }
    }
    Ok(code)
}
