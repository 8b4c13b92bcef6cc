//! Benefit & credit issuance against customer cohorts
//!
//! Targets resolve to customer ids (by type, by contact list, or explicit).
//! Discount-code assignments are set membership: re-issuing skips existing
//! pairs. Credits are value-bearing and every issuance is a new batch.

use std::future::Future;

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{CreditSource, CustomerType};
use sqlx::PgPool;

use crate::BoxError;
use crate::db::{self, credits::NewCreditBatch};
use crate::error::ServiceResult;
use crate::money::{validate_amount, validate_positive_amount};

/// Who receives an issuance
#[derive(Debug, Clone)]
pub enum IssueTarget {
    Types(Vec<CustomerType>),
    Lists(Vec<i64>),
    Customers(Vec<i64>),
}

impl IssueTarget {
    fn validate(&self) -> Result<(), AppError> {
        let (empty, field) = match self {
            Self::Types(types) => (types.is_empty(), "customerTypes"),
            Self::Lists(ids) => (ids.is_empty(), "listIds"),
            Self::Customers(ids) => (ids.is_empty(), "customerIds"),
        };
        if empty {
            return Err(AppError::validation(format!("{field} must not be empty"))
                .with_detail("field", field));
        }
        Ok(())
    }
}

/// `{ "customerTypes": [...] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByTypes {
    pub customer_types: Vec<CustomerType>,
}

/// `{ "listIds": [...] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByLists {
    pub list_ids: Vec<i64>,
}

/// `{ "customerIds": [...] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ByCustomers {
    pub customer_ids: Vec<i64>,
}

impl From<ByTypes> for IssueTarget {
    fn from(body: ByTypes) -> Self {
        Self::Types(body.customer_types)
    }
}

impl From<ByLists> for IssueTarget {
    fn from(body: ByLists) -> Self {
        Self::Lists(body.list_ids)
    }
}

impl From<ByCustomers> for IssueTarget {
    fn from(body: ByCustomers) -> Self {
        Self::Customers(body.customer_ids)
    }
}

/// Customer ids for a target, ascending and distinct
pub async fn resolve_targets(pool: &PgPool, target: &IssueTarget) -> ServiceResult<Vec<i64>> {
    target.validate()?;
    let ids = match target {
        IssueTarget::Types(types) => db::customers::ids_by_types(pool, types).await?,
        IssueTarget::Lists(list_ids) => db::contact_lists::customer_ids_for_lists(pool, list_ids).await?,
        IssueTarget::Customers(ids) => {
            let mut ids = ids.clone();
            ids.sort_unstable();
            ids.dedup();
            db::customers::existing_ids(pool, &ids).await?
        }
    };
    Ok(ids)
}

// ── Discount-code assignments ──

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssignmentResult {
    pub assigned: usize,
    pub skipped: usize,
    pub total: usize,
}

/// One insert per customer, in order. `Ok(false)` and unique violations
/// count as skipped; any other error aborts.
pub async fn assign_each<F, Fut>(customer_ids: &[i64], mut insert: F) -> Result<AssignmentResult, BoxError>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<bool, BoxError>>,
{
    let mut result = AssignmentResult {
        total: customer_ids.len(),
        ..Default::default()
    };
    for &customer_id in customer_ids {
        match insert(customer_id).await {
            Ok(true) => result.assigned += 1,
            Ok(false) => result.skipped += 1,
            Err(e) if db::unique_violation(&e).is_some() => result.skipped += 1,
            Err(e) => return Err(e),
        }
    }
    Ok(result)
}

pub async fn assign_code(
    pool: &PgPool,
    code_id: i64,
    target: &IssueTarget,
) -> ServiceResult<AssignmentResult> {
    let code = db::discount_codes::find_by_id(pool, code_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::DiscountCodeNotFound))?;
    let customer_ids = resolve_targets(pool, target).await?;
    let result = assign_each(&customer_ids, |customer_id| {
        db::discount_codes::assign(pool, code.id, customer_id)
    })
    .await?;
    tracing::info!(
        code = %code.code,
        assigned = result.assigned,
        skipped = result.skipped,
        "Discount code assigned"
    );
    Ok(result)
}

// ── Credits ──

fn default_source() -> CreditSource {
    CreditSource::Promotion
}

/// Terms shared by every credit of one issuance
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTerms {
    pub amount: f64,
    #[serde(default)]
    pub min_order_amount: f64,
    #[serde(default = "default_source")]
    pub source: CreditSource,
    pub description: Option<String>,
    pub expires_in_days: Option<i64>,
}

impl CreditTerms {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_positive_amount(self.amount, "amount")?;
        validate_amount(self.min_order_amount, "minOrderAmount")?;
        if let Some(days) = self.expires_in_days
            && !(1..=3650).contains(&days)
        {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                "expiresInDays must be between 1 and 3650",
            )
            .with_detail("field", "expiresInDays"));
        }
        Ok(())
    }

    pub fn expires_at(&self, now: i64) -> Option<i64> {
        self.expires_in_days
            .map(|days| now + days * shared::util::DAY_MILLIS)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditIssueResult {
    pub batch_id: String,
    pub issued: u64,
}

pub async fn issue_credits(
    pool: &PgPool,
    terms: &CreditTerms,
    target: &IssueTarget,
) -> ServiceResult<CreditIssueResult> {
    terms.validate()?;
    let customer_ids = resolve_targets(pool, target).await?;

    let batch_id = uuid::Uuid::new_v4().to_string();
    let batch = NewCreditBatch {
        batch_id: &batch_id,
        amount: terms.amount,
        min_order_amount: terms.min_order_amount,
        source: terms.source,
        description: terms.description.as_deref(),
        expires_at: terms.expires_at(shared::util::now_millis()),
    };
    let issued = db::credits::insert_batch(pool, &batch, &customer_ids).await?;
    tracing::info!(batch_id = %batch_id, issued, amount = terms.amount, "Credits issued");
    Ok(CreditIssueResult { batch_id, issued })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> CreditTerms {
        serde_json::from_value(serde_json::json!({
            "amount": 20.0,
            "minOrderAmount": 100.0,
            "expiresInDays": 30
        }))
        .unwrap()
    }

    #[test]
    fn credit_terms_defaults_and_expiry() {
        let terms = terms();
        assert_eq!(terms.source, CreditSource::Promotion);
        assert!(terms.validate().is_ok());
        assert_eq!(terms.expires_at(1_000), Some(1_000 + 30 * shared::util::DAY_MILLIS));

        let open_ended = CreditTerms {
            expires_in_days: None,
            ..terms
        };
        assert_eq!(open_ended.expires_at(1_000), None);
    }

    #[test]
    fn credit_terms_validation() {
        let zero = CreditTerms {
            amount: 0.0,
            ..terms()
        };
        assert_eq!(zero.validate().unwrap_err().code, ErrorCode::ValidationFailed);

        let forever = CreditTerms {
            expires_in_days: Some(0),
            ..terms()
        };
        assert_eq!(forever.validate().unwrap_err().code, ErrorCode::ValueOutOfRange);
    }

    #[test]
    fn empty_targets_are_rejected() {
        let err = IssueTarget::Types(vec![]).validate().unwrap_err();
        assert_eq!(err.details.unwrap()["field"], "customerTypes");
        assert!(IssueTarget::Customers(vec![1]).validate().is_ok());
    }

    #[tokio::test]
    async fn assign_each_counts_skips() {
        let existing = [2_i64, 4];
        let result = assign_each(&[1, 2, 3, 4], |id| async move { Ok(!existing.contains(&id)) })
            .await
            .unwrap();
        assert_eq!(
            result,
            AssignmentResult {
                assigned: 2,
                skipped: 2,
                total: 4
            }
        );
    }

    #[tokio::test]
    async fn assign_each_aborts_on_other_errors() {
        let mut calls = 0;
        let result = assign_each(&[1, 2, 3], |id| {
            calls += 1;
            async move {
                if id == 2 {
                    Err::<bool, BoxError>("connection reset".into())
                } else {
                    Ok(true)
                }
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls, 2);
    }
}
