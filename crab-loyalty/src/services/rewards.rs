//! Side effects of a completed order: points award and discount-code usage

use shared::models::{Customer, Order, PointsTransactionType};
use sqlx::PgPool;

use crate::BoxError;
use crate::db;
use crate::marketing::points::{find_points_rule, points_for_amount};

/// Award points for an order by the customer's points rule.
/// Returns the points written to the ledger (0 when no rule applies).
pub async fn award_points_for_order(
    pool: &PgPool,
    customer: &Customer,
    order: &Order,
) -> Result<i64, BoxError> {
    let rules = db::points::list_active_rules(pool).await?;
    let Some(rule) = find_points_rule(&rules, customer.customer_type) else {
        return Ok(0);
    };
    let points = points_for_amount(order.final_amount, rule.earn_rate);
    if points <= 0 {
        return Ok(0);
    }

    let description = match order.order_number.as_deref() {
        Some(number) => format!("Order #{number}"),
        None => format!("Order {}", order.id),
    };
    let entry = db::points::apply_transaction(
        pool,
        customer.id,
        points,
        PointsTransactionType::Earn,
        Some(&description),
        Some(order.id),
    )
    .await?;
    if entry.is_none() {
        return Err(format!("customer {} vanished while awarding points", customer.id).into());
    }

    tracing::info!(customer_id = customer.id, order_id = order.id, points, rule = %rule.name, "Points awarded");
    Ok(points)
}

/// Record one use of a discount code. Unknown codes are logged and ignored.
pub async fn record_discount_usage(
    pool: &PgPool,
    code: &str,
    customer_id: i64,
    order_id: Option<i64>,
) -> Result<bool, BoxError> {
    let Some(discount_code) = db::discount_codes::find_by_code(pool, code).await? else {
        tracing::warn!(code, customer_id, "Discount code on invoice is unknown, usage not recorded");
        return Ok(false);
    };
    db::discount_codes::record_usage(pool, discount_code.id, customer_id, order_id).await?;
    tracing::info!(code = %discount_code.code, customer_id, "Discount code usage recorded");
    Ok(true)
}
