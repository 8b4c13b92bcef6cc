//! Benefits API: member discount rules, points rules and discount codes

mod discount_codes;
mod rules;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/benefits", routes())
}

fn routes() -> Router<AppState> {
    let rules = Router::new()
        .route(
            "/discount-rules",
            get(rules::list_discount_rules).post(rules::create_discount_rule),
        )
        .route(
            "/discount-rules/{id}",
            put(rules::update_discount_rule).delete(rules::delete_discount_rule),
        )
        .route(
            "/points-rules",
            get(rules::list_points_rules).post(rules::create_points_rule),
        )
        .route(
            "/points-rules/{id}",
            put(rules::update_points_rule).delete(rules::delete_points_rule),
        );

    let codes = Router::new()
        .route(
            "/discount-codes",
            get(discount_codes::list).post(discount_codes::create),
        )
        .route("/discount-codes/validate", post(discount_codes::validate))
        .route(
            "/discount-codes/{id}",
            get(discount_codes::get_by_id)
                .put(discount_codes::update)
                .delete(discount_codes::delete),
        )
        .route(
            "/discount-codes/{id}/assign/by-type",
            post(discount_codes::assign_by_type),
        )
        .route(
            "/discount-codes/{id}/assign/by-lists",
            post(discount_codes::assign_by_lists),
        )
        .route(
            "/discount-codes/{id}/assign/by-customers",
            post(discount_codes::assign_by_customers),
        )
        .route(
            "/discount-codes/{id}/assignments",
            get(discount_codes::assignments).delete(discount_codes::clear_assignments),
        )
        .route(
            "/discount-codes/{id}/assignments/{customer_id}",
            delete(discount_codes::remove_assignment),
        );

    rules.merge(codes)
}
