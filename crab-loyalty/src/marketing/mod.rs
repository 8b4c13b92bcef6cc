//! Marketing calculators
//!
//! Pure functions, no I/O: discount stacking, member rate resolution,
//! points earning, and credit / discount-code eligibility.

pub mod calculator;
pub mod eligibility;
pub mod member_rate;
pub mod points;
