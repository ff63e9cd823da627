pub mod auth;
pub mod dashboard;
pub mod grade;

use rust_decimal::{Decimal, prelude::ToPrimitive};

/// Decimals leave the API as JSON numbers
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
