use chrono::{DateTime, Utc};

use crate::domain::repository::OrderRepository;
use crate::error::ApiError;

/// Collision retries before falling back to the timestamp form.
const NUMBER_RETRIES: usize = 5;

fn random_suffix() -> u32 {
    use rand::RngExt;
    rand::rng().random_range(1000..10000)
}

/// A human-readable candidate: `ORD-<YYYYMMDD>-<4-digit>`.
fn candidate(now: DateTime<Utc>) -> String {
    format!("ORD-{}-{}", now.format("%Y%m%d"), random_suffix())
}

/// Produce an order number not yet present in the store.
///
/// The date form has a non-zero collision probability by construction, so
/// after [`NUMBER_RETRIES`] misses the millisecond-timestamp form takes
/// over — retry exhaustion never becomes a hard failure.
pub async fn make_unique_number<R: OrderRepository>(
    orders: &R,
    now: DateTime<Utc>,
) -> Result<String, ApiError> {
    for _ in 0..NUMBER_RETRIES {
        let number = candidate(now);
        if !orders.number_exists(&number).await? {
            return Ok(number);
        }
    }
    Ok(format!(
        "ORD-{}-{}",
        now.timestamp_millis(),
        random_suffix()
    ))
}
