use chrono::{Months, NaiveDate, NaiveDateTime};
use common::misc::SubscriptionStatus;
use db::models::subscriber::Subscriber;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Remaining-time text once a subscription has lapsed.
pub const EXPIRED: &str = "Expired";

/// Expiry of a subscription starting on `start`: one calendar month later.
///
/// The day of month is kept when the target month has it, otherwise the
/// result is clamped to that month's last day (Jan 31 -> Feb 28/29).
/// `None` only when the result falls outside the supported date range.
pub fn compute_expiry(start: NaiveDate) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(1))
}

/// Remaining time and status of a subscription expiring on `expiry`, as seen at `now`.
///
/// The expiry day is covered through 23:59:59.999. While covered the
/// remaining time reads `"{d}d {h}h {m}m"`, each part floored; after that
/// it reads `"Expired"`. Without an expiry date the status is `Unknown`
/// and the remaining time is empty.
pub fn remaining_and_status(
    expiry: Option<NaiveDate>,
    now: NaiveDateTime,
) -> (String, SubscriptionStatus) {
    let Some(end) = expiry.and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999)) else {
        return (String::new(), SubscriptionStatus::Unknown);
    };

    let diff_ms = (end - now).num_milliseconds();
    if diff_ms < 0 {
        return (EXPIRED.to_string(), SubscriptionStatus::Expired);
    }

    let days = diff_ms / DAY_MS;
    let hours = (diff_ms % DAY_MS) / HOUR_MS;
    let minutes = (diff_ms % HOUR_MS) / MINUTE_MS;

    (
        format!("{}d {}h {}m", days, hours, minutes),
        SubscriptionStatus::Active,
    )
}

/// Copy of `subscriber` with status and remaining time derived for `now`.
pub fn refresh(subscriber: &Subscriber, now: NaiveDateTime) -> Subscriber {
    let (remaining_time, subscription_status) = remaining_and_status(subscriber.expiry_date, now);
    Subscriber {
        remaining_time,
        subscription_status,
        ..subscriber.clone()
    }
}
