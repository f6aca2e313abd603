use chrono::{NaiveDate, NaiveDateTime};
use common::misc::SubscriptionStatus;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Price every subscription is recorded at.
pub const PRICING: &str = "1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    #[serde(deserialize_with = "uuid_or_timestamp")]
    pub id: Uuid,
    pub user_name: String,
    pub phone_number: String,
    pub email: String,
    pub trading_view_id: String,
    pub referral_id: String,
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "empty_date_as_none")]
    pub expiry_date: Option<NaiveDate>,
    pub join_date: NaiveDate,
    #[serde(default = "default_pricing")]
    pub pricing: String,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default)]
    pub remaining_time: String,
}

fn default_pricing() -> String {
    PRICING.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredId {
    Uuid(Uuid),
    /// Millisecond timestamp used as id by older snapshots.
    Timestamp(u64),
}

fn uuid_or_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Uuid, D::Error> {
    Ok(match StoredId::deserialize(deserializer)? {
        StoredId::Uuid(id) => id,
        StoredId::Timestamp(millis) => Uuid::from_u128(u128::from(millis)),
    })
}

/// Older snapshots store a blank string when no expiry was derived.
fn empty_date_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(date) => date.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl Subscriber {
    /// End of the last covered day; the subscription is live through it.
    pub fn covered_until(&self) -> Option<NaiveDateTime> {
        self.expiry_date
            .and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999))
    }

    /// Fields the roster search matches against.
    pub fn searchable_fields(&self) -> [&str; 5] {
        [
            &self.user_name,
            &self.email,
            &self.referral_id,
            &self.phone_number,
            &self.trading_view_id,
        ]
    }
}
