use chrono::{NaiveDate, NaiveDateTime};
use common::{
    error::{AppError, Res},
    misc::SubscriptionStatus,
};
use db::models::subscriber::{PRICING, Subscriber};

use crate::services::date;

/// Subscriber fields being edited before they are committed.
///
/// Identity fields are free-form; expiry, remaining time, status and pricing
/// only change through [`SubscriberDraft::set_start_date`].
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberDraft {
    pub user_name: String,
    pub phone_number: String,
    pub email: String,
    pub trading_view_id: String,
    /// Set when the draft was loaded from an existing record.
    pub referral_id: Option<String>,
    start_date: Option<NaiveDate>,
    expiry_date: Option<NaiveDate>,
    remaining_time: String,
    subscription_status: SubscriptionStatus,
    pricing: String,
}

impl SubscriberDraft {
    /// Blank draft starting today.
    pub fn new(now: NaiveDateTime) -> Self {
        let mut draft = Self {
            user_name: String::new(),
            phone_number: String::new(),
            email: String::new(),
            trading_view_id: String::new(),
            referral_id: None,
            start_date: Some(now.date()),
            expiry_date: None,
            remaining_time: String::new(),
            subscription_status: SubscriptionStatus::Unknown,
            pricing: PRICING.to_string(),
        };
        draft.refresh(now);
        draft
    }

    /// Draft holding the fields of an existing record.
    pub fn from_subscriber(subscriber: &Subscriber, now: NaiveDateTime) -> Self {
        let mut draft = Self {
            user_name: subscriber.user_name.clone(),
            phone_number: subscriber.phone_number.clone(),
            email: subscriber.email.clone(),
            trading_view_id: subscriber.trading_view_id.clone(),
            referral_id: Some(subscriber.referral_id.clone()),
            start_date: Some(subscriber.start_date),
            expiry_date: subscriber.expiry_date,
            remaining_time: subscriber.remaining_time.clone(),
            subscription_status: subscriber.subscription_status,
            pricing: subscriber.pricing.clone(),
        };
        draft.refresh(now);
        draft
    }

    /// Sets the four identity fields in one go.
    pub fn with_identity(
        mut self,
        user_name: impl Into<String>,
        phone_number: impl Into<String>,
        email: impl Into<String>,
        trading_view_id: impl Into<String>,
    ) -> Self {
        self.user_name = user_name.into();
        self.phone_number = phone_number.into();
        self.email = email.into();
        self.trading_view_id = trading_view_id.into();
        self
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date
    }

    pub fn remaining_time(&self) -> &str {
        &self.remaining_time
    }

    pub fn subscription_status(&self) -> SubscriptionStatus {
        self.subscription_status
    }

    pub fn pricing(&self) -> &str {
        &self.pricing
    }

    /// Changes the start date and re-derives everything that hangs off it.
    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>, now: NaiveDateTime) {
        self.start_date = start_date;
        self.refresh(now);
    }

    /// Re-derives expiry, remaining time, status and pricing for `now`.
    pub fn refresh(&mut self, now: NaiveDateTime) {
        self.expiry_date = self.start_date.and_then(date::compute_expiry);
        let (remaining_time, status) = date::remaining_and_status(self.expiry_date, now);
        self.remaining_time = remaining_time;
        self.subscription_status = status;
        self.pricing = PRICING.to_string();
    }

    /// Checks that every required field is filled and returns the start date.
    pub fn validate(&self) -> Res<NaiveDate> {
        let required = [
            ("userName", &self.user_name),
            ("phoneNumber", &self.phone_number),
            ("email", &self.email),
            ("tradingViewId", &self.trading_view_id),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(AppError::ValidationMissing(field.to_string()));
        }

        self.start_date
            .ok_or_else(|| AppError::ValidationMissing("startDate".to_string()))
    }

    /// Whether the identity fields match those of `subscriber`.
    pub fn same_identity(&self, subscriber: &Subscriber) -> bool {
        self.user_name == subscriber.user_name
            && self.phone_number == subscriber.phone_number
            && self.email == subscriber.email
            && self.trading_view_id == subscriber.trading_view_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_draft_starts_today_and_is_active() {
        let now = at(2024, 1, 31, 9);
        let draft = SubscriberDraft::new(now);

        assert_eq!(draft.start_date(), Some(now.date()));
        assert_eq!(draft.expiry_date(), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(draft.subscription_status(), SubscriptionStatus::Active);
        assert_eq!(draft.pricing(), "1");
        assert!(draft.user_name.is_empty());
    }

    #[test]
    fn changing_start_date_rederives_fields() {
        let now = at(2024, 3, 1, 12);
        let mut draft = SubscriberDraft::new(now);

        draft.set_start_date(NaiveDate::from_ymd_opt(2024, 1, 1), now);

        assert_eq!(draft.expiry_date(), NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(draft.subscription_status(), SubscriptionStatus::Expired);
        assert_eq!(draft.remaining_time(), "Expired");
    }

    #[test]
    fn clearing_start_date_leaves_status_unknown() {
        let now = at(2024, 3, 1, 12);
        let mut draft = SubscriberDraft::new(now);

        draft.set_start_date(None, now);

        assert_eq!(draft.expiry_date(), None);
        assert_eq!(draft.subscription_status(), SubscriptionStatus::Unknown);
    }

    #[test]
    fn validation_names_first_missing_field() {
        let now = at(2024, 3, 1, 12);
        let draft = SubscriberDraft::new(now).with_identity("alice", "555", "  ", "tv");

        let err = draft.validate().unwrap_err();
        assert!(matches!(err, AppError::ValidationMissing(ref f) if f == "email"));
    }

    #[test]
    fn validation_requires_start_date() {
        let now = at(2024, 3, 1, 12);
        let mut draft = SubscriberDraft::new(now).with_identity("alice", "555", "a@x.io", "tv");
        assert_eq!(draft.validate().unwrap(), now.date());

        draft.set_start_date(None, now);
        let err = draft.validate().unwrap_err();
        assert!(matches!(err, AppError::ValidationMissing(ref f) if f == "startDate"));
    }
}
