use chrono::NaiveDateTime;
use common::error::{AppError, Res};
use db::{
    SnapshotStore,
    models::subscriber::{PRICING, Subscriber},
};
use uuid::Uuid;

use crate::{
    dtos::draft::SubscriberDraft,
    services::{date, referral},
};

/// Ordered subscriber collection, saved in full after every change.
pub struct SubscriberStore<S: SnapshotStore> {
    records: Vec<Subscriber>,
    snapshot: S,
}

impl<S: SnapshotStore> SubscriberStore<S> {
    /// Loads the collection from `snapshot`.
    ///
    /// A snapshot that fails to parse is treated as empty; any other
    /// failure is returned.
    pub fn open(snapshot: S) -> Res<Self> {
        let records = match snapshot.load() {
            Ok(records) => records,
            Err(AppError::MalformedSnapshot(e)) => {
                log::warn!("Ignoring malformed snapshot, starting empty: {}", e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        log::info!("Loaded {} subscribers", records.len());
        Ok(Self { records, snapshot })
    }

    /// All records in insertion order.
    pub fn list(&self) -> &[Subscriber] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&Subscriber> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }

    /// Replaces the record with `id`, or appends a new one when `id` is
    /// `None` or unknown.
    ///
    /// Updates keep the record's id, referral code and join date. New
    /// records get a fresh id, today's join date and, unless the draft
    /// carries an unused one, the next referral code. Expiry, status and
    /// remaining time are always derived from the start date and `now`.
    pub fn upsert(
        &mut self,
        id: Option<Uuid>,
        draft: &SubscriberDraft,
        now: NaiveDateTime,
    ) -> Res<Subscriber> {
        let start_date = draft.validate()?;
        let expiry_date = date::compute_expiry(start_date);
        let (remaining_time, subscription_status) = date::remaining_and_status(expiry_date, now);

        let position = id.and_then(|id| self.records.iter().position(|r| r.id == id));

        let subscriber = match position {
            Some(index) => {
                let existing = &self.records[index];
                Subscriber {
                    id: existing.id,
                    referral_id: existing.referral_id.clone(),
                    join_date: existing.join_date,
                    user_name: draft.user_name.clone(),
                    phone_number: draft.phone_number.clone(),
                    email: draft.email.clone(),
                    trading_view_id: draft.trading_view_id.clone(),
                    start_date,
                    expiry_date,
                    pricing: PRICING.to_string(),
                    subscription_status,
                    remaining_time,
                }
            }
            None => Subscriber {
                id: self.fresh_id(),
                referral_id: self.referral_for(draft),
                join_date: now.date(),
                user_name: draft.user_name.clone(),
                phone_number: draft.phone_number.clone(),
                email: draft.email.clone(),
                trading_view_id: draft.trading_view_id.clone(),
                start_date,
                expiry_date,
                pricing: PRICING.to_string(),
                subscription_status,
                remaining_time,
            },
        };

        let mut records = self.records.clone();
        match position {
            Some(index) => records[index] = subscriber.clone(),
            None => records.push(subscriber.clone()),
        }
        self.commit(records)?;

        match position {
            Some(_) => log::info!("Updated subscriber {}", subscriber.id),
            None => log::info!(
                "Added subscriber {} ({})",
                subscriber.id,
                subscriber.referral_id
            ),
        }
        Ok(subscriber)
    }

    /// Deletes the record with `id`. Returns `false` when there is none.
    pub fn remove(&mut self, id: Uuid) -> Res<bool> {
        let Some(index) = self.records.iter().position(|r| r.id == id) else {
            log::debug!("Subscriber {} not found, nothing removed", id);
            return Ok(false);
        };

        let mut records = self.records.clone();
        records.remove(index);
        self.commit(records)?;

        log::info!("Removed subscriber {}", id);
        Ok(true)
    }

    /// Saves `records` and makes them current only once the save succeeded.
    fn commit(&mut self, records: Vec<Subscriber>) -> Res<()> {
        self.snapshot.save(&records)?;
        self.records = records;
        Ok(())
    }

    fn fresh_id(&self) -> Uuid {
        let mut id = Uuid::new_v4();
        while self.get(id).is_some() {
            id = Uuid::new_v4();
        }
        id
    }

    fn referral_taken(&self, code: &str) -> bool {
        self.records.iter().any(|r| r.referral_id == code)
    }

    fn referral_for(&self, draft: &SubscriberDraft) -> String {
        match draft.referral_id.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() && !self.referral_taken(code) => code.to_string(),
            Some(code) if !code.is_empty() => {
                log::warn!("Referral code {} already in use, allocating a new one", code);
                referral::allocate_unused(self.len(), |c| self.referral_taken(c))
            }
            _ => referral::allocate_unused(self.len(), |c| self.referral_taken(c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use common::misc::SubscriptionStatus;
    use db::MemorySnapshot;

    use super::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn draft(name: &str) -> SubscriberDraft {
        let mut draft = SubscriberDraft::new(now()).with_identity(
            name,
            "555-0100",
            format!("{name}@example.com"),
            format!("{name}_tv"),
        );
        draft.set_start_date(NaiveDate::from_ymd_opt(2024, 1, 15), now());
        draft
    }

    fn store() -> SubscriberStore<MemorySnapshot> {
        SubscriberStore::open(MemorySnapshot::new()).unwrap()
    }

    #[test]
    fn create_appends_with_fresh_identity() {
        let mut store = store();
        let alice = store.upsert(None, &draft("alice"), now()).unwrap();
        let bob = store.upsert(None, &draft("bob"), now()).unwrap();

        assert_ne!(alice.id, bob.id);
        assert_eq!(store.list(), [alice.clone(), bob.clone()]);
        assert_eq!(alice.referral_id, "REF0001");
        assert_eq!(bob.referral_id, "REF0002");
        assert_eq!(alice.join_date, now().date());
        assert_eq!(alice.expiry_date, NaiveDate::from_ymd_opt(2024, 2, 15));
        assert_eq!(alice.subscription_status, SubscriptionStatus::Active);
        assert_eq!(alice.remaining_time, "5d 11h 59m");
        assert_eq!(alice.pricing, "1");
    }

    #[test]
    fn unknown_id_creates_new_record() {
        let mut store = store();
        let created = store.upsert(Some(Uuid::new_v4()), &draft("alice"), now()).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].id, created.id);
    }

    #[test]
    fn update_keeps_id_referral_and_join_date() {
        let mut store = store();
        let original = store.upsert(None, &draft("alice"), now()).unwrap();
        store.upsert(None, &draft("bob"), now()).unwrap();

        let later = now() + chrono::TimeDelta::days(40);
        let mut edit = draft("alicia");
        edit.referral_id = Some("REF9999".to_string());
        edit.set_start_date(NaiveDate::from_ymd_opt(2024, 3, 20), later);
        let updated = store.upsert(Some(original.id), &edit, later).unwrap();

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.referral_id, original.referral_id);
        assert_eq!(updated.join_date, original.join_date);
        assert_eq!(updated.user_name, "alicia");
        assert_eq!(updated.start_date, NaiveDate::from_ymd_opt(2024, 3, 20).unwrap());
        assert_eq!(updated.expiry_date, NaiveDate::from_ymd_opt(2024, 4, 20));
        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0], updated);
    }

    #[test]
    fn invalid_draft_creates_nothing() {
        let mut store = store();
        let mut incomplete = draft("alice");
        incomplete.phone_number.clear();

        let err = store.upsert(None, &incomplete, now()).unwrap_err();

        assert!(matches!(err, AppError::ValidationMissing(_)));
        assert!(store.is_empty());
        assert_eq!(store.snapshot().saves(), 0);
    }

    #[test]
    fn every_mutation_saves_the_whole_collection() {
        let mut store = store();
        let alice = store.upsert(None, &draft("alice"), now()).unwrap();
        store.upsert(None, &draft("bob"), now()).unwrap();
        store.upsert(Some(alice.id), &draft("alice"), now()).unwrap();
        store.remove(alice.id).unwrap();

        assert_eq!(store.snapshot().saves(), 4);
        assert_eq!(store.snapshot().load().unwrap(), store.list());
    }

    #[test]
    fn remove_twice_reports_not_found() {
        let mut store = store();
        let alice = store.upsert(None, &draft("alice"), now()).unwrap();
        store.upsert(None, &draft("bob"), now()).unwrap();

        assert!(store.remove(alice.id).unwrap());
        assert_eq!(store.len(), 1);
        assert!(!store.remove(alice.id).unwrap());
        assert_eq!(store.snapshot().saves(), 3);
    }

    #[test]
    fn referral_codes_stay_unique_after_deletes() {
        let mut store = store();
        let first = store.upsert(None, &draft("a"), now()).unwrap();
        store.upsert(None, &draft("b"), now()).unwrap();
        store.remove(first.id).unwrap();

        let next = store.upsert(None, &draft("c"), now()).unwrap();

        assert_eq!(next.referral_id, "REF0003");
    }

    #[test]
    fn draft_referral_code_is_kept_when_unused() {
        let mut store = store();
        let mut with_code = draft("alice");
        with_code.referral_id = Some("VIP0001".to_string());

        let alice = store.upsert(None, &with_code, now()).unwrap();
        let mut clash = draft("bob");
        clash.referral_id = Some("VIP0001".to_string());
        let bob = store.upsert(None, &clash, now()).unwrap();

        assert_eq!(alice.referral_id, "VIP0001");
        assert_eq!(bob.referral_id, "REF0002");
    }

    #[test]
    fn malformed_snapshot_opens_empty() {
        let store = SubscriberStore::open(MemorySnapshot::with_raw("not json")).unwrap();
        assert!(store.is_empty());
    }

    const MIXED_SNAPSHOT: &str = r#"[
        {"id": 1718000000000, "userName": "alice", "phoneNumber": "555-0100",
         "email": "alice@example.com", "tradingViewId": "alice_tv", "referralId": "REF0001",
         "pricing": "1", "startDate": "2024-01-15", "expiryDate": "2024-02-15",
         "subscriptionStatus": "Active", "joinDate": "2024-01-15"},
        {"id": 1718000000001, "userName": "bob", "phoneNumber": "555-0199",
         "email": "bob@example.com", "tradingViewId": "", "referralId": "REF0002",
         "pricing": "1", "startDate": "2024-01-20", "expiryDate": "",
         "subscriptionStatus": "Active", "joinDate": "2024-01-20"}
    ]"#;

    #[test]
    fn blank_expiry_does_not_drop_the_roster() {
        let mut store = SubscriberStore::open(MemorySnapshot::with_raw(MIXED_SNAPSHOT)).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.list()[0].expiry_date, NaiveDate::from_ymd_opt(2024, 2, 15));
        assert_eq!(store.list()[1].expiry_date, None);
        let (_, status) = date::remaining_and_status(store.list()[1].expiry_date, now());
        assert_eq!(status, SubscriptionStatus::Unknown);

        // saving keeps both records
        store.upsert(None, &draft("carol"), now()).unwrap();
        let saved = store.snapshot().load().unwrap();
        assert_eq!(saved.len(), 3);
        assert_eq!(saved[1].user_name, "bob");
        assert_eq!(saved[2].referral_id, "REF0003");
    }

    #[test]
    fn reopening_restores_order() {
        let mut store = store();
        for name in ["a", "b", "c"] {
            store.upsert(None, &draft(name), now()).unwrap();
        }
        let snapshot = store.snapshot().clone();

        let reopened = SubscriberStore::open(snapshot).unwrap();
        assert_eq!(reopened.list(), store.list());
    }
}
