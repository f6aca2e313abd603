use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use common::{
    clock::Clock,
    error::{AppError, Res},
};
use db::{SnapshotStore, models::subscriber::Subscriber};
use uuid::Uuid;

use crate::{
    dtos::draft::SubscriberDraft,
    services::{date, search, store::SubscriberStore},
};

pub const ADDED_MESSAGE: &str = "Subscriber added successfully!";
pub const UPDATED_MESSAGE: &str = "Subscriber updated successfully!";

/// What the controller is currently doing with its draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    /// Draft describes a new subscriber.
    Idle,
    /// Draft was loaded from the subscriber with this id.
    Editing(Uuid),
    /// Transient state while a draft is committed.
    Submitting,
}

/// Success message with the moment it was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub shown_at: NaiveDateTime,
}

/// Drives the add/edit form: holds the draft and the edit target and
/// commits through the store.
pub struct LifecycleController<S: SnapshotStore> {
    store: SubscriberStore<S>,
    clock: Rc<dyn Clock>,
    state: EditState,
    draft: SubscriberDraft,
    notification: Option<Notification>,
    notification_ttl: TimeDelta,
}

impl<S: SnapshotStore> LifecycleController<S> {
    pub fn new(
        store: SubscriberStore<S>,
        clock: Rc<dyn Clock>,
        notification_ttl: TimeDelta,
    ) -> Self {
        let draft = SubscriberDraft::new(clock.now());
        Self {
            store,
            clock,
            state: EditState::Idle,
            draft,
            notification: None,
            notification_ttl,
        }
    }

    /// Loads the store from `snapshot` and starts idle.
    pub fn open(snapshot: S, clock: Rc<dyn Clock>, notification_ttl: TimeDelta) -> Res<Self> {
        let store = SubscriberStore::open(snapshot)?;
        Ok(Self::new(store, clock, notification_ttl))
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn draft(&self) -> &SubscriberDraft {
        &self.draft
    }

    pub fn store(&self) -> &SubscriberStore<S> {
        &self.store
    }

    /// Number of subscribers on record.
    pub fn total(&self) -> usize {
        self.store.len()
    }

    fn ensure_editable(&self, field: &str) -> Res<()> {
        match self.state {
            EditState::Editing(_) => Err(AppError::Forbidden(field.to_string())),
            _ => Ok(()),
        }
    }

    pub fn set_user_name(&mut self, value: impl Into<String>) -> Res<()> {
        self.ensure_editable("userName")?;
        self.draft.user_name = value.into();
        Ok(())
    }

    pub fn set_phone_number(&mut self, value: impl Into<String>) -> Res<()> {
        self.ensure_editable("phoneNumber")?;
        self.draft.phone_number = value.into();
        Ok(())
    }

    pub fn set_email(&mut self, value: impl Into<String>) -> Res<()> {
        self.ensure_editable("email")?;
        self.draft.email = value.into();
        Ok(())
    }

    pub fn set_trading_view_id(&mut self, value: impl Into<String>) -> Res<()> {
        self.ensure_editable("tradingViewId")?;
        self.draft.trading_view_id = value.into();
        Ok(())
    }

    /// Moves the draft's start date; expiry, status and remaining time follow.
    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.draft.set_start_date(start_date, self.clock.now());
    }

    /// Loads the subscriber with `id` into the draft.
    pub fn start_edit(&mut self, id: Uuid) -> Res<()> {
        let subscriber = self
            .store
            .get(id)
            .ok_or_else(|| AppError::NotFound(id.to_string()))?;

        self.draft = SubscriberDraft::from_subscriber(subscriber, self.clock.now());
        self.state = EditState::Editing(id);
        log::debug!("Editing subscriber {}", id);
        Ok(())
    }

    /// Drops the draft and goes back to adding a new subscriber.
    pub fn cancel_edit(&mut self) {
        self.state = EditState::Idle;
        self.draft = SubscriberDraft::new(self.clock.now());
    }

    /// Commits the current draft: updates the edit target, or creates a
    /// new subscriber when idle.
    ///
    /// On success the controller is idle with a fresh draft and a success
    /// notification. On failure nothing changes.
    pub fn submit(&mut self) -> Res<Subscriber> {
        let target = match self.state {
            EditState::Editing(id) => Some(id),
            _ => None,
        };
        let previous = std::mem::replace(&mut self.state, EditState::Submitting);

        let now = self.clock.now();
        let subscriber = match self.store.upsert(target, &self.draft, now) {
            Ok(subscriber) => subscriber,
            Err(e) => {
                self.state = previous;
                return Err(e);
            }
        };

        self.state = EditState::Idle;
        self.draft = SubscriberDraft::new(now);
        let message = match target {
            Some(_) => UPDATED_MESSAGE,
            None => ADDED_MESSAGE,
        };
        self.notification = Some(Notification {
            message: message.to_string(),
            shown_at: now,
        });
        Ok(subscriber)
    }

    /// Replaces the draft with `draft` and submits it.
    ///
    /// While editing, the identity fields must match the record being edited.
    pub fn submit_draft(&mut self, mut draft: SubscriberDraft) -> Res<Subscriber> {
        if let EditState::Editing(id) = self.state {
            let subscriber = self
                .store
                .get(id)
                .ok_or_else(|| AppError::NotFound(id.to_string()))?;
            if !draft.same_identity(subscriber) {
                return Err(AppError::Forbidden(
                    "identity fields cannot change while editing".to_string(),
                ));
            }
        }

        draft.refresh(self.clock.now());
        self.draft = draft;
        self.submit()
    }

    /// Deletes the subscriber with `id`; editing it is abandoned.
    pub fn remove(&mut self, id: Uuid) -> Res<bool> {
        let removed = self.store.remove(id)?;
        if removed && self.state == EditState::Editing(id) {
            self.cancel_edit();
        }
        Ok(removed)
    }

    /// Subscriber with `id`, status and remaining time as of now.
    pub fn view(&self, id: Uuid) -> Res<Subscriber> {
        self.store
            .get(id)
            .map(|subscriber| date::refresh(subscriber, self.clock.now()))
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    /// Subscribers matching `term`, in order, with status and remaining time as of now.
    pub fn rows(&self, term: &str) -> Vec<Subscriber> {
        let now = self.clock.now();
        search::filter(self.store.list(), term)
            .into_iter()
            .map(|subscriber| date::refresh(subscriber, now))
            .collect()
    }

    /// Message of the last success, until its display time runs out.
    pub fn notification(&self) -> Option<&str> {
        let notification = self.notification.as_ref()?;
        if self.clock.now() - notification.shown_at < self.notification_ttl {
            Some(notification.message.as_str())
        } else {
            None
        }
    }

    pub fn clear_notification(&mut self) {
        self.notification = None;
    }
}
