pub mod services {
    pub mod date;
    pub mod lifecycle;
    pub mod referral;
    pub mod search;
    pub mod store;
}

pub mod dtos {
    pub mod draft;
}

pub use dtos::draft::SubscriberDraft;
pub use services::{
    lifecycle::{EditState, LifecycleController, Notification},
    store::SubscriberStore,
};
