//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod notification_log_repo;
pub mod notification_preference_repo;
pub mod notification_repo;
pub mod push_subscription_repo;

pub use notification_log_repo::NotificationLogRepo;
pub use notification_preference_repo::NotificationPreferenceRepo;
pub use notification_repo::NotificationRepo;
pub use push_subscription_repo::PushSubscriptionRepo;
