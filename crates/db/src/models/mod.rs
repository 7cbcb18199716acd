//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts, where rows are created here

pub mod notification;
pub mod notification_log;
pub mod preference;
pub mod push_subscription;
