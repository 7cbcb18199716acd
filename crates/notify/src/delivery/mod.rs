//! Channel transports: SMTP email and HTTP web push.
//!
//! Both transports are configured from the environment and optional: a
//! deployment without `SMTP_HOST` or `PUSH_GATEWAY_URL` simply runs without
//! that channel.

pub mod email;
pub mod push;

pub use email::{EmailConfig, SmtpEmailSender};
pub use push::{HttpPushSender, PushConfig};
