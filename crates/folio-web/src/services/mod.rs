//! Clients for the third-party providers the API hands work to.

pub mod mailer;
pub mod media;
