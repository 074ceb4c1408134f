//! sea-orm entities for the api service's Postgres schema.

pub mod orders;
pub mod otp_challenges;
pub mod users;
