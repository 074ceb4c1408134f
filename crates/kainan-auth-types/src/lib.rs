//! Token types shared between the token issuer and every consumer.

pub mod bearer;
pub mod token;
