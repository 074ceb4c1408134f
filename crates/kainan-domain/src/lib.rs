//! Domain types shared across the Kainan backend.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod order;
pub mod otp;
pub mod pagination;
