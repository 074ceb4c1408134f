pub mod admin_order;
pub mod admin_user;
pub mod auth;
pub mod me;
pub mod order;
pub mod order_number;
pub mod otp;
pub mod token;
