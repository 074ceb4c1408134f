use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use kainan_core::health::{healthz, readyz};
use kainan_core::middleware::request_id_layer;

use crate::handlers::{
    admin::{assign_rider, delete_user, list_orders, update_order_status},
    auth::{
        admin_login, login, password_reset, password_send_otp, password_verify_otp, register,
        register_send_otp, register_verify_otp,
    },
    me::{add_address, add_cart_item, change_password, get_me, remove_cart_item, update_profile},
    orders::{
        amend_address, cancel_order, confirm_received, list_my_orders, place_direct_order,
        place_order,
    },
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Registration (two-phase) + login
        .route("/auth/register-send-otp", post(register_send_otp))
        .route("/auth/register-verify-otp", post(register_verify_otp))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/admin-login", post(admin_login))
        // Password reset
        .route("/auth/password-send-otp", post(password_send_otp))
        .route("/auth/password-verify-otp", post(password_verify_otp))
        .route("/auth/password-reset", post(password_reset))
        // Profile, address book, cart
        .route("/me", get(get_me))
        .route("/me/profile", patch(update_profile))
        .route("/me/password", patch(change_password))
        .route("/me/address", post(add_address))
        .route("/me/cart", post(add_cart_item))
        .route("/me/cart/{cart_item_id}", delete(remove_cart_item))
        // Orders
        .route("/orders", post(place_order))
        .route("/orders", get(list_my_orders))
        .route("/orders/direct", post(place_direct_order))
        .route("/orders/{order_id}/cancel", patch(cancel_order))
        .route("/orders/{order_id}/address", patch(amend_address))
        .route("/orders/{order_id}/received", patch(confirm_received))
        // Admin
        .route("/admin/orders", get(list_orders))
        .route("/admin/orders/{order_id}/status", patch(update_order_status))
        .route("/admin/orders/{order_id}/rider", patch(assign_rider))
        .route("/admin/users/{user_id}", delete(delete_user))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
