use kainan_api::error::ApiError;
use kainan_api::usecase::auth::{
    LoginInput, LoginUseCase, RegisterInput, RegisterUseCase, ResetPasswordInput,
    ResetPasswordUseCase,
};
use kainan_api::usecase::otp::{
    RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use kainan_api::usecase::token::issue_proof_token;
use kainan_api::util::verify_secret;
use kainan_auth_types::token::validate_session_token;
use kainan_domain::otp::OtpPurpose;

use crate::helpers::{MemoryStore, RecordingDispatcher, TEST_SECRET, test_user};

fn register_usecase(store: &MemoryStore) -> RegisterUseCase<crate::helpers::MemoryUserRepo> {
    RegisterUseCase {
        users: store.user_repo(),
        jwt_secret: TEST_SECRET.to_owned(),
    }
}

fn login_usecase(
    store: &MemoryStore,
    require_admin: bool,
) -> LoginUseCase<crate::helpers::MemoryUserRepo> {
    LoginUseCase {
        users: store.user_repo(),
        jwt_secret: TEST_SECRET.to_owned(),
        require_admin,
    }
}

fn register_input(proof_token: &str) -> RegisterInput {
    RegisterInput {
        first_name: "Alice".to_owned(),
        last_name: "Reyes".to_owned(),
        username: "alice".to_owned(),
        email: "alice@example.com".to_owned(),
        phone: "+639171234567".to_owned(),
        password: "secret123".to_owned(),
        proof_token: proof_token.to_owned(),
    }
}

/// Run the full two-phase protocol for an identifier and return the proof.
async fn obtain_proof(store: &MemoryStore, email: &str) -> String {
    let notifier = RecordingDispatcher::new();
    RequestOtpUseCase {
        users: store.user_repo(),
        otps: store.otp_repo(),
        notifier: notifier.clone(),
    }
    .execute(RequestOtpInput {
        identifier: email.to_owned(),
        purpose: OtpPurpose::Register,
    })
    .await
    .unwrap();

    VerifyOtpUseCase {
        otps: store.otp_repo(),
        jwt_secret: TEST_SECRET.to_owned(),
    }
    .execute(VerifyOtpInput {
        identifier: email.to_owned(),
        purpose: OtpPurpose::Register,
        code: notifier.last_code().unwrap(),
    })
    .await
    .unwrap()
}

#[tokio::test]
async fn should_register_through_the_full_two_phase_protocol() {
    let store = MemoryStore::new();
    let proof = obtain_proof(&store, "alice@example.com").await;

    let out = register_usecase(&store)
        .execute(register_input(&proof))
        .await
        .unwrap();

    // Registration doubles as login: the returned session token validates.
    let info = validate_session_token(&out.session_token, TEST_SECRET).unwrap();
    assert_eq!(info.user_id, out.user.id);
    assert!(!info.is_admin);

    let users = store.users.lock().unwrap();
    assert_eq!(users.len(), 1);
    let user = &users[0];
    assert_eq!(user.email, "alice@example.com");
    assert!(user.cart.is_empty());
    assert!(user.addresses.is_empty());
    assert!(!user.is_admin);
    // The password is stored hashed, never verbatim.
    assert_ne!(user.password_hash, "secret123");
    assert!(verify_secret("secret123", &user.password_hash));
}

#[tokio::test]
async fn should_reject_proof_bound_to_a_different_identifier() {
    let store = MemoryStore::new();
    let proof = obtain_proof(&store, "someone-else@example.com").await;

    let result = register_usecase(&store).execute(register_input(&proof)).await;

    assert!(matches!(result, Err(ApiError::InvalidToken)));
    assert!(store.users.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_proof_with_wrong_purpose() {
    let store = MemoryStore::new();
    let proof =
        issue_proof_token("alice@example.com", OtpPurpose::PasswordReset, TEST_SECRET).unwrap();

    let result = register_usecase(&store).execute(register_input(&proof)).await;

    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn should_reject_garbage_proof_token() {
    let store = MemoryStore::new();
    let result = register_usecase(&store)
        .execute(register_input("not-a-jwt"))
        .await;
    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn should_reject_short_password() {
    let store = MemoryStore::new();
    let proof = obtain_proof(&store, "alice@example.com").await;

    let mut input = register_input(&proof);
    input.password = "12345".to_owned();
    let result = register_usecase(&store).execute(input).await;

    assert!(matches!(result, Err(ApiError::PasswordTooShort)));
}

#[tokio::test]
async fn should_reject_username_collision() {
    let store = MemoryStore::new();
    let mut existing = test_user("other@example.com", "alice");
    existing.phone = "+639990000000".to_owned();
    store.seed_user(existing);
    let proof = obtain_proof(&store, "alice@example.com").await;

    let result = register_usecase(&store).execute(register_input(&proof)).await;

    assert!(matches!(result, Err(ApiError::Conflict)));
}

#[tokio::test]
async fn should_login_by_email_or_username() {
    let store = MemoryStore::new();
    store.seed_user(test_user("alice@example.com", "alice"));

    let by_email = login_usecase(&store, false)
        .execute(LoginInput {
            identifier: "Alice@Example.com".to_owned(),
            password: "secret123".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(by_email.user.username, "alice");

    let by_username = login_usecase(&store, false)
        .execute(LoginInput {
            identifier: "alice".to_owned(),
            password: "secret123".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(by_username.user.email, "alice@example.com");
}

#[tokio::test]
async fn should_fail_uniformly_for_unknown_user_and_wrong_password() {
    let store = MemoryStore::new();
    store.seed_user(test_user("alice@example.com", "alice"));

    let unknown = login_usecase(&store, false)
        .execute(LoginInput {
            identifier: "nobody@example.com".to_owned(),
            password: "secret123".to_owned(),
        })
        .await;
    let wrong = login_usecase(&store, false)
        .execute(LoginInput {
            identifier: "alice@example.com".to_owned(),
            password: "wrong-password".to_owned(),
        })
        .await;

    assert!(matches!(unknown, Err(ApiError::InvalidCredentials)));
    assert!(matches!(wrong, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn should_reject_non_admin_on_admin_login() {
    let store = MemoryStore::new();
    store.seed_user(test_user("alice@example.com", "alice"));

    let result = login_usecase(&store, true)
        .execute(LoginInput {
            identifier: "alice@example.com".to_owned(),
            password: "secret123".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_allow_admin_on_admin_login() {
    let store = MemoryStore::new();
    let mut admin = test_user("admin@example.com", "admin");
    admin.is_admin = true;
    store.seed_user(admin);

    let out = login_usecase(&store, true)
        .execute(LoginInput {
            identifier: "admin@example.com".to_owned(),
            password: "secret123".to_owned(),
        })
        .await
        .unwrap();

    let info = validate_session_token(&out.session_token, TEST_SECRET).unwrap();
    assert!(info.is_admin);
}

#[tokio::test]
async fn should_reject_banned_account_at_login() {
    let store = MemoryStore::new();
    let mut banned = test_user("banned@example.com", "banned");
    banned.is_banned = true;
    store.seed_user(banned);

    let result = login_usecase(&store, false)
        .execute(LoginInput {
            identifier: "banned@example.com".to_owned(),
            password: "secret123".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::Forbidden)));
}

#[tokio::test]
async fn should_reset_password_with_reset_proof() {
    let store = MemoryStore::new();
    store.seed_user(test_user("alice@example.com", "alice"));
    let proof =
        issue_proof_token("alice@example.com", OtpPurpose::PasswordReset, TEST_SECRET).unwrap();

    ResetPasswordUseCase {
        users: store.user_repo(),
        jwt_secret: TEST_SECRET.to_owned(),
    }
    .execute(ResetPasswordInput {
        email: "alice@example.com".to_owned(),
        new_password: "brand-new-pass".to_owned(),
        proof_token: proof,
    })
    .await
    .unwrap();

    let old = login_usecase(&store, false)
        .execute(LoginInput {
            identifier: "alice@example.com".to_owned(),
            password: "secret123".to_owned(),
        })
        .await;
    assert!(matches!(old, Err(ApiError::InvalidCredentials)));

    login_usecase(&store, false)
        .execute(LoginInput {
            identifier: "alice@example.com".to_owned(),
            password: "brand-new-pass".to_owned(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn should_reject_registration_proof_for_password_reset() {
    let store = MemoryStore::new();
    store.seed_user(test_user("alice@example.com", "alice"));
    let proof = issue_proof_token("alice@example.com", OtpPurpose::Register, TEST_SECRET).unwrap();

    let result = ResetPasswordUseCase {
        users: store.user_repo(),
        jwt_secret: TEST_SECRET.to_owned(),
    }
    .execute(ResetPasswordInput {
        email: "alice@example.com".to_owned(),
        new_password: "brand-new-pass".to_owned(),
        proof_token: proof,
    })
    .await;

    assert!(matches!(result, Err(ApiError::InvalidToken)));
}
