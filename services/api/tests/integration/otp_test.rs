use chrono::{Duration, Utc};
use uuid::Uuid;

use kainan_api::domain::types::OTP_MAX_ATTEMPTS;
use kainan_api::error::ApiError;
use kainan_api::usecase::otp::{
    RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use kainan_auth_types::token::validate_proof_token;
use kainan_domain::otp::OtpPurpose;

use crate::helpers::{MemoryStore, RecordingDispatcher, TEST_SECRET, test_user};

fn request_usecase(
    store: &MemoryStore,
    notifier: RecordingDispatcher,
) -> RequestOtpUseCase<
    crate::helpers::MemoryUserRepo,
    crate::helpers::MemoryOtpRepo,
    RecordingDispatcher,
> {
    RequestOtpUseCase {
        users: store.user_repo(),
        otps: store.otp_repo(),
        notifier,
    }
}

fn verify_usecase(store: &MemoryStore) -> VerifyOtpUseCase<crate::helpers::MemoryOtpRepo> {
    VerifyOtpUseCase {
        otps: store.otp_repo(),
        jwt_secret: TEST_SECRET.to_owned(),
    }
}

async fn issue(store: &MemoryStore, notifier: &RecordingDispatcher, email: &str) {
    request_usecase(store, notifier.clone())
        .execute(RequestOtpInput {
            identifier: email.to_owned(),
            purpose: OtpPurpose::Register,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn should_issue_six_digit_code_and_persist_challenge() {
    let store = MemoryStore::new();
    let notifier = RecordingDispatcher::new();

    issue(&store, &notifier, "alice@example.com").await;

    let code = notifier.last_code().unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let otps = store.otps.lock().unwrap();
    assert_eq!(otps.len(), 1);
    let challenge = &otps[0];
    assert_eq!(challenge.identifier, "alice@example.com");
    assert!(challenge.consumed_at.is_none());
    assert!(challenge.expires_at > Utc::now());
    // Only the salted hash is persisted.
    assert_ne!(challenge.code_hash, code);
}

#[tokio::test]
async fn should_keep_exactly_one_active_challenge_per_identifier() {
    let store = MemoryStore::new();
    let notifier = RecordingDispatcher::new();

    issue(&store, &notifier, "alice@example.com").await;
    issue(&store, &notifier, "alice@example.com").await;

    let otps = store.otps.lock().unwrap();
    assert_eq!(otps.len(), 2);
    let active = otps.iter().filter(|c| c.consumed_at.is_none()).count();
    assert_eq!(active, 1, "issuing a second challenge must invalidate the first");
}

#[tokio::test]
async fn should_reject_registration_code_for_registered_email() {
    let store = MemoryStore::new();
    store.seed_user(test_user("alice@example.com", "alice"));

    let result = request_usecase(&store, RecordingDispatcher::new())
        .execute(RequestOtpInput {
            identifier: "Alice@Example.com".to_owned(),
            purpose: OtpPurpose::Register,
        })
        .await;

    assert!(matches!(result, Err(ApiError::AlreadyRegistered)));
}

#[tokio::test]
async fn should_reject_reset_code_for_unknown_email() {
    let store = MemoryStore::new();

    let result = request_usecase(&store, RecordingDispatcher::new())
        .execute(RequestOtpInput {
            identifier: "nobody@example.com".to_owned(),
            purpose: OtpPurpose::PasswordReset,
        })
        .await;

    assert!(matches!(result, Err(ApiError::UserNotFound)));
}

#[tokio::test]
async fn should_not_persist_challenge_when_dispatch_fails() {
    let store = MemoryStore::new();

    let result = request_usecase(&store, RecordingDispatcher::failing())
        .execute(RequestOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::Register,
        })
        .await;

    assert!(matches!(result, Err(ApiError::Unavailable)));
    assert!(
        store.otps.lock().unwrap().is_empty(),
        "a code the user never received must not stay redeemable"
    );
}

#[tokio::test]
async fn should_redeem_correct_code_for_proof_token() {
    let store = MemoryStore::new();
    let notifier = RecordingDispatcher::new();
    issue(&store, &notifier, "alice@example.com").await;
    let code = notifier.last_code().unwrap();

    let token = verify_usecase(&store)
        .execute(VerifyOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::Register,
            code,
        })
        .await
        .unwrap();

    let proof = validate_proof_token(&token, TEST_SECRET, OtpPurpose::Register).unwrap();
    assert_eq!(proof.identifier, "alice@example.com");

    let otps = store.otps.lock().unwrap();
    assert!(otps[0].consumed_at.is_some(), "redeemed challenge must be consumed");
}

#[tokio::test]
async fn should_not_redeem_same_challenge_twice() {
    let store = MemoryStore::new();
    let notifier = RecordingDispatcher::new();
    issue(&store, &notifier, "alice@example.com").await;
    let code = notifier.last_code().unwrap();

    let verify = verify_usecase(&store);
    verify
        .execute(VerifyOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::Register,
            code: code.clone(),
        })
        .await
        .unwrap();

    let second = verify
        .execute(VerifyOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::Register,
            code,
        })
        .await;
    assert!(matches!(second, Err(ApiError::OtpNotFound)));
}

#[tokio::test]
async fn should_reject_wrong_code_and_count_the_attempt() {
    let store = MemoryStore::new();
    let notifier = RecordingDispatcher::new();
    issue(&store, &notifier, "alice@example.com").await;

    let result = verify_usecase(&store)
        .execute(VerifyOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::Register,
            code: "000000".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidCode)));
    assert_eq!(store.otps.lock().unwrap()[0].attempts, 1);
}

#[tokio::test]
async fn should_lock_out_after_five_attempts_even_with_correct_code() {
    let store = MemoryStore::new();
    let notifier = RecordingDispatcher::new();
    issue(&store, &notifier, "alice@example.com").await;
    let correct = notifier.last_code().unwrap();
    let wrong = if correct == "654321" { "123456" } else { "654321" };

    let verify = verify_usecase(&store);
    for _ in 0..OTP_MAX_ATTEMPTS {
        let result = verify
            .execute(VerifyOtpInput {
                identifier: "alice@example.com".to_owned(),
                purpose: OtpPurpose::Register,
                code: wrong.to_owned(),
            })
            .await;
        assert!(matches!(result, Err(ApiError::InvalidCode)));
    }

    // 6th try: right code, but the ceiling is reached — and the challenge
    // stays burned for every call after that.
    for _ in 0..2 {
        let result = verify
            .execute(VerifyOtpInput {
                identifier: "alice@example.com".to_owned(),
                purpose: OtpPurpose::Register,
                code: correct.clone(),
            })
            .await;
        assert!(matches!(result, Err(ApiError::TooManyAttempts)));
    }
}

#[tokio::test]
async fn should_report_missing_challenge() {
    let store = MemoryStore::new();

    let result = verify_usecase(&store)
        .execute(VerifyOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::Register,
            code: "123456".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::OtpNotFound)));
}

#[tokio::test]
async fn should_report_expired_challenge() {
    let store = MemoryStore::new();
    let now = Utc::now();
    store.otps.lock().unwrap().push(kainan_api::domain::types::OtpChallenge {
        id: Uuid::new_v4(),
        identifier: "alice@example.com".to_owned(),
        purpose: OtpPurpose::Register,
        code_hash: kainan_api::util::hash_secret("123456").unwrap(),
        expires_at: now - Duration::seconds(1),
        attempts: 0,
        consumed_at: None,
        created_at: now - Duration::seconds(301),
    });

    let result = verify_usecase(&store)
        .execute(VerifyOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::Register,
            code: "123456".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::OtpExpired)));
}

#[tokio::test]
async fn should_scope_challenges_by_purpose() {
    let store = MemoryStore::new();
    store.seed_user(test_user("alice@example.com", "alice"));
    let notifier = RecordingDispatcher::new();

    // Reset challenge exists; a registration verify must not find it.
    request_usecase(&store, notifier.clone())
        .execute(RequestOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::PasswordReset,
        })
        .await
        .unwrap();
    let code = notifier.last_code().unwrap();

    let result = verify_usecase(&store)
        .execute(VerifyOtpInput {
            identifier: "alice@example.com".to_owned(),
            purpose: OtpPurpose::Register,
            code,
        })
        .await;

    assert!(matches!(result, Err(ApiError::OtpNotFound)));
}
