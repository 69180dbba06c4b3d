use parcelbox_auth::error::AuthServiceError;
use parcelbox_auth::usecase::session::{
    CurrentSessionUseCase, ResolveCallerUseCase, SignInInput, SignInUseCase, SignOutUseCase,
};
use parcelbox_auth_types::token::validate_access_token;
use parcelbox_domain::id::SessionId;
use parcelbox_domain::profile::{ProfileStatus, Role};
use parcelbox_testing::fixture::{test_profile, test_profile_with_status};

use crate::helpers::{
    MockAccountRepo, MockProfileRepo, MockSessionRepo, TEST_JWT_SECRET, TEST_PASSWORD,
    TEST_TTL_SECS, expired_session, live_session, test_account, token_for,
};

fn sign_in_usecase(
    accounts: MockAccountRepo,
    sessions: MockSessionRepo,
) -> SignInUseCase<MockAccountRepo, MockSessionRepo> {
    SignInUseCase {
        accounts,
        sessions,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
        session_ttl_secs: TEST_TTL_SECS,
    }
}

// ── SignInUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_sign_in_and_record_session() {
    let account = test_account("ana@example.com", Role::Customer);
    let sessions = MockSessionRepo::empty();
    let stored = sessions.sessions_handle();
    let usecase = sign_in_usecase(MockAccountRepo::new(vec![account.clone()]), sessions);

    let out = usecase
        .execute(SignInInput {
            email: "Ana@example.com".into(),
            password: TEST_PASSWORD.into(),
        })
        .await
        .unwrap();

    assert_eq!(out.identity.id, account.id);
    let info = validate_access_token(&out.access_token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.identity_id, account.id);
    assert_eq!(info.expires_at, out.expires_at);

    let sessions = stored.lock().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id, info.session_id);
    assert_eq!(sessions[0].expires_at.timestamp() as u64, out.expires_at);
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let account = test_account("ana@example.com", Role::Customer);
    let sessions = MockSessionRepo::empty();
    let stored = sessions.sessions_handle();
    let usecase = sign_in_usecase(MockAccountRepo::new(vec![account]), sessions);

    let result = usecase
        .execute(SignInInput {
            email: "ana@example.com".into(),
            password: "wrong-password".into(),
        })
        .await;

    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
    assert!(stored.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_unknown_email_like_wrong_password() {
    let usecase = sign_in_usecase(MockAccountRepo::empty(), MockSessionRepo::empty());
    let result = usecase
        .execute(SignInInput {
            email: "nobody@example.com".into(),
            password: TEST_PASSWORD.into(),
        })
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
}

// ── CurrentSessionUseCase ────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_identity_for_live_session() {
    let account = test_account("ana@example.com", Role::Customer);
    let session = live_session(account.id);
    let usecase = CurrentSessionUseCase {
        accounts: MockAccountRepo::new(vec![account.clone()]),
        sessions: MockSessionRepo::new(vec![session.clone()]),
    };

    let identity = usecase.execute(token_for(&session)).await.unwrap();
    assert_eq!(identity, account.identity());
}

#[tokio::test]
async fn should_reject_expired_session() {
    let account = test_account("ana@example.com", Role::Customer);
    let session = expired_session(account.id);
    let usecase = CurrentSessionUseCase {
        accounts: MockAccountRepo::new(vec![account]),
        sessions: MockSessionRepo::new(vec![session.clone()]),
    };

    let result = usecase.execute(token_for(&session)).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidSession)));
}

#[tokio::test]
async fn should_reject_token_for_another_identity() {
    let ana = test_account("ana@example.com", Role::Customer);
    let bo = test_account("bo@example.com", Role::Customer);
    let session = live_session(ana.id);
    let mut token = token_for(&session);
    token.identity_id = bo.id;

    let usecase = CurrentSessionUseCase {
        accounts: MockAccountRepo::new(vec![ana, bo]),
        sessions: MockSessionRepo::new(vec![session]),
    };
    let result = usecase.execute(token).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidSession)));
}

// ── SignOutUseCase ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_revoke_session_on_sign_out() {
    let account = test_account("ana@example.com", Role::Customer);
    let session = live_session(account.id);
    let sessions = MockSessionRepo::new(vec![session.clone()]);

    SignOutUseCase {
        sessions: sessions.clone(),
    }
    .execute(token_for(&session))
    .await
    .unwrap();

    let current = CurrentSessionUseCase {
        accounts: MockAccountRepo::new(vec![account]),
        sessions,
    };
    let result = current.execute(token_for(&session)).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidSession)));
}

#[tokio::test]
async fn should_reject_sign_out_of_unknown_session() {
    let account = test_account("ana@example.com", Role::Customer);
    let mut session = live_session(account.id);
    session.id = SessionId::new();

    let result = SignOutUseCase {
        sessions: MockSessionRepo::empty(),
    }
    .execute(token_for(&session))
    .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidSession)));
}

// ── ResolveCallerUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_resolve_caller_role_from_profile() {
    let account = test_account("admin@example.com", Role::Admin);
    let session = live_session(account.id);
    let usecase = ResolveCallerUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&account.identity(), Role::Admin)]),
        accounts: MockAccountRepo::new(vec![account.clone()]),
        sessions: MockSessionRepo::new(vec![session.clone()]),
    };

    let caller = usecase.execute(token_for(&session)).await.unwrap();
    assert_eq!(caller.identity_id, account.id);
    assert_eq!(caller.role, Some(Role::Admin));
    assert!(caller.is_admin());
}

#[tokio::test]
async fn should_strip_role_from_suspended_caller() {
    let account = test_account("admin@example.com", Role::Admin);
    let session = live_session(account.id);
    let suspended =
        test_profile_with_status(&account.identity(), Role::Admin, ProfileStatus::Suspended);
    let usecase = ResolveCallerUseCase {
        profiles: MockProfileRepo::new(vec![suspended]),
        accounts: MockAccountRepo::new(vec![account]),
        sessions: MockSessionRepo::new(vec![session.clone()]),
    };

    let caller = usecase.execute(token_for(&session)).await.unwrap();
    assert_eq!(caller.role, None);
    assert!(!caller.is_admin());
}
