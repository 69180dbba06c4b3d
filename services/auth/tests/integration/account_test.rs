use parcelbox_auth::error::AuthServiceError;
use parcelbox_auth::infra::password::verify_password;
use parcelbox_auth::usecase::account::{CreateAccountInput, CreateAccountUseCase};
use parcelbox_domain::profile::Role;

use crate::helpers::{MockAccountRepo, TEST_PASSWORD, caller, test_account};

fn input(email: &str) -> CreateAccountInput {
    CreateAccountInput {
        email: email.to_owned(),
        password: TEST_PASSWORD.to_owned(),
        first_name: None,
        last_name: None,
        role: None,
    }
}

#[tokio::test]
async fn should_create_customer_account_with_hashed_password() {
    let repo = MockAccountRepo::empty();
    let accounts = repo.accounts_handle();
    let usecase = CreateAccountUseCase { accounts: repo };

    let identity = usecase
        .execute(None, input("  Ana@Example.com "))
        .await
        .unwrap();

    assert_eq!(identity.email, "ana@example.com");
    assert!(!identity.email_verified);

    let stored = accounts.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].signup_role, Role::Customer);
    assert_ne!(stored[0].password_hash, TEST_PASSWORD);
    assert!(verify_password(TEST_PASSWORD, &stored[0].password_hash));
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let existing = test_account("ana@example.com", Role::Customer);
    let usecase = CreateAccountUseCase {
        accounts: MockAccountRepo::new(vec![existing]),
    };

    let result = usecase.execute(None, input("ANA@example.com")).await;
    assert!(
        matches!(result, Err(AuthServiceError::AccountAlreadyExists)),
        "expected AccountAlreadyExists, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_short_password() {
    let usecase = CreateAccountUseCase {
        accounts: MockAccountRepo::empty(),
    };
    let result = usecase
        .execute(
            None,
            CreateAccountInput {
                password: "12345".into(),
                ..input("ana@example.com")
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let usecase = CreateAccountUseCase {
        accounts: MockAccountRepo::empty(),
    };
    let result = usecase.execute(None, input("not-an-email")).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_reject_one_letter_name() {
    let usecase = CreateAccountUseCase {
        accounts: MockAccountRepo::empty(),
    };
    let result = usecase
        .execute(
            None,
            CreateAccountInput {
                first_name: Some("A".into()),
                ..input("ana@example.com")
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_forbid_anonymous_staff_sign_up() {
    let repo = MockAccountRepo::empty();
    let accounts = repo.accounts_handle();
    let usecase = CreateAccountUseCase { accounts: repo };

    let result = usecase
        .execute(
            None,
            CreateAccountInput {
                role: Some(Role::LocationStaff),
                ..input("staff@example.com")
            },
        )
        .await;

    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
    assert!(accounts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_let_admin_create_staff_account() {
    let repo = MockAccountRepo::empty();
    let accounts = repo.accounts_handle();
    let usecase = CreateAccountUseCase { accounts: repo };
    let admin = caller(parcelbox_domain::id::IdentityId::new(), Some(Role::Admin));

    usecase
        .execute(
            Some(admin),
            CreateAccountInput {
                role: Some(Role::LocationStaff),
                first_name: Some(" Lee ".into()),
                ..input("staff@example.com")
            },
        )
        .await
        .unwrap();

    let stored = accounts.lock().unwrap();
    assert_eq!(stored[0].signup_role, Role::LocationStaff);
    assert_eq!(stored[0].first_name.as_deref(), Some("Lee"));
}

#[tokio::test]
async fn should_forbid_admin_granting_super_admin() {
    let usecase = CreateAccountUseCase {
        accounts: MockAccountRepo::empty(),
    };
    let admin = caller(parcelbox_domain::id::IdentityId::new(), Some(Role::Admin));

    let result = usecase
        .execute(
            Some(admin),
            CreateAccountInput {
                role: Some(Role::SuperAdmin),
                ..input("root@example.com")
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
}

#[tokio::test]
async fn should_forbid_location_admin_creating_admin_account() {
    let repo = MockAccountRepo::empty();
    let store = repo.accounts_handle();
    let usecase = CreateAccountUseCase { accounts: repo };
    let location_admin = caller(parcelbox_domain::id::IdentityId::new(), Some(Role::LocationAdmin));

    let result = usecase
        .execute(
            Some(location_admin),
            CreateAccountInput {
                role: Some(Role::Admin),
                ..input("lee@example.com")
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
    assert!(store.lock().unwrap().is_empty());
}
