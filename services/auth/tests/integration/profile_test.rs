use parcelbox_auth::error::AuthServiceError;
use parcelbox_auth::usecase::profile::{
    CreateProfileInput, CreateProfileUseCase, GetProfileUseCase, UpdateProfileUseCase,
};
use parcelbox_domain::id::IdentityId;
use parcelbox_domain::profile::{ProfileStatus, ProfileUpdate, Role};
use parcelbox_testing::fixture::test_profile;

use crate::helpers::{MockAccountRepo, MockProfileRepo, caller, test_account};

// ── GetProfileUseCase ────────────────────────────────────────────────────────

#[tokio::test]
async fn should_get_own_profile() {
    let account = test_account("ana@example.com", Role::Customer);
    let profile = test_profile(&account.identity(), Role::Customer);
    let usecase = GetProfileUseCase {
        profiles: MockProfileRepo::new(vec![profile.clone()]),
    };

    let found = usecase.execute(caller(account.id, Some(Role::Customer)), account.id).await.unwrap();
    assert_eq!(found, profile);
}

#[tokio::test]
async fn should_forbid_reading_someone_elses_profile() {
    let ana = test_account("ana@example.com", Role::Customer);
    let bo = test_account("bo@example.com", Role::Customer);
    let usecase = GetProfileUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&bo.identity(), Role::Customer)]),
    };

    let result = usecase.execute(caller(ana.id, Some(Role::Customer)), bo.id).await;
    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
}

#[tokio::test]
async fn should_let_admin_read_any_profile() {
    let bo = test_account("bo@example.com", Role::Customer);
    let usecase = GetProfileUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&bo.identity(), Role::Customer)]),
    };

    let admin = caller(IdentityId::new(), Some(Role::LocationAdmin));
    assert!(usecase.execute(admin, bo.id).await.is_ok());
}

#[tokio::test]
async fn should_report_missing_profile() {
    let usecase = GetProfileUseCase {
        profiles: MockProfileRepo::empty(),
    };
    let id = IdentityId::new();
    let result = usecase.execute(caller(id, None), id).await;
    assert!(matches!(result, Err(AuthServiceError::ProfileNotFound)));
}

// ── CreateProfileUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_profile_with_signup_role_and_names() {
    let mut account = test_account("staff@example.com", Role::LocationStaff);
    account.first_name = Some("Lee".into());
    let profiles = MockProfileRepo::empty();
    let stored = profiles.profiles_handle();
    let usecase = CreateProfileUseCase {
        accounts: MockAccountRepo::new(vec![account.clone()]),
        profiles,
    };

    let profile = usecase
        .execute(
            caller(account.id, None),
            CreateProfileInput {
                id: account.id,
                first_name: None,
                last_name: Some("Park".into()),
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.role, Role::LocationStaff);
    assert_eq!(profile.status, ProfileStatus::Active);
    assert_eq!(profile.first_name.as_deref(), Some("Lee"));
    assert_eq!(profile.last_name.as_deref(), Some("Park"));
    assert_eq!(stored.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_second_profile_for_same_identity() {
    let account = test_account("ana@example.com", Role::Customer);
    let usecase = CreateProfileUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&account.identity(), Role::Customer)]),
        accounts: MockAccountRepo::new(vec![account.clone()]),
    };

    let result = usecase
        .execute(
            caller(account.id, Some(Role::Customer)),
            CreateProfileInput {
                id: account.id,
                first_name: None,
                last_name: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::ProfileAlreadyExists)));
}

#[tokio::test]
async fn should_forbid_creating_profile_for_someone_else() {
    let ana = test_account("ana@example.com", Role::Customer);
    let bo = test_account("bo@example.com", Role::Customer);
    let usecase = CreateProfileUseCase {
        accounts: MockAccountRepo::new(vec![ana.clone(), bo.clone()]),
        profiles: MockProfileRepo::empty(),
    };

    let result = usecase
        .execute(
            caller(ana.id, None),
            CreateProfileInput {
                id: bo.id,
                first_name: None,
                last_name: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
}

// ── UpdateProfileUseCase ─────────────────────────────────────────────────────

#[tokio::test]
async fn should_update_own_names() {
    let account = test_account("ana@example.com", Role::Customer);
    let profile = test_profile(&account.identity(), Role::Customer);
    let profiles = MockProfileRepo::new(vec![profile.clone()]);
    let stored = profiles.profiles_handle();
    let usecase = UpdateProfileUseCase { profiles };

    let updated = usecase
        .execute(
            caller(account.id, Some(Role::Customer)),
            account.id,
            ProfileUpdate {
                first_name: Some("Ana".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.first_name.as_deref(), Some("Ana"));
    assert!(updated.updated_at >= profile.updated_at);
    assert_eq!(stored.lock().unwrap()[0], updated);
}

#[tokio::test]
async fn should_reject_empty_update() {
    let id = IdentityId::new();
    let usecase = UpdateProfileUseCase {
        profiles: MockProfileRepo::empty(),
    };
    let result = usecase.execute(caller(id, None), id, ProfileUpdate::default()).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidInput(_))));
}

#[tokio::test]
async fn should_forbid_customer_changing_own_role() {
    let account = test_account("ana@example.com", Role::Customer);
    let usecase = UpdateProfileUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&account.identity(), Role::Customer)]),
    };

    let result = usecase
        .execute(
            caller(account.id, Some(Role::Customer)),
            account.id,
            ProfileUpdate {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
}

#[tokio::test]
async fn should_let_admin_suspend_customer() {
    let customer = test_account("ana@example.com", Role::Customer);
    let usecase = UpdateProfileUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&customer.identity(), Role::Customer)]),
    };

    let updated = usecase
        .execute(
            caller(IdentityId::new(), Some(Role::Admin)),
            customer.id,
            ProfileUpdate {
                status: Some(ProfileStatus::Suspended),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, ProfileStatus::Suspended);
    assert!(!updated.is_active());
}

#[tokio::test]
async fn should_only_let_super_admin_grant_super_admin() {
    let target = test_account("lee@example.com", Role::Admin);
    let profiles = MockProfileRepo::new(vec![test_profile(&target.identity(), Role::Admin)]);
    let promote = ProfileUpdate {
        role: Some(Role::SuperAdmin),
        ..Default::default()
    };

    let by_admin = UpdateProfileUseCase {
        profiles: profiles.clone(),
    }
    .execute(caller(IdentityId::new(), Some(Role::Admin)), target.id, promote.clone())
    .await;
    assert!(matches!(by_admin, Err(AuthServiceError::Forbidden)));

    let by_root = UpdateProfileUseCase { profiles }
        .execute(caller(IdentityId::new(), Some(Role::SuperAdmin)), target.id, promote)
        .await
        .unwrap();
    assert_eq!(by_root.role, Role::SuperAdmin);
}

#[tokio::test]
async fn should_protect_super_admin_from_lesser_admins() {
    let root = test_account("root@example.com", Role::SuperAdmin);
    let usecase = UpdateProfileUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&root.identity(), Role::SuperAdmin)]),
    };

    let result = usecase
        .execute(
            caller(IdentityId::new(), Some(Role::Admin)),
            root.id,
            ProfileUpdate {
                status: Some(ProfileStatus::Inactive),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
}

#[tokio::test]
async fn should_report_update_of_missing_profile() {
    let usecase = UpdateProfileUseCase {
        profiles: MockProfileRepo::empty(),
    };
    let result = usecase
        .execute(
            caller(IdentityId::new(), Some(Role::Admin)),
            IdentityId::new(),
            ProfileUpdate {
                last_name: Some("Park".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::ProfileNotFound)));
}

#[tokio::test]
async fn should_forbid_location_admin_promoting_self_to_admin() {
    let account = test_account("loc@example.com", Role::LocationAdmin);
    let profiles = MockProfileRepo::new(vec![test_profile(&account.identity(), Role::LocationAdmin)]);
    let store = profiles.profiles_handle();
    let usecase = UpdateProfileUseCase { profiles };

    let result = usecase
        .execute(
            caller(account.id, Some(Role::LocationAdmin)),
            account.id,
            ProfileUpdate {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
    assert_eq!(store.lock().unwrap()[0].role, Role::LocationAdmin);
}

#[tokio::test]
async fn should_forbid_admin_changing_own_status() {
    let account = test_account("lee@example.com", Role::Admin);
    let usecase = UpdateProfileUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&account.identity(), Role::Admin)]),
    };

    let result = usecase
        .execute(
            caller(account.id, Some(Role::Admin)),
            account.id,
            ProfileUpdate {
                status: Some(ProfileStatus::Inactive),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AuthServiceError::Forbidden)));
}

#[tokio::test]
async fn should_forbid_location_admin_granting_admin_to_others() {
    let staff = test_account("staff@example.com", Role::LocationStaff);
    let usecase = UpdateProfileUseCase {
        profiles: MockProfileRepo::new(vec![test_profile(&staff.identity(), Role::LocationStaff)]),
    };
    let promote = |role| ProfileUpdate {
        role: Some(role),
        ..Default::default()
    };

    let to_admin = usecase
        .execute(caller(IdentityId::new(), Some(Role::LocationAdmin)), staff.id, promote(Role::Admin))
        .await;
    assert!(matches!(to_admin, Err(AuthServiceError::Forbidden)));

    let to_location_admin = usecase
        .execute(
            caller(IdentityId::new(), Some(Role::LocationAdmin)),
            staff.id,
            promote(Role::LocationAdmin),
        )
        .await
        .unwrap();
    assert_eq!(to_location_admin.role, Role::LocationAdmin);
}
