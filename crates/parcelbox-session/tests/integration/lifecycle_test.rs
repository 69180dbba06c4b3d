use parcelbox_domain::profile::Role;
use parcelbox_session::notice::SessionNotice;
use parcelbox_session::port::{AuthBackend, AuthChange};
use parcelbox_session::SessionState;

use crate::helpers::{PASSWORD, manager, register, spawn_runner, wait_for_state};

#[tokio::test]
async fn should_restore_existing_session_on_init() {
    let manager = manager();
    let identity = register(&manager, "back@example.com", Role::LocationStaff).await;
    manager.backend().authenticate("back@example.com", PASSWORD).await.unwrap();

    let _listener = manager.init().await;

    let state = manager.state();
    let session = state.session().expect("authenticated");
    assert_eq!(session.identity.id, identity.id);
    assert_eq!(session.role(), Some(Role::LocationStaff));
}

#[tokio::test]
async fn should_unsubscribe_when_listener_closes() {
    let manager = manager();
    let listener = manager.init().await;
    assert_eq!(manager.backend().session_subscriber_count(), 1);

    listener.close();
    assert_eq!(manager.backend().session_subscriber_count(), 0);
}

#[tokio::test]
async fn should_apply_sign_in_from_another_client() {
    let manager = manager();
    let identity = register(&manager, "elsewhere@example.com", Role::Customer).await;
    let listener = manager.init().await;
    let runner = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.run(listener).await })
    };
    let mut states = manager.subscribe();

    manager.backend().emit(AuthChange::SignedIn(identity.clone()));

    let state = wait_for_state(&mut states, |s| s.identity_id() == Some(identity.id)).await;
    assert_eq!(state.session().and_then(|s| s.role()), Some(Role::Customer));
    runner.abort();
}

#[tokio::test]
async fn should_apply_sign_out_from_another_client() {
    let manager = manager();
    let identity = register(&manager, "twice@example.com", Role::Customer).await;
    let listener = manager.init().await;
    manager.sign_in("twice@example.com", PASSWORD).await.unwrap();
    let runner = spawn_runner(&manager, listener, &identity).await;
    let mut states = manager.subscribe();

    manager.backend().emit(AuthChange::SignedOut);

    wait_for_state(&mut states, |s| *s == SessionState::Anonymous).await;
    runner.abort();
}

#[tokio::test]
async fn should_pick_up_confirmed_email() {
    let manager = manager();
    let identity = register(&manager, "confirm@example.com", Role::Customer).await;
    let listener = manager.init().await;
    manager.sign_in("confirm@example.com", PASSWORD).await.unwrap();
    let runner = spawn_runner(&manager, listener, &identity).await;
    let mut states = manager.subscribe();

    manager.backend().confirm_email(identity.id);

    wait_for_state(&mut states, |s| {
        s.session().is_some_and(|session| session.identity.email_verified)
    })
    .await;
    runner.abort();
}

#[tokio::test]
async fn should_end_anonymous_when_termination_fails() {
    let manager = manager();
    register(&manager, "stuck@example.com", Role::Customer).await;
    manager.sign_in("stuck@example.com", PASSWORD).await.unwrap();
    manager.backend().fail_next_terminate();
    let mut notices = manager.notices();

    manager.sign_out().await.unwrap();

    assert_eq!(manager.state(), SessionState::Anonymous);
    assert_eq!(notices.recv().await.unwrap(), SessionNotice::SignedOut);
}
