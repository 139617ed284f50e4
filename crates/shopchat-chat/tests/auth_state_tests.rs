mod common;

use common::{ada, FakeAuthApi};
use futures::future::join;
use pretty_assertions::assert_eq;
use shopchat_chat::auth_state::{
    ACCOUNT_EXISTS_MESSAGE, INVALID_CREDENTIALS_MESSAGE, LOGIN_FAILED_MESSAGE,
};
use shopchat_chat::{AuthState, AuthStatus};
use shopchat_types::{AuthUser, ProfileUpdate};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn state_with(api: FakeAuthApi) -> (Rc<FakeAuthApi>, AuthState) {
    let api = Rc::new(api);
    let state = AuthState::new(api.clone());
    (api, state)
}

fn error_sink() -> (Rc<RefCell<Vec<String>>>, impl Fn() -> Box<dyn FnOnce(&str)>) {
    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink_errors = errors.clone();
    let make = move || {
        let errors = sink_errors.clone();
        Box::new(move |msg: &str| errors.borrow_mut().push(msg.to_string())) as Box<dyn FnOnce(&str)>
    };
    (errors, make)
}

#[tokio::test]
async fn test_initialize_restores_cookie_identity() {
    let (_, state) = state_with(FakeAuthApi::default().with_cookie_for(ada()));
    assert_eq!(state.status(), AuthStatus::Unknown);

    state.initialize().await;

    assert!(state.is_authenticated());
    assert_eq!(state.current_user().as_deref(), Some(&ada()));
}

#[tokio::test]
async fn test_initialize_without_cookie_is_anonymous() {
    let (_, state) = state_with(FakeAuthApi::default());
    state.initialize().await;
    assert_eq!(state.status(), AuthStatus::Anonymous);
    assert!(state.current_user().is_none());
}

#[tokio::test]
async fn test_initialize_failure_is_silent() {
    let (api, state) = state_with(FakeAuthApi::default().with_cookie_for(ada()));
    api.unreachable.set(true);

    state.initialize().await;

    assert_eq!(state.status(), AuthStatus::Anonymous);
    assert!(!state.is_auth_dialog_open());
}

#[tokio::test]
async fn test_wrong_password_keeps_state_and_reports() {
    let (_, state) = state_with(FakeAuthApi::default().with_account("correct-horse", ada()));
    state.initialize().await;
    let (errors, sink) = error_sink();

    let ok = state.login("ada@example.com", "wrong", sink()).await;

    assert!(!ok);
    assert_eq!(state.status(), AuthStatus::Anonymous);
    assert_eq!(*errors.borrow(), vec![INVALID_CREDENTIALS_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_failed_login_does_not_sign_out_current_user() {
    let (_, state) = state_with(
        FakeAuthApi::default()
            .with_account("correct-horse", ada())
            .with_cookie_for(ada()),
    );
    state.initialize().await;
    let (errors, sink) = error_sink();

    assert!(!state.login("ada@example.com", "nope", sink()).await);

    assert_eq!(state.current_user().as_deref(), Some(&ada()));
    assert_eq!(errors.borrow().len(), 1);
    assert!(!errors.borrow()[0].is_empty());
}

#[tokio::test]
async fn test_unreachable_backend_reports_login_failure() {
    let (api, state) = state_with(FakeAuthApi::default().with_account("correct-horse", ada()));
    api.unreachable.set(true);
    let (errors, sink) = error_sink();

    assert!(!state.login("ada@example.com", "correct-horse", sink()).await);

    assert_eq!(*errors.borrow(), vec![LOGIN_FAILED_MESSAGE.to_string()]);
    assert!(!state.is_authenticated());
}

#[tokio::test]
async fn test_login_closes_dialog_and_notifies() {
    let (_, state) = state_with(FakeAuthApi::default().with_account("correct-horse", ada()));
    state.initialize().await;
    let notified = Rc::new(Cell::new(0));
    let seen = notified.clone();
    state.subscribe(move |_| seen.set(seen.get() + 1));

    state.trigger_auth();
    assert!(state.is_auth_dialog_open());

    let ok = state
        .login("ada@example.com", "correct-horse", |msg| panic!("unexpected error: {msg}"))
        .await;

    assert!(ok);
    assert!(!state.is_auth_dialog_open());
    assert_eq!(state.current_user().map(|u| u.full_name.clone()), Some("Ada Lovelace".to_string()));
    assert_eq!(notified.get(), 2);
}

#[tokio::test]
async fn test_logout_is_immediate_and_survives_network_failure() {
    let (api, state) = state_with(FakeAuthApi::default().with_cookie_for(ada()));
    state.initialize().await;
    api.unreachable.set(true);

    let request = state.logout();
    assert_eq!(state.status(), AuthStatus::Anonymous);
    assert_eq!(api.logout_calls.get(), 0);

    request.await;

    assert_eq!(api.logout_calls.get(), 1);
    assert_eq!(state.status(), AuthStatus::Anonymous);
}

#[tokio::test]
async fn test_logout_clears_server_session() {
    let (api, state) = state_with(FakeAuthApi::default().with_cookie_for(ada()));
    state.initialize().await;

    state.logout().await;

    assert!(api.signed_in.borrow().is_none());
    let again = AuthState::new(api.clone());
    again.initialize().await;
    assert_eq!(again.status(), AuthStatus::Anonymous);
}

#[tokio::test]
async fn test_trigger_auth_is_ignored_when_signed_in() {
    let (_, state) = state_with(FakeAuthApi::default().with_cookie_for(ada()));
    state.initialize().await;

    state.trigger_auth();
    assert!(!state.is_auth_dialog_open());

    state.logout().await;
    state.trigger_auth();
    assert!(state.is_auth_dialog_open());

    state.close_auth_dialog();
    assert!(!state.is_auth_dialog_open());
    assert_eq!(state.status(), AuthStatus::Anonymous);
}

#[tokio::test]
async fn test_signup_signs_in_new_account() {
    let (api, state) = state_with(FakeAuthApi::default());
    state.initialize().await;
    state.trigger_auth();

    let ok = state
        .signup("Grace Hopper", "grace@example.com", "cobol-1959", |msg| {
            panic!("unexpected error: {msg}")
        })
        .await;

    assert!(ok);
    assert!(!state.is_auth_dialog_open());
    let user = state.current_user().unwrap();
    assert_eq!(user.email, "grace@example.com");
    assert_eq!(user.full_name, "Grace Hopper");
    assert!(api.accounts.borrow().contains_key("grace@example.com"));
}

#[tokio::test]
async fn test_duplicate_signup_reports_existing_account() {
    let (_, state) = state_with(FakeAuthApi::default().with_account("correct-horse", ada()));
    state.initialize().await;
    let (errors, sink) = error_sink();

    let ok = state
        .signup("Ada Again", "ada@example.com", "whatever", sink())
        .await;

    assert!(!ok);
    assert_eq!(state.status(), AuthStatus::Anonymous);
    assert_eq!(*errors.borrow(), vec![ACCOUNT_EXISTS_MESSAGE.to_string()]);
}

#[tokio::test]
async fn test_late_identity_check_does_not_override_login() {
    let (_, state) = state_with(FakeAuthApi::default().with_account("correct-horse", ada()));

    assert!(state.login("ada@example.com", "correct-horse", |_| {}).await);
    state.initialize().await;

    assert_eq!(state.current_user().as_deref(), Some(&ada()));
}

#[tokio::test]
async fn test_update_profile_refreshes_user() {
    let (_, state) = state_with(FakeAuthApi::default().with_cookie_for(ada()));
    state.initialize().await;

    let update = ProfileUpdate {
        name: Some("Augusta Ada King".to_string()),
        password: None,
    };
    state.update_profile(&update).await.unwrap();

    let expected = AuthUser {
        full_name: "Augusta Ada King".to_string(),
        ..ada()
    };
    assert_eq!(state.current_user().as_deref(), Some(&expected));
}

#[tokio::test]
async fn test_update_profile_failure_keeps_user() {
    let (api, state) = state_with(FakeAuthApi::default().with_cookie_for(ada()));
    state.initialize().await;
    api.unreachable.set(true);

    let update = ProfileUpdate {
        name: Some("Someone Else".to_string()),
        password: None,
    };
    assert!(state.update_profile(&update).await.is_err());
    assert_eq!(state.current_user().as_deref(), Some(&ada()));
}

#[tokio::test]
async fn test_delete_account_signs_out() {
    let (api, state) = state_with(
        FakeAuthApi::default()
            .with_account("correct-horse", ada())
            .with_cookie_for(ada()),
    );
    state.initialize().await;

    state.delete_account().await.unwrap();

    assert_eq!(state.status(), AuthStatus::Anonymous);
    assert!(api.accounts.borrow().is_empty());
}

#[tokio::test]
async fn test_logout_during_profile_update_stays_signed_out() {
    let (api, state) = state_with(FakeAuthApi::default().with_cookie_for(ada()));
    state.initialize().await;
    api.yield_after_update.set(true);

    let update = ProfileUpdate {
        name: Some("Augusta Ada King".to_string()),
        password: None,
    };
    let (updated, ()) = join(state.update_profile(&update), async { state.logout().await }).await;

    assert!(updated.is_ok());
    assert_eq!(state.status(), AuthStatus::Anonymous);
    assert_eq!(state.current_user(), None);
}
