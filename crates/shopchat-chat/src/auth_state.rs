use futures::future::{FutureExt, LocalBoxFuture};
use shopchat_api::{ApiError, AuthApi};
use shopchat_types::{AuthUser, ProfileUpdate};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";
pub const ACCOUNT_EXISTS_MESSAGE: &str = "An account with this email already exists";
pub const SIGNUP_FAILED_MESSAGE: &str = "Unable to create account";
pub const LOGIN_FAILED_MESSAGE: &str = "Unable to log in, please try again";
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the server, please try again";

#[derive(Debug, Clone, PartialEq)]
pub enum AuthStatus {
    /// Identity check not finished yet
    Unknown,
    Anonymous,
    Authenticated(Rc<AuthUser>),
}

type Listener = Box<dyn Fn(&AuthState)>;

/// Application-wide identity and auth-dialog state.
///
/// Built once when the application starts and shared by `Rc` with every
/// screen that needs to know who is signed in.
pub struct AuthState {
    api: Rc<dyn AuthApi>,
    status: RefCell<AuthStatus>,
    dialog_open: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl AuthState {
    pub fn new(api: Rc<dyn AuthApi>) -> Self {
        Self {
            api,
            status: RefCell::new(AuthStatus::Unknown),
            dialog_open: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn status(&self) -> AuthStatus {
        self.status.borrow().clone()
    }

    pub fn current_user(&self) -> Option<Rc<AuthUser>> {
        match &*self.status.borrow() {
            AuthStatus::Authenticated(user) => Some(Rc::clone(user)),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.status.borrow(), AuthStatus::Authenticated(_))
    }

    pub fn is_auth_dialog_open(&self) -> bool {
        self.dialog_open.get()
    }

    /// Register a callback run after every status or dialog change.
    ///
    /// Listeners must not subscribe further listeners from inside the call.
    pub fn subscribe(&self, listener: impl Fn(&AuthState) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    fn notify(&self) {
        for listener in self.listeners.borrow().iter() {
            listener(self);
        }
    }

    fn set_status(&self, status: AuthStatus) {
        *self.status.borrow_mut() = status;
        self.notify();
    }

    fn sign_in(&self, user: AuthUser) {
        log::info!("Signed in as {}", user.email);
        self.dialog_open.set(false);
        self.set_status(AuthStatus::Authenticated(Rc::new(user)));
    }

    /// Re-establish identity from the ambient session cookie.
    ///
    /// Failures leave the user anonymous without surfacing anything. A result
    /// arriving after a login or logout already decided the state is ignored.
    pub async fn initialize(&self) {
        let status = match self.api.who_am_i().await {
            Ok(Some(user)) => AuthStatus::Authenticated(Rc::new(user)),
            Ok(None) => AuthStatus::Anonymous,
            Err(e) => {
                log::warn!("Identity check failed: {}", e);
                AuthStatus::Anonymous
            }
        };

        if *self.status.borrow() != AuthStatus::Unknown {
            log::debug!("Identity already settled, ignoring identity check result");
            return;
        }
        self.set_status(status);
    }

    /// Log in; failures go to `on_error` and leave the state untouched.
    ///
    /// Returns whether the user is now signed in with these credentials.
    pub async fn login(&self, email: &str, password: &str, on_error: impl FnOnce(&str)) -> bool {
        match self.api.login(email, password).await {
            Ok(user) => {
                self.sign_in(user);
                true
            }
            Err(ApiError::InvalidCredentials) => {
                on_error(INVALID_CREDENTIALS_MESSAGE);
                false
            }
            Err(e) => {
                log::warn!("Login failed: {}", e);
                on_error(if e.is_transport() {
                    UNREACHABLE_MESSAGE
                } else {
                    LOGIN_FAILED_MESSAGE
                });
                false
            }
        }
    }

    /// Create an account and sign in; failures go to `on_error`
    pub async fn signup(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
        on_error: impl FnOnce(&str),
    ) -> bool {
        match self.api.signup(full_name, email, password).await {
            Ok(user) => {
                self.sign_in(user);
                true
            }
            Err(ApiError::AccountExists) => {
                on_error(ACCOUNT_EXISTS_MESSAGE);
                false
            }
            Err(e) => {
                log::warn!("Signup failed: {}", e);
                on_error(if e.is_transport() {
                    UNREACHABLE_MESSAGE
                } else {
                    SIGNUP_FAILED_MESSAGE
                });
                false
            }
        }
    }

    /// Sign out locally right away.
    ///
    /// The returned future only tells the backend; the state is already
    /// anonymous whether or not it is ever polled.
    pub fn logout(&self) -> LocalBoxFuture<'static, ()> {
        self.set_status(AuthStatus::Anonymous);
        let api = Rc::clone(&self.api);
        async move {
            if let Err(e) = api.logout().await {
                log::warn!("Logout request failed: {}", e);
            }
        }
        .boxed_local()
    }

    /// Ask for credentials unless someone is already signed in
    pub fn trigger_auth(&self) {
        if self.is_authenticated() {
            return;
        }
        self.dialog_open.set(true);
        self.notify();
    }

    /// Dismiss the auth dialog, signed in or not
    pub fn close_auth_dialog(&self) {
        self.dialog_open.set(false);
        self.notify();
    }

    /// Change name or password and refresh the held user.
    ///
    /// The held user is only replaced while still signed in, so a logout
    /// during the request stands.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), ApiError> {
        let profile = self.api.update_profile(update).await?;
        if !self.is_authenticated() {
            log::debug!("Signed out during profile update, not restoring the user");
            return Ok(());
        }
        self.set_status(AuthStatus::Authenticated(Rc::new(AuthUser::from(&profile))));
        Ok(())
    }

    /// Delete the account; the user is signed out once the backend confirms
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.api.delete_account().await?;
        log::info!("Account deleted");
        self.set_status(AuthStatus::Anonymous);
        Ok(())
    }
}
