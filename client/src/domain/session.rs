//! Session store: the single source of truth for who is signed in.
//!
//! State machine: `Uninitialized -> Initializing -> {Authenticated, Anonymous}`.
//! After startup the store moves between `Authenticated` and `Anonymous` only
//! through login/register, logout, or a rejection signal from the transport.
//!
//! ## Invariants
//! - `identity` is `Some` only while `phase` is `Authenticated`, and only
//!   after the identity probe succeeded with the current credential.
//! - Clearing the credential always clears the identity.
//! - Login and registration never overlap: a second attempt while one is in
//!   flight fails with [`SessionError::LoginInProgress`].
//! - Logout and rejection end the current session epoch. An attempt that
//!   started in an earlier epoch never publishes its identity; it drops its
//!   token and fails with [`SessionError::SessionEnded`].
//! - `loading` stays true while any session operation is in flight.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::ports::{AuthApi, CredentialStore, RejectionListener, RejectionNotifier};
use super::{Identity, LoginCredentials, Registration, SessionError, WiringError};

/// Lifecycle phase of the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// `initialize` has not run yet.
    Uninitialized,
    /// The persisted credential is being probed.
    Initializing,
    /// A credential is stored and its identity resolved.
    Authenticated,
    /// No usable credential.
    Anonymous,
}

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Where the store is in its lifecycle.
    pub phase: SessionPhase,
    /// Resolved profile; `Some` only while authenticated.
    pub identity: Option<Identity>,
    /// True while a session operation is in flight.
    pub loading: bool,
}

impl SessionSnapshot {
    /// Return whether a probed identity backs this snapshot.
    pub fn is_authenticated(&self) -> bool {
        self.phase == SessionPhase::Authenticated && self.identity.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Uninitialized,
            identity: None,
            loading: true,
        }
    }
}

/// Resets the in-flight flag when a login attempt ends, however it ends.
struct LoginGuard<'a>(&'a AtomicBool);

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Keeps `loading` raised while at least one operation holds it.
struct BusyGuard<'a>(&'a SessionStore);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let busy = &self.0.busy;
        // Counting inside the closure serializes against other guards.
        self.0.state.send_modify(|state| {
            let remaining = busy.fetch_sub(1, Ordering::AcqRel).saturating_sub(1);
            state.loading = remaining > 0;
        });
    }
}

/// Holder of the credential lifecycle and the resolved identity.
pub struct SessionStore {
    auth: Arc<dyn AuthApi>,
    credentials: Arc<dyn CredentialStore>,
    state: watch::Sender<SessionSnapshot>,
    login_in_flight: AtomicBool,
    initialize_started: AtomicBool,
    busy: AtomicUsize,
    epoch: AtomicU64,
}

impl SessionStore {
    /// Build the store and register it as `notifier`'s rejection listener.
    ///
    /// # Errors
    ///
    /// Returns [`WiringError::ListenerAlreadyRegistered`] when another
    /// listener already owns the notifier.
    pub fn new(
        auth: Arc<dyn AuthApi>,
        credentials: Arc<dyn CredentialStore>,
        notifier: &dyn RejectionNotifier,
    ) -> Result<Arc<Self>, WiringError> {
        let (state, _) = watch::channel(SessionSnapshot::default());
        let store = Arc::new(Self {
            auth,
            credentials,
            state,
            login_in_flight: AtomicBool::new(false),
            initialize_started: AtomicBool::new(false),
            busy: AtomicUsize::new(0),
            epoch: AtomicU64::new(0),
        });
        let listener: Arc<dyn RejectionListener> = store.clone();
        let weak: Weak<dyn RejectionListener> = Arc::downgrade(&listener);
        notifier.register_rejection_listener(weak)?;
        Ok(store)
    }

    /// Current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Identity of the signed-in user, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    /// Return whether someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// Gate for authenticated-only features such as uploading.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotAuthenticated`] when nobody is signed in.
    pub fn require_identity(&self) -> Result<Identity, SessionError> {
        self.identity().ok_or(SessionError::NotAuthenticated)
    }

    /// Resolve the persisted credential, if any, into a session.
    ///
    /// Without a stored token the store becomes anonymous without any network
    /// call. A failed probe clears the token and is not reported. The store
    /// leaves the loading state exactly once; later calls are no-ops.
    pub async fn initialize(&self) {
        if self.initialize_started.swap(true, Ordering::AcqRel) {
            debug!("session already initialized");
            return;
        }
        let epoch = self.current_epoch();
        let _busy = self.begin_busy();
        self.state.send_modify(|state| state.phase = SessionPhase::Initializing);

        let stored = match self.credentials.load() {
            Ok(stored) => stored,
            Err(error) => {
                warn!(%error, "could not read persisted credential; starting anonymous");
                None
            }
        };

        let probe = match stored {
            None => None,
            Some(_) => Some(self.auth.current_user().await),
        };

        match probe {
            None => self.settle_anonymous(epoch),
            Some(Ok(identity)) => {
                let username = identity.username.clone();
                if self.publish_identity(epoch, identity) {
                    info!(user = %username, "session restored");
                } else {
                    debug!(user = %username, "session changed while restoring; keeping it");
                }
            }
            Some(Err(error)) if self.current_epoch() == epoch => {
                warn!(%error, "stored credential failed the identity probe");
                self.discard_credential();
                self.settle_anonymous(epoch);
            }
            Some(Err(error)) => {
                debug!(%error, "identity probe failed after the session changed");
            }
        }
    }

    /// Sign in and resolve the identity.
    ///
    /// # Errors
    ///
    /// Fails on invalid input, on an overlapping attempt, or when the service
    /// refuses the credentials; prior state is then left as it was. When the
    /// token is issued but the identity probe fails, the new token is dropped
    /// and the probe error returned. A logout or credential rejection while
    /// the attempt runs ends it with [`SessionError::SessionEnded`].
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, SessionError> {
        let credentials = LoginCredentials::try_from_parts(username, password)?;
        let _guard = self.begin_attempt()?;
        self.run_loading(self.authenticate(&credentials)).await
    }

    /// Create an account, then sign in with the same credentials.
    ///
    /// # Errors
    ///
    /// Account-creation failures are returned as-is and no login is tried.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, SessionError> {
        let registration = Registration::try_from_parts(username, email, password)?;
        self.register_validated(&registration).await
    }

    /// Like [`SessionStore::register`] for a payload validated elsewhere,
    /// such as [`Registration::try_from_form`].
    ///
    /// # Errors
    ///
    /// See [`SessionStore::register`].
    pub async fn register_validated(
        &self,
        registration: &Registration,
    ) -> Result<Identity, SessionError> {
        let _guard = self.begin_attempt()?;
        self.run_loading(async {
            self.auth
                .register(registration)
                .await
                .map_err(SessionError::from)?;
            info!(user = %registration.username(), "account created; signing in");
            self.authenticate(&registration.login_credentials()).await
        })
        .await
    }

    /// Sign out. Server-side invalidation is best effort; local state is
    /// always cleared.
    ///
    /// A login or registration still in flight ends with
    /// [`SessionError::SessionEnded`] instead of signing back in.
    pub async fn logout(&self) {
        let _busy = self.begin_busy();
        self.end_epoch();
        if let Err(error) = self.auth.logout().await {
            warn!(%error, "logout call failed; clearing local session anyway");
        }
        self.discard_credential();
        self.state.send_modify(|state| {
            state.phase = SessionPhase::Anonymous;
            state.identity = None;
        });
        info!("signed out");
    }

    fn begin_attempt(&self) -> Result<LoginGuard<'_>, SessionError> {
        self.login_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::LoginInProgress)?;
        Ok(LoginGuard(&self.login_in_flight))
    }

    fn begin_busy(&self) -> BusyGuard<'_> {
        self.state.send_modify(|state| {
            self.busy.fetch_add(1, Ordering::AcqRel);
            state.loading = true;
        });
        BusyGuard(self)
    }

    async fn run_loading<F>(&self, attempt: F) -> Result<Identity, SessionError>
    where
        F: Future<Output = Result<Identity, SessionError>>,
    {
        let _busy = self.begin_busy();
        attempt.await
    }

    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    fn end_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
    }

    /// Enter `Authenticated` unless the session changed since `epoch`.
    ///
    /// The epoch is compared under the state lock, so a concurrent logout
    /// either fails this check or clears the state afterwards. A published
    /// identity starts a new epoch of its own.
    fn publish_identity(&self, epoch: u64, identity: Identity) -> bool {
        self.state.send_if_modified(|state| {
            if self.current_epoch() != epoch {
                return false;
            }
            self.end_epoch();
            state.phase = SessionPhase::Authenticated;
            state.identity = Some(identity);
            true
        })
    }

    fn settle_anonymous(&self, epoch: u64) {
        self.state.send_if_modified(|state| {
            if self.current_epoch() != epoch {
                return false;
            }
            state.phase = SessionPhase::Anonymous;
            state.identity = None;
            true
        });
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Identity, SessionError> {
        let epoch = self.current_epoch();
        let token = self.auth.login(credentials).await?;
        if self.current_epoch() != epoch {
            debug!("session ended while the token was issued; discarding it");
            return Err(SessionError::SessionEnded);
        }
        self.credentials.save(&token)?;

        match self.auth.current_user().await {
            Ok(identity) => {
                let username = identity.username.clone();
                if self.publish_identity(epoch, identity.clone()) {
                    info!(user = %username, "signed in");
                    Ok(identity)
                } else {
                    debug!(user = %username, "session ended during the identity probe");
                    self.discard_credential();
                    Err(SessionError::SessionEnded)
                }
            }
            Err(error) => {
                warn!(%error, "identity probe failed right after login");
                self.discard_credential();
                self.state.send_modify(|state| {
                    state.phase = SessionPhase::Anonymous;
                    state.identity = None;
                });
                Err(error.into())
            }
        }
    }

    fn discard_credential(&self) {
        if let Err(error) = self.credentials.clear() {
            warn!(%error, "could not remove persisted credential");
        }
    }
}

impl RejectionListener for SessionStore {
    fn credential_rejected(&self) {
        self.end_epoch();
        self.discard_credential();
        self.state.send_modify(|state| {
            state.identity = None;
            if matches!(
                state.phase,
                SessionPhase::Authenticated | SessionPhase::Initializing
            ) {
                state.phase = SessionPhase::Anonymous;
            }
        });
        info!("credential rejected by the service; session cleared");
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
