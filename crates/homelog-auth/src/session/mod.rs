//! Token-backed authentication session with automatic expiry.
//!
//! The session moves between two observable states. Login and restore make it
//! [`SessionStatus::Authenticated`]; logout and expiry return it to
//! [`SessionStatus::Anonymous`]. While authenticated a single-shot timer
//! waits for the permission token's expiration.

mod config;
mod event;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use jiff::Timestamp;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub use self::config::{DEFAULT_LOGIN_ROUTE, DEFAULT_TOKEN_PATH, SessionConfig};
pub use self::event::{ActiveSession, SessionEvent, SessionStatus};
use crate::grant::PermissionStore;
use crate::storage::{StoredTokens, TokenStorage};
use crate::token::{BearerToken, PermissionTokenDecoder};
use crate::{AccessControl, Error, Result, TRACING_TARGET_SESSION};

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Default)]
struct SessionState {
    active: Option<ActiveSession>,
    timer: Option<CancellationToken>,
    /// Bumped on every transition so a superseded timer can tell it is stale.
    generation: u64,
}

impl SessionState {
    /// Ends the current session, returning it.
    fn end(&mut self) -> Option<ActiveSession> {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.generation = self.generation.wrapping_add(1);
        self.active.take()
    }
}

struct SessionInner {
    decoder: PermissionTokenDecoder,
    storage: Arc<dyn TokenStorage>,
    access: AccessControl,
    login_route: String,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    /// Installs `active` and schedules its expiry.
    ///
    /// Runs with the state lock held so grants and events follow the order
    /// of transitions. Lock order is session state, then access control.
    fn install(
        self: &Arc<Self>,
        state: &mut SessionState,
        handle: &Handle,
        active: ActiveSession,
        remaining: Duration,
    ) {
        let user_id = active.user_id();
        let cancel = CancellationToken::new();

        state.end();
        self.access
            .set_permissions(PermissionStore::from_token(&active.claims));
        state.active = Some(active);
        state.timer = Some(cancel.clone());

        spawn_expiry(handle, Arc::downgrade(self), cancel, state.generation, remaining);
        self.publish(SessionEvent::LoggedIn { user_id });
    }

    /// Handles a fired expiry timer.
    fn expire(&self, generation: u64) {
        let mut state = self.lock();
        if state.generation != generation {
            tracing::trace!(
                target: TRACING_TARGET_SESSION,
                generation,
                current = state.generation,
                "ignoring stale expiry timer"
            );
            return;
        }

        let Some(ended) = state.end() else {
            return;
        };

        self.access.clear_permissions();
        if let Err(error) = self.storage.clear() {
            tracing::error!(
                target: TRACING_TARGET_SESSION,
                error = %error,
                "failed to clear tokens of expired session"
            );
        }

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            user_id = ended.user_id(),
            redirect = %self.login_route,
            "session expired"
        );
        self.publish(SessionEvent::Expired {
            redirect: self.login_route.clone(),
        });
    }
}

/// The authentication session of this client.
///
/// Cheap to clone; clones share state. The loaded grant set of the
/// [`AccessControl`] handed in is kept in step with the session: it is set
/// from the permission token on login and cleared on logout and expiry.
#[derive(Clone)]
pub struct AuthSession {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("status", &self.status())
            .field("decoder", &self.inner.decoder)
            .field("storage", &self.inner.storage)
            .field("login_route", &self.inner.login_route)
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Creates an anonymous session.
    ///
    /// `login_route` is published with [`SessionEvent::Expired`].
    pub fn new(
        storage: Arc<dyn TokenStorage>,
        decoder: PermissionTokenDecoder,
        access: AccessControl,
        login_route: impl Into<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let inner = SessionInner {
            decoder,
            storage,
            access,
            login_route: login_route.into(),
            state: Mutex::new(SessionState::default()),
            events,
        };

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Creates an anonymous session from configuration, storing tokens on disk.
    pub fn from_config(config: &SessionConfig, access: AccessControl) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Arc::new(config.storage()),
            config.decoder(),
            access,
            config.login_route.clone(),
        ))
    }

    /// Establishes a session from the tokens issued at login.
    ///
    /// Replaces any current session. Both tokens are persisted.
    ///
    /// # Errors
    ///
    /// Returns a token decode error for a malformed or already expired
    /// permission token, an internal error outside a Tokio runtime and a
    /// storage error if the tokens cannot be persisted. The current session
    /// is left untouched on every error.
    pub fn login(
        &self,
        identity_token: impl Into<BearerToken>,
        permission_token: impl Into<BearerToken>,
    ) -> Result<ActiveSession> {
        let (active, remaining) = self.open(identity_token.into(), permission_token.into())?;
        let handle = runtime()?;
        let tokens = StoredTokens::new(
            active.identity_token.clone(),
            active.permission_token.clone(),
        );

        let mut state = self.inner.lock();
        self.inner.storage.save(&tokens)?;
        self.inner.install(&mut state, &handle, active.clone(), remaining);
        drop(state);

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            user_id = active.user_id(),
            expires_at = %active.expires_at,
            "session established"
        );

        Ok(active)
    }

    /// Ends the session and clears the persisted tokens.
    ///
    /// Calling this while anonymous succeeds and changes nothing observable.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted tokens cannot be removed. The
    /// session has ended and [`SessionEvent::LoggedOut`] is published anyway.
    pub fn logout(&self) -> Result<()> {
        let mut state = self.inner.lock();
        let ended = state.end();
        self.inner.access.clear_permissions();
        let cleared = self.inner.storage.clear();

        if let Some(ended) = ended {
            tracing::info!(
                target: TRACING_TARGET_SESSION,
                user_id = ended.user_id(),
                "session ended"
            );
            self.inner.publish(SessionEvent::LoggedOut);
        }

        cleared
    }

    /// Re-establishes a session from persisted tokens.
    ///
    /// Returns `Ok(None)` and clears the stored state when the tokens are
    /// missing, incomplete, undecodable or expired.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the persisted state cannot be read and an
    /// internal error outside a Tokio runtime.
    pub fn restore(&self) -> Result<Option<ActiveSession>> {
        let handle = runtime()?;
        let mut state = self.inner.lock();
        let stored = self.inner.storage.load()?;
        let had_state = !stored.is_empty();

        let Some((identity_token, permission_token)) = stored.complete() else {
            if had_state {
                tracing::debug!(target: TRACING_TARGET_SESSION, "clearing incomplete token pair");
                self.inner.storage.clear()?;
            }
            return Ok(None);
        };

        let (active, remaining) = match self.open(identity_token, permission_token) {
            Ok(opened) => opened,
            Err(error) if error.kind().is_anonymous() => {
                tracing::debug!(
                    target: TRACING_TARGET_SESSION,
                    error = %error,
                    "discarding persisted session"
                );
                self.inner.storage.clear()?;
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        self.inner.install(&mut state, &handle, active.clone(), remaining);
        drop(state);

        tracing::info!(
            target: TRACING_TARGET_SESSION,
            user_id = active.user_id(),
            expires_at = %active.expires_at,
            "session restored"
        );

        Ok(Some(active))
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        if self.inner.lock().active.is_some() {
            SessionStatus::Authenticated
        } else {
            SessionStatus::Anonymous
        }
    }

    /// Returns a snapshot of the current session.
    #[must_use]
    pub fn current(&self) -> Option<ActiveSession> {
        self.inner.lock().active.clone()
    }

    /// Returns the identity token to authenticate requests with.
    #[must_use]
    pub fn identity_token(&self) -> Option<BearerToken> {
        self.inner
            .lock()
            .active
            .as_ref()
            .map(|active| active.identity_token.clone())
    }

    /// Subscribes to lifecycle events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Returns the access control kept in step with this session.
    #[must_use]
    pub fn access_control(&self) -> &AccessControl {
        &self.inner.access
    }

    /// Returns the route published when the session expires.
    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.inner.login_route
    }

    /// Decodes the permission token and checks it has not expired.
    fn open(
        &self,
        identity_token: BearerToken,
        permission_token: BearerToken,
    ) -> Result<(ActiveSession, Duration)> {
        let claims = self.inner.decoder.decode(permission_token.as_str())?;
        let now = Timestamp::now();
        let (Some(expires_at), Some(remaining)) =
            (claims.expires_at(), claims.remaining_lifetime_at(now))
        else {
            return Err(Error::token_decode("permission token has expired")
                .with_context(format!("user {}", claims.user.id)));
        };

        let active = ActiveSession {
            identity_token,
            permission_token,
            claims,
            expires_at,
        };
        Ok((active, remaining))
    }
}

fn runtime() -> Result<Handle> {
    Handle::try_current()
        .map_err(|e| Error::internal("no Tokio runtime to schedule session expiry").with_source(e))
}

fn spawn_expiry(
    handle: &Handle,
    inner: Weak<SessionInner>,
    cancel: CancellationToken,
    generation: u64,
    remaining: Duration,
) {
    tracing::debug!(
        target: TRACING_TARGET_SESSION,
        generation,
        remaining_ms = remaining.as_millis(),
        "scheduling session expiry"
    );

    handle.spawn(async move {
        tokio::select! {
            () = cancel.cancelled() => {}
            () = tokio::time::sleep(remaining) => {
                if let Some(inner) = inner.upgrade() {
                    inner.expire(generation);
                }
            }
        }
    });
}
