use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::{Claims, Credential, Role, SharedTokenStore};
use crate::error::{ClientError, DenyReason};
use crate::navigation::{Navigator, Route};
use crate::notify::SharedSink;

/// An authenticated session, derived from the stored credential on every check
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub claims: Claims,
}

impl Session {
    pub fn role(&self) -> Role {
        self.claims.role
    }

    pub fn subject_id(&self) -> &str {
        &self.claims.subject_id
    }

    pub fn email(&self) -> &str {
        &self.claims.email
    }
}

/// Gatekeeper run before any gated view loads data.
///
/// A denial clears the credential (for missing or expired sessions), posts
/// one notice and navigates away.
///
/// Every redirect bumps the guard's epoch. Checks that started in the same
/// epoch (requests already in flight when the session died) share the first
/// redirect; a check started afterwards redirects again.
pub struct SessionGuard {
    store: SharedTokenStore,
    sink: SharedSink,
    navigator: Arc<dyn Navigator>,
    epoch: AtomicU64,
}

impl SessionGuard {
    pub fn new(store: SharedTokenStore, sink: SharedSink, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, sink, navigator, epoch: AtomicU64::new(0) }
    }

    /// Capture before starting a request whose failure may end in `deny_since`
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub fn store(&self) -> &SharedTokenStore {
        &self.store
    }

    /// Side-effect-free check
    pub fn check(&self, required: Option<Role>) -> Result<Session, DenyReason> {
        self.check_at(required, Utc::now())
    }

    pub fn check_at(&self, required: Option<Role>, now: DateTime<Utc>) -> Result<Session, DenyReason> {
        let claims = match self.store.credential_at(now) {
            Credential::Valid { claims, .. } => claims,
            Credential::Absent | Credential::Expired { .. } => return Err(DenyReason::NoSession),
        };

        if let Some(required) = required {
            if !claims.role.satisfies(required) {
                return Err(DenyReason::RoleMismatch);
            }
        }

        Ok(Session { claims })
    }

    pub fn authorize(&self, required: Option<Role>) -> Result<Session, ClientError> {
        let epoch = self.epoch();
        self.check(required).map_err(|reason| {
            self.deny_since(reason, epoch);
            ClientError::Unauthorized(reason)
        })
    }

    /// Deny a check that started in `epoch`.
    ///
    /// A dead session is always cleared. The notice and navigation only run
    /// if no other check from the same epoch has redirected yet.
    pub fn deny_since(&self, reason: DenyReason, epoch: u64) {
        if reason == DenyReason::NoSession {
            if let Err(e) = self.store.clear() {
                tracing::error!("Failed to clear credential: {}", e);
            }
        }

        if self
            .epoch
            .compare_exchange(epoch, epoch.wrapping_add(1), Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("Redirect already issued for epoch {}, suppressing duplicate denial ({})", epoch, reason);
            return;
        }

        tracing::info!("Session guard denied access: {}", reason);
        let target = match reason {
            DenyReason::NoSession => Route::Login,
            // The session itself is fine; send the user to their own home
            DenyReason::RoleMismatch => self
                .store
                .credential()
                .claims()
                .map(|c| Route::home_for(c.role))
                .unwrap_or(Route::Login),
        };
        self.sink.error(&ClientError::Unauthorized(reason).user_message());
        self.navigator.navigate(target);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::{fresh, stale};
    use crate::auth::{MemoryTokenStore, TokenStore};
    use crate::navigation::RecordingNavigator;
    use crate::notify::{NotificationKind, NotificationQueue};
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryTokenStore>,
        queue: Arc<NotificationQueue>,
        nav: Arc<RecordingNavigator>,
        guard: SessionGuard,
    }

    fn fixture(token: Option<String>) -> Fixture {
        let store = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let queue = Arc::new(NotificationQueue::new(Duration::from_secs(60)));
        let nav = Arc::new(RecordingNavigator::new());
        let guard = SessionGuard::new(store.clone(), queue.clone(), nav.clone());
        Fixture { store, queue, nav, guard }
    }

    #[test]
    fn missing_credential_redirects_to_login() {
        let f = fixture(None);
        assert_eq!(f.guard.authorize(None), Err(ClientError::Unauthorized(DenyReason::NoSession)));
        assert_eq!(f.nav.visits(), vec![Route::Login]);
        let notices = f.queue.visible();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, NotificationKind::Error);
        assert!(notices[0].message.contains("session has expired"));
    }

    #[test]
    fn expired_credential_is_denied_for_every_role() {
        for role in [Role::User, Role::Admin] {
            let f = fixture(Some(stale(role)));
            assert_eq!(f.guard.check(None), Err(DenyReason::NoSession));
            assert_eq!(f.guard.check(Some(Role::User)), Err(DenyReason::NoSession));
            f.guard.authorize(Some(Role::User)).unwrap_err();
            assert_eq!(f.store.get().unwrap(), None, "expired token is cleared");
        }
    }

    #[test]
    fn admin_passes_user_guard_but_user_fails_admin_guard() {
        let admin = fixture(Some(fresh(Role::Admin)));
        assert!(admin.guard.check(Some(Role::User)).is_ok());
        assert!(admin.guard.check(Some(Role::Admin)).is_ok());

        let user = fixture(Some(fresh(Role::User)));
        assert!(user.guard.check(Some(Role::User)).is_ok());
        assert_eq!(user.guard.check(Some(Role::Admin)), Err(DenyReason::RoleMismatch));
    }

    #[test]
    fn role_mismatch_keeps_session_and_goes_home() {
        let f = fixture(Some(fresh(Role::User)));
        f.guard.authorize(Some(Role::Admin)).unwrap_err();
        assert!(f.store.get().unwrap().is_some());
        assert_eq!(f.nav.visits(), vec![Route::Feedback]);
        assert_eq!(f.queue.len(), 1);
    }

    #[test]
    fn sequential_denials_each_redirect() {
        let f = fixture(None);
        f.guard.authorize(None).unwrap_err();
        f.guard.authorize(Some(Role::Admin)).unwrap_err();
        assert_eq!(f.nav.visits(), vec![Route::Login, Route::Login]);
        assert_eq!(f.queue.len(), 2);
    }

    #[test]
    fn in_flight_denials_share_one_redirect() {
        let f = fixture(Some(fresh(Role::Admin)));
        let epoch = f.guard.epoch();
        for _ in 0..3 {
            f.guard.deny_since(DenyReason::NoSession, epoch);
        }
        assert_eq!(f.nav.visits(), vec![Route::Login]);
        assert_eq!(f.queue.len(), 1);

        // A check started after the redirect is not covered by it
        f.guard.authorize(None).unwrap_err();
        assert_eq!(f.nav.visits().len(), 2);
    }

    #[test]
    fn suppressed_denial_still_clears_credential() {
        let f = fixture(None);
        let epoch = f.guard.epoch();
        f.guard.deny_since(DenyReason::NoSession, epoch);

        // A late 401 from the old epoch arrives after a new token landed
        f.store.set(&stale(Role::User)).unwrap();
        f.guard.deny_since(DenyReason::NoSession, epoch);
        assert_eq!(f.store.get().unwrap(), None);
        assert_eq!(f.nav.visits().len(), 1);
    }

    #[test]
    fn role_mismatch_then_expiry_clears_token() {
        let f = fixture(Some(fresh(Role::User)));
        f.guard.authorize(Some(Role::Admin)).unwrap_err();
        f.store.set(&stale(Role::User)).unwrap();
        f.guard.authorize(Some(Role::User)).unwrap_err();

        assert_eq!(f.store.get().unwrap(), None, "expired credential is cleared");
        assert_eq!(f.nav.visits(), vec![Route::Feedback, Route::Login]);
        assert_eq!(f.queue.len(), 2);
    }

    #[test]
    fn success_has_no_side_effects() {
        let token = fresh(Role::Admin);
        let f = fixture(Some(token.clone()));
        let session = f.guard.authorize(Some(Role::Admin)).unwrap();
        assert_eq!(session.subject_id(), "u-1");
        assert_eq!(f.store.get().unwrap(), Some(token));
        assert!(f.nav.visits().is_empty());
        assert!(f.queue.is_empty());
    }
}
