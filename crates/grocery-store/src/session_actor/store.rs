//! [`ActorState`] implementation for the signed-in identity.

use super::SessionError;
use crate::ids;
use crate::model::{Identity, Role, SignupRequest, DEMO_ACCOUNTS};
use crate::storage::{StorageView, IDENTITY_KEY};
use async_trait::async_trait;
use grocery_actor::ActorState;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

pub enum SessionCommand {
    Login { email: String, password: String },
    Signup(SignupRequest),
    Logout,
    /// Adopt a sign-in or sign-out made by another view.
    ApplyExternal(Option<String>),
}

/// Passwords stay out of the command log.
impl std::fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionCommand::Login { email, .. } => f
                .debug_struct("Login")
                .field("email", email)
                .finish_non_exhaustive(),
            SessionCommand::Signup(request) => f.debug_tuple("Signup").field(request).finish(),
            SessionCommand::Logout => f.write_str("Logout"),
            SessionCommand::ApplyExternal(value) => f
                .debug_tuple("ApplyExternal")
                .field(&value.is_some())
                .finish(),
        }
    }
}

/// An account created by signup, kept for the lifetime of the store.
struct Registered {
    identity: Identity,
    password: String,
}

/// The signed-in identity, mirrored to the [`IDENTITY_KEY`] slot while signed in.
pub struct SessionStore {
    current: Option<Identity>,
    registered: Vec<Registered>,
    rng: StdRng,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("current", &self.current)
            .field("registered", &self.registered.len())
            .finish_non_exhaustive()
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl SessionStore {
    pub fn new(rng: StdRng) -> Self {
        Self {
            current: None,
            registered: Vec::new(),
            rng,
        }
    }

    fn new_id(&mut self) -> String {
        ids::base36(&mut self.rng, 9)
    }

    fn email_known(&self, email: &str) -> bool {
        DEMO_ACCOUNTS.iter().any(|a| same_email(a.email, email))
            || self
                .registered
                .iter()
                .any(|r| same_email(&r.identity.email, email))
    }

    fn login(&mut self, email: &str, password: &str) -> Result<Identity, SessionError> {
        if let Some(demo) = DEMO_ACCOUNTS
            .iter()
            .find(|a| same_email(a.email, email) && a.password == password)
        {
            return Ok(Identity {
                id: self.new_id(),
                name: demo.name.to_string(),
                email: demo.email.to_string(),
                role: demo.role,
            });
        }
        self.registered
            .iter()
            .find(|r| same_email(&r.identity.email, email) && r.password == password)
            .map(|r| r.identity.clone())
            .ok_or(SessionError::InvalidCredentials)
    }

    fn signup(&mut self, request: SignupRequest) -> Result<Identity, SessionError> {
        if request.role == Role::Admin {
            return Err(SessionError::RoleNotAllowed(request.role));
        }
        let name = request.name.trim();
        let email = request.email.trim();
        if name.is_empty() || email.is_empty() || request.password.is_empty() {
            return Err(SessionError::InvalidSignup(
                "name, email and password are required".to_string(),
            ));
        }
        if self.email_known(email) {
            return Err(SessionError::EmailInUse(email.to_string()));
        }

        let identity = Identity {
            id: self.new_id(),
            name: name.to_string(),
            email: email.to_string(),
            role: request.role,
        };
        self.registered.push(Registered {
            identity: identity.clone(),
            password: request.password,
        });
        Ok(identity)
    }

    fn sign_in(&mut self, identity: Identity, view: &StorageView) {
        info!(email = %identity.email, role = %identity.role, "Signed in");
        match serde_json::to_string(&identity) {
            Ok(json) => {
                if let Err(e) = view.set(IDENTITY_KEY, json) {
                    warn!(error = %e, "Failed to persist identity");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode identity"),
        }
        self.current = Some(identity);
    }

    fn apply_external(&mut self, value: Option<String>) {
        match value {
            None => {
                if self.current.take().is_some() {
                    info!("Signed out in another view");
                }
            }
            Some(raw) => match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) if self.current.as_ref() != Some(&identity) => {
                    info!(email = %identity.email, "Signed in from another view");
                    self.current = Some(identity);
                }
                Ok(_) => debug!("External identity unchanged"),
                Err(e) => warn!(error = %e, "Ignoring unreadable external identity"),
            },
        }
    }
}

#[async_trait]
impl ActorState for SessionStore {
    type Command = SessionCommand;
    type Reply = Option<Identity>;
    type Snapshot = Option<Identity>;
    type Context = StorageView;
    type Error = SessionError;

    async fn on_start(&mut self, view: &StorageView) -> Result<(), SessionError> {
        if let Some(raw) = view.get(IDENTITY_KEY) {
            match serde_json::from_str::<Identity>(&raw) {
                Ok(identity) => {
                    debug!(email = %identity.email, "Restored session");
                    self.current = Some(identity);
                }
                Err(e) => warn!(error = %e, "Discarding unreadable saved identity"),
            }
        }
        Ok(())
    }

    /// Replies with the identity signed in after the command.
    async fn handle(
        &mut self,
        command: SessionCommand,
        view: &StorageView,
    ) -> Result<Option<Identity>, SessionError> {
        match command {
            SessionCommand::Login { email, password } => {
                let identity = self.login(&email, &password)?;
                self.sign_in(identity, view);
            }
            SessionCommand::Signup(request) => {
                let identity = self.signup(request)?;
                self.sign_in(identity, view);
            }
            SessionCommand::Logout => {
                self.current = None;
                view.remove(IDENTITY_KEY);
                info!("Signed out");
            }
            SessionCommand::ApplyExternal(value) => self.apply_external(value),
        }
        Ok(self.current.clone())
    }

    fn snapshot(&self) -> Option<Identity> {
        self.current.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SharedStorage;
    use rand::SeedableRng;

    fn store() -> SessionStore {
        SessionStore::new(StdRng::seed_from_u64(3))
    }

    fn login(email: &str, password: &str) -> SessionCommand {
        SessionCommand::Login {
            email: email.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn test_demo_login_persists_identity() {
        let view = SharedStorage::new().view();
        let mut store = store();

        let identity = store
            .handle(login("dealer@rks.com", "dealer123"), &view)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(identity.role, Role::Dealer);
        assert_eq!(identity.name, "Dealer User");
        assert_eq!(identity.id.len(), 9);

        let saved: Identity = serde_json::from_str(&view.get(IDENTITY_KEY).unwrap()).unwrap();
        assert_eq!(saved, identity);
    }

    #[tokio::test]
    async fn test_wrong_password_leaves_session_unchanged() {
        let view = SharedStorage::new().view();
        let mut store = store();
        store
            .handle(login("customer@rks.com", "customer123"), &view)
            .await
            .unwrap();
        let before = store.snapshot();

        let err = store
            .handle(login("admin@rks.com", "nope"), &view)
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidCredentials);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_signup_rules() {
        let view = SharedStorage::new().view();
        let mut store = store();
        let request = |email: &str, role| {
            SessionCommand::Signup(SignupRequest {
                name: "Asha".into(),
                email: email.into(),
                password: "pw".into(),
                role,
            })
        };

        assert_eq!(
            store.handle(request("a@b.in", Role::Admin), &view).await,
            Err(SessionError::RoleNotAllowed(Role::Admin))
        );
        assert!(matches!(
            store.handle(request("Customer@RKS.com", Role::Customer), &view).await,
            Err(SessionError::EmailInUse(_))
        ));
        assert_eq!(store.snapshot(), None);

        let created = store
            .handle(request("asha@example.in", Role::Customer), &view)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            store.handle(request("asha@example.in", Role::Dealer), &view).await,
            Err(SessionError::EmailInUse(_))
        ));

        // The registered account can sign back in and keeps its id
        store.handle(SessionCommand::Logout, &view).await.unwrap();
        let again = store
            .handle(login("asha@example.in", "pw"), &view)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again, created);
    }

    #[tokio::test]
    async fn test_logout_removes_key() {
        let view = SharedStorage::new().view();
        let mut store = store();
        store
            .handle(login("admin@rks.com", "admin123"), &view)
            .await
            .unwrap();

        let after = store.handle(SessionCommand::Logout, &view).await.unwrap();
        assert_eq!(after, None);
        assert_eq!(view.get(IDENTITY_KEY), None);
    }

    #[tokio::test]
    async fn test_on_start_restores_saved_identity() {
        let view = SharedStorage::new().view();
        view.set(
            IDENTITY_KEY,
            r#"{"id":"abc123xyz","name":"Admin User","email":"admin@rks.com","role":"admin"}"#
                .into(),
        )
        .unwrap();

        let mut store = store();
        store.on_start(&view).await.unwrap();
        assert_eq!(store.snapshot().map(|i| i.role), Some(Role::Admin));
    }
}
