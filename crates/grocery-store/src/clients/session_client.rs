use crate::model::{Identity, SignupRequest};
use crate::session_actor::{SessionCommand, SessionError, SessionStore};
use async_trait::async_trait;
use grocery_actor::{ActorClient, FrameworkError, StateClient};
use tracing::instrument;

/// Client for the session store.
#[derive(Debug, Clone)]
pub struct SessionClient {
    inner: StateClient<SessionStore>,
}

impl SessionClient {
    pub fn new(inner: StateClient<SessionStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<SessionStore> for SessionClient {
    type Error = SessionError;

    fn inner(&self) -> &StateClient<SessionStore> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        e.downcast_state::<SessionError>()
            .unwrap_or_else(|e| SessionError::ActorCommunicationError(e.to_string()))
    }
}

fn signed_in(identity: Option<Identity>) -> Result<Identity, SessionError> {
    identity.ok_or_else(|| {
        SessionError::ActorCommunicationError("no identity after sign-in".to_string())
    })
}

impl SessionClient {
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let identity = self
            .send(SessionCommand::Login {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        signed_in(identity)
    }

    /// Create an account and sign in as it.
    #[instrument(skip_all, fields(email = %request.email, role = %request.role))]
    pub async fn signup(&self, request: SignupRequest) -> Result<Identity, SessionError> {
        let identity = self.send(SessionCommand::Signup(request)).await?;
        signed_in(identity)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Logout).await.map(|_| ())
    }

    pub async fn current(&self) -> Result<Option<Identity>, SessionError> {
        self.snapshot().await
    }

    #[instrument(skip(self, value))]
    pub async fn apply_external(
        &self,
        value: Option<String>,
    ) -> Result<Option<Identity>, SessionError> {
        self.send(SessionCommand::ApplyExternal(value)).await
    }
}
