use crate::client::BackendClient;
use crate::types::BackendTarget;

/// Makes sure a conversation has a backend session before the main call.
pub struct SessionManager<'a> {
    backend: &'a BackendClient,
}

impl<'a> SessionManager<'a> {
    pub fn new(backend: &'a BackendClient) -> Self {
        Self { backend }
    }

    /// Resolve the session to send with the main call.
    ///
    /// A caller-supplied session is passed through untouched. Otherwise the
    /// reasoning engine gets an empty session id, and document engines get a
    /// freshly created session. Creation failures are logged and the request
    /// continues without a session.
    pub async fn ensure(
        &self,
        target: &BackendTarget,
        session: Option<&str>,
        token: &str,
    ) -> Option<String> {
        if let Some(session) = session.filter(|session| !session.is_empty()) {
            return Some(session.to_string());
        }

        let engine = match target {
            BackendTarget::ReasoningEngine { .. } => return Some(String::new()),
            BackendTarget::DocumentAnswer(engine) | BackendTarget::DocumentStreamAnswer(engine) => {
                engine
            }
        };

        match self.backend.create_session(engine, token).await {
            Ok(name) => {
                log::info!("Created session {}", name);
                Some(name)
            }
            Err(e) => {
                log::warn!("Failed to create session, continuing without one: {}", e);
                None
            }
        }
    }
}
