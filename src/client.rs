//! Client facade wiring session, transport, registry, cache, and resolver.

use std::sync::Arc;

use crate::cache::QueryCache;
use crate::config::Settings;
use crate::infra::{ApiError, ApiTransport, HttpTransport, InfraError};
use crate::registry::{CapabilityRegistry, RegistryError};
use crate::session::{Role, Session, SessionState};
use crate::validate::TargetResolver;

/// One client session against the admin API.
///
/// Owns the process-wide singletons (session, capability registry) and the
/// query/mutation cache. All parts share one transport, so the session
/// guard semantics — bearer attachment, clear-on-401 — apply uniformly.
pub struct SubdeskClient {
    session: Arc<Session>,
    transport: Arc<dyn ApiTransport>,
    registry: Arc<CapabilityRegistry>,
    cache: QueryCache,
    resolver: TargetResolver,
}

impl SubdeskClient {
    /// Build a client over the real HTTP transport.
    pub fn new(settings: &Settings) -> Result<Self, InfraError> {
        let session = Arc::new(Session::new());
        let transport = Arc::new(HttpTransport::new(&settings.api, session.clone())?);
        Ok(Self::with_transport(transport, session))
    }

    /// Build a client over any transport; tests drive the whole stack with
    /// an in-memory implementation through this.
    pub fn with_transport(transport: Arc<dyn ApiTransport>, session: Arc<Session>) -> Self {
        Self {
            session,
            registry: Arc::new(CapabilityRegistry::new()),
            cache: QueryCache::new(transport.clone()),
            resolver: TargetResolver::new(transport.clone()),
            transport,
        }
    }

    /// Exchange a one-time code for a session credential and activate it.
    pub async fn login(&self, code: &str) -> Result<SessionState, ApiError> {
        let resp = self.transport.auth(code).await?;
        let state = SessionState {
            token: resp.token,
            role: Role::from(resp.user_type.as_str()),
            id: resp.id,
            name: resp.name,
        };
        self.session.activate(state.clone());
        Ok(state)
    }

    /// Clear the session explicitly. Returns true when a session was
    /// active; listeners are notified the same way a 401 notifies them.
    pub fn logout(&self) -> bool {
        self.session.clear()
    }

    /// Load the capability registry; call once after construction.
    pub async fn load_capabilities(&self) -> Result<(), RegistryError> {
        self.registry.load(self.transport.as_ref()).await
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    pub fn transport(&self) -> &Arc<dyn ApiTransport> {
        &self.transport
    }
}
