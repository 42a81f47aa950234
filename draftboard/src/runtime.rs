//! Wiring helpers that assemble a ready-to-use chat client.

use std::sync::Arc;

use dchat::{ChatController, Confirm, DesignApi, RenderSurface, SessionResolver};
use dsession::SessionStore;
use dtransport::{
    HttpTransport, ReqwestTransport, ResilientTransport, SecurityContext, TransportError,
};
use reqwest::Client;

use crate::ClientConfig;

#[derive(Debug, Clone)]
pub struct ClientBundle {
    pub api: Arc<DesignApi>,
    pub store: Arc<SessionStore>,
    pub controller: Arc<ChatController>,
}

/// Builds a client that talks to `config.base_url` over reqwest.
pub fn build_client(
    config: &ClientConfig,
    surface: Arc<dyn RenderSurface>,
    confirm: Arc<dyn Confirm>,
) -> Result<ClientBundle, TransportError> {
    config.validate()?;

    let http = Client::builder()
        .build()
        .map_err(|err| TransportError::invalid_request(err.to_string()))?;
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(http, config.base_url.trim()));

    tracing::info!(
        phase = "runtime",
        event = "client_built",
        base_url = %config.base_url,
        max_retries = config.max_retries,
        timeout_ms = config.timeout_ms,
    );

    Ok(build_client_with(
        config,
        transport,
        config.security_context(),
        surface,
        confirm,
    ))
}

pub fn build_client_with_transport(
    config: &ClientConfig,
    transport: Arc<dyn HttpTransport>,
    surface: Arc<dyn RenderSurface>,
    confirm: Arc<dyn Confirm>,
) -> ClientBundle {
    build_client_with(
        config,
        transport,
        config.security_context(),
        surface,
        confirm,
    )
}

pub fn build_client_with(
    config: &ClientConfig,
    transport: Arc<dyn HttpTransport>,
    security: SecurityContext,
    surface: Arc<dyn RenderSurface>,
    confirm: Arc<dyn Confirm>,
) -> ClientBundle {
    let resilient = ResilientTransport::new(transport)
        .with_policy(config.retry_policy())
        .with_hooks(config.transport_hooks());

    let api = Arc::new(DesignApi::new(resilient, security));
    let store = Arc::new(config.session_store());
    let resolver = SessionResolver::new(Arc::clone(&api), Arc::clone(&store))
        .with_default_name(config.default_session_name.clone());

    let controller = ChatController::new(Arc::clone(&api), Arc::clone(&store), surface, confirm)
        .with_resolver(resolver)
        .with_notification_ttl(config.notification_ttl());

    ClientBundle {
        api,
        store,
        controller: Arc::new(controller),
    }
}
