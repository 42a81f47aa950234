use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use draftboard::prelude::*;
use draftboard::{
    ActionKind, FavoriteState, RatingState, ResolutionOrigin, dtransport::StatusCode,
};
use serde_json::{Value, json};

#[derive(Debug, Default)]
struct RoutedServer {
    routes: Mutex<HashMap<String, Value>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RoutedServer {
    fn with_routes(routes: &[(&str, Value)]) -> Arc<Self> {
        let server = Self::default();
        {
            let mut table = server.routes.lock().expect("routes lock");
            for (endpoint, body) in routes {
                table.insert(endpoint.to_string(), body.clone());
            }
        }
        Arc::new(server)
    }

    fn calls(&self, endpoint: &str) -> usize {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .filter(|request| request.endpoint() == endpoint)
            .count()
    }
}

impl HttpTransport for RoutedServer {
    fn send<'a>(
        &'a self,
        request: HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let endpoint = request.endpoint();
            self.requests.lock().expect("requests lock").push(request);

            let routed = self.routes.lock().expect("routes lock").get(&endpoint).cloned();
            Ok(match routed {
                Some(body) => HttpResponse::new(StatusCode::OK, body.to_string()),
                None => HttpResponse::new(StatusCode::NOT_FOUND, "{}"),
            })
        })
    }
}

fn session_file(prefix: &str) -> PathBuf {
    let unique = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir()
        .join(format!("draftboard-{prefix}-{unique}"))
        .join("active_session")
}

fn design_server() -> Arc<RoutedServer> {
    RoutedServer::with_routes(&[
        (
            "GET /chat/sessions",
            json!([
                {"session_id": "s-2", "name": "Packaging"},
                {"session_id": "s-1", "name": "Logo"}
            ]),
        ),
        (
            "GET /chat/session/s-2",
            json!({"messages": [
                {"id": 1, "content": "a folded paper crane", "is_user": true},
                {"id": 2, "content": "Here is your crane", "is_user": false,
                 "image_url": "/static/generated/crane.png", "detected_style": "origami"}
            ]}),
        ),
        (
            "GET /api/ratings",
            json!({"success": true, "ratings": [
                {"image_url": "/static/generated/crane.png", "prompt_relevance": 5,
                 "image_quality": 4, "style_accuracy": 5}
            ]}),
        ),
        ("GET /api/favorites", json!({"favorites": []})),
        (
            "POST /api/generate-image",
            json!({
                "image": "/static/generated/koi.png",
                "message": "A neon koi",
                "style_data": {"detected_style": "neon", "reasons": ["glow", "dark background"]}
            }),
        ),
    ])
}

#[tokio::test]
async fn persisted_session_survives_a_restart() {
    let path = session_file("restart");
    let config = ClientConfig::new("http://unused")
        .with_session_file(&path)
        .with_diagnostics(Diagnostics::Silent);

    let server = design_server();
    let first = build_client_with_transport(
        &config,
        server.clone(),
        Arc::new(RecordingSurface::new()),
        Arc::new(AlwaysConfirm),
    );
    let resolution = first
        .controller
        .initialize()
        .await
        .expect("first startup resolves");
    assert_eq!(resolution.origin, ResolutionOrigin::Latest);
    assert_eq!(resolution.session_id.as_str(), "s-2");

    let surface = Arc::new(RecordingSurface::new());
    let second = build_client_with_transport(
        &config,
        server.clone(),
        surface.clone(),
        Arc::new(AlwaysConfirm),
    );
    let resolution = second
        .controller
        .initialize()
        .await
        .expect("second startup resolves");

    assert_eq!(resolution.origin, ResolutionOrigin::Persisted);
    assert_eq!(resolution.session_id.as_str(), "s-2");
    assert_eq!(server.calls("POST /chat/new"), 0);
    assert_eq!(server.calls("GET /chat/session/s-2"), 2);

    let messages = surface.messages();
    assert_eq!(messages.len(), 2);
    assert!(
        messages[1]
            .rating
            .as_ref()
            .is_some_and(RatingState::is_submitted)
    );
    assert_eq!(messages[1].favorite, Some(FavoriteState::NotFavorited));

    let _ = std::fs::remove_dir_all(path.parent().expect("slot has a parent"));
}

#[tokio::test]
async fn send_through_facade_appends_both_turns_and_binds_image_actions() {
    let server = design_server();
    let surface = Arc::new(RecordingSurface::new());
    let bundle = build_client_with_transport(
        &ClientConfig::new("http://unused").with_csrf_token("tok-3"),
        server.clone(),
        surface.clone(),
        Arc::new(AlwaysConfirm),
    );

    bundle.controller.initialize().await.expect("startup");
    let turn = bundle
        .controller
        .send_message("  a neon koi logo ", "auto")
        .await
        .expect("generation succeeds");

    assert_eq!(turn.session_id.as_str(), "s-2");
    assert_eq!(turn.user.message.text, "a neon koi logo");
    assert_eq!(
        turn.assistant.message.image_ref.as_ref().map(ImageRef::as_str),
        Some("/static/generated/koi.png")
    );

    let bound: Vec<ActionKind> = turn.assistant.actions.iter().map(|(kind, _)| *kind).collect();
    assert!(bound.contains(&ActionKind::Rate));
    assert!(bound.contains(&ActionKind::Favorite));
    assert!(bound.contains(&ActionKind::StyleFeedback));

    assert!(!bundle.store.is_generating());
    assert!(!surface.is_loading());
    assert_eq!(surface.messages().len(), 4);
}
