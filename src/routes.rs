use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::info;

use crate::{
    curate::{CurationOutcome, handle_curation},
    error::AppError,
    frame::Frame,
    models::{ActionKind, ActionMetadata, ActionResponse},
    state::{AppState, CURATE_ACTION_PATH, CURATE_FRAME_PATH, INSTALL_FRAME_PATH},
    utils::get_context_from_body,
    views::{confirmation_frame, install_frame, prompt_frame, test_frame},
};

pub async fn curate_frame_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Frame, AppError> {
    let context = get_context_from_body(body)?;

    let outcome = handle_curation(&context, state.resolver.as_ref(), state.store.as_ref()).await?;

    Ok(match outcome {
        CurationOutcome::Prompt { caster } => {
            prompt_frame(&caster, &state.url(CURATE_FRAME_PATH))
        }
        CurationOutcome::Curated { record } => confirmation_frame(&record),
    })
}

pub async fn install_frame_handler(State(state): State<Arc<AppState>>) -> Frame {
    install_frame(&state.url(CURATE_ACTION_PATH))
}

pub async fn test_frame_handler(State(state): State<Arc<AppState>>) -> Frame {
    test_frame(&state.url(CURATE_ACTION_PATH))
}

pub async fn action_metadata_handler(State(state): State<Arc<AppState>>) -> Json<ActionMetadata> {
    Json(ActionMetadata {
        name: "Curate",
        icon: "smiley",
        description: "Curate a cast with your commentary",
        about_url: state.url(INSTALL_FRAME_PATH),
        action: ActionKind { kind: "post" },
    })
}

pub async fn curate_action_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let context = match get_context_from_body(body) {
        Ok(context) => context,
        Err(e) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "message": e.to_string() })))
                .into_response();
        }
    };

    info!(
        "Cast Action to {} (fid {}) from {}",
        context.cast_id.hash, context.cast_id.fid, context.fid
    );

    Json(ActionResponse {
        kind: "frame",
        frame_url: state.url(CURATE_FRAME_PATH),
    })
    .into_response()
}

pub async fn health_handler() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, header::CONTENT_TYPE},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        app,
        config::Config,
        curate::tests::{FakeResolver, RecordingStore, StoreCall},
    };

    fn config() -> Config {
        Config::from_lookup(
            |key| match key {
                "NEYNAR_HUB" => Some("hub".to_string()),
                "PUBLIC_URL" => Some("https://curate.example".to_string()),
                "CURATION_STORE" => Some("memory".to_string()),
                _ => None,
            },
            |_| None,
        )
        .unwrap()
    }

    fn router(resolver: Arc<FakeResolver>, store: Arc<RecordingStore>) -> Router {
        app(AppState::with_parts(config(), resolver, store))
    }

    async fn send(router: Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn payload(fid: i64, cast_fid: i64, hash: Value, input_text: Option<&str>) -> String {
        let mut data = json!({
            "fid": fid,
            "buttonIndex": 1,
            "castId": { "fid": cast_fid, "hash": hash },
        });
        if let Some(text) = input_text {
            data["inputText"] = json!(text);
        }

        json!({ "untrustedData": data, "trustedData": { "messageBytes": "00" } }).to_string()
    }

    fn doubles() -> (Arc<FakeResolver>, Arc<RecordingStore>) {
        (
            Arc::new(FakeResolver::with(&[(5, "bob"), (7, "alice")])),
            Arc::new(RecordingStore::default()),
        )
    }

    #[tokio::test]
    async fn initial_get_renders_invalid_cast() {
        let (resolver, store) = doubles();

        let (status, html) = send(
            router(resolver.clone(), store.clone()),
            Method::GET,
            CURATE_FRAME_PATH,
            "",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Invalid Cast ID"));
        assert!(resolver.calls().is_empty());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn zero_hash_renders_invalid_hash() {
        let (resolver, store) = doubles();

        let (_, html) = send(
            router(resolver.clone(), store.clone()),
            Method::POST,
            CURATE_FRAME_PATH,
            &payload(5, 7, json!(0), None),
        )
        .await;

        assert!(html.contains("Invalid Cast Hash"));
        assert!(resolver.calls().is_empty());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn malformed_body_renders_error_frame() {
        let (resolver, store) = doubles();

        let (status, html) = send(
            router(resolver.clone(), store.clone()),
            Method::POST,
            CURATE_FRAME_PATH,
            "{not json",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Malformed payload"));
        assert!(resolver.calls().is_empty());
    }

    #[tokio::test]
    async fn prompt_names_caster() {
        let (resolver, store) = doubles();

        let (_, html) = send(
            router(resolver.clone(), store.clone()),
            Method::POST,
            CURATE_FRAME_PATH,
            &payload(5, 7, json!(99), None),
        )
        .await;

        assert!(html.contains("Curate alice"));
        assert!(html.contains(r#"property="fc:frame:input:text""#));
        assert!(html.contains(r#"<meta property="fc:frame:button:1" content="Submit">"#));
        assert!(!html.contains("fc:frame:button:2"));
        assert!(html.contains(
            r#"<meta property="fc:frame:post_url" content="https://curate.example/api/curate-frame">"#
        ));
        assert_eq!(resolver.calls(), vec![7]);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn submission_confirms_and_stores() {
        let (resolver, store) = doubles();

        let (_, html) = send(
            router(resolver.clone(), store.clone()),
            Method::POST,
            CURATE_FRAME_PATH,
            &payload(5, 7, json!(99), Some("nice piece")),
        )
        .await;

        assert!(html.contains("bob"));
        assert_eq!(store.calls(), vec![StoreCall::NextId, StoreCall::Put(1)]);

        let record = store.inner.record(1).unwrap();
        assert_eq!(record["text"], "nice piece");
        assert_eq!(record["castId"], "99");
        assert_eq!(record["castFid"], "7");
        assert_eq!(record["curatorFid"], "5");
        assert_eq!(record["curatorUsername"], "bob");
        assert_eq!(record["casterUsername"], "alice");
    }

    #[tokio::test]
    async fn lookup_failure_renders_generic_error() {
        let resolver = Arc::new(FakeResolver::with(&[(7, "alice")]));
        let store = Arc::new(RecordingStore::default());

        let (status, html) = send(
            router(resolver, store.clone()),
            Method::POST,
            CURATE_FRAME_PATH,
            &payload(5, 7, json!("0xabc"), Some("nice piece")),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Error processing your request"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn store_failure_renders_generic_error() {
        let resolver = Arc::new(FakeResolver::with(&[(5, "bob"), (7, "alice")]));
        let store = Arc::new(RecordingStore {
            fail_put: true,
            ..Default::default()
        });

        let (_, html) = send(
            router(resolver, store.clone()),
            Method::POST,
            CURATE_FRAME_PATH,
            &payload(5, 7, json!("0xabc"), Some("nice piece")),
        )
        .await;

        assert!(html.contains("Error processing your request"));
        assert_eq!(store.calls(), vec![StoreCall::NextId, StoreCall::Put(1)]);
    }

    #[tokio::test]
    async fn install_frame_links_action() {
        let (resolver, store) = doubles();

        let (_, html) = send(router(resolver, store), Method::GET, INSTALL_FRAME_PATH, "").await;

        assert!(html.contains("Install the Curate action!"));
        assert!(html.contains("Add Curate Cast Action"));
        assert!(html.contains("url=https%3A%2F%2Fcurate.example%2Fapi%2Fadd-curate-action"));
    }

    #[tokio::test]
    async fn test_frame_offers_banana() {
        let (resolver, store) = doubles();

        let (_, html) = send(router(resolver, store), Method::POST, "/api/curate-test", "").await;

        assert!(html.contains(r#"<meta property="fc:frame:button:1" content="banana">"#));
    }

    #[tokio::test]
    async fn action_metadata() {
        let (resolver, store) = doubles();

        let (status, body) = send(router(resolver, store), Method::GET, CURATE_ACTION_PATH, "").await;
        let json: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Curate");
        assert_eq!(json["icon"], "smiley");
        assert_eq!(json["action"]["type"], "post");
        assert_eq!(json["aboutUrl"], "https://curate.example/api/install-curate");
    }

    #[tokio::test]
    async fn action_points_at_curate_frame() {
        let (resolver, store) = doubles();

        let (status, body) = send(
            router(resolver.clone(), store),
            Method::POST,
            CURATE_ACTION_PATH,
            &payload(5, 7, json!("0xabc"), None),
        )
        .await;
        let json: Value = serde_json::from_str(&body).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["type"], "frame");
        assert_eq!(json["frameUrl"], "https://curate.example/api/curate-frame");
        assert!(resolver.calls().is_empty());
    }

    #[tokio::test]
    async fn action_rejects_malformed_body() {
        let (resolver, store) = doubles();

        let (status, _) = send(router(resolver, store), Method::POST, CURATE_ACTION_PATH, "[").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health() {
        let (resolver, store) = doubles();

        let (status, body) = send(router(resolver, store), Method::GET, "/health", "").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }
}
