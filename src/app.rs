use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth, state::AppState};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;

    async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn register_then_login_scenario() {
        let state = AppState::fake();
        let keys = state.keys.clone();
        let app = build_app(state);
        let creds = json!({ "email": "a@x.com", "password": "secret123" });

        let (status, body) = post_json(&app, "/auth/register", creds.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "User created" }));

        let (status, body) = post_json(&app, "/auth/login", creds).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        let token = body["access_token"].as_str().expect("access_token string");
        assert!(!token.is_empty());
        assert_eq!(keys.verify(token).unwrap().role, "user");

        let (status, body) = post_json(
            &app,
            "/auth/login",
            json!({ "email": "a@x.com", "password": "wrong" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "detail": "Invalid credentials" }));
    }

    #[tokio::test]
    async fn duplicate_registration_is_bad_request() {
        let app = build_app(AppState::fake());
        let creds = json!({ "email": "dup@x.com", "password": "secret123" });

        post_json(&app, "/auth/register", creds.clone()).await;
        let (status, body) = post_json(&app, "/auth/register", creds).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "detail": "Email already registered" }));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let app = build_app(AppState::fake());
        post_json(
            &app,
            "/auth/register",
            json!({ "email": "a@x.com", "password": "secret123" }),
        )
        .await;

        let unknown = post_json(
            &app,
            "/auth/login",
            json!({ "email": "ghost@x.com", "password": "secret123" }),
        )
        .await;
        let wrong = post_json(
            &app,
            "/auth/login",
            json!({ "email": "a@x.com", "password": "nope" }),
        )
        .await;
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_body_is_unprocessable() {
        let app = build_app(AppState::fake());

        let (status, body) =
            post_json(&app, "/auth/register", json!({ "email": "a@x.com" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, _) = post_json(
            &app,
            "/auth/login",
            json!({ "email": "", "password": "secret123" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = build_app(AppState::fake());
        let res = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
