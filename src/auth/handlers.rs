use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use tracing::{field, instrument, Span};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse},
        services::AuthService,
    },
    error::ServiceResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

#[instrument(skip(auth, payload), fields(username = field::Empty))]
pub async fn login(
    State(auth): State<AuthService>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ServiceResult<Json<LoginResponse>> {
    let Json(payload) = payload?;
    Span::current().record("username", payload.username.as_str());
    payload.validate()?;
    let res = auth.login(&payload.username, &payload.password).await?;
    Ok(Json(res))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::{app::build_app, state::AppState, users::dto::CreateUser};

    fn login_request(body: &str) -> Request<Body> {
        Request::post("/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn seeded_state() -> AppState {
        let state = AppState::fake();
        state
            .users
            .create(CreateUser {
                name: "Ana".into(),
                username: "ana".into(),
                email: "ana@example.com".into(),
                password: "password123".into(),
            })
            .await
            .unwrap();
        state
    }

    #[tokio::test]
    async fn login_returns_only_an_access_token() {
        let app = build_app(seeded_state().await);
        let res = app
            .oneshot(login_request(r#"{"username":"ana","password":"password123"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert!(obj["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn bad_credentials_are_unauthorized() {
        let state = seeded_state().await;

        let wrong = build_app(state.clone())
            .oneshot(login_request(r#"{"username":"ana","password":"wrong-one"}"#))
            .await
            .unwrap();
        let unknown = build_app(state)
            .oneshot(login_request(r#"{"username":"bob","password":"password123"}"#))
            .await
            .unwrap();

        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
        let a = to_bytes(wrong.into_body(), usize::MAX).await.unwrap();
        let b = to_bytes(unknown.into_body(), usize::MAX).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn blank_username_is_bad_request() {
        let res = build_app(AppState::fake())
            .oneshot(login_request(r#"{"username":"","password":"x"}"#))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn null_or_missing_fields_are_bad_requests() {
        for body in [r#"{"username":null,"password":"x"}"#, r#"{"password":"x"}"#, "not json"] {
            let res = build_app(seeded_state().await)
                .oneshot(login_request(body))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        }
    }
}
