use std::net::SocketAddr;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{expenses, home, users};

pub fn build_app(state: AppState) -> Router {
    let api = Router::new()
        .merge(users::router())
        .merge(expenses::router())
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(home::router())
        .nest("/api", api)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(config: &AppConfig, app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        build_app(AppState::fake())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&v).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app.clone().oneshot(req).await.unwrap()
    }

    async fn body_bytes(res: Response) -> Vec<u8> {
        axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    async fn json_body(res: Response) -> Value {
        serde_json::from_slice(&body_bytes(res).await).unwrap()
    }

    #[tokio::test]
    async fn liveness_and_status() {
        let app = app();

        let res = send(&app, Method::GET, "/", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_bytes(res).await, home::BANNER.as_bytes());

        let res = send(&app, Method::GET, "/status", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_bytes(res).await, b"OK");
    }

    #[tokio::test]
    async fn signup_login_and_expense_lifecycle() {
        let app = app();
        let creds = json!({"email": "a@x.com", "password": "p1"});

        let res = send(&app, Method::POST, "/api/users/signup", Some(creds.clone())).await;
        assert_eq!(res.status(), StatusCode::OK);
        let user = json_body(res).await;
        assert_eq!(user["id"], 1);
        assert_eq!(user["email"], "a@x.com");
        assert!(user.get("password").is_none());
        assert!(user.get("password_hash").is_none());

        let res = send(&app, Method::POST, "/api/users/signup", Some(creds.clone())).await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = send(&app, Method::POST, "/api/users/login", Some(creds)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["id"], 1);

        let wrong = json!({"email": "a@x.com", "password": "wrong"});
        let res = send(&app, Method::POST, "/api/users/login", Some(wrong)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let expense = json!({"category": "food", "amount": 12.5, "user": {"id": 1}});
        let res = send(&app, Method::POST, "/api/expenses", Some(expense)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let created = json_body(res).await;
        assert_eq!(created["id"], 1);
        assert_eq!(created["category"], "food");
        assert_eq!(created["amount"], 12.5);
        assert_eq!(created["user"]["id"], 1);

        let res = send(&app, Method::GET, "/api/expenses/1", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await, created);

        let res = send(&app, Method::DELETE, "/api/expenses/1", None).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(body_bytes(res).await.is_empty());

        let res = send(&app, Method::GET, "/api/expenses/1", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn update_and_listing_by_user() {
        let app = app();
        for email in ["a@x.com", "b@x.com"] {
            let res = send(
                &app,
                Method::POST,
                "/api/users/signup",
                Some(json!({"email": email, "password": "pw"})),
            )
            .await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        for (category, user) in [("food", 1), ("rent", 2), ("fuel", 1)] {
            let body = json!({"category": category, "amount": 5, "user": {"id": user}});
            let res = send(&app, Method::POST, "/api/expenses", Some(body)).await;
            assert_eq!(res.status(), StatusCode::OK);
        }

        let res = send(&app, Method::GET, "/api/expenses/user/1", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let mine = json_body(res).await;
        let categories: Vec<_> = mine
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["category"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(categories, vec!["food", "fuel"]);

        let res = send(&app, Method::GET, "/api/expenses/user/99", None).await;
        assert_eq!(json_body(res).await, json!([]));

        let patch = json!({
            "category": "groceries",
            "amount": 40.25,
            "description": "weekly",
            "expenseDate": "2024-02-29",
            "user": {"id": 2}
        });
        let res = send(&app, Method::PUT, "/api/expenses/1", Some(patch.clone())).await;
        assert_eq!(res.status(), StatusCode::OK);
        let updated = json_body(res).await;
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["expenseDate"], "2024-02-29");
        assert_eq!(updated["user"]["id"], 2);

        let res = send(&app, Method::PUT, "/api/expenses/42", Some(patch)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = send(&app, Method::DELETE, "/api/expenses/42", None).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = send(&app, Method::GET, "/api/expenses", None).await;
        assert_eq!(json_body(res).await.as_array().unwrap().len(), 3);

        let res = send(&app, Method::GET, "/api/users", None).await;
        let users = json_body(res).await;
        assert_eq!(users.as_array().unwrap().len(), 2);
        assert!(users[0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn invalid_expense_is_bad_request() {
        let app = app();
        let body = json!({"category": "food", "amount": -3, "user": {"id": 1}});
        let res = send(&app, Method::POST, "/api/expenses", Some(body)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let body = json!({"category": "food", "amount": 3, "user": {"id": 1}});
        let res = send(&app, Method::POST, "/api/expenses", Some(body)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(res).await, b"Unknown user");
    }

    #[tokio::test]
    async fn api_allows_any_origin() {
        let app = app();
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/expenses")
            .header(header::ORIGIN, "http://frontend.example")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let allow = res
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .expect("cors header");
        assert_eq!(allow, "*");
    }

    #[tokio::test]
    async fn login_without_credentials_is_unauthorized() {
        let app = app();
        let creds = json!({"email": "a@x.com", "password": "p1"});
        let res = send(&app, Method::POST, "/api/users/signup", Some(creds)).await;
        assert_eq!(res.status(), StatusCode::OK);

        for body in [
            json!({}),
            json!({"email": "a@x.com"}),
            json!({"email": null, "password": "p1"}),
        ] {
            let res = send(&app, Method::POST, "/api/users/login", Some(body)).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[tokio::test]
    async fn username_is_returned_by_every_user_endpoint() {
        let app = app();
        let body = json!({"email": "a@x.com", "password": "p1", "username": "al"});
        let res = send(&app, Method::POST, "/api/users/signup", Some(body)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["username"], "al");

        let creds = json!({"email": "a@x.com", "password": "p1"});
        let res = send(&app, Method::POST, "/api/users/login", Some(creds)).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["username"], "al");

        let body = json!({"email": "b@x.com", "password": "p1"});
        let res = send(&app, Method::POST, "/api/users/signup", Some(body)).await;
        assert_eq!(json_body(res).await["username"], Value::Null);

        let res = send(&app, Method::GET, "/api/users", None).await;
        let users = json_body(res).await;
        assert_eq!(users[0]["username"], "al");
        assert_eq!(users[1]["username"], Value::Null);
    }

    #[tokio::test]
    async fn api_answers_cors_preflight() {
        let app = app();
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/expenses/1")
            .header(header::ORIGIN, "http://frontend.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        assert!(res
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[tokio::test]
    async fn status_has_no_cors_headers() {
        let app = app();
        let req = Request::builder()
            .method(Method::GET)
            .uri("/status")
            .header(header::ORIGIN, "http://frontend.example")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(!res
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
