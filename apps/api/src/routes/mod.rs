//! HTTP route assembly.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Router                               │
//! │                                                             │
//! │  GET  /health          liveness + database reachability     │
//! │  /cars/...             listings (see cars module)           │
//! │  /users/...            accounts (see users module)          │
//! │                                                             │
//! │  Layers: request tracing, permissive CORS                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod cars;
pub mod users;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Any-origin CORS: the API serves browser frontends on other hosts
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/cars", cars::routes())
        .nest("/users", users::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// GET /health - liveness probe that also pings the database.
async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let db_ok = state.db.health_check().await;

    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
    }))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::JwtManager;
    use crate::media::{MediaError, MediaStore};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, Response, StatusCode};
    use carlot_core::types::CarDraft;
    use carlot_core::validation::validate_new_car;
    use carlot_db::{Database, DbConfig};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const FIXED_MEDIA_URL: &str = "https://media.test/cars/fixture.jpg";

    /// Media store that never talks to the network.
    struct StaticMediaStore;

    #[async_trait]
    impl MediaStore for StaticMediaStore {
        async fn upload(&self, _bytes: Vec<u8>, _filename: &str) -> Result<String, MediaError> {
            Ok(FIXED_MEDIA_URL.to_string())
        }
    }

    async fn test_state() -> Arc<AppState> {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Arc::new(AppState {
            db,
            media: Arc::new(StaticMediaStore),
            jwt: JwtManager::new("test-secret".to_string(), 3600),
        })
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    /// Registers an account and returns its bearer token.
    async fn register_user(router: &Router, username: &str) -> String {
        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/register",
                None,
                json!({ "username": username, "password": "hunter2" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Inserts a car through the repository, bypassing HTTP.
    async fn seed_car(state: &AppState, brand: &str, year: i64) -> String {
        let new_car = validate_new_car(CarDraft {
            brand: brand.to_string(),
            make: "fixture".to_string(),
            year,
            cm3: 1998,
            km: 42_000,
            price: 15_000,
            user_id: "seed-user".to_string(),
            picture_url: Some(FIXED_MEDIA_URL.to_string()),
        })
        .unwrap();
        state.db.cars().insert(&new_car).await.unwrap().id
    }

    // -------------------------------------------------------------------------
    // Multipart helpers
    // -------------------------------------------------------------------------

    const BOUNDARY: &str = "carlot-test-boundary";

    fn multipart_body(fields: &[(&str, &str)], picture: Option<(&str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; \
                     name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((filename, bytes)) = picture {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"picture\"; \
                     filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(token: Option<&str>, body: Vec<u8>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/cars").header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn full_car_fields<'a>() -> Vec<(&'a str, &'a str)> {
        vec![
            ("brand", "mercedes benz"),
            ("make", "c class"),
            ("year", "2019"),
            ("cm3", "1998"),
            ("km", "42000"),
            ("price", "25000"),
        ]
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_health_reports_ok() {
        let router = build_router(test_state().await);

        let response = router.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }

    // -------------------------------------------------------------------------
    // Accounts
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_register_login_me_flow() {
        let router = build_router(test_state().await);

        register_user(&router, "suchart").await;

        let response = router
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/login",
                None,
                json!({ "username": "suchart", "password": "hunter2" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["token_type"], "Bearer");
        assert_eq!(body["user"]["username"], "suchart");
        assert!(body["user"].get("password_hash").is_none());
        let token = body["access_token"].as_str().unwrap().to_string();

        let mut request = get_request("/users/me");
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {token}").parse().unwrap(),
        );
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["username"], "suchart");
    }

    #[tokio::test]
    async fn test_register_rejects_short_username() {
        let router = build_router(test_state().await);

        let response = router
            .oneshot(json_request(
                "POST",
                "/users/register",
                None,
                json!({ "username": "ab", "password": "hunter2" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert!(body["detail"]["username"].is_array());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let router = build_router(test_state().await);

        register_user(&router, "suchart").await;

        let response = router
            .oneshot(json_request(
                "POST",
                "/users/register",
                None,
                json!({ "username": "suchart", "password": "other-pass" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login_wrong_password_denied() {
        let router = build_router(test_state().await);

        register_user(&router, "suchart").await;

        let response = router
            .oneshot(json_request(
                "POST",
                "/users/login",
                None,
                json!({ "username": "suchart", "password": "wrong" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["detail"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_login_unknown_user_same_answer() {
        let router = build_router(test_state().await);

        let response = router
            .oneshot(json_request(
                "POST",
                "/users/login",
                None,
                json!({ "username": "nobody", "password": "hunter2" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["detail"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_me_without_token_denied() {
        let router = build_router(test_state().await);

        let response = router.oneshot(get_request("/users/me")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // -------------------------------------------------------------------------
    // Car creation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_create_requires_auth() {
        let router = build_router(test_state().await);

        let body = multipart_body(&full_car_fields(), Some(("car.jpg", b"jpegbytes")));
        let response = router
            .oneshot(multipart_request(None, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_create_and_fetch_roundtrip() {
        let router = build_router(test_state().await);
        let token = register_user(&router, "suchart").await;

        let body = multipart_body(&full_car_fields(), Some(("car.jpg", b"jpegbytes")));
        let response = router
            .clone()
            .oneshot(multipart_request(Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let created = body_json(response).await;
        // Brand and make come back title-cased
        assert_eq!(created["brand"], "Mercedes Benz");
        assert_eq!(created["make"], "C Class");
        assert_eq!(created["year"], 2019);
        assert_eq!(created["picture_url"], FIXED_MEDIA_URL);

        let id = created["id"].as_str().unwrap();
        let response = router
            .oneshot(get_request(&format!("/cars/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let fetched = body_json(response).await;
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_aggregates_field_failures() {
        let router = build_router(test_state().await);
        let token = register_user(&router, "suchart").await;

        let body = multipart_body(
            &[
                ("brand", "bmw"),
                ("make", "m3"),
                ("year", "1899"),
                ("cm3", "1998"),
                ("km", "42000"),
                ("price", "0"),
            ],
            Some(("car.jpg", b"jpegbytes")),
        );
        let response = router
            .oneshot(multipart_request(Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert!(body["detail"]["year"].is_array());
        assert!(body["detail"]["price"].is_array());
        assert!(body["detail"].get("brand").is_none());
    }

    #[tokio::test]
    async fn test_create_missing_parts_rejected() {
        let router = build_router(test_state().await);
        let token = register_user(&router, "suchart").await;

        // No year, no picture
        let body = multipart_body(
            &[
                ("brand", "bmw"),
                ("make", "m3"),
                ("cm3", "1998"),
                ("km", "42000"),
                ("price", "25000"),
            ],
            None,
        );
        let response = router
            .oneshot(multipart_request(Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["detail"]["year"][0], "is required");
        assert_eq!(body["detail"]["picture"][0], "is required");
    }

    #[tokio::test]
    async fn test_create_missing_picture_alone_rejected() {
        let router = build_router(test_state().await);
        let token = register_user(&router, "suchart").await;

        let body = multipart_body(&full_car_fields(), None);
        let response = router
            .oneshot(multipart_request(Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["detail"]["picture"][0], "is required");
    }

    #[tokio::test]
    async fn test_create_non_integer_year_rejected() {
        let router = build_router(test_state().await);
        let token = register_user(&router, "suchart").await;

        let body = multipart_body(
            &[
                ("brand", "bmw"),
                ("make", "m3"),
                ("year", "twenty-nineteen"),
                ("cm3", "1998"),
                ("km", "42000"),
                ("price", "25000"),
            ],
            Some(("car.jpg", b"jpegbytes")),
        );
        let response = router
            .oneshot(multipart_request(Some(&token), body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["detail"]["year"][0], "must be an integer");
    }

    // -------------------------------------------------------------------------
    // Listing and pagination
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_paginates_in_insertion_order() {
        let state = test_state().await;
        let router = build_router(state.clone());

        for i in 0..25 {
            seed_car(&state, &format!("brand{i:02}"), 2000 + i).await;
        }

        let response = router.clone().oneshot(get_request("/cars")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["cars"].as_array().unwrap().len(), 10);
        assert_eq!(body["page"], 1);
        assert_eq!(body["has_more"], true);
        assert_eq!(body["cars"][0]["brand"], "Brand00");

        let response = router
            .clone()
            .oneshot(get_request("/cars?page=3"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["cars"].as_array().unwrap().len(), 5);
        assert_eq!(body["page"], 3);
        assert_eq!(body["has_more"], false);
        assert_eq!(body["cars"][0]["brand"], "Brand20");

        let response = router
            .oneshot(get_request("/cars?page=2&limit=20"))
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["cars"].as_array().unwrap().len(), 5);
        assert_eq!(body["has_more"], false);
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let router = build_router(test_state().await);

        let response = router.oneshot(get_request("/cars")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["cars"].as_array().unwrap().len(), 0);
        assert_eq!(body["has_more"], false);
    }

    #[tokio::test]
    async fn test_list_huge_page_is_just_empty() {
        let state = test_state().await;
        let router = build_router(state.clone());
        seed_car(&state, "bmw", 2015).await;

        // u64::MAX on the query string: well-formed, far past the end
        let response = router
            .oneshot(get_request("/cars?page=18446744073709551615"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["cars"].as_array().unwrap().len(), 0);
        assert_eq!(body["has_more"], false);
    }

    #[tokio::test]
    async fn test_list_rejects_zero_page() {
        let router = build_router(test_state().await);

        let response = router
            .clone()
            .oneshot(get_request("/cars?page=0"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = router.oneshot(get_request("/cars?limit=0")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    // -------------------------------------------------------------------------
    // Fetch, update, delete
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_get_unknown_id_not_found() {
        let state = test_state().await;
        let router = build_router(state.clone());

        // Well-formed but absent
        let response = router
            .clone()
            .oneshot(get_request(
                "/cars/00000000-0000-4000-8000-000000000000",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        // Malformed identifiers present the same outcome
        let response = router
            .oneshot(get_request("/cars/definitely-not-a-key"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_flow() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let token = register_user(&router, "suchart").await;
        let id = seed_car(&state, "bmw", 2015).await;

        let response = router
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/cars/{id}"),
                Some(&token),
                json!({ "km": 55000, "brand": "alfa romeo" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["km"], 55000);
        assert_eq!(body["brand"], "Alfa Romeo");
        // Untouched fields survive
        assert_eq!(body["year"], 2015);
    }

    #[tokio::test]
    async fn test_update_requires_auth() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let id = seed_car(&state, "bmw", 2015).await;

        let response = router
            .oneshot(json_request(
                "PUT",
                &format!("/cars/{id}"),
                None,
                json!({ "km": 55000 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_update_bad_request() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let token = register_user(&router, "suchart").await;
        let id = seed_car(&state, "bmw", 2015).await;

        let response = router
            .oneshot(json_request(
                "PUT",
                &format!("/cars/{id}"),
                Some(&token),
                json!({}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["detail"], "No fields provided for update");
    }

    #[tokio::test]
    async fn test_update_out_of_range_field_rejected() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let token = register_user(&router, "suchart").await;
        let id = seed_car(&state, "bmw", 2015).await;

        let response = router
            .oneshot(json_request(
                "PUT",
                &format!("/cars/{id}"),
                Some(&token),
                json!({ "year": 1950 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert!(body["detail"]["year"].is_array());
    }

    #[tokio::test]
    async fn test_update_unknown_id_not_found() {
        let router = build_router(test_state().await);
        let token = register_user(&router, "suchart").await;

        let response = router
            .oneshot(json_request(
                "PUT",
                "/cars/00000000-0000-4000-8000-000000000000",
                Some(&token),
                json!({ "km": 55000 }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_delete_again() {
        let state = test_state().await;
        let router = build_router(state.clone());
        let id = seed_car(&state, "bmw", 2015).await;

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/cars/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/cars/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
