//! HTTP routing.

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api::{admin, attendance, contributions, events, hierarchy, members};
use crate::auth::{self, AppState};

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth routes
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/api/me", get(auth::me))
        // Hierarchy
        .route("/api/regions", get(hierarchy::list_regions))
        .route("/api/universities", get(hierarchy::list_universities))
        .route("/api/small-groups", get(hierarchy::list_small_groups))
        .route("/api/alumni-groups", get(hierarchy::list_alumni_groups))
        // Members and events
        .route(
            "/api/members",
            get(members::list_members).post(members::create_member),
        )
        .route(
            "/api/members/{id}",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        )
        .route(
            "/api/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/api/events/{id}",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        // Member-scoped records
        .route(
            "/api/attendance",
            get(attendance::list_attendance).post(attendance::create_attendance),
        )
        .route(
            "/api/attendance/{id}",
            delete(attendance::delete_attendance),
        )
        .route(
            "/api/contributions",
            get(contributions::list_contributions).post(contributions::create_contribution),
        )
        .route(
            "/api/contributions/{id}",
            delete(contributions::delete_contribution),
        )
        // Administration
        .route(
            "/api/role-assignments",
            get(admin::list_role_assignments).post(admin::assign_role),
        )
        .route("/api/users", post(admin::create_user))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::{AuthConfig, SessionConfig};

    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/flock")
            .expect("lazy pool");
        router(Arc::new(AppState::new(
            pool,
            SessionConfig::default(),
            AuthConfig::default(),
        )))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn scoped_listing_without_session_is_unauthenticated() {
        let response = app()
            .oneshot(
                Request::get("/api/members")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await, json!({ "error": "unauthenticated" }));
    }

    #[tokio::test]
    async fn admin_route_without_session_is_unauthenticated() {
        let response = app()
            .oneshot(
                Request::post("/api/role-assignments")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"user_id":"x","scope":"national"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn logout_without_session_clears_the_cookie() {
        let response = app()
            .oneshot(
                Request::post("/auth/logout")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("set-cookie")
            .to_str()
            .expect("ascii");
        assert!(cookie.starts_with("session="));
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = app()
            .oneshot(
                Request::get("/api/nothing")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
