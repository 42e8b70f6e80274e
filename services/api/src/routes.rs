use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json};
use family_estate::properties::PropertyStore;
use family_estate::tenancy::{tenancy_router, Notifier, TenancyService, TenantStore};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub(crate) fn with_estate_routes<P, T, N>(service: Arc<TenancyService<P, T, N>>) -> axum::Router
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    tenancy_router(service)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/notifications", get(notifications_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Most recent notifications first, as the web client shows them.
pub(crate) async fn notifications_endpoint(
    Extension(state): Extension<AppState>,
) -> impl IntoResponse {
    let mut events = state.notifications.events();
    events.reverse();
    Json(json!({ "notifications": events }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{
        demo_catalog, InMemoryNotifier, InMemoryPropertyStore, InMemoryTenantStore,
    };
    use axum::body::Body;
    use axum::http::Request;
    use family_estate::tenancy::{PropertyChoice, TenantForm};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use tower::ServiceExt;

    fn app(ready: bool) -> (axum::Router, AppState) {
        let notifier = Arc::new(InMemoryNotifier::default());
        let service = Arc::new(TenancyService::new(
            Arc::new(InMemoryPropertyStore::seeded(demo_catalog())),
            Arc::new(InMemoryTenantStore::default()),
            notifier.clone(),
        ));
        let state = AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            notifications: notifier,
        };
        let router = with_estate_routes(service).layer(Extension(state.clone()));
        (router, state)
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json payload")
    }

    fn tenant_form() -> TenantForm {
        TenantForm {
            full_name: "Ravi Kumar".to_string(),
            phone: "9800000010".to_string(),
            occupation: "Engineer".to_string(),
            agreement_number: "AGR-2025-07".to_string(),
            start_date: "2025-07-01".to_string(),
            end_date: "2026-06-30".to_string(),
            property: PropertyChoice::apartment("B1", "A12"),
            ..TenantForm::default()
        }
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_flagged() {
        let (router, state) = app(false);

        let response = router
            .clone()
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        state.readiness.store(true, Ordering::Release);
        let response = router
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_is_always_ok() {
        let (router, _) = app(false);
        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn notifications_list_follows_tenant_writes() {
        let (router, _) = app(true);

        let create = Request::post("/api/v1/tenants")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::to_vec(&tenant_form()).expect("serializable"),
            ))
            .expect("request");
        let response = router.clone().oneshot(create).await.expect("route executes");
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = router
            .oneshot(
                Request::get("/api/v1/notifications")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        let payload = json_body(response).await;
        assert_eq!(payload["notifications"][0]["kind"], "tenant_created");
        assert_eq!(payload["notifications"][0]["level"], "success");
    }

    #[tokio::test]
    async fn roster_is_served_as_csv() {
        let (router, _) = app(true);
        let response = router
            .oneshot(
                Request::get("/api/v1/occupancy/roster.csv")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"text/csv"[..])
        );
    }
}
