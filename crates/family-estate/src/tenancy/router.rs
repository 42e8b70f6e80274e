use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::properties::{PropertyKind, PropertyRef, PropertyStore, StoreError};

use super::domain::TenantId;
use super::form::{parse_date, TenantForm};
use super::repository::{Notifier, TenantStore};
use super::service::{TenancyError, TenancyService};

type SharedService<P, T, N> = State<Arc<TenancyService<P, T, N>>>;

/// Router exposing tenant CRUD, unit vacating, and occupancy reporting.
pub fn tenancy_router<P, T, N>(service: Arc<TenancyService<P, T, N>>) -> Router
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/tenants",
            get(list_handler::<P, T, N>).post(create_handler::<P, T, N>),
        )
        .route(
            "/api/v1/tenants/:tenant_id",
            get(fetch_handler::<P, T, N>)
                .put(update_handler::<P, T, N>)
                .delete(delete_handler::<P, T, N>),
        )
        .route("/api/v1/properties", get(catalog_handler::<P, T, N>))
        .route(
            "/api/v1/buildings/:building_id/apartments",
            get(building_apartments_handler::<P, T, N>),
        )
        .route(
            "/api/v1/properties/:kind/:property_id/vacate",
            post(vacate_handler::<P, T, N>),
        )
        .route("/api/v1/occupancy/audit", get(audit_handler::<P, T, N>))
        .route(
            "/api/v1/occupancy/reconcile",
            post(reconcile_handler::<P, T, N>),
        )
        .route(
            "/api/v1/occupancy/roster.csv",
            get(roster_handler::<P, T, N>),
        )
        .route("/api/v1/dashboard", get(dashboard_handler::<P, T, N>))
        .with_state(service)
}

pub(crate) fn error_response(error: TenancyError) -> Response {
    let status = match &error {
        TenancyError::Validation(form) => {
            let payload = json!({
                "error": error.to_string(),
                "issues": form.issues,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
        TenancyError::TenantNotFound(_)
        | TenancyError::PropertyNotFound(_)
        | TenancyError::BuildingNotFound(_)
        | TenancyError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        TenancyError::Store(StoreError::Conflict) => StatusCode::CONFLICT,
        TenancyError::Store(StoreError::Unavailable(_)) | TenancyError::Roster(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

pub(crate) async fn create_handler<P, T, N>(
    State(service): SharedService<P, T, N>,
    Json(form): Json<TenantForm>,
) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.create_tenant(&form) {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<P, T, N>(
    State(service): SharedService<P, T, N>,
    Path(tenant_id): Path<String>,
    Json(form): Json<TenantForm>,
) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.update_tenant(&TenantId(tenant_id), &form) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<P, T, N>(
    State(service): SharedService<P, T, N>,
    Path(tenant_id): Path<String>,
) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.delete_tenant(&TenantId(tenant_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<P, T, N>(
    State(service): SharedService<P, T, N>,
    Path(tenant_id): Path<String>,
) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.get_tenant(&TenantId(tenant_id)) {
        Ok(tenant) => (StatusCode::OK, Json(tenant)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<P, T, N>(State(service): SharedService<P, T, N>) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.list_tenants() {
        Ok(tenants) => (StatusCode::OK, Json(tenants)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn catalog_handler<P, T, N>(State(service): SharedService<P, T, N>) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.catalog() {
        Ok(catalog) => (StatusCode::OK, Json(catalog)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn building_apartments_handler<P, T, N>(
    State(service): SharedService<P, T, N>,
    Path(building_id): Path<String>,
) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.building_apartments(&building_id) {
        Ok(apartments) => (StatusCode::OK, Json(apartments)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn vacate_handler<P, T, N>(
    State(service): SharedService<P, T, N>,
    Path((kind, property_id)): Path<(String, String)>,
) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    let Some(kind) = PropertyKind::parse(&kind) else {
        let payload = json!({ "error": format!("unknown property kind '{kind}'") });
        return (StatusCode::NOT_FOUND, Json(payload)).into_response();
    };

    match service.remove_tenant_from_property(&PropertyRef::new(kind, property_id)) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn audit_handler<P, T, N>(State(service): SharedService<P, T, N>) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.audit() {
        Ok(drifts) => {
            let payload = json!({
                "consistent": drifts.is_empty(),
                "drifts": drifts,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reconcile_handler<P, T, N>(
    State(service): SharedService<P, T, N>,
) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.reconcile() {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn roster_handler<P, T, N>(State(service): SharedService<P, T, N>) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    match service.roster() {
        Ok(csv) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/csv")], csv).into_response(),
        Err(error) => error_response(error),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DashboardQuery {
    #[serde(default)]
    pub(crate) today: Option<String>,
}

pub(crate) async fn dashboard_handler<P, T, N>(
    State(service): SharedService<P, T, N>,
    Query(query): Query<DashboardQuery>,
) -> Response
where
    P: PropertyStore + 'static,
    T: TenantStore + 'static,
    N: Notifier + 'static,
{
    let today = match query.today.as_deref().map(parse_date).transpose() {
        Ok(today) => today.unwrap_or_else(|| Utc::now().date_naive()),
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
        }
    };

    match service.dashboard(today) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}
