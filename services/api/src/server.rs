use crate::cli::ServeArgs;
use crate::infra::{
    catalog_from, AppState, InMemoryNotifier, InMemoryPropertyStore, InMemoryTenantStore,
};
use crate::routes::with_estate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use family_estate::config::AppConfig;
use family_estate::error::AppError;
use family_estate::telemetry;
use family_estate::tenancy::TenancyService;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = catalog_from(config.storage.seed_path.as_deref())?;
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let notifier = Arc::new(InMemoryNotifier::default());
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        notifications: notifier.clone(),
    };

    let tenancy_service = Arc::new(TenancyService::new(
        Arc::new(InMemoryPropertyStore::seeded(catalog)),
        Arc::new(InMemoryTenantStore::default()),
        notifier,
    ));

    let app = with_estate_routes(tenancy_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "family estate service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
