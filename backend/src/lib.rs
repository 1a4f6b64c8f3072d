//! # Daybook Backend
//!
//! Task planner and personal ledger served over a JSON REST API.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers)
//!     ↓
//! Domain Layer (business rules, services)
//!     ↓
//! Storage Layer (JSON documents in the data directory)
//! ```
//!
//! Mappers translate between the `shared` DTOs and domain types for both
//! the IO and the storage layer.
//!
//! ## Key Responsibilities
//!
//! - Initialize and configure the application state
//! - Run the integrity check before serving
//! - Set up the REST API router with CORS

pub mod config;
pub mod domain;
pub mod io;
pub mod mappers;
pub mod storage;

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::{
    CategoryService, Clock, ExportService, IntegrityService, PersonService, PrayerService,
    PrayerTimesProvider, SettingsService, StaticPrayerTimes, SystemClock, TaskService,
    TransactionService,
};
use crate::storage::{JsonConnection, KeyValueStore};

/// Main application state that holds all services
#[derive(Clone)]
pub struct AppState {
    pub category_service: CategoryService,
    pub task_service: TaskService,
    pub person_service: PersonService,
    pub transaction_service: TransactionService,
    pub settings_service: SettingsService,
    pub integrity_service: IntegrityService,
    pub prayer_service: PrayerService,
    pub export_service: ExportService,
}

impl AppState {
    /// Wire every service to one store and clock
    pub fn with_store(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        prayer_times: Arc<dyn PrayerTimesProvider>,
        default_currency: &str,
    ) -> Self {
        let settings_service = SettingsService::new(store.clone(), default_currency);
        let task_service = TaskService::new(store.clone(), clock.clone());

        Self {
            category_service: CategoryService::new(store.clone(), task_service.clone(), clock.clone()),
            person_service: PersonService::new(store.clone(), settings_service.clone(), clock.clone()),
            transaction_service: TransactionService::new(store.clone(), clock.clone()),
            integrity_service: IntegrityService::new(store.clone()),
            prayer_service: PrayerService::new(
                store.clone(),
                settings_service.clone(),
                prayer_times,
                clock.clone(),
            ),
            export_service: ExportService::new(store, clock),
            settings_service,
            task_service,
        }
    }
}

/// Initialize the backend with all required services
pub fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    let data_directory = config.data_directory()?;
    info!("Setting up storage in {}", data_directory.display());
    let connection = JsonConnection::new(&data_directory)?;

    info!("Setting up domain model");
    let prayer_times = StaticPrayerTimes::new(config.prayer_times.to_prayer_times()?);
    let app_state = AppState::with_store(
        Arc::new(connection),
        Arc::new(SystemClock),
        Arc::new(prayer_times),
        &config.default_currency,
    );

    info!("Checking data integrity");
    app_state.integrity_service.run_maintenance()?;

    Ok(app_state)
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", io::api_router())
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{send, test_state};
    use crate::storage::test_utils::TestEnvironment;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_routes_are_mounted_under_api() {
        let app = create_router(test_state());

        let (status, _) = send(&app, Method::GET, "/api/settings", None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::GET, "/settings", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_initialize_backend_persists_to_data_directory() -> Result<()> {
        let env = TestEnvironment::new()?;
        let config = AppConfig {
            data_directory: Some(env.base_path.clone()),
            default_currency: "CAD".to_string(),
            ..AppConfig::default()
        };

        let app = create_router(initialize_backend(&config)?);
        let (status, person) = send(&app, Method::POST, "/api/people", Some(json!({"name": "Rui"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(person["currency"], "CAD");
        assert!(env.base_directory().join("people.json").exists());

        // A second start over the same directory sees the same data
        let restarted = create_router(initialize_backend(&config)?);
        let (_, people) = send(&restarted, Method::GET, "/api/people", None).await;
        assert_eq!(people["people"][0]["name"], "Rui");
        Ok(())
    }
}
