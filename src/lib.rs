//! Leads workspace: a paginated, filterable list of leads that can be edited
//! and converted into opportunities, backed by a simulated leads API.

#[cfg(feature = "server")]
use std::sync::Arc;
#[cfg(feature = "server")]
use std::time::Duration;

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_web::cookie::Key;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::db::{establish_connection_pool, run_migrations};
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::pagination::PaginationParams;
#[cfg(feature = "server")]
use crate::repository::{DieselRepository, KeyValueStore};
#[cfg(feature = "server")]
use crate::routes::api::{api_v1_leads, api_v1_opportunities};
#[cfg(feature = "server")]
use crate::routes::main::{
    convert_lead, load_more, save_lead, save_preferences, show_index, show_lead, toggle_sort,
};
#[cfg(feature = "server")]
use crate::services::leads::LeadsController;
#[cfg(feature = "server")]
use crate::services::simulated::SimulatedLeadsApi;
#[cfg(feature = "server")]
use crate::store::opportunities::OpportunitiesProvider;
#[cfg(feature = "server")]
use crate::store::preferences::PreferencesStore;

#[cfg(feature = "data")]
pub mod dataset;
#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod pagination;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "server")]
pub mod services;
#[cfg(feature = "data")]
pub mod store;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;
    run_migrations(&pool)
        .map_err(|e| std::io::Error::other(format!("Failed to migrate database: {e}")))?;

    let repo: Arc<dyn KeyValueStore> = Arc::new(DieselRepository::new(pool));

    let dataset = dataset::load_leads(&server_config.leads_dataset).map_err(|e| {
        std::io::Error::other(format!(
            "Failed to load leads from {}: {e}",
            server_config.leads_dataset
        ))
    })?;
    log::info!("Loaded {} leads", dataset.len());

    let api = SimulatedLeadsApi::new(dataset)
        .with_latency(Duration::from_millis(server_config.simulated_latency_ms))
        .with_failure_rate(server_config.failure_rate);

    // The provider lives as long as the server; the controller only holds a consumer.
    let opportunities = web::Data::new(OpportunitiesProvider::new(repo.clone()));
    let controller = web::Data::new(LeadsController::new(
        api,
        PreferencesStore::new(repo),
        opportunities.consumer(),
        PaginationParams::new(1, server_config.page_size),
    ));

    // Key for signing flash-message cookies.
    let secret_key = Key::try_from(server_config.secret.as_bytes())
        .map_err(|e| std::io::Error::other(format!("Invalid secret key: {e}")))?;

    let message_store = CookieMessageStore::builder(secret_key).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(
                web::scope("/api")
                    .service(api_v1_leads)
                    .service(api_v1_opportunities),
            )
            .service(show_index)
            .service(show_lead)
            .service(load_more)
            .service(save_lead)
            .service(convert_lead)
            .service(save_preferences)
            .service(toggle_sort)
            .app_data(web::Data::new(tera.clone()))
            .app_data(controller.clone())
            .app_data(opportunities.clone())
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
