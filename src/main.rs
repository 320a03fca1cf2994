mod app_state;
mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;
#[cfg(test)]
mod test_utils;

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};

use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::services::notifier::MailNotifier;
use crate::services::upload_store::UploadStore;

/// Corpo JSON máximo (o logo chega como data URL em base64)
pub const JSON_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Erros de JSON malformado viram 400 no formato `{"error": ...}`
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| ApiError::bad_request(format!("JSON inválido: {err}")).into())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    if let Err(e) = utils::logging::init_logging() {
        eprintln!("{e}");
    }

    let config = AppConfig::from_env();

    tracing::info!(backend = config.database.backend.name(), "Conectando ao banco de dados...");
    let db = db::establish_connection(&config.database)
        .await
        .map_err(std::io::Error::other)?;

    let uploads = UploadStore::new(config.uploads_dir.clone());
    uploads.ensure_dir().await?;

    let notifier = Arc::new(MailNotifier::from_config(&config));
    if config.admin_password.is_empty() {
        tracing::warn!("ADMIN_PASSWORD vazio: login de administrador desabilitado");
    }

    let bind = (config.host.clone(), config.port);
    let state = web::Data::new(AppState {
        db,
        config,
        uploads,
        notifier,
    });

    tracing::info!("Servidor iniciando em http://{}:{}", bind.0, bind.1);

    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(app_state.clone())
            .app_data(json_config())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await?;

    // Servidor parado: fecha o pool antes de sair
    tracing::info!("Servidor encerrado, fechando conexões");
    if let Err(e) = state.db.clone().close().await {
        tracing::error!(error = %e, "Falha ao fechar o pool de conexões");
    }

    Ok(())
}
