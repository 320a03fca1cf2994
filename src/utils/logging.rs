use std::env;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Nível de log inválido: {0}")]
    InvalidLogLevel(String),

    #[error("Falha ao inicializar os logs: {0}")]
    Initialization(String),
}

/// Inicializa o subscriber do tracing a partir de LOG_LEVEL (padrão: info).
/// Os registros do crate `log` (middleware Logger do actix) passam pelo mesmo subscriber.
pub fn init_logging() -> Result<(), LoggingError> {
    let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(&level)
        .map_err(|e| LoggingError::InvalidLogLevel(format!("{}: {}", level, e)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| LoggingError::Initialization(e.to_string()))
}
