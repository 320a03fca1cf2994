// ============================================================================
// CONFIGURAÇÃO
// ============================================================================
//
// Toda a configuração vem de variáveis de ambiente (carregadas do .env pelo
// main). O AppConfig é construído uma única vez na inicialização e injetado
// nos handlers através do AppState.
//
// ============================================================================

use std::env;
use std::path::PathBuf;

// O iep_recrutamento.db antigo tem colunas camelCase: não é reaproveitado
const DEFAULT_SQLITE_PATH: &str = "recrutamento.db";
const DEFAULT_PASSWORD_SALT: &str = "iep-recrutamento-default-salt";

/// Backend relacional escolhido na inicialização do processo
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { url: String },
    Sqlite { path: PathBuf },
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Postgres { .. } => "PostgreSQL",
            StorageBackend::Sqlite { .. } => "SQLite",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub max_connections: u32,
}

/// Servidor SMTP usado para avisar o administrador sobre novos cadastros
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub admin_password: String,
    pub admin_login: String,
    pub admin_email: Option<String>,
    pub password_salt: String,
    pub uploads_dir: PathBuf,
    pub mail: Option<MailConfig>,
    pub allowed_studies: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // A presença de DATABASE_URL decide o backend
        let backend = match non_empty_var("DATABASE_URL") {
            Some(url) => StorageBackend::Postgres { url },
            None => StorageBackend::Sqlite {
                path: sqlite_path(non_empty_var("SQLITE_PATH")),
            },
        };

        let password_salt = non_empty_var("PASSWORD_SALT").unwrap_or_else(|| {
            tracing::warn!("PASSWORD_SALT não definido, usando salt padrão (INSEGURO)");
            DEFAULT_PASSWORD_SALT.to_string()
        });

        let mail = non_empty_var("SMTP_HOST").map(|host| MailConfig {
            host,
            port: parse_var("SMTP_PORT").unwrap_or(587),
            user: non_empty_var("SMTP_USER"),
            from: non_empty_var("SMTP_FROM")
                .unwrap_or_else(|| "nao-responda@iep-recrutamento.local".to_string()),
        });

        Self {
            host: non_empty_var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var("PORT").unwrap_or(3000),
            database: DatabaseConfig {
                backend,
                max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(5),
            },
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            admin_login: non_empty_var("ADMIN_LOGIN").unwrap_or_else(|| "admin".to_string()),
            admin_email: non_empty_var("ADMIN_EMAIL"),
            password_salt,
            uploads_dir: PathBuf::from(
                non_empty_var("UPLOADS_DIR").unwrap_or_else(|| "uploads".to_string()),
            ),
            mail,
            allowed_studies: parse_list(
                &non_empty_var("ALLOWED_STUDIES").unwrap_or_else(|| "M-18".to_string()),
            ),
        }
    }

    pub fn is_allowed_study(&self, estudo: &str) -> bool {
        self.allowed_studies.iter().any(|s| s == estudo)
    }
}

fn sqlite_path(configured: Option<String>) -> PathBuf {
    PathBuf::from(configured.unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string()))
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    non_empty_var(key).and_then(|v| v.parse().ok())
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
