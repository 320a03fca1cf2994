// ============================================================================
// CONEXÃO BD + ADAPTADOR DE CONSULTAS
// ============================================================================
//
// Description:
//   Escolhe o backend (PostgreSQL se DATABASE_URL estiver definida, senão
//   SQLite local), abre o pool, provisiona o schema e expõe uma interface
//   única de consulta: execute / fetch_all / fetch_one.
//
// Points d'attention:
//   - O SQL dos handlers usa sempre `?`; a tradução fica no dialeto
//   - A escolha do backend é feita uma vez por processo
//   - Nenhum retry: o DbErr do driver sobe intacto para quem chamou
//
// ============================================================================

pub mod dialect;
pub mod schema;

use std::sync::Arc;

use sea_orm::{
    DatabaseConnection, DbErr, FromQueryResult, SqlxPostgresConnector, SqlxSqliteConnector,
    Statement, Value,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::{DatabaseConfig, StorageBackend};
pub use dialect::{ExecOutcome, PostgresDialect, SqlDialect, SqliteDialect};

#[derive(Debug, thiserror::Error)]
pub enum DbSetupError {
    #[error("Falha ao conectar ao banco de dados: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Falha ao criar diretório do banco de dados: {0}")]
    Io(#[from] std::io::Error),

    #[error("Falha ao provisionar o schema: {0}")]
    Schema(#[from] DbErr),
}

/// Adaptador de consultas injetado nos handlers
#[derive(Clone, Debug)]
pub struct Db {
    conn: DatabaseConnection,
    dialect: Arc<dyn SqlDialect>,
}

impl Db {
    pub fn new(conn: DatabaseConnection, dialect: Arc<dyn SqlDialect>) -> Self {
        Self { conn, dialect }
    }

    pub fn dialect_name(&self) -> &'static str {
        self.dialect.name()
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    fn statement(&self, sql: &str, params: Vec<Value>) -> Statement {
        let sql = self.dialect.rewrite_placeholders(sql);
        Statement::from_sql_and_values(self.dialect.backend(), sql.into_owned(), params)
    }

    /// Executa um comando pelo efeito (INSERT / UPDATE / DELETE / DDL)
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<ExecOutcome, DbErr> {
        let stmt = self.statement(sql, params);
        self.dialect.execute(&self.conn, stmt).await
    }

    pub async fn fetch_all<T: FromQueryResult>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Vec<T>, DbErr> {
        T::find_by_statement(self.statement(sql, params))
            .all(&self.conn)
            .await
    }

    pub async fn fetch_one<T: FromQueryResult>(
        &self,
        sql: &str,
        params: Vec<Value>,
    ) -> Result<Option<T>, DbErr> {
        T::find_by_statement(self.statement(sql, params))
            .one(&self.conn)
            .await
    }

    pub async fn close(self) -> Result<(), DbErr> {
        self.conn.close().await
    }
}

/// Abre o backend configurado e garante que o schema existe
pub async fn establish_connection(config: &DatabaseConfig) -> Result<Db, DbSetupError> {
    let db = match &config.backend {
        StorageBackend::Postgres { url } => {
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await?;
            Db::new(
                SqlxPostgresConnector::from_sqlx_postgres_pool(pool),
                Arc::new(PostgresDialect),
            )
        }
        StorageBackend::Sqlite { path } => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let options = SqliteConnectOptions::new()
                .filename(path)
                .create_if_missing(true)
                .foreign_keys(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .connect_with(options)
                .await?;
            Db::new(
                SqlxSqliteConnector::from_sqlx_sqlite_pool(pool),
                Arc::new(SqliteDialect),
            )
        }
    };

    tracing::info!(backend = db.dialect_name(), "Conectado ao banco de dados");
    schema::provision(&db).await?;

    Ok(db)
}
