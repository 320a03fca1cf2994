// Infra comum dos testes de endpoint: SQLite e uploads num diretório
// temporário, notificador que só conta chamadas, usuários e tokens prontos.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use actix_web::body::BoxBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;
use chrono::Utc;
use tempfile::TempDir;

use crate::app_state::AppState;
use crate::config::{AppConfig, DatabaseConfig, StorageBackend};
use crate::db::{self, Db};
use crate::models::users::UserRole;
use crate::services::notifier::{AdminNotifier, NotifyError, PendingRegistration};
use crate::services::session_service::SessionService;
use crate::services::upload_store::UploadStore;
use crate::utils::password;

pub const TEST_SALT: &str = "sal-de-teste";
pub const TEST_ADMIN_SECRET: &str = "segredo-admin";
pub const TEST_PASSWORD: &str = "senha123";

/// Conta os avisos; com `fail` devolve erro como um SMTP fora do ar
#[derive(Default)]
pub struct CountingNotifier {
    pub calls: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl AdminNotifier for CountingNotifier {
    async fn registration_pending(&self, _registration: &PendingRegistration) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(NotifyError::NoMailServer)
        } else {
            Ok(())
        }
    }
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub notifier: Arc<CountingNotifier>,
    // Mantém o diretório vivo até o fim do teste
    _dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_notifier(CountingNotifier::default()).await
    }

    pub async fn with_notifier(notifier: CountingNotifier) -> Self {
        Self::build(notifier, |_| {}).await
    }

    pub async fn build(notifier: CountingNotifier, adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path().join("test.db"), dir.path().join("uploads"));
        adjust(&mut config);

        let db = db::establish_connection(&config.database).await.unwrap();
        let uploads = UploadStore::new(config.uploads_dir.clone());
        uploads.ensure_dir().await.unwrap();

        let notifier = Arc::new(notifier);
        let state = web::Data::new(AppState {
            db,
            config,
            uploads,
            notifier: notifier.clone(),
        });

        Self { state, notifier, _dir: dir }
    }

    pub fn db(&self) -> &Db {
        &self.state.db
    }

    /// Cria um usuário direto no banco e devolve o id
    pub async fn create_user(&self, login: &str, role: UserRole, aprovado: bool) -> i32 {
        let now = Utc::now().naive_utc();
        let hash = password::hash_password(TEST_PASSWORD, TEST_SALT).unwrap();
        let outcome = self
            .db()
            .execute(
                "INSERT INTO usuarios (nome, email, login, senha_hash, role, aprovado, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
                vec![
                    format!("Usuário {login}").into(),
                    None::<String>.into(),
                    login.into(),
                    hash.into(),
                    role.as_str().into(),
                    aprovado.into(),
                    now.into(),
                    now.into(),
                ],
            )
            .await
            .unwrap();
        outcome.inserted_id.unwrap() as i32
    }

    pub async fn token_for(&self, user_id: i32) -> String {
        SessionService::issue(self.db(), user_id).await.unwrap().token
    }

    /// Usuário aprovado comum com token
    pub async fn approved_token(&self) -> String {
        let id = self.create_user("operador", UserRole::User, true).await;
        self.token_for(id).await
    }

    pub async fn admin_token(&self) -> String {
        let id = self.create_user("chefe", UserRole::Admin, true).await;
        self.token_for(id).await
    }

    pub fn upload_path(&self, stored_name: &str) -> PathBuf {
        self.state.uploads.root().join(stored_name)
    }
}

pub fn test_config(sqlite_path: PathBuf, uploads_dir: PathBuf) -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database: DatabaseConfig {
            backend: StorageBackend::Sqlite { path: sqlite_path },
            max_connections: 2,
        },
        admin_password: TEST_ADMIN_SECRET.into(),
        admin_login: "admin".into(),
        admin_email: Some("admin@teste.local".into()),
        password_salt: TEST_SALT.into(),
        uploads_dir,
        mail: None,
        allowed_studies: vec!["M-18".into()],
    }
}

/// Mesma montagem do main, sem o Logger
pub fn test_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<BoxBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(crate::json_config())
        .configure(crate::routes::configure_routes)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

/// Corpo multipart com campos de texto e arquivos (nome, tipo, conteúdo)
pub fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> (String, Vec<u8>) {
    const BOUNDARY: &str = "----recrutamento-teste";
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (filename, mime, content) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"documentos\"; filename=\"{filename}\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}
