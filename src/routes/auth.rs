use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::LoginResponse;
use crate::models::users::{self, UserRole};
use crate::services::notifier::PendingRegistration;
use crate::services::session_service::SessionService;
use crate::utils::password;

const INVALID_CREDENTIALS: &str = "Credenciais inválidas";

// DTO para o cadastro
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Nome é obrigatório"))]
    pub nome: String,
    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,
    #[validate(length(min = 3, message = "Login deve ter ao menos 3 caracteres"))]
    pub login: String,
    #[validate(length(min = 6, message = "Senha deve ter ao menos 6 caracteres"))]
    pub senha: String,
}

// DTO para o login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub senha: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub senha: String,
}

/// POST /api/auth/register - Cria a conta ainda não aprovada (PÚBLICA)
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let mut body = body.into_inner();
    // E-mail em branco conta como ausente antes da validação
    body.email = body.email.take().filter(|e| !e.trim().is_empty());
    body.validate()
        .map_err(|e| ApiError::bad_request(format!("Dados de cadastro inválidos: {e}")))?;

    let email = body.email.clone();

    // 1. Hash da senha com o salt fixo
    let senha_hash = password::hash_password(&body.senha, &state.config.password_salt)
        .map_err(ApiError::internal("Erro ao cadastrar usuário"))?;

    // 2. Inserir (login duplicado => 409)
    let now = Utc::now().naive_utc();
    let outcome = state
        .db
        .execute(
            "INSERT INTO usuarios (nome, email, login, senha_hash, role, aprovado, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
            vec![
                body.nome.clone().into(),
                email.clone().into(),
                body.login.clone().into(),
                senha_hash.into(),
                UserRole::User.as_str().into(),
                false.into(),
                now.into(),
                now.into(),
            ],
        )
        .await
        .map_err(ApiError::from_write("Erro ao cadastrar usuário", "Login já cadastrado"))?;

    let user_id = outcome
        .inserted_id
        .and_then(|id| i32::try_from(id).ok())
        .ok_or_else(|| ApiError::internal("Erro ao cadastrar usuário")("id não retornado"))?;

    tracing::info!(user_id, login = %body.login, "Novo cadastro aguardando aprovação");

    // 3. Avisar o administrador (falha só vai para o log)
    let pending = PendingRegistration {
        user_id,
        nome: body.nome,
        login: body.login,
        email,
    };
    if let Err(e) = state.notifier.registration_pending(&pending).await {
        tracing::warn!(error = %e, user_id, "Falha ao avisar o administrador do cadastro");
    }

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Cadastro realizado. Aguarde a aprovação do administrador.",
        "id": user_id
    })))
}

/// POST /api/auth/login - Token de 7 dias (PÚBLICA)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    // 1. Buscar o usuário
    let user = find_by_login(&state, &body.login)
        .await?
        .ok_or_else(|| ApiError::not_found(INVALID_CREDENTIALS))?;

    // 2. Verificar a senha
    let valid = password::verify_password(&body.senha, &state.config.password_salt, &user.senha_hash)
        .map_err(ApiError::internal("Erro ao fazer login"))?;
    if !valid {
        return Err(ApiError::Forbidden(INVALID_CREDENTIALS.into()));
    }

    // 3. Só depois da senha: conta aprovada?
    if !user.aprovado {
        return Err(ApiError::Forbidden(
            "Cadastro aguardando aprovação do administrador".into(),
        ));
    }

    issue_login(&state, user).await
}

/// POST /api/auth/admin-login - Segredo compartilhado ADMIN_PASSWORD (PÚBLICA)
#[post("/admin-login")]
pub async fn admin_login(
    body: web::Json<AdminLoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let secret = state.config.admin_password.as_str();
    if secret.is_empty() {
        return Err(ApiError::Forbidden("Login de administrador desabilitado".into()));
    }
    if body.senha != secret {
        tracing::warn!("Tentativa de login de administrador com senha incorreta");
        return Err(ApiError::Forbidden(INVALID_CREDENTIALS.into()));
    }

    let admin_login = state.config.admin_login.as_str();
    let now = Utc::now().naive_utc();

    match find_by_login(&state, admin_login).await? {
        Some(existing) => {
            // Conta existente é promovida a admin aprovado
            if UserRole::from_db(&existing.role) != UserRole::Admin || !existing.aprovado {
                state
                    .db
                    .execute(
                        "UPDATE usuarios SET role = ?, aprovado = ?, updated_at = ? WHERE id = ?",
                        vec![UserRole::Admin.as_str().into(), true.into(), now.into(), existing.id.into()],
                    )
                    .await
                    .map_err(ApiError::internal("Erro ao fazer login"))?;
                tracing::info!(user_id = existing.id, "Conta promovida a administrador");
            }
        }
        None => {
            let senha_hash = password::hash_password(secret, &state.config.password_salt)
                .map_err(ApiError::internal("Erro ao fazer login"))?;
            state
                .db
                .execute(
                    "INSERT INTO usuarios (nome, email, login, senha_hash, role, aprovado, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
                    vec![
                        "Administrador".into(),
                        state.config.admin_email.clone().into(),
                        admin_login.into(),
                        senha_hash.into(),
                        UserRole::Admin.as_str().into(),
                        true.into(),
                        now.into(),
                        now.into(),
                    ],
                )
                .await
                .map_err(ApiError::internal("Erro ao fazer login"))?;
            tracing::info!(login = admin_login, "Conta de administrador criada");
        }
    }

    let user = find_by_login(&state, admin_login)
        .await?
        .ok_or_else(|| ApiError::internal("Erro ao fazer login")("conta admin ausente"))?;

    issue_login(&state, user).await
}

/// GET /api/auth/me - Usuário do token, no mesmo formato do login (PROTEGIDA)
#[get("/me")]
pub async fn me(auth_user: AuthUser, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let user: users::Model = state
        .db
        .fetch_one("SELECT * FROM usuarios WHERE id = ?", vec![auth_user.0.user_id.into()])
        .await
        .map_err(ApiError::internal("Erro ao buscar usuário"))?
        .ok_or_else(|| ApiError::Unauthorized("Usuário não encontrado".into()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "usuario": user })))
}

async fn find_by_login(state: &AppState, login_value: &str) -> Result<Option<users::Model>, ApiError> {
    state
        .db
        .fetch_one("SELECT * FROM usuarios WHERE login = ?", vec![login_value.into()])
        .await
        .map_err(ApiError::internal("Erro ao fazer login"))
}

async fn issue_login(state: &AppState, user: users::Model) -> Result<HttpResponse, ApiError> {
    let issued = SessionService::issue(&state.db, user.id)
        .await
        .map_err(ApiError::internal("Erro ao fazer login"))?;

    tracing::info!(user_id = user.id, role = %user.role, "Login efetuado");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token: issued.token,
        expires_at: issued.expires_at,
        usuario: user,
    }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(admin_login)
            .service(me),
    );
}
