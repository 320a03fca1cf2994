use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use futures::future::LocalBoxFuture;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::services::session_service::{AccessTier, GateRejection, SessionService, SessionUser, bearer_token};

/// Usuário autenticado e aprovado.
/// Usado como extrator nas rotas que alteram dados.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

/// Usuário autenticado, aprovado e com role = admin
#[derive(Debug, Clone)]
pub struct AdminUser(pub SessionUser);

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pending = gate(req, AccessTier::Approved);
        Box::pin(async move { pending.await.map(AuthUser) })
    }
}

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pending = gate(req, AccessTier::Admin);
        Box::pin(async move { pending.await.map(AdminUser) })
    }
}

fn gate(req: &HttpRequest, tier: AccessTier) -> LocalBoxFuture<'static, Result<SessionUser, ApiError>> {
    // 1. Extrair o token (formato: "Bearer <token>")
    let token = bearer_token(
        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok()),
    )
    .map(str::to_string);

    let state = req.app_data::<web::Data<AppState>>().cloned();

    Box::pin(async move {
        let token = token.ok_or_else(|| {
            ApiError::Unauthorized("Token ausente (esperado: Authorization: Bearer <token>)".into())
        })?;
        let state = state.ok_or_else(|| ApiError::internal("Erro de configuração")("AppState ausente"))?;

        // 2. Buscar o token, verificar expiração, aprovação e papel
        let decision = SessionService::authorize(&state.db, &token, tier)
            .await
            .map_err(ApiError::internal("Erro ao validar sessão"))?;

        decision.map_err(|rejection| match rejection {
            GateRejection::Unauthorized(msg) => ApiError::Unauthorized(msg.to_string()),
            GateRejection::Forbidden(msg) => ApiError::Forbidden(msg.to_string()),
        })
    })
}
