// ============================================================================
// SESSÕES E AUTORIZAÇÃO
// ============================================================================
//
// Máquina de estados por requisição:
//   Anônimo -> (Bearer presente?) -> Busca do token -> Autorizado | Rejeitado
//
//   - token ausente / desconhecido / expirado     => 401
//   - token válido mas usuário não aprovado       => 401
//   - nível admin exige role = admin, senão       => 403
//
// A aprovação é verificada a cada requisição: desaprovar um usuário invalida
// na hora todos os tokens dele.
//
// ============================================================================

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, NaiveDateTime, Utc};
use rand::RngCore;
use sea_orm::{DbErr, FromQueryResult};
use serde::Serialize;

use crate::db::Db;
use crate::models::users::UserRole;

pub const TOKEN_TTL_DAYS: i64 = 7;
const TOKEN_BYTES: usize = 32;

/// Linha do token já juntada com o dono
#[derive(Debug, Clone, FromQueryResult)]
pub struct SessionRow {
    pub usuario_id: i32,
    pub expires_at: NaiveDateTime,
    pub nome: String,
    pub login: String,
    pub role: String,
    pub aprovado: bool,
}

/// Usuário autorizado para a requisição corrente
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub user_id: i32,
    pub nome: String,
    pub login: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTier {
    Approved,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateRejection {
    Unauthorized(&'static str),
    Forbidden(&'static str),
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: NaiveDateTime,
}

pub struct SessionService;

impl SessionService {
    /// 32 bytes aleatórios em base64url sem padding
    pub fn generate_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Cria um novo token para o usuário, válido por 7 dias
    pub async fn issue(db: &Db, user_id: i32) -> Result<IssuedToken, DbErr> {
        let now = Utc::now().naive_utc();
        let expires_at = now + Duration::days(TOKEN_TTL_DAYS);
        let token = Self::generate_token();

        db.execute(
            "INSERT INTO tokens (token, usuario_id, expires_at, created_at) VALUES (?, ?, ?, ?)",
            vec![token.clone().into(), user_id.into(), expires_at.into(), now.into()],
        )
        .await?;

        Ok(IssuedToken { token, expires_at })
    }

    pub async fn lookup(db: &Db, token: &str) -> Result<Option<SessionRow>, DbErr> {
        db.fetch_one(
            "SELECT t.usuario_id, t.expires_at, u.nome, u.login, u.role, u.aprovado \
             FROM tokens t JOIN usuarios u ON u.id = t.usuario_id \
             WHERE t.token = ?",
            vec![token.into()],
        )
        .await
    }

    /// Busca o token e aplica o portão do nível pedido
    pub async fn authorize(
        db: &Db,
        token: &str,
        tier: AccessTier,
    ) -> Result<Result<SessionUser, GateRejection>, DbErr> {
        let session = Self::lookup(db, token).await?;
        Ok(evaluate(session, Utc::now().naive_utc(), tier))
    }
}

/// Regra pura do portão: expiração, aprovação e papel
pub fn evaluate(
    session: Option<SessionRow>,
    now: NaiveDateTime,
    tier: AccessTier,
) -> Result<SessionUser, GateRejection> {
    let session = session.ok_or(GateRejection::Unauthorized("Token inválido"))?;

    if session.expires_at <= now {
        return Err(GateRejection::Unauthorized("Token expirado"));
    }
    if !session.aprovado {
        return Err(GateRejection::Unauthorized("Usuário não aprovado"));
    }

    let role = UserRole::from_db(&session.role);
    if tier == AccessTier::Admin && role != UserRole::Admin {
        return Err(GateRejection::Forbidden("Acesso restrito ao administrador"));
    }

    Ok(SessionUser {
        user_id: session.usuario_id,
        nome: session.nome,
        login: session.login,
        role,
    })
}

/// Extrai o token do cabeçalho `Authorization: Bearer <token>`
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(aprovado: bool, role: &str, expires_in: Duration) -> SessionRow {
        SessionRow {
            usuario_id: 7,
            expires_at: Utc::now().naive_utc() + expires_in,
            nome: "Ana".into(),
            login: "ana".into(),
            role: role.into(),
            aprovado,
        }
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        assert!(matches!(
            evaluate(None, now(), AccessTier::Approved),
            Err(GateRejection::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_is_unauthorized() {
        let session = row(true, "user", Duration::seconds(-1));
        assert_eq!(
            evaluate(Some(session), now(), AccessTier::Approved),
            Err(GateRejection::Unauthorized("Token expirado"))
        );
    }

    #[test]
    fn test_unapproved_user_is_unauthorized_even_as_admin() {
        let session = row(false, "admin", Duration::days(1));
        assert_eq!(
            evaluate(Some(session), now(), AccessTier::Admin),
            Err(GateRejection::Unauthorized("Usuário não aprovado"))
        );
    }

    #[test]
    fn test_approved_user_tiers() {
        let user = evaluate(Some(row(true, "user", Duration::days(1))), now(), AccessTier::Approved)
            .unwrap();
        assert_eq!(user.user_id, 7);
        assert_eq!(user.role, UserRole::User);

        assert!(matches!(
            evaluate(Some(row(true, "user", Duration::days(1))), now(), AccessTier::Admin),
            Err(GateRejection::Forbidden(_))
        ));

        let admin = evaluate(Some(row(true, "admin", Duration::days(1))), now(), AccessTier::Admin)
            .unwrap();
        assert_eq!(admin.role, UserRole::Admin);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(Some("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(Some("Basic abc")), None);
        assert_eq!(bearer_token(Some("Bearer   ")), None);
        assert_eq!(bearer_token(None), None);
    }

    #[test]
    fn test_generated_tokens_are_unique_and_url_safe() {
        let a = SessionService::generate_token();
        let b = SessionService::generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_issued_token_expires_in_seven_days() {
        let ctx = crate::test_utils::TestContext::new().await;
        let user_id = ctx.create_user("ana", UserRole::User, true).await;

        let before = now();
        let issued = SessionService::issue(ctx.db(), user_id).await.unwrap();
        let ttl = issued.expires_at - before;
        assert!(ttl >= Duration::days(TOKEN_TTL_DAYS));
        assert!(ttl < Duration::days(TOKEN_TTL_DAYS) + Duration::minutes(1));

        let stored = SessionService::lookup(ctx.db(), &issued.token).await.unwrap().unwrap();
        assert_eq!(stored.usuario_id, user_id);
        assert!((stored.expires_at - issued.expires_at).num_seconds().abs() < 1);

        // Logo após o prazo o mesmo token é recusado
        let later = issued.expires_at + Duration::seconds(1);
        assert_eq!(
            evaluate(Some(stored), later, AccessTier::Approved),
            Err(GateRejection::Unauthorized("Token expirado"))
        );
    }
}
