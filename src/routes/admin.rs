use actix_web::{HttpResponse, get, put, web};
use chrono::Utc;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::AdminUser;
use crate::models::users;

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub aprovado: Option<bool>,
}

/// GET /api/admin/usuarios - Todas as contas, mais recentes primeiro
#[get("/usuarios")]
pub async fn list_users(
    _admin: AdminUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let rows: Vec<users::Model> = state
        .db
        .fetch_all("SELECT * FROM usuarios ORDER BY created_at DESC", vec![])
        .await
        .map_err(ApiError::internal("Erro ao listar usuários"))?;

    Ok(HttpResponse::Ok().json(rows))
}

/// PUT /api/admin/usuarios/{id}/aprovacao - Aprova (padrão) ou revoga
#[put("/usuarios/{id}/aprovacao")]
pub async fn set_approval(
    admin: AdminUser,
    path: web::Path<i32>,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    let aprovado = approval_from_body(&body)?;

    let outcome = state
        .db
        .execute(
            "UPDATE usuarios SET aprovado = ?, updated_at = ? WHERE id = ?",
            vec![aprovado.into(), Utc::now().naive_utc().into(), user_id.into()],
        )
        .await
        .map_err(ApiError::internal("Erro ao atualizar aprovação"))?;

    if outcome.rows_affected == 0 {
        return Err(ApiError::not_found("Usuário não encontrado"));
    }

    // A revogação vale já na próxima requisição: o portão relê `aprovado`
    tracing::info!(user_id, aprovado, by = admin.0.user_id, "Aprovação de usuário alterada");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": user_id,
        "aprovado": aprovado
    })))
}

/// Corpo vazio aprova; qualquer outro corpo precisa ser `{"aprovado": bool}`
fn approval_from_body(body: &[u8]) -> Result<bool, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(true);
    }

    let request: ApprovalRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Corpo inválido: {e}")))?;
    Ok(request.aprovado.unwrap_or(true))
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(list_users)
            .service(set_approval),
    );
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use super::approval_from_body;
    use crate::error::ApiError;
    use crate::models::users::UserRole;
    use crate::test_utils::{TestContext, bearer, test_app};

    #[::core::prelude::v1::test]
    fn test_approval_body_parsing() {
        assert!(approval_from_body(b"").unwrap());
        assert!(approval_from_body(b"  \n").unwrap());
        assert!(approval_from_body(b"{}").unwrap());
        assert!(!approval_from_body(br#"{"aprovado": false}"#).unwrap());
        assert!(matches!(approval_from_body(br#"{"aprovado": "false"}"#), Err(ApiError::BadRequest(_))));
        assert!(matches!(approval_from_body(b"aprovado=false"), Err(ApiError::BadRequest(_))));
    }

    #[actix_web::test]
    async fn test_unparseable_revoke_does_not_approve() {
        let ctx = TestContext::new().await;
        let admin_token = ctx.admin_token().await;
        let user_id = ctx.create_user("pendente", UserRole::User, false).await;
        let user_token = ctx.token_for(user_id).await;
        let app = test::init_service(test_app(ctx.state.clone())).await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/usuarios/{user_id}/aprovacao"))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "aprovado": "false" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        // Sem Content-Type JSON o corpo ainda é lido e respeitado
        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/usuarios/{user_id}/aprovacao"))
            .insert_header(bearer(&admin_token))
            .insert_header(("Content-Type", "text/plain"))
            .set_payload(r#"{"aprovado": false}"#)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["aprovado"], false);

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header(bearer(&user_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_admin_routes_require_admin_role() {
        let ctx = TestContext::new().await;
        let user_token = ctx.approved_token().await;
        let app = test::init_service(test_app(ctx.state.clone())).await;

        let req = test::TestRequest::get().uri("/api/admin/usuarios").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/admin/usuarios")
            .insert_header(bearer(&user_token))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_approval_grants_and_revokes_access() {
        let ctx = TestContext::new().await;
        let admin_token = ctx.admin_token().await;
        let user_id = ctx.create_user("novo", UserRole::User, false).await;
        let user_token = ctx.token_for(user_id).await;
        let app = test::init_service(test_app(ctx.state.clone())).await;

        let me = |token: &str| {
            test::TestRequest::get()
                .uri("/api/auth/me")
                .insert_header(bearer(token))
                .to_request()
        };
        assert_eq!(test::call_service(&app, me(&user_token)).await.status(), StatusCode::UNAUTHORIZED);

        // Corpo ausente: aprova
        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/usuarios/{user_id}/aprovacao"))
            .insert_header(bearer(&admin_token))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["aprovado"], true);
        assert_eq!(test::call_service(&app, me(&user_token)).await.status(), StatusCode::OK);

        let req = test::TestRequest::put()
            .uri(&format!("/api/admin/usuarios/{user_id}/aprovacao"))
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "aprovado": false }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(test::call_service(&app, me(&user_token)).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/admin/usuarios")
            .insert_header(bearer(&admin_token))
            .to_request();
        let users: Value = test::call_and_read_body_json(&app, req).await;
        let users = users.as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.get("senha_hash").is_none()));
    }

    #[actix_web::test]
    async fn test_approval_of_unknown_user_is_not_found() {
        let ctx = TestContext::new().await;
        let admin_token = ctx.admin_token().await;
        let app = test::init_service(test_app(ctx.state.clone())).await;

        let req = test::TestRequest::put()
            .uri("/api/admin/usuarios/9999/aprovacao")
            .insert_header(bearer(&admin_token))
            .set_json(json!({ "aprovado": true }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
