use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::settings::{self, LOGO_KEY};

#[derive(Deserialize)]
pub struct SaveLogoRequest {
    #[serde(rename = "logoData")]
    pub logo_data: Option<String>,
}

/// GET /api/configuracoes/logo
#[get("/logo")]
pub async fn get_logo(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let row: Option<settings::Model> = state
        .db
        .fetch_one("SELECT * FROM configuracoes WHERE chave = ?", vec![LOGO_KEY.into()])
        .await
        .map_err(ApiError::internal("Erro ao buscar logo"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "logo": row.and_then(|r| r.valor)
    })))
}

/// POST /api/configuracoes/logo - Upsert da chave "logo"
#[post("/logo")]
pub async fn save_logo(
    _auth: AuthUser,
    body: web::Json<SaveLogoRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    // ON CONFLICT ... DO UPDATE é aceito tanto pelo SQLite quanto pelo PostgreSQL
    state
        .db
        .execute(
            "INSERT INTO configuracoes (chave, valor, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT (chave) DO UPDATE SET valor = excluded.valor, updated_at = excluded.updated_at",
            vec![
                LOGO_KEY.into(),
                body.into_inner().logo_data.into(),
                Utc::now().naive_utc().into(),
            ],
        )
        .await
        .map_err(ApiError::internal("Erro ao salvar logo"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Logo salvo com sucesso"
    })))
}

pub fn settings_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/configuracoes")
            .service(get_logo)
            .service(save_logo),
    );
}
