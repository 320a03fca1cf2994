use actix_web::{HttpResponse, get, web};
use chrono::Utc;

use crate::app_state::AppState;
use crate::models::health::HealthResponse;

/// GET /api/health - Inclui o backend de armazenamento em uso
#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        database: state.db.dialect_name(),
        time: Utc::now(),
    };

    HttpResponse::Ok().json(response)
}
