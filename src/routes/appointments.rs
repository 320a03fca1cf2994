use actix_web::{HttpResponse, delete, get, post, web};
use chrono::Utc;
use serde::Deserialize;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::appointments;
use crate::services::patient_service::PatientService;
use crate::utils::ids;

// DTO para criar um agendamento
#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub paciente_id: Option<String>,
    pub data: Option<String>,
    pub descricao: Option<String>,
}

/// GET /api/agendamentos - Ordenados por data crescente
#[get("")]
pub async fn list_appointments(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows: Vec<appointments::Model> = state
        .db
        .fetch_all("SELECT * FROM agendamentos ORDER BY data ASC", vec![])
        .await
        .map_err(ApiError::internal("Erro ao buscar agendamentos"))?;

    Ok(HttpResponse::Ok().json(rows))
}

/// POST /api/agendamentos - O paciente precisa existir
#[post("")]
pub async fn create_appointment(
    _auth: AuthUser,
    body: web::Json<CreateAppointmentRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let CreateAppointmentRequest { paciente_id, data, descricao } = body.into_inner();

    let (Some(paciente_id), Some(data)) = (
        paciente_id.filter(|v| !v.is_empty()),
        data.filter(|v| !v.is_empty()),
    ) else {
        return Err(ApiError::bad_request("paciente_id e data são obrigatórios"));
    };

    let exists = PatientService::exists(&state.db, &paciente_id)
        .await
        .map_err(ApiError::internal("Erro ao criar agendamento"))?;
    if !exists {
        return Err(ApiError::bad_request("Paciente não encontrado"));
    }

    let id = ids::appointment_id();
    state
        .db
        .execute(
            "INSERT INTO agendamentos (id, paciente_id, data, descricao, created_at) VALUES (?, ?, ?, ?, ?)",
            vec![
                id.clone().into(),
                paciente_id.clone().into(),
                data.clone().into(),
                descricao.clone().into(),
                Utc::now().naive_utc().into(),
            ],
        )
        .await
        .map_err(ApiError::internal("Erro ao criar agendamento"))?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "id": id,
        "paciente_id": paciente_id,
        "data": data,
        "descricao": descricao
    })))
}

/// DELETE /api/agendamentos/{id}
#[delete("/{id}")]
pub async fn delete_appointment(
    _auth: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let outcome = state
        .db
        .execute("DELETE FROM agendamentos WHERE id = ?", vec![path.as_str().into()])
        .await
        .map_err(ApiError::internal("Erro ao remover agendamento"))?;

    if outcome.rows_affected == 0 {
        return Err(ApiError::not_found("Agendamento não encontrado"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Agendamento removido"
    })))
}

pub fn appointments_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/agendamentos")
            .service(list_appointments)
            .service(create_appointment)
            .service(delete_appointment),
    );
}
