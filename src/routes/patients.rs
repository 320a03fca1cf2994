use actix_multipart::Multipart;
use actix_web::{HttpResponse, guard, http::header, web};

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::dto::PatientPayload;
use crate::services::multipart_form::{PatientForm, read_patient_form};
use crate::services::patient_service::PatientService;
use crate::services::upload_store::StoredUpload;

/// GET /api/pacientes - Lista todos os pacientes (data mais recente primeiro)
pub async fn list_patients(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = PatientService::list(&state.db)
        .await
        .map_err(ApiError::internal("Erro ao buscar pacientes"))?;

    Ok(HttpResponse::Ok().json(rows))
}

/// GET /api/pacientes/{id} - Paciente com os documentos
pub async fn get_patient(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let patient = PatientService::find_with_documents(&state.db, &path)
        .await
        .map_err(ApiError::internal("Erro ao buscar paciente"))?
        .ok_or_else(|| ApiError::not_found("Paciente não encontrado"))?;

    Ok(HttpResponse::Ok().json(patient))
}

/// POST /api/pacientes (JSON)
pub async fn create_patient_json(
    _auth: AuthUser,
    body: web::Json<PatientPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    create_patient(&state, body.into_inner(), Vec::new()).await
}

/// POST /api/pacientes (multipart, com até 10 documentos)
pub async fn create_patient_multipart(
    _auth: AuthUser,
    multipart: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let PatientForm { payload, uploads } = read_patient_form(multipart, &state.uploads).await?;
    create_patient(&state, payload, uploads).await
}

async fn create_patient(
    state: &AppState,
    payload: PatientPayload,
    uploads: Vec<StoredUpload>,
) -> Result<HttpResponse, ApiError> {
    // Em erro o serviço já apagou os arquivos sem documento gravado
    let id = PatientService::create(&state.db, &state.uploads, &state.config, payload, &uploads).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Paciente criado com sucesso",
        "id": id,
        "documentos": uploads.len()
    })))
}

/// PUT /api/pacientes/{id} (JSON)
pub async fn update_patient_json(
    _auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<PatientPayload>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    update_patient(&state, &path, body.into_inner(), Vec::new()).await
}

/// PUT /api/pacientes/{id} (multipart, novos documentos são acrescentados)
pub async fn update_patient_multipart(
    _auth: AuthUser,
    path: web::Path<String>,
    multipart: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let PatientForm { payload, uploads } = read_patient_form(multipart, &state.uploads).await?;
    update_patient(&state, &path, payload, uploads).await
}

async fn update_patient(
    state: &AppState,
    id: &str,
    payload: PatientPayload,
    uploads: Vec<StoredUpload>,
) -> Result<HttpResponse, ApiError> {
    if !PatientService::update(&state.db, &state.uploads, id, payload, &uploads).await? {
        return Err(ApiError::not_found("Paciente não encontrado"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Paciente atualizado com sucesso",
        "documentos": uploads.len()
    })))
}

/// DELETE /api/pacientes/{id} - Remove paciente, documentos e arquivos
pub async fn delete_patient(
    _auth: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let deleted = PatientService::delete(&state.db, &state.uploads, &path)
        .await
        .map_err(ApiError::internal("Erro ao deletar paciente"))?;

    if !deleted {
        return Err(ApiError::not_found("Paciente não encontrado"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Paciente deletado com sucesso"
    })))
}

fn is_multipart(ctx: &guard::GuardContext<'_>) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"))
}

pub fn patients_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/pacientes")
            .service(
                web::resource("")
                    .route(web::get().to(list_patients))
                    .route(web::post().guard(guard::fn_guard(is_multipart)).to(create_patient_multipart))
                    .route(web::post().to(create_patient_json)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_patient))
                    .route(web::put().guard(guard::fn_guard(is_multipart)).to(update_patient_multipart))
                    .route(web::put().to(update_patient_json))
                    .route(web::delete().to(delete_patient)),
            ),
    );
}
