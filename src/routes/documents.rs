use actix_web::{HttpResponse, web};
use sea_orm::FromQueryResult;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::services::patient_service::PatientService;

#[derive(Debug, FromQueryResult)]
struct StoredFile {
    caminho_arquivo: String,
}

/// GET /api/documentos/{paciente_id} - Documentos de um paciente
pub async fn list_documents(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let rows = PatientService::documents_of(&state.db, &path)
        .await
        .map_err(ApiError::internal("Erro ao buscar documentos"))?;

    Ok(HttpResponse::Ok().json(rows))
}

/// DELETE /api/documentos/{id} - Remove um documento e o arquivo físico
pub async fn delete_document(
    _auth: AuthUser,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    // O mesmo segmento é o id do paciente no GET; aqui precisa ser numérico
    let id: i32 = path
        .parse()
        .map_err(|_| ApiError::not_found("Documento não encontrado"))?;

    let doc: StoredFile = state
        .db
        .fetch_one("SELECT caminho_arquivo FROM documentos WHERE id = ?", vec![id.into()])
        .await
        .map_err(ApiError::internal("Erro ao deletar documento"))?
        .ok_or_else(|| ApiError::not_found("Documento não encontrado"))?;

    state.uploads.remove(&doc.caminho_arquivo).await;

    state
        .db
        .execute("DELETE FROM documentos WHERE id = ?", vec![id.into()])
        .await
        .map_err(ApiError::internal("Erro ao deletar documento"))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Documento deletado com sucesso"
    })))
}

pub fn documents_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/documentos").service(
            web::resource("/{id}")
                .route(web::get().to(list_documents))
                .route(web::delete().to(delete_document)),
        ),
    );
}
