// Leitura do formulário multipart de pacientes: campos de texto viram o
// PatientPayload, arquivos do campo "documentos" vão direto para o disco.
// Se qualquer parte falhar, os arquivos já gravados nesta requisição são apagados.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::{StreamExt, TryStreamExt};

use crate::error::ApiError;
use crate::models::dto::PatientPayload;
use crate::services::upload_store::{MAX_FILES, StoredUpload, UploadError, UploadStore};

const DOCUMENTS_FIELD: &str = "documentos";
const MAX_TEXT_FIELD: usize = 64 * 1024;

pub struct PatientForm {
    pub payload: PatientPayload,
    pub uploads: Vec<StoredUpload>,
}

pub async fn read_patient_form(
    mut multipart: Multipart,
    store: &UploadStore,
) -> Result<PatientForm, ApiError> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut uploads: Vec<StoredUpload> = Vec::new();

    let result: Result<(), ApiError> = async {
        while let Some(field) = multipart.next().await {
            let mut field = field.map_err(|e| ApiError::bad_request(format!("Multipart inválido: {}", e)))?;
            let name = field.name().unwrap_or_default().to_string();
            let filename = field
                .content_disposition()
                .and_then(|cd| cd.get_filename())
                .map(str::to_string);

            match filename {
                Some(original_name) if name == DOCUMENTS_FIELD => {
                    if uploads.len() >= MAX_FILES {
                        return Err(upload_error(UploadError::TooMany));
                    }
                    let mime_type = field
                        .content_type()
                        .map(|m| m.essence_str().to_string())
                        .unwrap_or_default();
                    let stored = store
                        .save_stream(&original_name, &mime_type, &mut field)
                        .await
                        .map_err(upload_error)?;
                    uploads.push(stored);
                }
                Some(_) => {
                    // Arquivo em campo desconhecido: descarta o conteúdo
                    while field.try_next().await.map_err(|e| ApiError::bad_request(e.to_string()))?.is_some() {}
                }
                None => {
                    let mut value = Vec::new();
                    while let Some(chunk) = field
                        .try_next()
                        .await
                        .map_err(|e| ApiError::bad_request(e.to_string()))?
                    {
                        if value.len() + chunk.len() > MAX_TEXT_FIELD {
                            return Err(ApiError::bad_request(format!("Campo {} muito grande", name)));
                        }
                        value.extend_from_slice(&chunk);
                    }
                    let value = String::from_utf8(value)
                        .map_err(|_| ApiError::bad_request(format!("Campo {} não é UTF-8", name)))?;
                    fields.insert(name, value);
                }
            }
        }
        Ok(())
    }
    .await;

    if let Err(e) = result {
        store.remove_all(&uploads).await;
        return Err(e);
    }

    Ok(PatientForm {
        payload: payload_from_fields(fields),
        uploads,
    })
}

fn upload_error(err: UploadError) -> ApiError {
    if err.is_client_error() {
        ApiError::bad_request(err.to_string())
    } else {
        ApiError::internal("Erro ao salvar documento")(err)
    }
}

/// Campos vazios do formulário contam como ausentes
fn payload_from_fields(mut fields: HashMap<String, String>) -> PatientPayload {
    let mut take = |key: &str| fields.remove(key).filter(|v| !v.is_empty());

    PatientPayload {
        id: take("id"),
        nome: take("nome"),
        status: take("status"),
        estudo: take("estudo"),
        data: take("data"),
        encaminhador: take("encaminhador"),
        tcle_agendado: take("tcleAgendado"),
        tcle_assinado: take("tcleAssinado"),
        data_assinatura: take("dataAssinatura"),
        elegivel: take("elegivel"),
        motivo_nao_elegivel: take("motivoNaoElegivel"),
        comentarios: take("comentarios"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_from_fields() {
        let fields = HashMap::from([
            ("nome".to_string(), "Maria".to_string()),
            ("tcleAgendado".to_string(), "2025-01-10".to_string()),
            ("encaminhador".to_string(), String::new()),
            ("ignorado".to_string(), "x".to_string()),
        ]);
        let payload = payload_from_fields(fields);
        assert_eq!(payload.nome.as_deref(), Some("Maria"));
        assert_eq!(payload.tcle_agendado.as_deref(), Some("2025-01-10"));
        assert_eq!(payload.encaminhador, None);
        assert_eq!(payload.id, None);
    }
}
