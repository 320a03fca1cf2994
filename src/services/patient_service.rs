use chrono::Utc;
use sea_orm::{DbErr, Value};

use crate::config::AppConfig;
use crate::db::Db;
use crate::error::ApiError;
use crate::models::dto::{PatientPayload, PatientWithDocuments};
use crate::models::patients::PatientStatus;
use crate::models::{documents, patients};
use crate::services::upload_store::{StoredUpload, UploadStore};
use crate::utils::ids;

const INSERT_DOCUMENT: &str = "INSERT INTO documentos (paciente_id, nome_arquivo, caminho_arquivo, tamanho, tipo, uploaded_at) \
                               VALUES (?, ?, ?, ?, ?, ?)";

/// Campos obrigatórios já validados
struct RequiredFields {
    nome: String,
    status: String,
    estudo: String,
    data: String,
}

pub struct PatientService;

impl PatientService {
    pub async fn list(db: &Db) -> Result<Vec<patients::Model>, DbErr> {
        db.fetch_all("SELECT * FROM pacientes ORDER BY data DESC", vec![]).await
    }

    pub async fn find_with_documents(db: &Db, id: &str) -> Result<Option<PatientWithDocuments>, DbErr> {
        let Some(patient) = db
            .fetch_one::<patients::Model>("SELECT * FROM pacientes WHERE id = ?", vec![id.into()])
            .await?
        else {
            return Ok(None);
        };

        let documentos = Self::documents_of(db, id).await?;
        Ok(Some(PatientWithDocuments { patient, documentos }))
    }

    pub async fn documents_of(db: &Db, patient_id: &str) -> Result<Vec<documents::Model>, DbErr> {
        db.fetch_all(
            "SELECT * FROM documentos WHERE paciente_id = ? ORDER BY id ASC",
            vec![patient_id.into()],
        )
        .await
    }

    pub async fn exists(db: &Db, id: &str) -> Result<bool, DbErr> {
        let row: Option<patients::Model> = db
            .fetch_one("SELECT * FROM pacientes WHERE id = ?", vec![id.into()])
            .await?;
        Ok(row.is_some())
    }

    /// Cria o paciente e registra os documentos já gravados em disco.
    /// Se o paciente não for gravado, os arquivos enviados são apagados.
    pub async fn create(
        db: &Db,
        store: &UploadStore,
        config: &AppConfig,
        payload: PatientPayload,
        uploads: &[StoredUpload],
    ) -> Result<String, ApiError> {
        let id = match Self::insert_patient(db, config, payload).await {
            Ok(id) => id,
            Err(e) => {
                store.remove_all(uploads).await;
                return Err(e);
            }
        };

        Self::attach_documents(db, store, &id, uploads).await?;
        Ok(id)
    }

    /// Status e estudo são validados aqui (e só aqui)
    async fn insert_patient(
        db: &Db,
        config: &AppConfig,
        payload: PatientPayload,
    ) -> Result<String, ApiError> {
        let required = required_fields(&payload)?;

        if PatientStatus::parse(&required.status).is_none() {
            let allowed: Vec<&str> = PatientStatus::ALL.iter().map(|s| s.as_str()).collect();
            return Err(ApiError::bad_request(format!(
                "Status inválido. Valores aceitos: {}",
                allowed.join(", ")
            )));
        }
        if !config.is_allowed_study(&required.estudo) {
            return Err(ApiError::bad_request(format!(
                "Estudo inválido. Valores aceitos: {}",
                config.allowed_studies.join(", ")
            )));
        }

        let id = payload
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(ids::patient_id);
        let now = Utc::now().naive_utc();

        db.execute(
            "INSERT INTO pacientes (id, nome, status, estudo, data, encaminhador, tcle_agendado, tcle_assinado, \
             data_assinatura, elegivel, motivo_nao_elegivel, comentarios, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                id.clone().into(),
                required.nome.into(),
                required.status.into(),
                required.estudo.into(),
                required.data.into(),
                payload.encaminhador.into(),
                payload.tcle_agendado.into(),
                payload.tcle_assinado.into(),
                payload.data_assinatura.into(),
                payload.elegivel.into(),
                payload.motivo_nao_elegivel.into(),
                payload.comentarios.into(),
                now.into(),
                now.into(),
            ],
        )
        .await
        .map_err(ApiError::from_write("Erro ao criar paciente", "Já existe um paciente com este id"))?;

        Ok(id)
    }

    /// Atualiza o paciente e acrescenta os documentos novos.
    /// Devolve false se o paciente não existe; nesse caso e em qualquer erro
    /// antes da gravação os arquivos enviados são apagados.
    pub async fn update(
        db: &Db,
        store: &UploadStore,
        id: &str,
        payload: PatientPayload,
        uploads: &[StoredUpload],
    ) -> Result<bool, ApiError> {
        match Self::update_row(db, id, payload).await {
            Ok(true) => {}
            Ok(false) => {
                store.remove_all(uploads).await;
                return Ok(false);
            }
            Err(e) => {
                store.remove_all(uploads).await;
                return Err(e);
            }
        }

        Self::attach_documents(db, store, id, uploads).await?;
        Ok(true)
    }

    /// Atualiza todos os campos. Status/estudo não são revalidados.
    async fn update_row(db: &Db, id: &str, payload: PatientPayload) -> Result<bool, ApiError> {
        let required = required_fields(&payload)?;
        let now = Utc::now().naive_utc();

        let outcome = db
            .execute(
                "UPDATE pacientes SET nome = ?, status = ?, estudo = ?, data = ?, encaminhador = ?, \
                 tcle_agendado = ?, tcle_assinado = ?, data_assinatura = ?, elegivel = ?, \
                 motivo_nao_elegivel = ?, comentarios = ?, updated_at = ? WHERE id = ?",
                vec![
                    required.nome.into(),
                    required.status.into(),
                    required.estudo.into(),
                    required.data.into(),
                    payload.encaminhador.into(),
                    payload.tcle_agendado.into(),
                    payload.tcle_assinado.into(),
                    payload.data_assinatura.into(),
                    payload.elegivel.into(),
                    payload.motivo_nao_elegivel.into(),
                    payload.comentarios.into(),
                    now.into(),
                    id.into(),
                ],
            )
            .await
            .map_err(ApiError::internal("Erro ao atualizar paciente"))?;

        Ok(outcome.rows_affected > 0)
    }

    /// Remove arquivos, documentos e o paciente, nesta ordem.
    /// Devolve false se o paciente não existe.
    pub async fn delete(db: &Db, store: &UploadStore, id: &str) -> Result<bool, DbErr> {
        let docs = Self::documents_of(db, id).await?;
        for doc in &docs {
            store.remove(&doc.caminho_arquivo).await;
        }

        db.execute("DELETE FROM documentos WHERE paciente_id = ?", vec![id.into()])
            .await?;
        let outcome = db
            .execute("DELETE FROM pacientes WHERE id = ?", vec![id.into()])
            .await?;

        Ok(outcome.rows_affected > 0)
    }

    /// Um INSERT por documento, sem transação: uma falha no meio deixa os
    /// anteriores gravados e apaga os arquivos ainda sem linha
    async fn attach_documents(
        db: &Db,
        store: &UploadStore,
        patient_id: &str,
        uploads: &[StoredUpload],
    ) -> Result<(), ApiError> {
        for (recorded, upload) in uploads.iter().enumerate() {
            let params: Vec<Value> = vec![
                patient_id.into(),
                upload.original_name.clone().into(),
                upload.stored_name.clone().into(),
                upload.size.into(),
                upload.mime_type.clone().into(),
                Utc::now().naive_utc().into(),
            ];
            if let Err(e) = db.execute(INSERT_DOCUMENT, params).await {
                store.remove_all(&uploads[recorded..]).await;
                return Err(ApiError::internal("Erro ao salvar documento")(e));
            }
        }
        Ok(())
    }
}

fn required_fields(payload: &PatientPayload) -> Result<RequiredFields, ApiError> {
    let field = |value: &Option<String>| value.clone().filter(|v| !v.trim().is_empty());

    match (
        field(&payload.nome),
        field(&payload.status),
        field(&payload.estudo),
        field(&payload.data),
    ) {
        (Some(nome), Some(status), Some(estudo), Some(data)) => Ok(RequiredFields {
            nome,
            status,
            estudo,
            data,
        }),
        _ => Err(ApiError::bad_request("nome, status, estudo e data são obrigatórios")),
    }
}
