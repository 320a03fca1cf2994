// Objetos de requisição/resposta compartilhados entre rotas e serviços
use serde::{Deserialize, Serialize};

use super::{documents, patients, users};

/// Corpo aceito na criação e atualização de pacientes (JSON ou multipart)
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PatientPayload {
    pub id: Option<String>,
    pub nome: Option<String>,
    pub status: Option<String>,
    pub estudo: Option<String>,
    pub data: Option<String>,
    pub encaminhador: Option<String>,
    #[serde(rename = "tcleAgendado")]
    pub tcle_agendado: Option<String>,
    #[serde(rename = "tcleAssinado")]
    pub tcle_assinado: Option<String>,
    #[serde(rename = "dataAssinatura")]
    pub data_assinatura: Option<String>,
    pub elegivel: Option<String>,
    #[serde(rename = "motivoNaoElegivel")]
    pub motivo_nao_elegivel: Option<String>,
    pub comentarios: Option<String>,
}

/// Paciente com os documentos embutidos (GET /api/pacientes/{id})
#[derive(Debug, Serialize)]
pub struct PatientWithDocuments {
    #[serde(flatten)]
    pub patient: patients::Model,
    pub documentos: Vec<documents::Model>,
}

/// Resposta de login: token + dados públicos do usuário
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: chrono::NaiveDateTime,
    pub usuario: users::Model,
}
