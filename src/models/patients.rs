// ============================================================================
// MODELO : PACIENTES
// ============================================================================
//
// Description:
//   Tabela pacientes. O id é um token opaco (fornecido pelo cliente ou
//   gerado no formato p_<base36>), não um inteiro.
//
// Colunas:
//   - id (TEXT, PRIMARY KEY)
//   - nome, status, estudo, data (TEXT, NOT NULL)
//   - encaminhador, tcle_agendado, tcle_assinado, data_assinatura,
//     elegivel, motivo_nao_elegivel, comentarios (TEXT, NULL)
//   - created_at, updated_at (TIMESTAMP)
//
// Points d'attention:
//   - O JSON mantém os nomes camelCase da API antiga (tcleAgendado, ...)
//   - status/estudo só são validados na criação
//   - ON DELETE CASCADE em documentos e agendamentos
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pacientes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub nome: String,
    pub status: String,
    pub estudo: String,
    pub data: String,
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
    #[serde(rename = "createdAt")]
    pub created_at: DateTime,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::documents::Entity")]
    Documents,

    #[sea_orm(has_many = "super::appointments::Entity")]
    Appointments,
}

impl Related<super::documents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::appointments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Status possíveis no funil de recrutamento
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientStatus {
    Triagem,
    Elegivel,
    Randomizado,
    NaoElegivel,
}

impl PatientStatus {
    pub const ALL: [PatientStatus; 4] = [
        PatientStatus::Triagem,
        PatientStatus::Elegivel,
        PatientStatus::Randomizado,
        PatientStatus::NaoElegivel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Triagem => "Triagem",
            PatientStatus::Elegivel => "Elegível",
            PatientStatus::Randomizado => "Randomizado",
            PatientStatus::NaoElegivel => "Não elegível",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}
