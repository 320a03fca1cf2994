// ============================================================================
// MODELO : DOCUMENTOS
// ============================================================================
//
// Description:
//   Metadados dos arquivos anexados a um paciente. O arquivo físico fica em
//   UPLOADS_DIR com nome aleatório (caminho_arquivo); nome_arquivo guarda o
//   nome original enviado pelo cliente.
//
// Points d'attention:
//   - ON DELETE CASCADE: paciente removido => documentos removidos
//   - O arquivo em disco é apagado junto com a linha (best-effort)
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documentos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub paciente_id: String,
    pub nome_arquivo: String,
    pub caminho_arquivo: String,
    pub tamanho: Option<i32>,
    pub tipo: Option<String>,
    #[serde(rename = "uploadedAt")]
    pub uploaded_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::patients::Entity",
        from = "Column::PacienteId",
        to = "super::patients::Column::Id",
        on_delete = "Cascade"
    )]
    Patient,
}

impl Related<super::patients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Patient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
