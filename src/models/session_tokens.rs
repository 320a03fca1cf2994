// ============================================================================
// MODELO : TOKENS DE SESSÃO
// ============================================================================
//
// Colunas da tabela tokens:
//   - token (TEXT, PRIMARY KEY) - 32 bytes aleatórios em base64url
//   - usuario_id (INTEGER, NOT NULL, FK vers usuarios)
//   - expires_at (TIMESTAMP, NOT NULL) - created_at + 7 dias
//   - created_at (TIMESTAMP)
//
// Workflow:
//   1. POST /api/auth/login ou /api/auth/admin-login valida as credenciais
//   2. Backend gera o token e insere nesta tabela
//   3. Cliente envia Authorization: Bearer <token>
//   4. A cada requisição protegida: token existe, não expirou, usuário aprovado
//
// Points d'attention:
//   - Não há revogação além da expiração
//   - ON DELETE CASCADE: usuário removido => tokens removidos
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub token: String,

    pub usuario_id: i32,

    pub expires_at: DateTime,

    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UsuarioId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
