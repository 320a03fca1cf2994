use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Chave usada para o logo da instituição
pub const LOGO_KEY: &str = "logo";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "configuracoes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub chave: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub valor: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
