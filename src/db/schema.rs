// Provisionamento idempotente do schema: CREATE TABLE IF NOT EXISTS a partir
// das entidades, na ordem das chaves estrangeiras, seguido das migrações de
// coluna legadas (falham com "coluna já existe" e são ignoradas).

use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};

use super::Db;
use crate::models::{appointments, documents, patients, session_tokens, settings, users};

/// Colunas adicionadas depois da primeira versão do schema
const COLUMN_MIGRATIONS: &[(&str, &str)] = &[
    ("pacientes", "ALTER TABLE pacientes ADD COLUMN comentarios TEXT"),
];

pub async fn provision(db: &Db) -> Result<(), DbErr> {
    create_table(db, patients::Entity).await?;
    create_table(db, documents::Entity).await?;
    create_table(db, settings::Entity).await?;
    create_table(db, users::Entity).await?;
    create_table(db, session_tokens::Entity).await?;
    create_table(db, appointments::Entity).await?;

    for (table, sql) in COLUMN_MIGRATIONS {
        if let Err(e) = db.execute(sql, vec![]).await {
            tracing::debug!(table = *table, error = %e, "Migração de coluna ignorada");
        }
    }

    tracing::info!("Schema pronto");
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &Db, entity: E) -> Result<(), DbErr> {
    let conn = db.connection();
    let backend = conn.get_database_backend();
    let name = entity.table_name().to_string();
    let mut table = Schema::new(backend).create_table_from_entity(entity);
    table.if_not_exists();

    conn.execute(backend.build(&table)).await?;
    tracing::debug!(table = %name, "Tabela pronta");
    Ok(())
}
