// Dialetos SQL suportados. Os handlers escrevem SQL neutro com `?` e o
// dialeto ativo traduz para a sintaxe nativa antes de enviar ao driver.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DbErr, Statement};

/// Resultado de um comando executado só pelo efeito
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub inserted_id: Option<i64>,
}

#[async_trait]
pub trait SqlDialect: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn backend(&self) -> DbBackend;

    /// Reescreve os placeholders posicionais `?` para a sintaxe do backend
    fn rewrite_placeholders<'a>(&self, sql: &'a str) -> Cow<'a, str>;

    async fn execute(
        &self,
        conn: &DatabaseConnection,
        stmt: Statement,
    ) -> Result<ExecOutcome, DbErr>;
}

#[derive(Debug, Default)]
pub struct SqliteDialect;

#[async_trait]
impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn backend(&self) -> DbBackend {
        DbBackend::Sqlite
    }

    fn rewrite_placeholders<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(sql)
    }

    async fn execute(
        &self,
        conn: &DatabaseConnection,
        stmt: Statement,
    ) -> Result<ExecOutcome, DbErr> {
        let is_insert = starts_with_keyword(&stmt.sql, "INSERT");
        let result = conn.execute(stmt).await?;
        let rows_affected = result.rows_affected();

        // last_insert_rowid é por conexão: só faz sentido logo após um INSERT
        let inserted_id = if is_insert && rows_affected > 0 {
            i64::try_from(result.last_insert_id()).ok()
        } else {
            None
        };

        Ok(ExecOutcome { rows_affected, inserted_id })
    }
}

#[derive(Debug, Default)]
pub struct PostgresDialect;

#[async_trait]
impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn backend(&self) -> DbBackend {
        DbBackend::Postgres
    }

    fn rewrite_placeholders<'a>(&self, sql: &'a str) -> Cow<'a, str> {
        numbered_placeholders(sql)
    }

    async fn execute(
        &self,
        conn: &DatabaseConnection,
        stmt: Statement,
    ) -> Result<ExecOutcome, DbErr> {
        // O Postgres não tem last_insert_id: o id só vem com RETURNING
        if !contains_keyword(&stmt.sql, "RETURNING") {
            let result = conn.execute(stmt).await?;
            return Ok(ExecOutcome {
                rows_affected: result.rows_affected(),
                inserted_id: None,
            });
        }

        let rows = conn.query_all(stmt).await?;
        let inserted_id = rows
            .first()
            .and_then(|row| {
                row.try_get::<i32>("", "id")
                    .map(i64::from)
                    .or_else(|_| row.try_get::<i64>("", "id"))
                    .ok()
            });

        Ok(ExecOutcome {
            rows_affected: rows.len() as u64,
            inserted_id,
        })
    }
}

/// `?` → `$1, $2, ...`, ignorando `?` dentro de literais entre aspas simples
pub fn numbered_placeholders(sql: &str) -> Cow<'_, str> {
    if !sql.contains('?') {
        return Cow::Borrowed(sql);
    }

    let mut out = String::with_capacity(sql.len() + 8);
    let mut index = 0;
    let mut in_literal = false;

    for c in sql.chars() {
        match c {
            '\'' => {
                // '' dentro do literal fecha e reabre, o que mantém o estado correto
                in_literal = !in_literal;
                out.push(c);
            }
            '?' if !in_literal => {
                index += 1;
                out.push('$');
                out.push_str(&index.to_string());
            }
            _ => out.push(c),
        }
    }

    Cow::Owned(out)
}

fn starts_with_keyword(sql: &str, keyword: &str) -> bool {
    sql.trim_start()
        .get(..keyword.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(keyword))
}

fn contains_keyword(sql: &str, keyword: &str) -> bool {
    sql.split_whitespace().any(|word| word.eq_ignore_ascii_case(keyword))
}
