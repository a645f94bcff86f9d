//! Schema bootstrap: resource tables and the two join tables.
//! Join rows cascade on delete and rename of either side; the other side is never removed.

use crate::error::AppError;
use crate::model::MAX_TEXT_LEN;
use crate::sql::{qualified_table, quoted, Link, INGREDIENTE, RICETTA, RICETTA_INGREDIENTI, RISTORANTE, RISTORANTE_RICETTE};
use sqlx::PgPool;

fn table_ddl(schema: &str) -> Vec<String> {
    let text = format!("VARCHAR({})", MAX_TEXT_LEN);
    let mut ddl = vec![
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  \"nome\" {t} PRIMARY KEY,\n  \"produttore\" {t} NOT NULL\n)",
            qualified_table(schema, INGREDIENTE),
            t = text
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  \"nome\" {t} PRIMARY KEY\n)",
            qualified_table(schema, RICETTA),
            t = text
        ),
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n  \"nome\" {t} PRIMARY KEY,\n  \"indirizzo\" {t} NOT NULL\n)",
            qualified_table(schema, RISTORANTE),
            t = text
        ),
    ];
    ddl.push(link_ddl(schema, &RICETTA_INGREDIENTI, RICETTA, &text));
    ddl.push(link_ddl(schema, &RISTORANTE_RICETTE, RISTORANTE, &text));
    ddl
}

fn link_ddl(schema: &str, link: &Link, owner_table: &str, text: &str) -> String {
    let owner = quoted(link.owner);
    let member = quoted(link.member);
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {owner} {text} NOT NULL REFERENCES {} (\"nome\") ON UPDATE CASCADE ON DELETE CASCADE,\n  {member} {text} NOT NULL REFERENCES {} (\"nome\") ON UPDATE CASCADE ON DELETE CASCADE,\n  PRIMARY KEY ({owner}, {member})\n)",
        qualified_table(schema, link.table),
        qualified_table(schema, owner_table),
        qualified_table(schema, link.member_table),
    )
}

/// Create the schema and all tables if missing. Idempotent.
pub async fn apply_migrations(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", quoted(schema)))
        .execute(pool)
        .await?;
    for sql in table_ddl(schema) {
        tracing::debug!(sql = %sql, "migration");
        sqlx::query(&sql).execute(pool).await?;
    }
    tracing::info!(schema, "schema ready");
    Ok(())
}
