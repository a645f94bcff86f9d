//! PostgreSQL store. Multi-statement writes run in one transaction; join rows follow
//! renames and deletes through `ON UPDATE/DELETE CASCADE`.

use super::{duplicate, missing_refs, Store};
use crate::error::{AppError, ConfigError};
use crate::filter::{IngredientFilter, RecipeFilter, RestaurantFilter};
use crate::model::{
    Ingredient, IngredientChanges, Recipe, RecipeChanges, Restaurant, RestaurantChanges,
};
use crate::sql::{
    bind_params, clear_links, delete, insert, insert_links, missing_names, quoted,
    select_ingredients, select_recipes, select_restaurants, update, Link, QueryBuf, INGREDIENTE,
    NOME, RICETTA, RICETTA_INGREDIENTI, RISTORANTE, RISTORANTE_RICETTE,
};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{ConnectOptions, PgConnection, PgPool, Row};
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    /// `schema` must already hold the tables (see [`crate::migration::apply_migrations`]).
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn fetch_all(conn: &mut PgConnection, q: &QueryBuf) -> Result<Vec<PgRow>, sqlx::Error> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    bind_params(sqlx::query(&q.sql), &q.params).fetch_all(conn).await
}

async fn fetch_optional(conn: &mut PgConnection, q: &QueryBuf) -> Result<Option<PgRow>, sqlx::Error> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "query");
    bind_params(sqlx::query(&q.sql), &q.params).fetch_optional(conn).await
}

async fn execute(conn: &mut PgConnection, q: &QueryBuf) -> Result<u64, sqlx::Error> {
    tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
    let done = bind_params(sqlx::query(&q.sql), &q.params).execute(conn).await?;
    Ok(done.rows_affected())
}

/// Unique violations become `Conflict`; everything else stays a database error.
fn write_error(e: sqlx::Error, resource: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return duplicate(resource);
        }
    }
    AppError::Db(e)
}

fn ingredient_from_row(row: &PgRow) -> Result<Ingredient, sqlx::Error> {
    Ok(Ingredient {
        nome: row.try_get("nome")?,
        produttore: row.try_get("produttore")?,
    })
}

fn recipe_from_row(row: &PgRow) -> Result<Recipe, sqlx::Error> {
    Ok(Recipe {
        nome: row.try_get("nome")?,
        ingredienti: row.try_get("ingredienti")?,
    })
}

fn restaurant_from_row(row: &PgRow) -> Result<Restaurant, sqlx::Error> {
    Ok(Restaurant {
        nome: row.try_get("nome")?,
        indirizzo: row.try_get("indirizzo")?,
        ricette: row.try_get("ricette")?,
    })
}

impl PgStore {
    async fn check_refs(
        &self,
        conn: &mut PgConnection,
        table: &str,
        field: &str,
        names: &[String],
    ) -> Result<(), AppError> {
        if names.is_empty() {
            return Ok(());
        }
        let rows = fetch_all(conn, &missing_names(&self.schema, table, names)).await?;
        let missing = rows
            .iter()
            .map(|r| r.try_get::<String, _>(NOME))
            .collect::<Result<Vec<_>, _>>()?;
        missing_refs(field, &missing)
    }

    async fn replace_links(
        &self,
        conn: &mut PgConnection,
        link: &Link,
        owner: &str,
        members: &[String],
    ) -> Result<(), AppError> {
        execute(conn, &clear_links(&self.schema, link, owner)).await?;
        if !members.is_empty() {
            execute(conn, &insert_links(&self.schema, link, owner, members)).await?;
        }
        Ok(())
    }

    /// Apply an UPDATE built by [`update`]; returns the row's key after the update.
    async fn update_row(
        &self,
        conn: &mut PgConnection,
        table: &str,
        resource: &str,
        nome: &str,
        sets: &[(&str, &str)],
    ) -> Result<Option<String>, AppError> {
        let q = update(&self.schema, table, nome, sets);
        let row = fetch_optional(conn, &q).await.map_err(|e| write_error(e, resource))?;
        Ok(row.map(|r| r.try_get::<String, _>(NOME)).transpose()?)
    }

    async fn delete_row(&self, table: &str, nome: &str) -> Result<bool, AppError> {
        let mut conn = self.pool.acquire().await?;
        let row = fetch_optional(&mut conn, &delete(&self.schema, table, nome)).await?;
        if row.is_some() {
            tracing::info!(table, nome, "deleted");
        }
        Ok(row.is_some())
    }

    async fn recipe_in(&self, conn: &mut PgConnection, nome: &str) -> Result<Option<Recipe>, AppError> {
        let q = select_recipes(&self.schema, &RecipeFilter::by_name(nome));
        let row = fetch_optional(conn, &q).await?;
        Ok(row.as_ref().map(recipe_from_row).transpose()?)
    }

    async fn restaurant_in(
        &self,
        conn: &mut PgConnection,
        nome: &str,
    ) -> Result<Option<Restaurant>, AppError> {
        let q = select_restaurants(&self.schema, &RestaurantFilter::by_name(nome));
        let row = fetch_optional(conn, &q).await?;
        Ok(row.as_ref().map(restaurant_from_row).transpose()?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list_ingredients(&self, filter: &IngredientFilter) -> Result<Vec<Ingredient>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let rows = fetch_all(&mut conn, &select_ingredients(&self.schema, filter)).await?;
        Ok(rows.iter().map(ingredient_from_row).collect::<Result<_, _>>()?)
    }

    async fn get_ingredient(&self, nome: &str) -> Result<Option<Ingredient>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let q = select_ingredients(&self.schema, &IngredientFilter::by_name(nome));
        let row = fetch_optional(&mut conn, &q).await?;
        Ok(row.as_ref().map(ingredient_from_row).transpose()?)
    }

    async fn create_ingredient(&self, new: Ingredient) -> Result<Ingredient, AppError> {
        let mut conn = self.pool.acquire().await?;
        let q = insert(
            &self.schema,
            INGREDIENTE,
            &[("nome", new.nome.as_str()), ("produttore", new.produttore.as_str())],
        );
        execute(&mut conn, &q).await.map_err(|e| write_error(e, "ingrediente"))?;
        tracing::info!(nome = %new.nome, "ingredient created");
        Ok(new)
    }

    async fn update_ingredient(
        &self,
        nome: &str,
        changes: IngredientChanges,
    ) -> Result<Option<Ingredient>, AppError> {
        let mut sets = Vec::new();
        if let Some(n) = &changes.nome {
            sets.push(("nome", n.as_str()));
        }
        if let Some(p) = &changes.produttore {
            sets.push(("produttore", p.as_str()));
        }
        let mut tx = self.pool.begin().await?;
        let Some(key) = self.update_row(&mut tx, INGREDIENTE, "ingrediente", nome, &sets).await? else {
            return Ok(None);
        };
        let q = select_ingredients(&self.schema, &IngredientFilter::by_name(&key));
        let row = fetch_optional(&mut tx, &q).await?;
        let updated = row.as_ref().map(ingredient_from_row).transpose()?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_ingredient(&self, nome: &str) -> Result<bool, AppError> {
        self.delete_row(INGREDIENTE, nome).await
    }

    async fn list_recipes(&self, filter: &RecipeFilter) -> Result<Vec<Recipe>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let rows = fetch_all(&mut conn, &select_recipes(&self.schema, filter)).await?;
        Ok(rows.iter().map(recipe_from_row).collect::<Result<_, _>>()?)
    }

    async fn get_recipe(&self, nome: &str) -> Result<Option<Recipe>, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.recipe_in(&mut conn, nome).await
    }

    async fn create_recipe(&self, new: Recipe) -> Result<Recipe, AppError> {
        let mut tx = self.pool.begin().await?;
        let q = insert(&self.schema, RICETTA, &[("nome", new.nome.as_str())]);
        execute(&mut tx, &q).await.map_err(|e| write_error(e, "ricetta"))?;
        self.check_refs(&mut tx, INGREDIENTE, "ingredienti", &new.ingredienti).await?;
        self.replace_links(&mut tx, &RICETTA_INGREDIENTI, &new.nome, &new.ingredienti).await?;
        let created = self
            .recipe_in(&mut tx, &new.nome)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tx.commit().await?;
        tracing::info!(nome = %created.nome, "recipe created");
        Ok(created)
    }

    async fn update_recipe(&self, nome: &str, changes: RecipeChanges) -> Result<Option<Recipe>, AppError> {
        let mut sets = Vec::new();
        if let Some(n) = &changes.nome {
            sets.push(("nome", n.as_str()));
        }
        let mut tx = self.pool.begin().await?;
        let Some(key) = self.update_row(&mut tx, RICETTA, "ricetta", nome, &sets).await? else {
            return Ok(None);
        };
        if let Some(ingredienti) = &changes.ingredienti {
            self.check_refs(&mut tx, INGREDIENTE, "ingredienti", ingredienti).await?;
            self.replace_links(&mut tx, &RICETTA_INGREDIENTI, &key, ingredienti).await?;
        }
        let updated = self.recipe_in(&mut tx, &key).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_recipe(&self, nome: &str) -> Result<bool, AppError> {
        self.delete_row(RICETTA, nome).await
    }

    async fn list_restaurants(&self, filter: &RestaurantFilter) -> Result<Vec<Restaurant>, AppError> {
        let mut conn = self.pool.acquire().await?;
        let rows = fetch_all(&mut conn, &select_restaurants(&self.schema, filter)).await?;
        Ok(rows.iter().map(restaurant_from_row).collect::<Result<_, _>>()?)
    }

    async fn get_restaurant(&self, nome: &str) -> Result<Option<Restaurant>, AppError> {
        let mut conn = self.pool.acquire().await?;
        self.restaurant_in(&mut conn, nome).await
    }

    async fn create_restaurant(&self, new: Restaurant) -> Result<Restaurant, AppError> {
        let mut tx = self.pool.begin().await?;
        let q = insert(
            &self.schema,
            RISTORANTE,
            &[("nome", new.nome.as_str()), ("indirizzo", new.indirizzo.as_str())],
        );
        execute(&mut tx, &q).await.map_err(|e| write_error(e, "ristorante"))?;
        self.check_refs(&mut tx, RICETTA, "ricette", &new.ricette).await?;
        self.replace_links(&mut tx, &RISTORANTE_RICETTE, &new.nome, &new.ricette).await?;
        let created = self
            .restaurant_in(&mut tx, &new.nome)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))?;
        tx.commit().await?;
        tracing::info!(nome = %created.nome, "restaurant created");
        Ok(created)
    }

    async fn update_restaurant(
        &self,
        nome: &str,
        changes: RestaurantChanges,
    ) -> Result<Option<Restaurant>, AppError> {
        let mut sets = Vec::new();
        if let Some(n) = &changes.nome {
            sets.push(("nome", n.as_str()));
        }
        if let Some(i) = &changes.indirizzo {
            sets.push(("indirizzo", i.as_str()));
        }
        let mut tx = self.pool.begin().await?;
        let Some(key) = self.update_row(&mut tx, RISTORANTE, "ristorante", nome, &sets).await? else {
            return Ok(None);
        };
        if let Some(ricette) = &changes.ricette {
            self.check_refs(&mut tx, RICETTA, "ricette", ricette).await?;
            self.replace_links(&mut tx, &RISTORANTE_RICETTE, &key, ricette).await?;
        }
        let updated = self.restaurant_in(&mut tx, &key).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_restaurant(&self, nome: &str) -> Result<bool, AppError> {
        self.delete_row(RISTORANTE, nome).await
    }
}

/// Create the target database through the server's `postgres` database when it is missing.
/// A URL without a database name uses the server default and is left alone.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let target = AdminTarget::parse(database_url)?;
    if target.database.is_empty() || target.database == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&target.admin_url).map_err(|e| {
        ConfigError::Invalid {
            var: "DATABASE_URL",
            reason: e.to_string(),
        }
    })?;
    let mut conn: PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&target.database)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quoted(&target.database)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %target.database, "database created");
    }
    Ok(())
}

/// `DATABASE_URL` split into the target database name and a URL for the `postgres`
/// maintenance database on the same server, query options kept.
#[derive(Debug, PartialEq, Eq)]
struct AdminTarget {
    admin_url: String,
    database: String,
}

impl AdminTarget {
    fn parse(url: &str) -> Result<Self, ConfigError> {
        let (scheme, rest) = url.split_once("://").ok_or_else(|| ConfigError::Invalid {
            var: "DATABASE_URL",
            reason: "expected postgres://[user[:password]@]host[:port][/database]".into(),
        })?;
        let authority_end = rest.find(|c| c == '/' || c == '?').unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(authority_end);
        let (path, query) = match tail.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (tail, None),
        };
        let mut admin_url = format!("{}://{}/postgres", scheme, authority);
        if let Some(query) = query {
            admin_url.push('?');
            admin_url.push_str(query);
        }
        Ok(Self {
            admin_url,
            database: path.trim_start_matches('/').trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_name_is_split_from_url() {
        let t = AdminTarget::parse("postgres://user:pw@localhost:5432/tomato?sslmode=disable").unwrap();
        assert_eq!(t.admin_url, "postgres://user:pw@localhost:5432/postgres?sslmode=disable");
        assert_eq!(t.database, "tomato");
    }

    #[test]
    fn url_without_database_keeps_the_host() {
        let t = AdminTarget::parse("postgres://db.internal").unwrap();
        assert_eq!(t.admin_url, "postgres://db.internal/postgres");
        assert_eq!(t.database, "");

        let t = AdminTarget::parse("postgres://db.internal:5433?sslmode=require").unwrap();
        assert_eq!(t.admin_url, "postgres://db.internal:5433/postgres?sslmode=require");
        assert_eq!(t.database, "");
    }

    #[test]
    fn url_without_scheme_is_a_config_error() {
        assert!(matches!(
            AdminTarget::parse("localhost/tomato"),
            Err(ConfigError::Invalid { var: "DATABASE_URL", .. })
        ));
    }
}
