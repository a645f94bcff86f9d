//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for the three resources and their links.

use super::params::BindValue;
use crate::filter::{IngredientFilter, RecipeFilter, RestaurantFilter};

pub const INGREDIENTE: &str = "ingrediente";
pub const RICETTA: &str = "ricetta";
pub const RISTORANTE: &str = "ristorante";

/// Primary key column of every resource table.
pub const NOME: &str = "nome";

/// A many-to-many join table: (owner, member) name pairs.
#[derive(Clone, Copy, Debug)]
pub struct Link {
    pub table: &'static str,
    pub owner: &'static str,
    pub member: &'static str,
    pub member_table: &'static str,
}

pub const RICETTA_INGREDIENTI: Link = Link {
    table: "ricetta_ingredienti",
    owner: "ricetta_nome",
    member: "ingrediente_nome",
    member_table: INGREDIENTE,
};

pub const RISTORANTE_RICETTE: Link = Link {
    table: "ristorante_ricette",
    owner: "ristorante_nome",
    member: "ricetta_nome",
    member_table: RICETTA,
};

const MAIN_ALIAS: &str = "main";

/// Quote identifier for PostgreSQL (identifiers are constants or validated settings).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
pub fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        Self::default()
    }

    fn push_param(&mut self, v: impl Into<BindValue>) -> usize {
        self.params.push(v.into());
        self.params.len()
    }
}

/// Member names of `link` for the row aliased `main`, ascending, as a `text[]` column.
fn linked_names(schema: &str, link: &Link, alias: &str) -> String {
    let l = quoted(link.member);
    format!(
        "COALESCE((SELECT array_agg(l.{l}::text ORDER BY l.{l} COLLATE \"C\") FROM {} l WHERE l.{} = {}.{}), ARRAY[]::text[]) AS {}",
        qualified_table(schema, link.table),
        quoted(link.owner),
        MAIN_ALIAS,
        quoted(NOME),
        quoted(alias),
    )
}

fn finish_select(
    q: &mut QueryBuf,
    select_parts: &[String],
    schema: &str,
    table: &str,
    where_parts: &[String],
) {
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {} {}{} ORDER BY {}.{} COLLATE \"C\"",
        select_parts.join(", "),
        qualified_table(schema, table),
        MAIN_ALIAS,
        where_clause,
        MAIN_ALIAS,
        quoted(NOME),
    );
}

fn main_col(name: &str) -> String {
    format!("{}.{}", MAIN_ALIAS, quoted(name))
}

/// Ingredients, ordered by name. Recipe and restaurant conditions share one recipe traversal.
pub fn select_ingredients(schema: &str, filter: &IngredientFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    if let Some(nome) = &filter.nome {
        let n = q.push_param(nome.as_str());
        where_parts.push(format!("{} = ${}", main_col(NOME), n));
    }
    if filter.ricetta.is_some() || filter.ristorante.is_some() {
        let ri = RICETTA_INGREDIENTI;
        let rr = RISTORANTE_RICETTE;
        let mut from = format!("{} ri", qualified_table(schema, ri.table));
        let mut conds = vec![format!("ri.{} = {}", quoted(ri.member), main_col(NOME))];
        if let Some(ricetta) = &filter.ricetta {
            let n = q.push_param(ricetta.as_str());
            conds.push(format!("ri.{} = ${}", quoted(ri.owner), n));
        }
        if let Some(ristorante) = &filter.ristorante {
            from.push_str(&format!(
                " JOIN {} rr ON rr.{} = ri.{}",
                qualified_table(schema, rr.table),
                quoted(rr.member),
                quoted(ri.owner),
            ));
            let n = q.push_param(ristorante.as_str());
            conds.push(format!("rr.{} = ${}", quoted(rr.owner), n));
        }
        where_parts.push(format!("EXISTS (SELECT 1 FROM {} WHERE {})", from, conds.join(" AND ")));
    }
    let select_parts = vec![
        format!("{} AS {}", main_col(NOME), quoted(NOME)),
        format!("{} AS {}", main_col("produttore"), quoted("produttore")),
    ];
    finish_select(&mut q, &select_parts, schema, INGREDIENTE, &where_parts);
    q
}

/// `EXISTS` over `link` joining the current row on one side and `$param` on the other.
fn link_exists(schema: &str, link: &Link, main_is_owner: bool, param: usize) -> String {
    let (ours, theirs) = if main_is_owner {
        (link.owner, link.member)
    } else {
        (link.member, link.owner)
    };
    format!(
        "EXISTS (SELECT 1 FROM {} l WHERE l.{} = {} AND l.{} = ${})",
        qualified_table(schema, link.table),
        quoted(ours),
        main_col(NOME),
        quoted(theirs),
        param,
    )
}

/// Recipes with their ingredient names, ordered by name.
pub fn select_recipes(schema: &str, filter: &RecipeFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    if let Some(nome) = &filter.nome {
        let n = q.push_param(nome.as_str());
        where_parts.push(format!("{} = ${}", main_col(NOME), n));
    }
    if let Some(ristorante) = &filter.ristorante {
        let n = q.push_param(ristorante.as_str());
        where_parts.push(link_exists(schema, &RISTORANTE_RICETTE, false, n));
    }
    if let Some(ingrediente) = &filter.ingrediente {
        let n = q.push_param(ingrediente.as_str());
        where_parts.push(link_exists(schema, &RICETTA_INGREDIENTI, true, n));
    }
    let select_parts = vec![
        format!("{} AS {}", main_col(NOME), quoted(NOME)),
        linked_names(schema, &RICETTA_INGREDIENTI, "ingredienti"),
    ];
    finish_select(&mut q, &select_parts, schema, RICETTA, &where_parts);
    q
}

/// Restaurants with their recipe names, ordered by name.
pub fn select_restaurants(schema: &str, filter: &RestaurantFilter) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    if let Some(nome) = &filter.nome {
        let n = q.push_param(nome.as_str());
        where_parts.push(format!("{} = ${}", main_col(NOME), n));
    }
    if let Some(ricetta) = &filter.ricetta {
        let n = q.push_param(ricetta.as_str());
        where_parts.push(link_exists(schema, &RISTORANTE_RICETTE, true, n));
    }
    let select_parts = vec![
        format!("{} AS {}", main_col(NOME), quoted(NOME)),
        format!("{} AS {}", main_col("indirizzo"), quoted("indirizzo")),
        linked_names(schema, &RISTORANTE_RICETTE, "ricette"),
    ];
    finish_select(&mut q, &select_parts, schema, RISTORANTE, &where_parts);
    q
}

/// INSERT one row from (column, value) pairs.
pub fn insert(schema: &str, table: &str, values: &[(&str, &str)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (col, val) in values {
        let n = q.push_param(*val);
        cols.push(quoted(col));
        placeholders.push(format!("${}", n));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_table(schema, table),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by name, setting only the given columns. With nothing to set, selects the key instead
/// so the caller can still detect a missing row.
pub fn update(schema: &str, table: &str, nome: &str, sets: &[(&str, &str)]) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = qualified_table(schema, table);
    if sets.is_empty() {
        q.push_param(nome);
        q.sql = format!("SELECT {0} FROM {1} WHERE {0} = $1", quoted(NOME), table);
        return q;
    }
    let mut set_parts = Vec::new();
    for (col, val) in sets {
        let n = q.push_param(*val);
        set_parts.push(format!("{} = ${}", quoted(col), n));
    }
    let id_param = q.push_param(nome);
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${} RETURNING {}",
        table,
        set_parts.join(", "),
        quoted(NOME),
        id_param,
        quoted(NOME)
    );
    q
}

/// DELETE by name; returns the key when a row was removed.
pub fn delete(schema: &str, table: &str, nome: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(nome);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1 RETURNING {}",
        qualified_table(schema, table),
        quoted(NOME),
        quoted(NOME)
    );
    q
}

/// Remove every link of `owner`.
pub fn clear_links(schema: &str, link: &Link, owner: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(owner);
    q.sql = format!(
        "DELETE FROM {} WHERE {} = $1",
        qualified_table(schema, link.table),
        quoted(link.owner)
    );
    q
}

/// Link `owner` to every name in `members`.
pub fn insert_links(schema: &str, link: &Link, owner: &str, members: &[String]) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(owner);
    q.push_param(members);
    q.sql = format!(
        "INSERT INTO {} ({}, {}) SELECT $1, m FROM unnest($2::text[]) AS m ON CONFLICT DO NOTHING",
        qualified_table(schema, link.table),
        quoted(link.owner),
        quoted(link.member)
    );
    q
}

/// Names from `names` with no row in `table`, ascending.
pub fn missing_names(schema: &str, table: &str, names: &[String]) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.push_param(names);
    q.sql = format!(
        "SELECT m.n AS {0} FROM unnest($1::text[]) AS m(n) WHERE NOT EXISTS (SELECT 1 FROM {1} t WHERE t.{0} = m.n) ORDER BY m.n COLLATE \"C\"",
        quoted(NOME),
        qualified_table(schema, table)
    );
    q
}
