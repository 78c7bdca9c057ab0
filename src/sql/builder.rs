//! Builds parameterized INSERT, SELECT, UPDATE, DELETE from entity metadata.
//!
//! Reads always go through one projection: the entity's columns plus one scalar subquery per
//! include (`row_to_json` for to_one, `json_agg` for to_many). Writes are wrapped in a CTE so the
//! written row comes back through the same projection in a single statement.

use crate::model::{EntityMeta, Include, IncludeDirection};
use crate::sql::PgBindValue;

const MAIN_ALIAS: &str = "main";
const WRITTEN: &str = "written";

/// Quote identifier for PostgreSQL (safe: only from static metadata).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: PgBindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }

    /// Push a value and return its placeholder, cast to the column type when known.
    fn placeholder(&mut self, entity: &EntityMeta, column: &str, v: PgBindValue) -> String {
        let n = self.push_param(v);
        entity
            .column(column)
            .map(|c| format!("${}::{}", n, c.pg_type))
            .unwrap_or_else(|| format!("${}", n))
    }

    /// `"a" = $1::int4 AND "b" = $2::int4` over the primary key.
    fn key_predicate(&mut self, entity: &EntityMeta, key: Vec<PgBindValue>, alias: Option<&str>) -> String {
        entity
            .pk
            .iter()
            .zip(key)
            .map(|(col, v)| {
                let ph = self.placeholder(entity, col, v);
                match alias {
                    Some(a) => format!("{}.{} = {}", a, quoted(col), ph),
                    None => format!("{} = {}", quoted(col), ph),
                }
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

fn include_subquery(inc: &Include) -> String {
    let cols = inc.columns.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", ");
    let filter = match inc.via {
        Some(via) => format!(
            "{} IN (SELECT {} FROM {} WHERE {} = {}.{})",
            quoted(inc.their_key),
            quoted(via.far_key),
            quoted(via.table),
            quoted(via.near_key),
            MAIN_ALIAS,
            quoted(inc.our_key)
        ),
        None => format!("{} = {}.{}", quoted(inc.their_key), MAIN_ALIAS, quoted(inc.our_key)),
    };
    let inner = format!("SELECT {} FROM {} WHERE {}", cols, quoted(inc.table), filter);
    match inc.direction {
        IncludeDirection::ToOne => format!("(SELECT row_to_json(sub) FROM ({}) sub)", inner),
        IncludeDirection::ToMany => format!(
            "(SELECT COALESCE(json_agg(row_to_json(sub)), '[]'::json) FROM ({} ORDER BY {}) sub)",
            inner,
            quoted(inc.their_key)
        ),
    }
}

/// `SELECT main."a" AS "a", ..., (<include>) AS "name" FROM <source> main`
fn projection(entity: &EntityMeta, source: &str) -> String {
    let mut parts: Vec<String> = entity
        .columns
        .iter()
        .map(|c| format!("{}.{} AS {}", MAIN_ALIAS, quoted(c.name), quoted(c.name)))
        .collect();
    for inc in entity.includes {
        parts.push(format!("{} AS {}", include_subquery(inc), quoted(inc.name)));
    }
    format!("SELECT {} FROM {} {}", parts.join(", "), source, MAIN_ALIAS)
}

fn order_by_key(entity: &EntityMeta) -> String {
    let cols = entity
        .pk
        .iter()
        .map(|c| format!("{}.{}", MAIN_ALIAS, quoted(c)))
        .collect::<Vec<_>>()
        .join(", ");
    format!(" ORDER BY {}", cols)
}

/// SELECT list with optional exact-match filters, ORDER BY pk, optional LIMIT/OFFSET.
/// Filters on unknown columns are skipped; values bind as text cast to the column type.
pub fn select_list(
    entity: &EntityMeta,
    filters: &[(String, String)],
    limit: Option<u32>,
    offset: Option<u32>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for (col, val) in filters {
        if entity.column(col).is_none() {
            continue;
        }
        let ph = q.placeholder(entity, col, PgBindValue::Text(val.clone()));
        where_parts.push(format!("{}.{} = {}", MAIN_ALIAS, quoted(col), ph));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let limit_clause = limit.map(|n| format!(" LIMIT {}", n)).unwrap_or_default();
    let offset_clause = offset.map(|n| format!(" OFFSET {}", n)).unwrap_or_default();
    q.sql = format!(
        "{}{}{}{}{}",
        projection(entity, &quoted(entity.table)),
        where_clause,
        order_by_key(entity),
        limit_clause,
        offset_clause
    );
    q
}

/// SELECT one row by primary key.
pub fn select_by_key(entity: &EntityMeta, key: Vec<PgBindValue>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let predicate = q.key_predicate(entity, key, Some(MAIN_ALIAS));
    q.sql = format!("{} WHERE {}", projection(entity, &quoted(entity.table)), predicate);
    q
}

/// Bare `INSERT ... RETURNING <returning>`; columns left out take their database default.
pub fn insert_returning(entity: &EntityMeta, values: Vec<(&'static str, PgBindValue)>, returning: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    let table = quoted(entity.table);
    q.sql = if values.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES RETURNING {}", table, returning)
    } else {
        let mut cols = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());
        for (name, v) in values {
            placeholders.push(q.placeholder(entity, name, v));
            cols.push(quoted(name));
        }
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            table,
            cols.join(", "),
            placeholders.join(", "),
            returning
        )
    };
    q
}

/// INSERT returning the new row through the read projection.
pub fn insert(entity: &EntityMeta, values: Vec<(&'static str, PgBindValue)>) -> QueryBuf {
    let mut q = insert_returning(entity, values, "*");
    q.sql = format!("WITH {} AS ({}) {}", WRITTEN, q.sql, projection(entity, WRITTEN));
    q
}

/// UPDATE by key: SET only the given columns. With nothing to set this is a plain read.
pub fn update(entity: &EntityMeta, key: Vec<PgBindValue>, values: Vec<(&'static str, PgBindValue)>) -> QueryBuf {
    if values.is_empty() {
        return select_by_key(entity, key);
    }
    let mut q = QueryBuf::new();
    let mut sets = Vec::with_capacity(values.len());
    for (name, v) in values {
        let rhs = q.placeholder(entity, name, v);
        sets.push(format!("{} = {}", quoted(name), rhs));
    }
    let predicate = q.key_predicate(entity, key, None);
    let statement = format!(
        "UPDATE {} SET {} WHERE {} RETURNING *",
        quoted(entity.table),
        sets.join(", "),
        predicate
    );
    q.sql = format!("WITH {} AS ({}) {}", WRITTEN, statement, projection(entity, WRITTEN));
    q
}

/// DELETE by key.
pub fn delete(entity: &EntityMeta, key: Vec<PgBindValue>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let predicate = q.key_predicate(entity, key, None);
    q.sql = format!("DELETE FROM {} WHERE {}", quoted(entity.table), predicate);
    q
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{col, Column, Via};

    const DISH_COLUMNS: &[Column] = &[
        col("dish_id", "int4"),
        col("name", "text"),
        col("price", "numeric"),
        col("kitchen_id", "int4"),
    ];

    const DISH_INCLUDES: &[Include] = &[
        Include::to_one("kitchen", "kitchen", &["kitchen_id", "name"], "kitchen_id", "kitchen_id"),
        Include::to_many("tags", "tag", &["tag_id", "label"], "dish_id", "tag_id").through(Via {
            table: "dish_tag",
            near_key: "dish_id",
            far_key: "tag_id",
        }),
    ];

    const DISH: EntityMeta = EntityMeta {
        table: "dish",
        pk: &["dish_id"],
        columns: DISH_COLUMNS,
        includes: &[],
    };

    const DISH_WITH_INCLUDES: EntityMeta = EntityMeta {
        includes: DISH_INCLUDES,
        ..DISH
    };

    const DISH_TAG: EntityMeta = EntityMeta {
        table: "dish_tag",
        pk: &["dish_id", "tag_id"],
        columns: &[col("dish_id", "int4"), col("tag_id", "int4")],
        includes: &[],
    };

    #[test]
    fn select_list_orders_by_key_and_skips_unknown_filters() {
        let filters = vec![
            ("kitchen_id".to_string(), "3".to_string()),
            ("nope".to_string(), "x".to_string()),
        ];
        let q = select_list(&DISH, &filters, Some(10), None);
        assert_eq!(
            q.sql,
            "SELECT main.\"dish_id\" AS \"dish_id\", main.\"name\" AS \"name\", main.\"price\" AS \"price\", \
             main.\"kitchen_id\" AS \"kitchen_id\" FROM \"dish\" main WHERE main.\"kitchen_id\" = $1::int4 \
             ORDER BY main.\"dish_id\" LIMIT 10"
        );
        assert_eq!(q.params, vec![PgBindValue::Text("3".into())]);
    }

    #[test]
    fn includes_become_scalar_subqueries() {
        let q = select_by_key(&DISH_WITH_INCLUDES, vec![PgBindValue::Int(7)]);
        assert!(q.sql.contains(
            "(SELECT row_to_json(sub) FROM (SELECT \"kitchen_id\", \"name\" FROM \"kitchen\" \
             WHERE \"kitchen_id\" = main.\"kitchen_id\") sub) AS \"kitchen\""
        ));
        assert!(q.sql.contains(
            "\"tag_id\" IN (SELECT \"tag_id\" FROM \"dish_tag\" WHERE \"dish_id\" = main.\"dish_id\")"
        ));
        assert!(q.sql.contains("COALESCE(json_agg(row_to_json(sub)), '[]'::json)"));
        assert!(q.sql.ends_with("WHERE main.\"dish_id\" = $1::int4"));
    }

    #[test]
    fn insert_returns_the_row_through_the_projection() {
        let q = insert(
            &DISH,
            vec![("name", "Soup".into()), ("price", PgBindValue::Text("4.50".into()))],
        );
        assert!(q.sql.starts_with(
            "WITH written AS (INSERT INTO \"dish\" (\"name\", \"price\") VALUES ($1::text, $2::numeric) RETURNING *) SELECT "
        ));
        assert!(q.sql.ends_with("FROM written main"));
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn bare_insert_returns_the_requested_column() {
        let q = insert_returning(&DISH, vec![("name", "Soup".into())], "\"dish_id\"");
        assert_eq!(q.sql, "INSERT INTO \"dish\" (\"name\") VALUES ($1::text) RETURNING \"dish_id\"");
        let q = insert_returning(&DISH, Vec::new(), "*");
        assert_eq!(q.sql, "INSERT INTO \"dish\" DEFAULT VALUES RETURNING *");
    }

    #[test]
    fn update_sets_only_given_columns_and_binds_key_last() {
        let q = update(&DISH, vec![PgBindValue::Int(7)], vec![("price", PgBindValue::Null)]);
        assert!(q.sql.contains("UPDATE \"dish\" SET \"price\" = $1::numeric WHERE \"dish_id\" = $2::int4 RETURNING *"));
        assert_eq!(q.params, vec![PgBindValue::Null, PgBindValue::Int(7)]);
    }

    #[test]
    fn empty_update_is_a_read() {
        let q = update(&DISH, vec![PgBindValue::Int(7)], Vec::new());
        assert!(q.sql.starts_with("SELECT "));
        assert_eq!(q.params, vec![PgBindValue::Int(7)]);
    }

    #[test]
    fn composite_keys_match_every_column() {
        let q = delete(&DISH_TAG, vec![PgBindValue::Int(1), PgBindValue::Int(2)]);
        assert_eq!(
            q.sql,
            "DELETE FROM \"dish_tag\" WHERE \"dish_id\" = $1::int4 AND \"tag_id\" = $2::int4"
        );
    }
}
