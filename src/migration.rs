//! Schema DDL: one `TableDef` per table, emitted in foreign-key dependency order.
//! Every statement is idempotent (IF NOT EXISTS), so migrations run on every start.

use crate::error::AppError;
use sqlx::PgPool;

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    /// Type plus column modifiers, e.g. "VARCHAR(120) NOT NULL".
    pub ddl: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    NoAction,
    Cascade,
    SetNull,
}

impl OnDelete {
    fn as_sql(&self) -> &'static str {
        match self {
            OnDelete::NoAction => "NO ACTION",
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
    pub ref_column: &'static str,
    pub on_delete: OnDelete,
}

#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    pub primary_key: &'static [&'static str],
    pub unique: &'static [&'static [&'static str]],
    /// (constraint name, boolean expression)
    pub checks: &'static [(&'static str, &'static str)],
    pub foreign_keys: &'static [ForeignKey],
}

const fn c(name: &'static str, ddl: &'static str) -> ColumnDef {
    ColumnDef { name, ddl }
}

const fn fk(column: &'static str, references: &'static str, ref_column: &'static str, on_delete: OnDelete) -> ForeignKey {
    ForeignKey {
        column,
        references,
        ref_column,
        on_delete,
    }
}

/// Every application table, parents before children.
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: "customer",
        columns: &[
            c("customer_id", "SERIAL"),
            c("first_name", "VARCHAR(50) NOT NULL"),
            c("last_name", "VARCHAR(50) NOT NULL"),
            c("email", "VARCHAR(120) NOT NULL"),
            c("phone", "VARCHAR(20)"),
            c("password_hash", "TEXT NOT NULL"),
            c("role", "VARCHAR(20) NOT NULL DEFAULT 'customer'"),
            c("created_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
        ],
        primary_key: &["customer_id"],
        unique: &[&["email"]],
        checks: &[("customer_role_check", "role IN ('customer', 'staff', 'admin')")],
        foreign_keys: &[],
    },
    TableDef {
        name: "loyalty_account",
        columns: &[
            c("account_id", "SERIAL"),
            c("points", "INTEGER NOT NULL DEFAULT 0"),
            c("opened_on", "DATE NOT NULL DEFAULT CURRENT_DATE"),
            c("customer_id", "INTEGER NOT NULL"),
        ],
        primary_key: &["account_id"],
        unique: &[&["customer_id"]],
        checks: &[("loyalty_points_check", "points >= 0")],
        foreign_keys: &[fk("customer_id", "customer", "customer_id", OnDelete::Cascade)],
    },
    TableDef {
        name: "dining_table",
        columns: &[
            c("table_id", "SERIAL"),
            c("number", "INTEGER NOT NULL"),
            c("capacity", "INTEGER NOT NULL"),
            c("description", "TEXT"),
        ],
        primary_key: &["table_id"],
        unique: &[&["number"]],
        checks: &[("dining_table_capacity_check", "capacity > 0")],
        foreign_keys: &[],
    },
    TableDef {
        name: "function_room",
        columns: &[
            c("room_id", "SERIAL"),
            c("name", "VARCHAR(100) NOT NULL"),
            c("capacity", "INTEGER NOT NULL"),
            c("description", "TEXT"),
        ],
        primary_key: &["room_id"],
        unique: &[&["name"]],
        checks: &[("function_room_capacity_check", "capacity > 0")],
        foreign_keys: &[],
    },
    TableDef {
        name: "corporate_event",
        columns: &[
            c("event_id", "SERIAL"),
            c("name", "VARCHAR(100) NOT NULL"),
            c("description", "TEXT"),
            c("event_date", "DATE NOT NULL"),
            c("event_time", "TIME"),
            c("room_id", "INTEGER"),
        ],
        primary_key: &["event_id"],
        unique: &[],
        checks: &[],
        foreign_keys: &[fk("room_id", "function_room", "room_id", OnDelete::SetNull)],
    },
    TableDef {
        name: "reservation",
        columns: &[
            c("reservation_id", "SERIAL"),
            c("reserved_at", "TIMESTAMPTZ NOT NULL"),
            c("party_size", "INTEGER NOT NULL"),
            c("status", "VARCHAR(20) NOT NULL DEFAULT 'pending'"),
            c("discount", "NUMERIC(5,2)"),
            c("customer_id", "INTEGER"),
            c("table_id", "INTEGER"),
            c("room_id", "INTEGER"),
        ],
        primary_key: &["reservation_id"],
        unique: &[],
        checks: &[
            ("reservation_place_check", "table_id IS NOT NULL OR room_id IS NOT NULL"),
            ("reservation_party_size_check", "party_size > 0"),
        ],
        foreign_keys: &[
            fk("customer_id", "customer", "customer_id", OnDelete::SetNull),
            fk("table_id", "dining_table", "table_id", OnDelete::NoAction),
            fk("room_id", "function_room", "room_id", OnDelete::NoAction),
        ],
    },
    TableDef {
        name: "menu_item",
        columns: &[
            c("menu_item_id", "SERIAL"),
            c("name", "VARCHAR(100) NOT NULL"),
            c("description", "TEXT NOT NULL DEFAULT ''"),
            c("price", "NUMERIC(8,2) NOT NULL"),
            c("available", "BOOLEAN NOT NULL DEFAULT TRUE"),
        ],
        primary_key: &["menu_item_id"],
        unique: &[],
        checks: &[("menu_item_price_check", "price >= 0")],
        foreign_keys: &[],
    },
    TableDef {
        name: "allergen",
        columns: &[
            c("allergen_id", "SERIAL"),
            c("name", "VARCHAR(100) NOT NULL"),
            c("description", "TEXT"),
        ],
        primary_key: &["allergen_id"],
        unique: &[&["name"]],
        checks: &[],
        foreign_keys: &[],
    },
    TableDef {
        name: "menu_item_allergen",
        columns: &[c("menu_item_id", "INTEGER NOT NULL"), c("allergen_id", "INTEGER NOT NULL")],
        primary_key: &["menu_item_id", "allergen_id"],
        unique: &[],
        checks: &[],
        foreign_keys: &[
            fk("menu_item_id", "menu_item", "menu_item_id", OnDelete::Cascade),
            fk("allergen_id", "allergen", "allergen_id", OnDelete::Cascade),
        ],
    },
    TableDef {
        name: "customer_order",
        columns: &[
            c("order_id", "SERIAL"),
            c("ordered_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
            c("status", "VARCHAR(20) NOT NULL DEFAULT 'new'"),
            c("total_amount", "NUMERIC(10,2) NOT NULL DEFAULT 0"),
            c("customer_id", "INTEGER"),
        ],
        primary_key: &["order_id"],
        unique: &[],
        checks: &[("customer_order_total_check", "total_amount >= 0")],
        foreign_keys: &[fk("customer_id", "customer", "customer_id", OnDelete::SetNull)],
    },
    TableDef {
        name: "order_line",
        columns: &[
            c("order_line_id", "SERIAL"),
            c("quantity", "INTEGER NOT NULL DEFAULT 1"),
            c("unit_price", "NUMERIC(8,2) NOT NULL"),
            c("order_id", "INTEGER NOT NULL"),
            c("menu_item_id", "INTEGER NOT NULL"),
        ],
        primary_key: &["order_line_id"],
        unique: &[&["order_id", "menu_item_id"]],
        checks: &[("order_line_quantity_check", "quantity > 0")],
        foreign_keys: &[
            fk("order_id", "customer_order", "order_id", OnDelete::Cascade),
            fk("menu_item_id", "menu_item", "menu_item_id", OnDelete::NoAction),
        ],
    },
    TableDef {
        name: "payment",
        columns: &[
            c("payment_id", "SERIAL"),
            c("amount", "NUMERIC(10,2) NOT NULL"),
            c("method", "VARCHAR(20) NOT NULL"),
            c("paid_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
            c("order_id", "INTEGER NOT NULL"),
        ],
        primary_key: &["payment_id"],
        unique: &[],
        checks: &[("payment_amount_check", "amount >= 0")],
        foreign_keys: &[fk("order_id", "customer_order", "order_id", OnDelete::NoAction)],
    },
    TableDef {
        name: "review",
        columns: &[
            c("review_id", "SERIAL"),
            c("rating", "INTEGER NOT NULL"),
            c("comment", "TEXT"),
            c("reviewed_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
            c("order_id", "INTEGER"),
            c("customer_id", "INTEGER"),
        ],
        primary_key: &["review_id"],
        unique: &[],
        checks: &[("review_rating_check", "rating BETWEEN 1 AND 5")],
        foreign_keys: &[
            fk("order_id", "customer_order", "order_id", OnDelete::SetNull),
            fk("customer_id", "customer", "customer_id", OnDelete::SetNull),
        ],
    },
    TableDef {
        name: "meal_plan",
        columns: &[
            c("meal_plan_id", "SERIAL"),
            c("name", "VARCHAR(100) NOT NULL"),
            c("valid_from", "DATE NOT NULL"),
            c("valid_to", "DATE NOT NULL"),
        ],
        primary_key: &["meal_plan_id"],
        unique: &[],
        checks: &[("meal_plan_validity_check", "valid_to >= valid_from")],
        foreign_keys: &[],
    },
    TableDef {
        name: "meal_plan_line",
        columns: &[
            c("meal_plan_line_id", "SERIAL"),
            c("day", "INTEGER NOT NULL"),
            c("position", "INTEGER NOT NULL DEFAULT 1"),
            c("meal_plan_id", "INTEGER NOT NULL"),
            c("menu_item_id", "INTEGER NOT NULL"),
        ],
        primary_key: &["meal_plan_line_id"],
        unique: &[],
        checks: &[("meal_plan_line_day_check", "day BETWEEN 1 AND 7")],
        foreign_keys: &[
            fk("meal_plan_id", "meal_plan", "meal_plan_id", OnDelete::Cascade),
            fk("menu_item_id", "menu_item", "menu_item_id", OnDelete::NoAction),
        ],
    },
    TableDef {
        name: "notification",
        columns: &[
            c("notification_id", "SERIAL"),
            c("kind", "VARCHAR(20) NOT NULL"),
            c("sent_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
            c("body", "TEXT NOT NULL"),
            c("reservation_id", "INTEGER"),
            c("order_id", "INTEGER"),
        ],
        primary_key: &["notification_id"],
        unique: &[],
        checks: &[],
        foreign_keys: &[
            fk("reservation_id", "reservation", "reservation_id", OnDelete::SetNull),
            fk("order_id", "customer_order", "order_id", OnDelete::SetNull),
        ],
    },
    TableDef {
        name: "revoked_token",
        columns: &[
            c("jti", "UUID NOT NULL"),
            c("expires_at", "TIMESTAMPTZ NOT NULL"),
            c("revoked_at", "TIMESTAMPTZ NOT NULL DEFAULT NOW()"),
        ],
        primary_key: &["jti"],
        unique: &[],
        checks: &[],
        foreign_keys: &[],
    },
];

/// `CREATE TABLE IF NOT EXISTS` with primary key, unique, check and foreign-key constraints inline.
pub fn create_table_sql(t: &TableDef) -> String {
    let mut defs: Vec<String> = t
        .columns
        .iter()
        .map(|col| format!("{} {}", quote(col.name), col.ddl))
        .collect();

    let pk: Vec<String> = t.primary_key.iter().map(|s| quote(s)).collect();
    defs.push(format!("PRIMARY KEY ({})", pk.join(", ")));

    for u in t.unique {
        let cols: Vec<String> = u.iter().map(|s| quote(s)).collect();
        defs.push(format!("UNIQUE ({})", cols.join(", ")));
    }
    for (name, expression) in t.checks {
        defs.push(format!("CONSTRAINT {} CHECK ({})", quote(name), expression));
    }
    for f in t.foreign_keys {
        defs.push(format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({}) ON DELETE {}",
            quote(&format!("{}_{}_fkey", t.name, f.column)),
            quote(f.column),
            quote(f.references),
            quote(f.ref_column),
            f.on_delete.as_sql()
        ));
    }

    format!("CREATE TABLE IF NOT EXISTS {} (\n  {}\n)", quote(t.name), defs.join(",\n  "))
}

/// Indexes on foreign-key columns not already covered by a primary key or unique constraint.
pub fn index_sql(t: &TableDef) -> Vec<String> {
    t.foreign_keys
        .iter()
        .filter(|f| t.primary_key.first() != Some(&f.column))
        .filter(|f| !t.unique.iter().any(|u| u.first() == Some(&f.column)))
        .map(|f| {
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                quote(&format!("{}_{}_idx", t.name, f.column)),
                quote(t.name),
                quote(f.column)
            )
        })
        .collect()
}

/// Create every table and index. Safe to run repeatedly.
pub async fn apply_migrations(pool: &PgPool) -> Result<(), AppError> {
    for t in TABLES {
        sqlx::query(&create_table_sql(t)).execute(pool).await?;
        for sql in index_sql(t) {
            sqlx::query(&sql).execute(pool).await?;
        }
    }
    tracing::info!(tables = TABLES.len(), "schema migrated");
    Ok(())
}

/// Empty every application table and restart its id sequence.
pub async fn truncate_all(pool: &PgPool) -> Result<(), AppError> {
    let names: Vec<String> = TABLES.iter().map(|t| quote(t.name)).collect();
    sqlx::query(&format!("TRUNCATE {} RESTART IDENTITY CASCADE", names.join(", ")))
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn table(name: &str) -> &'static TableDef {
        TABLES.iter().find(|t| t.name == name).unwrap()
    }

    #[test]
    fn parents_are_created_before_children() {
        let mut seen = HashSet::new();
        for t in TABLES {
            for f in t.foreign_keys {
                assert!(seen.contains(f.references), "{} references {} before it exists", t.name, f.references);
            }
            seen.insert(t.name);
        }
    }

    #[test]
    fn association_table_has_composite_key() {
        let sql = create_table_sql(table("menu_item_allergen"));
        assert!(sql.contains("PRIMARY KEY (\"menu_item_id\", \"allergen_id\")"));
        assert!(!sql.contains("SERIAL"));
    }

    #[test]
    fn reservation_requires_a_place() {
        let sql = create_table_sql(table("reservation"));
        assert!(sql.contains("CHECK (table_id IS NOT NULL OR room_id IS NOT NULL)"));
        assert!(sql.contains("REFERENCES \"customer\" (\"customer_id\") ON DELETE SET NULL"));
    }

    #[test]
    fn loyalty_account_is_one_per_customer_and_cascades() {
        let sql = create_table_sql(table("loyalty_account"));
        assert!(sql.contains("UNIQUE (\"customer_id\")"));
        assert!(sql.contains("ON DELETE CASCADE"));
    }

    #[test]
    fn order_line_is_unique_per_order_and_item() {
        let sql = create_table_sql(table("order_line"));
        assert!(sql.contains("UNIQUE (\"order_id\", \"menu_item_id\")"));
    }

    #[test]
    fn indexes_skip_columns_led_by_a_key() {
        assert!(index_sql(table("loyalty_account")).is_empty());
        assert_eq!(index_sql(table("menu_item_allergen")).len(), 1);
        assert_eq!(index_sql(table("reservation")).len(), 3);
        assert_eq!(index_sql(table("order_line")), vec![
            "CREATE INDEX IF NOT EXISTS \"order_line_menu_item_id_idx\" ON \"order_line\" (\"menu_item_id\")".to_string()
        ]);
    }
}
