//! Static table metadata that drives SQL generation and DDL.

/// Direction of an embedded summary: to_one (we hold the FK) or to_many (they hold it).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IncludeDirection {
    ToOne,
    ToMany,
}

/// Association table traversed by a many-to-many include.
#[derive(Clone, Copy, Debug)]
pub struct Via {
    pub table: &'static str,
    /// Column in the association table pointing back at us.
    pub near_key: &'static str,
    /// Column in the association table pointing at the related table.
    pub far_key: &'static str,
}

/// Summary projection of a related table embedded under `name` in every read.
#[derive(Clone, Copy, Debug)]
pub struct Include {
    pub name: &'static str,
    pub direction: IncludeDirection,
    pub table: &'static str,
    /// Columns of the related table that make up the summary.
    pub columns: &'static [&'static str],
    /// Our column used in the join (our FK for to_one; our PK for to_many).
    pub our_key: &'static str,
    /// Their column used in the join (their PK for to_one; their FK for to_many).
    pub their_key: &'static str,
    pub via: Option<Via>,
}

impl Include {
    pub const fn to_one(
        name: &'static str,
        table: &'static str,
        columns: &'static [&'static str],
        our_key: &'static str,
        their_key: &'static str,
    ) -> Self {
        Include {
            name,
            direction: IncludeDirection::ToOne,
            table,
            columns,
            our_key,
            their_key,
            via: None,
        }
    }

    pub const fn to_many(
        name: &'static str,
        table: &'static str,
        columns: &'static [&'static str],
        our_key: &'static str,
        their_key: &'static str,
    ) -> Self {
        Include {
            name,
            direction: IncludeDirection::ToMany,
            table,
            columns,
            our_key,
            their_key,
            via: None,
        }
    }

    pub const fn through(mut self, via: Via) -> Self {
        self.via = Some(via);
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    /// PostgreSQL type used to cast bound text parameters (e.g. "int4", "timestamptz").
    pub pg_type: &'static str,
}

pub const fn col(name: &'static str, pg_type: &'static str) -> Column {
    Column { name, pg_type }
}

#[derive(Clone, Copy, Debug)]
pub struct EntityMeta {
    pub table: &'static str,
    /// Primary key columns in key order; more than one for association tables.
    pub pk: &'static [&'static str],
    /// Readable columns, primary key included. Sensitive columns are left out.
    pub columns: &'static [Column],
    pub includes: &'static [Include],
}

impl EntityMeta {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}
