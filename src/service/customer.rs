//! Customer writes: the loyalty-account cascade and password hashing.

use crate::auth::{hash_password, Role};
use crate::entities::{Customer, CustomerPatch, Customers, NewCustomer};
use crate::error::AppError;
use crate::resource::Resource;
use crate::service::CrudService;
use crate::sql::{insert_returning, update, PgBindValue};
use sqlx::postgres::Postgres;
use sqlx::{PgPool, Transaction};

pub struct CustomerService;

impl CustomerService {
    /// Insert the customer and its zero-point loyalty account in one transaction.
    /// Either both rows persist or neither does.
    pub async fn create(pool: &PgPool, input: NewCustomer) -> Result<Customer, AppError> {
        let password_hash = hash_password(&input.password)?;
        let mut values = Customers::insert_values(input);
        values.push(("password_hash", password_hash.into()));

        let mut tx = pool.begin().await?;
        match Self::create_in(&mut tx, values).await {
            Ok(customer) => {
                tx.commit().await.map_err(AppError::from_write)?;
                tracing::info!(customer_id = customer.customer_id, "customer created");
                Ok(customer)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    async fn create_in(
        tx: &mut Transaction<'_, Postgres>,
        values: Vec<(&'static str, PgBindValue)>,
    ) -> Result<Customer, AppError> {
        let stmt = insert_returning(&Customers::META, values, "customer_id");
        let mut q = sqlx::query_scalar::<_, i32>(&stmt.sql);
        for p in &stmt.params {
            q = q.bind(p.clone());
        }
        let customer_id = q.fetch_one(&mut **tx).await.map_err(AppError::from_write)?;

        sqlx::query("INSERT INTO loyalty_account (points, opened_on, customer_id) VALUES (0, CURRENT_DATE, $1)")
            .bind(customer_id)
            .execute(&mut **tx)
            .await
            .map_err(AppError::from_write)?;

        CrudService::<Customers>::read_in(&mut **tx, &customer_id)
            .await?
            .ok_or_else(|| AppError::Internal("customer vanished inside its own transaction".into()))
    }

    /// Stored role of a customer, `None` when there is no such customer.
    pub async fn role_of(pool: &PgPool, id: i32) -> Result<Option<Role>, AppError> {
        let role: Option<String> = sqlx::query_scalar("SELECT role FROM customer WHERE customer_id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        role.map(|r| r.parse().map_err(AppError::Internal)).transpose()
    }

    /// Apply a patch; a new password is hashed before it is stored.
    pub async fn update(pool: &PgPool, id: i32, mut patch: CustomerPatch) -> Result<Option<Customer>, AppError> {
        let password = patch.password.take();
        let mut values = Customers::patch_values(patch);
        if let Some(p) = password {
            values.push(("password_hash", hash_password(&p)?.into()));
        }
        let q = update(&Customers::META, vec![id.into()], values);
        let mut tx = pool.begin().await?;
        match CrudService::<Customers>::write_one(&mut tx, &q).await {
            Ok(row) => {
                tx.commit().await.map_err(AppError::from_write)?;
                Ok(row)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }
}
