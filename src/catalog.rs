//! Product record store.
//!
//! Every read, update and delete is scoped by `(owner_id, id)`. A product that
//! exists under another owner is reported exactly like one that does not exist.

use anyhow::Result;
use libsql::Connection;

use crate::model::{Product, ValidPatch, ValidProduct};

const PRODUCT_COLUMNS: &str = "id, owner_id, name, description, car_model, plate_number, pictures";

pub struct Catalog<'a> {
    conn: &'a Connection,
}

impl<'a> Catalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, input: ValidProduct) -> Result<Product> {
        let pictures = serde_json::to_string(&input.pictures)?;
        let query = format!(
            r#"
            INSERT INTO products (owner_id, name, description, car_model, plate_number, pictures)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING {PRODUCT_COLUMNS}
        "#
        );

        let mut rows = self
            .conn
            .query(
                &query,
                libsql::params![
                    input.owner_id,
                    input.name,
                    input.description,
                    input.car_model,
                    input.plate_number,
                    pictures
                ],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Self::row_to_product(&row)?)
        } else {
            anyhow::bail!("Failed to create product")
        }
    }

    /// All products of one owner, oldest first. Callers must not rely on the order.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE owner_id = ? ORDER BY id ASC");

        let mut rows = self.conn.query(&query, libsql::params![owner_id]).await?;
        let mut products = Vec::new();

        while let Some(row) = rows.next().await? {
            products.push(Self::row_to_product(&row)?);
        }

        Ok(products)
    }

    pub async fn get_owned(&self, owner_id: &str, id: i64) -> Result<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ? AND owner_id = ?");

        let mut rows = self.conn.query(&query, libsql::params![id, owner_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_product(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Writes the provided fields in one statement; absent fields keep their stored value.
    /// Concurrent updates race and the last write wins.
    pub async fn update_owned(&self, owner_id: &str, id: i64, patch: ValidPatch) -> Result<Option<Product>> {
        if patch.is_empty() {
            return self.get_owned(owner_id, id).await;
        }

        let pictures = patch.pictures.as_ref().map(serde_json::to_string).transpose()?;
        let query = format!(
            r#"
            UPDATE products SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                car_model = COALESCE(?, car_model),
                plate_number = COALESCE(?, plate_number),
                pictures = COALESCE(?, pictures),
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ? AND owner_id = ?
            RETURNING {PRODUCT_COLUMNS}
        "#
        );

        let mut rows = self
            .conn
            .query(
                &query,
                libsql::params![
                    patch.name,
                    patch.description,
                    patch.car_model,
                    patch.plate_number,
                    pictures,
                    id,
                    owner_id
                ],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_product(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Removes and returns the product in a single statement.
    pub async fn delete_owned(&self, owner_id: &str, id: i64) -> Result<Option<Product>> {
        let query = format!("DELETE FROM products WHERE id = ? AND owner_id = ? RETURNING {PRODUCT_COLUMNS}");

        let mut rows = self.conn.query(&query, libsql::params![id, owner_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_product(&row)?))
        } else {
            Ok(None)
        }
    }

    fn row_to_product(row: &libsql::Row) -> Result<Product> {
        let pictures: String = row.get(6)?;
        let pictures: Vec<String> = serde_json::from_str(&pictures)
            .map_err(|e| anyhow::anyhow!("corrupt pictures column: {e}"))?;

        Ok(Product {
            id: row.get(0)?,
            owner_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            car_model: row.get(4)?,
            plate_number: row.get(5)?,
            pictures,
        })
    }
}
