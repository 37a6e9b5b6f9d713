use anyhow::Result;
use libsql::Connection;

use crate::model::{User, ValidSignIn};

pub struct Accounts<'a> {
    conn: &'a Connection,
}

impl<'a> Accounts<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let query = r#"
            SELECT name, email, external_id, email_verified, picture_url
            FROM users WHERE external_id = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![external_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_user(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Creates the user on first sign-in and returns the stored record.
    /// A repeat sign-in leaves the existing row untouched, even if the profile changed.
    /// The flag is true when this call inserted the row.
    pub async fn sign_in(&self, input: ValidSignIn) -> Result<(User, bool)> {
        let insert = r#"
            INSERT INTO users (name, email, external_id, email_verified, picture_url)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(external_id) DO NOTHING
        "#;

        let inserted = self
            .conn
            .execute(
                insert,
                libsql::params![
                    input.name,
                    input.email,
                    input.external_id.as_str(),
                    input.email_verified as i64,
                    input.picture_url
                ],
            )
            .await?;

        match self.find_by_external_id(&input.external_id).await? {
            Some(user) => Ok((user, inserted > 0)),
            None => anyhow::bail!("user {} vanished after sign-in", input.external_id),
        }
    }

    fn row_to_user(row: &libsql::Row) -> Result<User> {
        let email_verified: i64 = row.get(3)?;

        Ok(User {
            name: row.get(0)?,
            email: row.get(1)?,
            external_id: row.get(2)?,
            email_verified: email_verified != 0,
            picture_url: row.get(4)?,
        })
    }
}
