use async_trait::async_trait;
use cashlet_core::{
    dhke::public_key_from_hex,
    keyset::Keyset,
    proof::{Proof, Proofs},
};
use sqlx::Row;
use tracing::instrument;
use url::Url;

use crate::{error::WalletError, localstore::LocalStore, session::MintSession};

#[derive(Clone, Debug)]
pub struct SqliteLocalStore {
    pool: sqlx::SqlitePool,
}

#[async_trait(?Send)]
impl LocalStore for SqliteLocalStore {
    #[instrument(level = "debug", skip(self), err)]
    async fn load_mint_session(&self) -> Result<Option<MintSession>, WalletError> {
        let row = sqlx::query("SELECT mint_url, keyset FROM mint_session WHERE id = 1;")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let mint_url: String = row.get(0);
                let keyset: String = row.get(1);
                Ok(Some(MintSession {
                    mint_url: Url::parse(&mint_url)?,
                    keyset: serde_json::from_str::<Keyset>(&keyset)?,
                }))
            }
        }
    }

    #[instrument(level = "debug", skip(self, session), err)]
    async fn save_mint_session(&self, session: &MintSession) -> Result<(), WalletError> {
        sqlx::query(
            r#"INSERT INTO mint_session (id, mint_url, keyset) VALUES (1, $1, $2)
            ON CONFLICT(id) DO UPDATE SET mint_url = $1, keyset = $2;
            "#,
        )
        .bind(session.mint_url.as_str())
        .bind(serde_json::to_string(&session.keyset)?)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[instrument(level = "debug", skip(self), err)]
    async fn load_proofs(&self) -> Result<Proofs, WalletError> {
        let rows = sqlx::query("SELECT keyset_id, amount, C, secret FROM proofs ORDER BY position;")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let keyset_id: String = row.get(0);
                let amount: i64 = row.get(1);
                let c: String = row.get(2);
                let secret: String = row.get(3);
                Ok(Proof::new(
                    amount as u64,
                    secret,
                    public_key_from_hex(&c)?,
                    keyset_id,
                ))
            })
            .collect::<Result<Vec<Proof>, WalletError>>()?
            .into())
    }

    #[instrument(level = "debug", skip(self, proofs), fields(count = proofs.len()), err)]
    async fn save_proofs(&self, proofs: &Proofs) -> Result<(), WalletError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM proofs;").execute(&mut *tx).await?;

        for (position, proof) in proofs.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO proofs (keyset_id, amount, C, secret, position, time_created) VALUES ($1, $2, $3, $4, $5, CURRENT_TIMESTAMP);
                "#,
            )
            .bind(&proof.keyset_id)
            .bind(proof.amount as i64)
            .bind(proof.c.to_string())
            .bind(&proof.secret)
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

impl SqliteLocalStore {
    pub async fn with_path(absolute_path: String) -> Result<Self, WalletError> {
        Self::with_connection_string(&format!("sqlite://{absolute_path}?mode=rwc")).await
    }

    pub async fn with_in_memory() -> Result<Self, WalletError> {
        Self::with_connection_string("sqlite::memory:").await
    }

    async fn with_connection_string(connection_string: &str) -> Result<Self, WalletError> {
        // an in-memory database only lives as long as its single connection
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect(connection_string)
            .await?;

        sqlx::query("PRAGMA journal_mode=WAL")
            .execute(&pool)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}
