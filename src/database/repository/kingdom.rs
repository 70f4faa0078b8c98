use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{Kingdom, KingdomInput, KINGDOM_STATE_CONQUERED};
use crate::filter::name_search_pattern;

const KINGDOM_COLUMNS: &str = "id, name, area, capital, image, description, state";

/// Rows per INSERT; six binds each keeps a batch well under the 65535 bind limit.
pub const INSERT_BATCH_SIZE: usize = 1000;

pub struct KingdomRepository {
    pool: PgPool,
}

impl KingdomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Case-insensitive substring search on the name; empty input lists everything.
    pub async fn search(&self, name: &str) -> Result<Vec<Kingdom>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM kingdoms WHERE name ILIKE $1 ORDER BY id",
            KINGDOM_COLUMNS
        );
        let kingdoms = sqlx::query_as::<_, Kingdom>(&sql)
            .bind(name_search_pattern(name))
            .fetch_all(&self.pool)
            .await?;
        Ok(kingdoms)
    }

    pub async fn get(&self, id: i32) -> Result<Kingdom, DatabaseError> {
        let sql = format!("SELECT {} FROM kingdoms WHERE id = $1", KINGDOM_COLUMNS);
        sqlx::query_as::<_, Kingdom>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("kingdom {} not found", id)))
    }

    pub async fn create(&self, input: &KingdomInput) -> Result<Kingdom, DatabaseError> {
        let sql = format!(
            "INSERT INTO kingdoms (name, area, capital, image, description, state)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            KINGDOM_COLUMNS
        );
        sqlx::query_as::<_, Kingdom>(&sql)
            .bind(input.name.trim())
            .bind(input.area)
            .bind(input.capital.trim())
            .bind(&input.image)
            .bind(&input.description)
            .bind(&input.state)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "kingdom with this name already exists", "kingdom not found"))
    }

    pub async fn update(&self, id: i32, input: &KingdomInput) -> Result<Kingdom, DatabaseError> {
        let sql = format!(
            "UPDATE kingdoms
             SET name = $2, area = $3, capital = $4, image = $5, description = $6, state = $7
             WHERE id = $1
             RETURNING {}",
            KINGDOM_COLUMNS
        );
        sqlx::query_as::<_, Kingdom>(&sql)
            .bind(id)
            .bind(input.name.trim())
            .bind(input.area)
            .bind(input.capital.trim())
            .bind(&input.image)
            .bind(&input.description)
            .bind(&input.state)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "kingdom with this name already exists", "kingdom not found"))?
            .ok_or_else(|| DatabaseError::NotFound(format!("kingdom {} not found", id)))
    }

    pub async fn update_state(&self, id: i32, state: &str) -> Result<Kingdom, DatabaseError> {
        let sql = format!(
            "UPDATE kingdoms SET state = $2 WHERE id = $1 RETURNING {}",
            KINGDOM_COLUMNS
        );
        sqlx::query_as::<_, Kingdom>(&sql)
            .bind(id)
            .bind(state)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("kingdom {} not found", id)))
    }

    /// Kingdoms are never removed, they are marked as conquered.
    pub async fn soft_delete(&self, id: i32) -> Result<Kingdom, DatabaseError> {
        self.update_state(id, KINGDOM_STATE_CONQUERED).await
    }

    /// Bulk insert used by the seeding command. Names that already exist are skipped;
    /// returns the number of rows written.
    pub async fn insert_many(&self, kingdoms: &[KingdomInput]) -> Result<u64, DatabaseError> {
        if kingdoms.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for batch in kingdoms.chunks(INSERT_BATCH_SIZE) {
            let mut qb: QueryBuilder<Postgres> =
                QueryBuilder::new("INSERT INTO kingdoms (name, area, capital, image, description, state) ");
            qb.push_values(batch, |mut row, k| {
                row.push_bind(&k.name)
                    .push_bind(k.area)
                    .push_bind(&k.capital)
                    .push_bind(&k.image)
                    .push_bind(&k.description)
                    .push_bind(&k.state);
            });
            qb.push(" ON CONFLICT (name) DO NOTHING");

            inserted += qb.build().execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;
        Ok(inserted)
    }
}
