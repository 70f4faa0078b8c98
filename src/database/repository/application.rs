use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use crate::database::manager::DatabaseError;
use crate::database::models::{
    ApplicationState, ApplicationWithKingdoms, Kingdom, KingdomFromApplication, RulerApplication,
};
use crate::filter::ApplicationFilter;

const APPLICATION_COLUMNS: &str =
    "id, state, date_create, date_send, date_complete, ruler, creator_refer, moderator_refer, checked";

/// One row of the application/kingdom join.
#[derive(Debug, FromRow)]
struct KingdomLinkRow {
    id: i32,
    name: String,
    area: i32,
    capital: String,
    image: String,
    description: String,
    state: String,
    from_date: NaiveDate,
    to_date: NaiveDate,
}

impl From<KingdomLinkRow> for KingdomFromApplication {
    fn from(row: KingdomLinkRow) -> Self {
        KingdomFromApplication {
            kingdom: Kingdom {
                id: row.id,
                name: row.name,
                area: row.area,
                capital: row.capital,
                image: row.image,
                description: row.description,
                state: row.state,
            },
            from: row.from_date,
            to: row.to_date,
        }
    }
}

pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found(id: i32) -> DatabaseError {
        DatabaseError::NotFound(format!("application {} not found", id))
    }

    pub async fn get(&self, id: i32) -> Result<RulerApplication, DatabaseError> {
        let sql = format!("SELECT {} FROM ruler_applications WHERE id = $1", APPLICATION_COLUMNS);
        sqlx::query_as::<_, RulerApplication>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Every application the user created, deleted ones excluded.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<RulerApplication>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ruler_applications
             WHERE creator_refer = $1 AND state <> $2
             ORDER BY id",
            APPLICATION_COLUMNS
        );
        let apps = sqlx::query_as::<_, RulerApplication>(&sql)
            .bind(user_id)
            .bind(ApplicationState::Deleted.as_str())
            .fetch_all(&self.pool)
            .await?;
        Ok(apps)
    }

    pub async fn list_all(&self, filter: &ApplicationFilter) -> Result<Vec<RulerApplication>, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM ruler_applications", APPLICATION_COLUMNS));
        filter.push_where(&mut qb);
        qb.push(" ORDER BY date_send, id");

        let apps = qb
            .build_query_as::<RulerApplication>()
            .fetch_all(&self.pool)
            .await?;
        Ok(apps)
    }

    pub async fn find_draft(&self, user_id: i32) -> Result<Option<RulerApplication>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ruler_applications WHERE creator_refer = $1 AND state = $2",
            APPLICATION_COLUMNS
        );
        let app = sqlx::query_as::<_, RulerApplication>(&sql)
            .bind(user_id)
            .bind(ApplicationState::Draft.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(app)
    }

    /// Returns the user's draft, creating it when there is none. The partial
    /// unique index on drafts makes concurrent callers converge on one row.
    pub async fn get_or_create_draft(&self, user_id: i32) -> Result<RulerApplication, DatabaseError> {
        let sql = format!(
            "INSERT INTO ruler_applications (state, creator_refer)
             VALUES ($1, $2)
             ON CONFLICT (creator_refer) WHERE state = 'Draft' DO NOTHING
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        let inserted = sqlx::query_as::<_, RulerApplication>(&sql)
            .bind(ApplicationState::Draft.as_str())
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "draft already exists", "user not found"))?;

        match inserted {
            Some(app) => Ok(app),
            None => self
                .find_draft(user_id)
                .await?
                .ok_or_else(|| DatabaseError::Conflict("draft was removed concurrently".to_string())),
        }
    }

    pub async fn with_kingdoms(&self, id: i32) -> Result<ApplicationWithKingdoms, DatabaseError> {
        let application = self.get(id).await?;
        let rows = sqlx::query_as::<_, KingdomLinkRow>(
            "SELECT k.id, k.name, k.area, k.capital, k.image, k.description, k.state,
                    ka.from_date, ka.to_date
             FROM kingdom_applications ka
             JOIN kingdoms k ON k.id = ka.kingdom_refer
             WHERE ka.application_refer = $1
             ORDER BY ka.from_date, k.id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ApplicationWithKingdoms {
            application,
            kingdoms: rows.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn kingdom_count(&self, id: i32) -> Result<i64, DatabaseError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM kingdom_applications WHERE application_refer = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Only drafts carry an editable ruler name.
    pub async fn update_ruler(&self, id: i32, ruler: &str) -> Result<RulerApplication, DatabaseError> {
        let sql = format!(
            "UPDATE ruler_applications SET ruler = $2
             WHERE id = $1 AND state = $3
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, RulerApplication>(&sql)
            .bind(id)
            .bind(ruler)
            .bind(ApplicationState::Draft.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::Conflict("only a draft application can be edited".to_string()))
    }

    /// Moves an application from `from` to `to`, stamping the matching date.
    /// The update is guarded on the current state so a concurrent change is
    /// reported as a conflict instead of being overwritten.
    pub async fn transition(
        &self,
        id: i32,
        from: ApplicationState,
        to: ApplicationState,
        moderator: Option<i32>,
    ) -> Result<RulerApplication, DatabaseError> {
        let stamps_send = to == ApplicationState::Submitted;
        let stamps_complete = matches!(to, ApplicationState::Approved | ApplicationState::Rejected);

        let sql = format!(
            "UPDATE ruler_applications
             SET state = $2,
                 date_send = CASE WHEN $4 THEN CURRENT_DATE ELSE date_send END,
                 date_complete = CASE WHEN $5 THEN CURRENT_DATE ELSE date_complete END,
                 moderator_refer = COALESCE($6, moderator_refer)
             WHERE id = $1 AND state = $3
             RETURNING {}",
            APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, RulerApplication>(&sql)
            .bind(id)
            .bind(to.as_str())
            .bind(from.as_str())
            .bind(stamps_send)
            .bind(stamps_complete)
            .bind(moderator)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| {
                DatabaseError::Conflict(format!("application is no longer in state {}", from))
            })
    }

    /// Result of the external verification service.
    pub async fn set_check(&self, id: i32, checked: bool) -> Result<RulerApplication, DatabaseError> {
        let sql = format!(
            "UPDATE ruler_applications SET checked = $2 WHERE id = $1 RETURNING {}",
            APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, RulerApplication>(&sql)
            .bind(id)
            .bind(checked)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    pub async fn add_kingdom(
        &self,
        application_id: i32,
        kingdom_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            "INSERT INTO kingdom_applications (kingdom_refer, application_refer, from_date, to_date)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(kingdom_id)
        .bind(application_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_write(e, "kingdom is already in the application", "kingdom not found")
        })?;
        Ok(())
    }

    pub async fn update_kingdom(
        &self,
        application_id: i32,
        kingdom_id: i32,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE kingdom_applications SET from_date = $3, to_date = $4
             WHERE application_refer = $1 AND kingdom_refer = $2",
        )
        .bind(application_id)
        .bind(kingdom_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "kingdom is already in the application", "kingdom not found"))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("kingdom is not in the application".to_string()));
        }
        Ok(())
    }

    pub async fn remove_kingdom(&self, application_id: i32, kingdom_id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "DELETE FROM kingdom_applications WHERE application_refer = $1 AND kingdom_refer = $2",
        )
        .bind(application_id)
        .bind(kingdom_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("kingdom is not in the application".to_string()));
        }
        Ok(())
    }

    /// Hard delete; kingdom links go with it.
    pub async fn delete(&self, id: i32) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM ruler_applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
