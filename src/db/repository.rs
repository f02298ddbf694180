//! Database repository for query execution and single-row writes.
//!
//! Every write is one statement, so a failed write leaves the prior row as it was.

use std::collections::HashMap;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};

use super::resources::{
    game_from_row, score_from_row, user_from_row, GAME_COLUMNS, SCORE_COLUMNS, USER_COLUMNS,
};
use crate::errors::AppError;
use crate::models::{Game, Score, User};
use crate::query::{populate, Page, QueryPlan, Resource};

/// Current time as a fixed-width RFC 3339 UTC timestamp.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run a list query: count, windowed select, projection, then relation expansion.
    ///
    /// All statements share one read transaction so `count` and `data` see the
    /// same snapshot.
    pub async fn query<R: Resource>(&self, plan: &QueryPlan) -> Result<Page, AppError> {
        let mut tx = self.pool.begin().await?;

        let count_row = plan.count_query().build().fetch_one(&mut *tx).await?;
        let count: i64 = count_row.get("count");

        let rows = plan.select_query().build().fetch_all(&mut *tx).await?;

        let mut records: Vec<Map<String, Value>> = Vec::with_capacity(rows.len());
        for row in rows {
            let mut record = match serde_json::to_value(R::from_row(&row))? {
                Value::Object(map) => map,
                other => {
                    return Err(AppError::Internal(format!(
                        "{} row did not serialize to an object: {}",
                        plan.schema.table, other
                    )))
                }
            };
            plan.projection.apply(&mut record);
            records.push(record);
        }

        for relation in plan.populate.relations() {
            let ids = populate::referenced_ids(relation, &records);
            if ids.is_empty() {
                continue;
            }
            let lookup = populate::lookup_query(relation, &ids)
                .build()
                .fetch_all(&mut *tx)
                .await?;
            let resolved: HashMap<String, Value> = lookup
                .iter()
                .map(|row| populate::sub_document(relation, row))
                .collect();
            populate::attach(relation, &mut records, &resolved);
        }

        tx.commit().await?;

        tracing::debug!(
            table = plan.schema.table,
            count,
            returned = records.len(),
            "Executed list query"
        );

        let data = records.into_iter().map(Value::Object).collect();
        Ok(Page::new(&plan.pagination, count, data))
    }

    // ==================== GAME OPERATIONS ====================

    /// Get a game by ID.
    pub async fn get_game(&self, id: &str) -> Result<Option<Game>, AppError> {
        let sql = format!("SELECT {} FROM games WHERE id = ?", GAME_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(game_from_row))
    }

    /// Insert a new game.
    pub async fn insert_game(&self, game: &Game) -> Result<(), AppError> {
        let metadata = serde_json::to_string(&game.metadata)?;

        sqlx::query(
            "INSERT INTO games (id, name, slug, description, metadata, is_publish, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&game.id)
        .bind(&game.name)
        .bind(&game.slug)
        .bind(&game.description)
        .bind(&metadata)
        .bind(game.is_publish as i32)
        .bind(&game.created_by)
        .bind(&game.created_at)
        .bind(&game.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write every mutable column of an existing game.
    pub async fn save_game(&self, game: &Game) -> Result<(), AppError> {
        let metadata = serde_json::to_string(&game.metadata)?;

        let result = sqlx::query(
            "UPDATE games SET name = ?, slug = ?, description = ?, metadata = ?, is_publish = ?, updated_at = ? WHERE id = ?"
        )
        .bind(&game.name)
        .bind(&game.slug)
        .bind(&game.description)
        .bind(&metadata)
        .bind(game.is_publish as i32)
        .bind(&game.updated_at)
        .bind(&game.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Game {} not found", game.id)));
        }
        Ok(())
    }

    // ==================== SCORE OPERATIONS ====================

    /// Get a score by ID.
    pub async fn get_score(&self, id: &str) -> Result<Option<Score>, AppError> {
        let sql = format!("SELECT {} FROM scores WHERE id = ?", SCORE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(score_from_row))
    }

    /// Insert a new score.
    pub async fn insert_score(&self, score: &Score) -> Result<(), AppError> {
        let metadata = serde_json::to_string(&score.metadata)?;

        sqlx::query(
            "INSERT INTO scores (id, user_id, game_id, value, metadata, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&score.id)
        .bind(&score.user)
        .bind(&score.game)
        .bind(score.value)
        .bind(&metadata)
        .bind(score.is_active as i32)
        .bind(&score.created_at)
        .bind(&score.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write every mutable column of an existing score.
    pub async fn save_score(&self, score: &Score) -> Result<(), AppError> {
        let metadata = serde_json::to_string(&score.metadata)?;

        let result = sqlx::query(
            "UPDATE scores SET value = ?, metadata = ?, is_active = ?, updated_at = ? WHERE id = ?",
        )
        .bind(score.value)
        .bind(&metadata)
        .bind(score.is_active as i32)
        .bind(&score.updated_at)
        .bind(&score.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Score {} not found", score.id)));
        }
        Ok(())
    }

    // ==================== USER OPERATIONS ====================

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Insert a new user.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, username, role, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(user.role.as_str())
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Write every mutable column of an existing user.
    pub async fn save_user(&self, user: &User) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE users SET username = ?, role = ?, updated_at = ? WHERE id = ?")
                .bind(&user.username)
                .bind(user.role.as_str())
                .bind(&user.updated_at)
                .bind(&user.id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user.id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_is_fixed_width_utc() {
        let ts = timestamp();
        assert_eq!(ts.len(), "2024-01-01T00:00:00.000Z".len());
        assert!(ts.ends_with('Z'));
    }
}
