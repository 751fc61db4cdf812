//! Database queries for library items.
//!
//! Movies and series live in two tables with the same columns apart from the
//! date, so every query is built against the table and date column of a
//! [`MediaKind`] instead of going through a per-table entity.

use chrono::Utc;
use sea_orm::sea_query::{
    Alias, Asterisk, Condition, Expr, ExprTrait, Func, LikeExpr, Order, Query,
};
use sea_orm::{ConnectionTrait, DbErr, QueryResult};
use uuid::Uuid;

use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::{LibraryItem, LibraryItemPatch, MediaKind};

use super::DbPool;

const ID: &str = "id";
const TMDB_ID: &str = "tmdb_id";
const TITLE: &str = "title";
const POSTER_PATH: &str = "poster_path";
const TMDB_SCORE: &str = "tmdb_score";
const SCORE: &str = "score";
const WATCHED: &str = "watched";
const USER_ID: &str = "user_id";
const CREATED_AT: &str = "created_at";
const UPDATED_AT: &str = "updated_at";

fn col(name: &'static str) -> Alias {
    Alias::new(name)
}

/// Row values for a new library item, ready for insertion.
pub struct LibraryInsert {
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub date: Option<chrono::NaiveDate>,
    pub tmdb_score: f64,
    pub score: f64,
    pub watched: bool,
}

/// Filters for a library listing.
pub struct LibraryFilter<'a> {
    pub user_id: Uuid,
    pub watched: bool,
    /// Lowercased, escaped `LIKE` pattern matched against the lowercased title
    pub title_pattern: Option<&'a str>,
}

impl LibraryFilter<'_> {
    fn condition(&self) -> Condition {
        let mut cond = Condition::all()
            .add(Expr::col(col(USER_ID)).eq(self.user_id))
            .add(Expr::col(col(WATCHED)).eq(self.watched));

        if let Some(pattern) = self.title_pattern {
            cond = cond.add(
                Expr::expr(Func::lower(Expr::col(col(TITLE))))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }

        cond
    }
}

fn row_to_item(row: &QueryResult, kind: &MediaKind) -> Result<LibraryItem, DbErr> {
    Ok(LibraryItem {
        id: row.try_get("", ID)?,
        tmdb_id: row.try_get("", TMDB_ID)?,
        title: row.try_get("", TITLE)?,
        poster_path: row.try_get("", POSTER_PATH)?,
        date: row.try_get("", kind.date_column)?,
        tmdb_score: row.try_get("", TMDB_SCORE)?,
        score: row.try_get("", SCORE)?,
        watched: row.try_get("", WATCHED)?,
        user_id: row.try_get("", USER_ID)?,
        created_at: row.try_get("", CREATED_AT)?,
        updated_at: row.try_get("", UPDATED_AT)?,
    })
}

fn item_columns(kind: &MediaKind) -> [Alias; 11] {
    [
        col(ID),
        col(TMDB_ID),
        col(TITLE),
        col(POSTER_PATH),
        col(kind.date_column),
        col(TMDB_SCORE),
        col(SCORE),
        col(WATCHED),
        col(USER_ID),
        col(CREATED_AT),
        col(UPDATED_AT),
    ]
}

impl DbPool {
    /// List one page of items matching `filter`, highest catalog rating first.
    /// Also returns the number of matching items before pagination.
    pub async fn list_library_items(
        &self,
        kind: &MediaKind,
        filter: &LibraryFilter<'_>,
        limit: u64,
        offset: u64,
    ) -> AppResult<(Vec<LibraryItem>, u64)> {
        let condition = filter.condition();

        let mut count_query = Query::select();
        count_query
            .expr_as(Func::count(Expr::col(Asterisk)), col("total"))
            .from(col(kind.table))
            .cond_where(condition.clone());

        let total: i64 = self
            .connection()
            .query_one_raw(self.backend().build(&count_query))
            .await
            .map_err(|e| AppError::Database(format!("Failed to count {}: {}", kind.table, e)))?
            .map(|row| row.try_get("", "total"))
            .transpose()
            .map_err(|e| AppError::Database(format!("Failed to count {}: {}", kind.table, e)))?
            .unwrap_or(0);

        let mut select = Query::select();
        select
            .columns(item_columns(kind))
            .from(col(kind.table))
            .cond_where(condition)
            .order_by(col(TMDB_SCORE), Order::Desc)
            .order_by(col(CREATED_AT), Order::Desc)
            .limit(limit)
            .offset(offset);

        let rows = self
            .connection()
            .query_all_raw(self.backend().build(&select))
            .await
            .map_err(|e| AppError::Database(format!("Failed to list {}: {}", kind.table, e)))?;

        let items = rows
            .iter()
            .map(|row| row_to_item(row, kind))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Database(format!("Failed to read {}: {}", kind.table, e)))?;

        Ok((items, u64::try_from(total).unwrap_or(0)))
    }

    /// Insert a new item. A second insert of the same catalog id for the same
    /// user is a conflict.
    pub async fn insert_library_item(
        &self,
        kind: &MediaKind,
        user_id: Uuid,
        new: LibraryInsert,
    ) -> AppResult<LibraryItem> {
        let now = Utc::now();

        let mut insert = Query::insert();
        insert.into_table(col(kind.table)).columns(item_columns(kind));
        insert
            .values([
                Uuid::new_v4().into(),
                new.tmdb_id.into(),
                new.title.into(),
                new.poster_path.into(),
                new.date.into(),
                new.tmdb_score.into(),
                new.score.into(),
                new.watched.into(),
                user_id.into(),
                now.into(),
                now.into(),
            ])
            .map_err(|e| AppError::Internal(format!("Failed to build insert: {}", e)))?;
        insert.returning_all();

        let row = match self
            .connection()
            .query_one_raw(self.backend().build(&insert))
            .await
        {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(kind.label.to_string()));
            }
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to insert into {}: {}",
                    kind.table, e
                )));
            }
        };

        let row = row.ok_or_else(|| {
            AppError::Database(format!("Insert into {} returned no row", kind.table))
        })?;

        row_to_item(&row, kind)
            .map_err(|e| AppError::Database(format!("Failed to read {}: {}", kind.table, e)))
    }

    /// Fetch an item by id. Items owned by other users are never matched.
    pub async fn get_library_item(
        &self,
        kind: &MediaKind,
        id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<LibraryItem>> {
        let mut select = Query::select();
        select
            .columns(item_columns(kind))
            .from(col(kind.table))
            .and_where(Expr::col(col(ID)).eq(id))
            .and_where(Expr::col(col(USER_ID)).eq(user_id));

        let row = self
            .connection()
            .query_one_raw(self.backend().build(&select))
            .await
            .map_err(|e| AppError::Database(format!("Failed to get from {}: {}", kind.table, e)))?;

        row.map(|r| row_to_item(&r, kind))
            .transpose()
            .map_err(|e| AppError::Database(format!("Failed to read {}: {}", kind.table, e)))
    }

    /// Apply a partial update in one statement and return the updated row.
    /// `updated_at` is always refreshed.
    pub async fn update_library_item(
        &self,
        kind: &MediaKind,
        id: Uuid,
        user_id: Uuid,
        patch: &LibraryItemPatch,
    ) -> AppResult<Option<LibraryItem>> {
        let mut update = Query::update();
        update
            .table(col(kind.table))
            .value(col(UPDATED_AT), Utc::now());

        if let Some(score) = patch.score {
            update.value(col(SCORE), score);
        }
        if let Some(watched) = patch.watched {
            update.value(col(WATCHED), watched);
        }

        update
            .and_where(Expr::col(col(ID)).eq(id))
            .and_where(Expr::col(col(USER_ID)).eq(user_id))
            .returning_all();

        let row = self
            .connection()
            .query_one_raw(self.backend().build(&update))
            .await
            .map_err(|e| AppError::Database(format!("Failed to update {}: {}", kind.table, e)))?;

        row.map(|r| row_to_item(&r, kind))
            .transpose()
            .map_err(|e| AppError::Database(format!("Failed to read {}: {}", kind.table, e)))
    }

    /// Delete an item. Returns false when no row matched id and owner.
    pub async fn delete_library_item(
        &self,
        kind: &MediaKind,
        id: Uuid,
        user_id: Uuid,
    ) -> AppResult<bool> {
        let mut delete = Query::delete();
        delete
            .from_table(col(kind.table))
            .and_where(Expr::col(col(ID)).eq(id))
            .and_where(Expr::col(col(USER_ID)).eq(user_id));

        let result = self
            .connection()
            .execute_raw(self.backend().build(&delete))
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete from {}: {}", kind.table, e)))?;

        Ok(result.rows_affected() > 0)
    }
}
