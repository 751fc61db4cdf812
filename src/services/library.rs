//! Library service: user-scoped CRUD over movies or series.
//!
//! One implementation serves both media kinds; the [`MediaKind`] it is built
//! with picks the table and date column.

use tracing::{debug, info};
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::library::{LibraryFilter, LibraryInsert};
use crate::error::{AppError, AppResult};
use crate::models::{
    LibraryItem, LibraryItemPatch, LibraryPage, ListQuery, MOVIES, MediaKind, NewLibraryItem,
    SERIES, total_pages,
};

/// Library operations for one media kind.
#[derive(Clone)]
pub struct LibraryService {
    pool: DbPool,
    kind: MediaKind,
}

impl LibraryService {
    pub fn new(pool: DbPool, kind: MediaKind) -> Self {
        Self { pool, kind }
    }

    pub fn movies(pool: DbPool) -> Self {
        Self::new(pool, MOVIES)
    }

    pub fn series(pool: DbPool) -> Self {
        Self::new(pool, SERIES)
    }

    pub fn kind(&self) -> &MediaKind {
        &self.kind
    }

    /// List a page of the user's watched list or watchlist.
    pub async fn list(&self, user_id: Uuid, query: &ListQuery) -> AppResult<LibraryPage> {
        let page = query.page();
        let limit = query.limit();
        let pattern = query.title_pattern();

        let filter = LibraryFilter {
            user_id,
            watched: query.watched,
            title_pattern: pattern.as_deref(),
        };

        let (results, count) = self
            .pool
            .list_library_items(&self.kind, &filter, limit, query.offset())
            .await?;

        debug!(
            kind = self.kind.table,
            user_id = %user_id,
            page,
            limit,
            count,
            "Listed library items"
        );

        Ok(LibraryPage {
            results,
            page,
            count,
            total_pages: total_pages(count, limit),
        })
    }

    /// Add an item to the user's library.
    pub async fn create(&self, user_id: Uuid, input: NewLibraryItem) -> AppResult<LibraryItem> {
        input.validate().map_err(AppError::InvalidInput)?;

        let date = input.parsed_date();
        let row = LibraryInsert {
            tmdb_id: input.tmdb_id,
            title: input.title,
            poster_path: input.poster_path,
            date,
            tmdb_score: input.tmdb_score,
            score: input.score.unwrap_or(0.0),
            watched: input.watched,
        };

        let item = self.pool.insert_library_item(&self.kind, user_id, row).await?;

        info!(
            kind = self.kind.table,
            user_id = %user_id,
            item_id = %item.id,
            tmdb_id = item.tmdb_id,
            "Added library item"
        );

        Ok(item)
    }

    /// Get one item owned by the user.
    pub async fn get(&self, id: Uuid, user_id: Uuid) -> AppResult<LibraryItem> {
        self.pool
            .get_library_item(&self.kind, id, user_id)
            .await?
            .ok_or_else(|| self.not_found())
    }

    /// Change score and/or watched flag. Omitted fields keep their values.
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &LibraryItemPatch,
    ) -> AppResult<LibraryItem> {
        patch.validate().map_err(AppError::InvalidInput)?;

        self.pool
            .update_library_item(&self.kind, id, user_id, patch)
            .await?
            .ok_or_else(|| self.not_found())
    }

    /// Remove an item from the user's library.
    pub async fn delete(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        if !self.pool.delete_library_item(&self.kind, id, user_id).await? {
            return Err(self.not_found());
        }

        info!(
            kind = self.kind.table,
            user_id = %user_id,
            item_id = %id,
            "Removed library item"
        );

        Ok(())
    }

    fn not_found(&self) -> AppError {
        AppError::NotFound(self.kind.label.to_string())
    }
}
