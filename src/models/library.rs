//! Library item models shared by movies and series.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

/// Where and how one kind of library item is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaKind {
    /// Relation holding the items
    pub table: &'static str,
    /// Column holding the optional release or first-air date
    pub date_column: &'static str,
    /// Human label used in error messages ("Movie not found")
    pub label: &'static str,
}

pub const MOVIES: MediaKind = MediaKind {
    table: "movies",
    date_column: "release_date",
    label: "Movie",
};

pub const SERIES: MediaKind = MediaKind {
    table: "series",
    date_column: "first_aired",
    label: "Serie",
};

/// A movie or series in a user's library.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryItem {
    pub id: Uuid,
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    /// Release date for movies, first air date for series
    pub date: Option<NaiveDate>,
    /// Catalog rating, fixed at insert
    pub tmdb_score: f64,
    /// The owner's own rating
    pub score: f64,
    pub watched: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for adding an item to a library.
#[derive(Debug, Clone)]
pub struct NewLibraryItem {
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    /// `YYYY-MM-DD`; anything else is stored as no date
    pub date: Option<String>,
    pub watched: bool,
    pub tmdb_score: f64,
    pub score: Option<f64>,
}

impl NewLibraryItem {
    pub fn validate(&self) -> Result<(), String> {
        if self.tmdb_id <= 0 {
            return Err("tmdbId must be a positive catalog id".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("title must not be empty".to_string());
        }
        if !is_valid_score(self.tmdb_score) {
            return Err("tmdbScore must be between 0 and 10".to_string());
        }
        if self.score.is_some_and(|s| !is_valid_score(s)) {
            return Err("score must be between 0 and 10".to_string());
        }
        Ok(())
    }

    /// Parsed date, `None` when absent or malformed.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
    }
}

/// Partial update. Only `score` and `watched` are mutable.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LibraryItemPatch {
    pub score: Option<f64>,
    pub watched: Option<bool>,
}

impl LibraryItemPatch {
    pub fn validate(&self) -> Result<(), String> {
        if self.score.is_some_and(|s| !is_valid_score(s)) {
            return Err("score must be between 0 and 10".to_string());
        }
        Ok(())
    }
}

fn is_valid_score(score: f64) -> bool {
    (0.0..=10.0).contains(&score)
}

/// Library listing request, before normalization.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub watched: bool,
    pub query: Option<String>,
    pub page: i64,
    pub limit: i64,
}

impl ListQuery {
    /// Requested page; anything below 1 means the first page.
    pub fn page(&self) -> u64 {
        if self.page < 1 { 1 } else { self.page as u64 }
    }

    /// Requested page size; out-of-range values fall back to the default.
    pub fn limit(&self) -> u64 {
        if self.limit < 1 || self.limit > MAX_PAGE_LIMIT as i64 {
            DEFAULT_PAGE_LIMIT
        } else {
            self.limit as u64
        }
    }

    /// Rows to skip. Capped at `i64::MAX`, the largest offset the database
    /// drivers can bind.
    pub fn offset(&self) -> u64 {
        (self.page() - 1)
            .saturating_mul(self.limit())
            .min(i64::MAX as u64)
    }

    /// Lowercased `LIKE` pattern for the title search, with wildcards in the
    /// search text escaped by `\`. `None` when there is nothing to search for.
    pub fn title_pattern(&self) -> Option<String> {
        let query = self.query.as_deref().map(str::trim).filter(|q| !q.is_empty())?;

        let mut pattern = String::with_capacity(query.len() + 2);
        pattern.push('%');
        for c in query.to_lowercase().chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        Some(pattern)
    }
}

/// One page of a library listing.
#[derive(Debug, Clone)]
pub struct LibraryPage {
    pub results: Vec<LibraryItem>,
    pub page: u64,
    /// Matching items before pagination
    pub count: u64,
    pub total_pages: u64,
}

// HTTP representations

/// Query string for library listings.
///
/// Numbers are parsed leniently: a malformed `page` or `limit` behaves like a
/// missing one.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// `true` for the watched list, anything else for the watchlist
    pub watched: Option<String>,
    /// Case-insensitive title search
    pub query: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(p: ListParams) -> Self {
        let number = |v: Option<String>| v.and_then(|s| s.trim().parse::<i64>().ok()).unwrap_or(0);
        ListQuery {
            watched: p.watched.as_deref() == Some("true"),
            query: p.query,
            page: number(p.page),
            limit: number(p.limit),
        }
    }
}

/// Movie in API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    pub id: Uuid,
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub tmdb_score: f64,
    pub score: f64,
    pub watched: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LibraryItem> for MovieResponse {
    fn from(i: LibraryItem) -> Self {
        Self {
            id: i.id,
            tmdb_id: i.tmdb_id,
            title: i.title,
            poster_path: i.poster_path,
            release_date: i.date,
            tmdb_score: i.tmdb_score,
            score: i.score,
            watched: i.watched,
            user_id: i.user_id,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

/// Series in API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SerieResponse {
    pub id: Uuid,
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub first_aired: Option<NaiveDate>,
    pub tmdb_score: f64,
    pub score: f64,
    pub watched: bool,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LibraryItem> for SerieResponse {
    fn from(i: LibraryItem) -> Self {
        Self {
            id: i.id,
            tmdb_id: i.tmdb_id,
            title: i.title,
            poster_path: i.poster_path,
            first_aired: i.date,
            tmdb_score: i.tmdb_score,
            score: i.score,
            watched: i.watched,
            user_id: i.user_id,
            created_at: i.created_at,
            updated_at: i.updated_at,
        }
    }
}

/// Body of POST /api/v1/movies.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieRequest {
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub tmdb_score: f64,
    pub score: Option<f64>,
}

impl From<CreateMovieRequest> for NewLibraryItem {
    fn from(r: CreateMovieRequest) -> Self {
        Self {
            tmdb_id: r.tmdb_id,
            title: r.title,
            poster_path: r.poster_path,
            date: r.release_date,
            watched: r.watched,
            tmdb_score: r.tmdb_score,
            score: r.score,
        }
    }
}

/// Body of POST /api/v1/series.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSerieRequest {
    pub tmdb_id: i32,
    pub title: String,
    pub poster_path: Option<String>,
    pub first_aired: Option<String>,
    #[serde(default)]
    pub watched: bool,
    #[serde(default)]
    pub tmdb_score: f64,
    pub score: Option<f64>,
}

impl From<CreateSerieRequest> for NewLibraryItem {
    fn from(r: CreateSerieRequest) -> Self {
        Self {
            tmdb_id: r.tmdb_id,
            title: r.title,
            poster_path: r.poster_path,
            date: r.first_aired,
            watched: r.watched,
            tmdb_score: r.tmdb_score,
            score: r.score,
        }
    }
}

/// Paginated listing in API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub results: Vec<T>,
    pub page: u64,
    pub count: u64,
    pub total_pages: u64,
}

impl<T: From<LibraryItem>> From<LibraryPage> for PageResponse<T> {
    fn from(p: LibraryPage) -> Self {
        Self {
            results: p.results.into_iter().map(T::from).collect(),
            page: p.page,
            count: p.count,
            total_pages: p.total_pages,
        }
    }
}

/// Response to POST /api/v1/movies.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovieCreatedResponse {
    pub movie: MovieResponse,
    pub message: String,
}

/// Response to POST /api/v1/series.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SerieCreatedResponse {
    pub serie: SerieResponse,
    pub message: String,
}
