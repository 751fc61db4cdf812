//! Domain models for the reelscore server.

pub mod library;
pub mod user;

// Re-export commonly used types
pub use library::{
    LibraryItem, LibraryItemPatch, LibraryPage, ListQuery, MOVIES, MediaKind, NewLibraryItem,
    SERIES,
};
pub use user::{Provider, UpdateProfileRequest, User};

/// Items per page when the requested limit is missing or out of range (a 3x9 grid).
pub const DEFAULT_PAGE_LIMIT: u64 = 27;

/// Largest page size a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 100;

/// Number of pages needed to show `total` items, `limit` at a time.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if total == 0 || limit == 0 {
        0
    } else {
        total.div_ceil(limit)
    }
}
