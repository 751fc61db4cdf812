//! Business logic services.

pub mod library;
pub mod tmdb;

pub use library::LibraryService;
pub use tmdb::{DiscoverScope, SearchScope, TmdbClient};
