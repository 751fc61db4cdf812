//! Reelscore server library.
//!
//! Session-backed API for keeping a personal library of movies and series,
//! with a TMDB catalog pass-through.

pub mod api;
pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;

pub use app::AppContext;
