//! # League Stats
//!
//! Superlatives for a Dota 2 league, computed from match data merged out of
//! two public providers.
//!
//! ## Architecture
//!
//! - **models**: Raw provider records, unified matches, the hero catalog, reports
//! - **fetch**: Stratz (paginated) and OpenDota (throttled, parse-job polling) clients
//! - **merge**: Joins both providers into unified matches
//! - **calculate**: Region/time filtering and superlative aggregation
//! - **sync**: One-shot fetch-and-merge pipeline for a league
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod merge;
pub mod models;
pub mod sync;

pub use models::*;
