//! # MoodFlow Common Library
//!
//! Shared code for the MoodFlow service:
//! - Error types
//! - Configuration loading and credential resolution
//! - Core data model (feature vectors, mood/genre labels, history records)
//! - On-disk session history store

pub mod config;
pub mod error;
pub mod history;
pub mod model;

pub use error::{Error, Result};
pub use model::{FeatureVector, Genre, HistorySession, Mood};
