//! HTTP API handlers
//!
//! One module per concern, each exporting a route builder merged in
//! `build_router`.

pub mod analyze;
pub mod auth;
pub mod catalog;
pub mod health;
pub mod history;
pub mod playlist;
pub mod ui;

pub use analyze::analyze_routes;
pub use auth::auth_routes;
pub use catalog::catalog_routes;
pub use health::health_routes;
pub use history::history_routes;
pub use playlist::playlist_routes;
pub use ui::ui_routes;
