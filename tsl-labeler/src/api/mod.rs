//! HTTP API handlers for tsl-labeler

pub mod buildinfo;
pub mod dataset;
pub mod guide;
pub mod health;
pub mod session;
pub mod stats;
pub mod ui;

pub use buildinfo::get_build_info;
pub use dataset::{get_dataset, load_dataset};
pub use guide::get_guide;
pub use health::health_routes;
pub use session::{get_session, next_item, skip_item, submit_label};
pub use stats::get_stats;
pub use ui::ui_routes;
