pub mod app;
pub mod badge;
pub mod cache;
pub mod curve;
pub mod errors;
pub mod handlers;
pub mod modal;
pub mod models;
pub mod page;
pub mod producer;
pub mod state;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod widget;

pub use app::router;
pub use cache::ResourceCache;
pub use state::AppState;
pub use storage::resolve_snapshot_dir;
pub use widget::Widget;
