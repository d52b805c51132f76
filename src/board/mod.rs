pub mod collation;
pub mod format;
pub mod merge;
pub mod normalize;
pub mod refresh;
pub mod routes;
pub mod view;
pub mod visibility;

pub use refresh::{BoardSnapshot, RefreshOrchestrator};
