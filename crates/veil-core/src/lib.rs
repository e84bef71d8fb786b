pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod model;
pub mod query;
pub mod region;
pub mod resolver;
pub mod watcher;

pub use config::OcclusionSettings;
pub use engine::{Cover, Occlusion, OcclusionEngine};
pub use error::OcclusionError;
pub use geometry::Rect;
pub use model::{Client, Monitor};
pub use query::{CachedQuery, CompositorQuery, Hyprctl, QueryError, UNKNOWN_WORKSPACE};
pub use region::{Edge, InvalidRegionError, RegionSpec};
pub use resolver::{Reference, RegionResolver};
pub use watcher::{OcclusionEvent, OcclusionWatcher, WatchedRegion};
