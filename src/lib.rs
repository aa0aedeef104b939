//! Floor-plan layout optimization.
//!
//! Given a building outline, walls, and restricted zones, the crate
//! places rectangular boxes ("ilots") to a target density with a
//! genetic search, routes a minimum-spanning corridor network between
//! them, and scores the result. The whole pipeline is deterministic
//! for a fixed seed.
//!
//! ```no_run
//! use glam::Vec2;
//! use ilotplan::{optimize_layout, BoxSpec, OptimizerConfig, PlanGeometry};
//!
//! let plan = PlanGeometry::new(vec![
//!     Vec2::new(0.0, 0.0),
//!     Vec2::new(30.0, 0.0),
//!     Vec2::new(30.0, 20.0),
//!     Vec2::new(0.0, 20.0),
//! ]);
//! let result = optimize_layout(
//!     &plan,
//!     &BoxSpec::default_mix(),
//!     0.3,
//!     &OptimizerConfig::default(),
//! )?;
//! println!("{} boxes, {} corridors", result.ilots.len(), result.corridors.len());
//! # Ok::<(), ilotplan::LayoutError>(())
//! ```

pub mod corridors;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod obstacles;
pub mod placement;
pub mod stats;

pub use corridors::{corridor_graph, route, Corridor, RouteOutcome};
pub use error::{ErrorKind, LayoutError};
pub use geometry::Rect;
pub use layout::{optimize_layout, LayoutFlag, LayoutResult, PlanGeometry};
pub use obstacles::{Obstacle, ObstacleIndex, Wall, Zone, ZoneKind};
pub use placement::genome::{BoxSpec, DensityProfile, SizeTier, TierSpec};
pub use placement::{CancelToken, Ilot, OptimizerConfig};
pub use stats::{CategoryStats, ScoreWeights, Statistics};
