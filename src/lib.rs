//! Outdoor sound-propagation ray pathfinder.
//!
//! Given a 2.5D scene of buildings, terrain and ground regions, this crate
//! enumerates the acoustically relevant geometric paths between a noise
//! source and a receiver: direct line-of-sight, specular reflections off
//! vertical facades, horizontal-edge (rooftop) diffraction and
//! vertical-edge (corner) diffraction. The geometry-to-attenuation
//! conversion, traffic emission modelling and all persistence concerns are
//! left to the caller; see [`sink::PathSink`].

pub mod config;
pub mod cutprofile;
pub mod error;
pub mod geometry;
pub mod mirror;
pub mod path;
pub mod roofhull;
pub mod scene;
pub mod schedule;
pub mod sidehull;
pub mod sink;

mod compose;

pub use compose::compute_paths;
pub use config::PathfinderConfig;
pub use error::PathfinderError;
pub use path::{PointKind, PointPath, PropagationPath, SegmentPath};
pub use scene::{Scene, SceneBuilder};
pub use schedule::{run, DiscretizedSource, Source, SourceGeometry};
pub use sink::{PathSink, ProgressVisitor};
