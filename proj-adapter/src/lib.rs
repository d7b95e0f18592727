//! Safe calls into the PROJ cartographic engine.
//!
//! Three requests are forwarded to PROJ: forward projection ([`fwd`]),
//! inverse projection ([`inv`]) and batch coordinate transforms
//! ([`transform`], [`Transformation`]). PROJ reports failures through an
//! error register instead of return values; every call here resets and reads
//! that register under one process-wide lock and turns it into a
//! [`ProjError`] carrying the engine's own message.

mod engine;
mod error;
mod point;
mod projection;
mod transformation;

pub use error::ProjError;
pub use point::{Point, Point3};
pub use projection::{fwd, inv, Projection, ProjectionOptions};
pub use transformation::{transform, transform_points, Transformation};
