//! Projective geometry of a ball seen by a pinhole camera.
//!
//! This crate covers the image-formation side of ball tracking:
//!
//! - [`Camera`] / [`Homography`] - pinhole camera with a single focal length,
//!   world pose from degree angles, and the 3x4 projection it induces
//! - [`obtain_ball_conic`] - the silhouette conic of a sphere
//! - [`projection_cone_from_ellipse`] - the back-projection cone of a conic
//! - [`estimate_ball_location`] - the sphere center recovered from its cone
//! - [`EllipseParams`] - explicit ellipse parameters to and from conics
//! - [`BallProjector`] - all of the above bundled for one camera and ball
//!
//! # Example
//!
//! ```
//! use projective_geometry::{
//!     estimate_ball_location, obtain_ball_conic, projection_cone_from_ellipse, Camera,
//! };
//! use nalgebra::Vector3;
//!
//! let camera = Camera::basketball_broadcast();
//! let radius = 29.5 / 36.0 / (2.0 * std::f64::consts::PI);
//! let ball = Vector3::new(0.0, 0.0, 5.0);
//!
//! let h = camera.homography().unwrap();
//! let conic = obtain_ball_conic(&ball, radius, &h).unwrap();
//! let ellipse = conic.ellipse_params().unwrap();
//! assert!(ellipse.a >= ellipse.b);
//!
//! let cone = projection_cone_from_ellipse(&conic, &camera.centered().homography().unwrap());
//! let estimate = estimate_ball_location(&cone, radius, &camera.center()).unwrap();
//! assert!((estimate - ball).norm() < 0.1);
//! ```
//!
//! # Coordinate System
//!
//! World coordinates are right-handed in yards: X along the pitch, Y across
//! it, Z up. Image coordinates are pixels with the origin in the top-left
//! corner and the principal point at the image center.
//!
//! # Layer 0 Crate
//!
//! No rendering or UI dependencies; everything here is pure computation on
//! `nalgebra` types.
//!
//! # Feature Flags
//!
//! - `serde`: Enable serialization/deserialization for cameras, conics and
//!   ellipse parameters

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::module_name_repetitions,
    clippy::suboptimal_flops,
    clippy::doc_markdown
)]

mod camera;
mod conic;
mod ellipse;
mod error;
mod estimate;
mod homography;
pub mod linalg;

pub use camera::{rotation_from_degrees, Camera, ImageSize};
pub use conic::{obtain_ball_conic, projection_cone_from_ellipse, Conic, Cone, SphereQuadric};
pub use ellipse::{EllipseParams, AXIS_ALIGNED_TOL};
pub use error::{GeometryError, Result};
pub use estimate::{
    estimate_ball_location, estimate_ball_location_exact, BallProjector, DISPLAY_DECIMALS,
};
pub use homography::Homography;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix3, Matrix3x4, Point2, Vector3};

/// Prelude for convenient imports.
///
/// ```
/// use projective_geometry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        estimate_ball_location, obtain_ball_conic, projection_cone_from_ellipse, BallProjector,
        Camera, Conic, Cone, EllipseParams, GeometryError, Homography,
    };
}
