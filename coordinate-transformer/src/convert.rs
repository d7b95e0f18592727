//! Value-returning helpers on top of the in-place adapter calls.
//!
//! Geographic coordinates are (longitude, latitude) in degrees throughout.

use std::f64::consts::PI;

use proj_adapter::{Point, Projection};

use crate::error::TransformError;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg / 180.0 * PI
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad / PI * 180.0
}

/// Forward projection of a single longitude/latitude pair.
pub fn project(proj: &Projection, lng: f64, lat: f64) -> Result<(f64, f64), TransformError> {
    let mut point = Point::new(lng, lat);
    proj_adapter::fwd(proj, &mut point)?;
    Ok((point.x, point.y))
}

/// Inverse projection of a single projected pair back to longitude/latitude.
pub fn unproject(proj: &Projection, x: f64, y: f64) -> Result<(f64, f64), TransformError> {
    let mut point = Point::new(x, y);
    proj_adapter::inv(proj, &mut point)?;
    Ok((point.x, point.y))
}

/// Transforms one 2D point between two projections.
///
/// Builds and drops a coordinate operation on every call. For repeated
/// transforms between the same pair, keep a [`proj_adapter::Transformation`]
/// or a [`crate::PointTransformer`] instead.
pub fn transform2(
    src: &Projection,
    dst: &Projection,
    x: f64,
    y: f64,
) -> Result<(f64, f64), TransformError> {
    let mut xs = [x];
    let mut ys = [y];
    proj_adapter::transform(src, dst, 1, &mut xs, &mut ys, None)?;
    Ok((xs[0], ys[0]))
}

/// 3D form of [`transform2`], with the same per-call cost.
pub fn transform3(
    src: &Projection,
    dst: &Projection,
    x: f64,
    y: f64,
    z: f64,
) -> Result<(f64, f64, f64), TransformError> {
    let mut xs = [x];
    let mut ys = [y];
    let mut zs = [z];
    proj_adapter::transform(src, dst, 1, &mut xs, &mut ys, Some(&mut zs))?;
    Ok((xs[0], ys[0], zs[0]))
}

/// Transforms copies of `x` and `y`, truncated to the shorter of the two.
pub fn transform2_list(
    src: &Projection,
    dst: &Projection,
    x: &[f64],
    y: &[f64],
) -> Result<(Vec<f64>, Vec<f64>), TransformError> {
    let n = x.len().min(y.len());
    let mut xs = x[..n].to_vec();
    let mut ys = y[..n].to_vec();
    proj_adapter::transform(src, dst, n, &mut xs, &mut ys, None)?;
    Ok((xs, ys))
}

/// Transforms copies of `x`, `y` and `z`, truncated to the shortest of the
/// three.
pub fn transform3_list(
    src: &Projection,
    dst: &Projection,
    x: &[f64],
    y: &[f64],
    z: &[f64],
) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>), TransformError> {
    let n = x.len().min(y.len()).min(z.len());
    let mut xs = x[..n].to_vec();
    let mut ys = y[..n].to_vec();
    let mut zs = z[..n].to_vec();
    proj_adapter::transform(src, dst, n, &mut xs, &mut ys, Some(&mut zs))?;
    Ok((xs, ys, zs))
}
