use std::{mem, ptr};

use proj_sys as proj;

use crate::{
    engine,
    error::ProjError,
    point::Point3,
    projection::{create_context, data_dir_cstring, Projection, ProjectionOptions},
};

/// A source to target coordinate operation built once and reused for any
/// number of batches.
///
/// Axis order is normalized, so geographic coordinates are (longitude,
/// latitude) in degrees on both sides.
#[derive(Debug)]
pub struct Transformation {
    ctx: *mut proj::PJ_CONTEXT,
    pj: *mut proj::PJ,
}

// SAFETY: `ctx` and `pj` are only touched while `engine::lock` is held.
unsafe impl Send for Transformation {}
unsafe impl Sync for Transformation {}

impl Transformation {
    pub fn new(source: &Projection, target: &Projection) -> Result<Self, ProjError> {
        Self::with_options(source, target, &ProjectionOptions::default())
    }

    pub fn with_options(
        source: &Projection,
        target: &Projection,
        options: &ProjectionOptions,
    ) -> Result<Self, ProjError> {
        let source_crs = source.crs()?;
        let target_crs = target.crs()?;
        let c_data_dir = data_dir_cstring(options)?;

        let _guard = engine::lock();
        let ctx = unsafe { create_context(options, c_data_dir.as_ref())? };

        let pj = unsafe {
            proj::proj_create_crs_to_crs_from_pj(
                ctx,
                source_crs,
                target_crs,
                ptr::null_mut(),
                ptr::null(),
            )
        };
        if pj.is_null() {
            let err = unsafe { engine::error_from_ctx(ctx, "proj_create_crs_to_crs_from_pj") };
            unsafe {
                proj::proj_context_destroy(ctx);
            }
            return Err(err);
        }

        // Normalize axis order (e.g. EPSG:4326 is lat,lon by definition).
        let normalized = unsafe { proj::proj_normalize_for_visualization(ctx, pj) };
        unsafe {
            proj::proj_destroy(pj);
        }
        if normalized.is_null() {
            let err = unsafe { engine::error_from_ctx(ctx, "proj_normalize_for_visualization") };
            unsafe {
                proj::proj_context_destroy(ctx);
            }
            return Err(err);
        }

        log::debug!(
            "created transformation {:?} -> {:?}",
            source.definition(),
            target.definition()
        );

        Ok(Self {
            ctx,
            pj: normalized,
        })
    }

    /// Transforms the first `count` entries of `x`, `y` and, when given, `z`
    /// in place with a single engine call.
    ///
    /// `z = None` means the batch carries no elevation; no z buffer is read or
    /// written. On failure the array contents are whatever PROJ wrote and must
    /// not be used.
    pub fn transform(
        &self,
        count: usize,
        x: &mut [f64],
        y: &mut [f64],
        z: Option<&mut [f64]>,
    ) -> Result<(), ProjError> {
        check_len("x", x.len(), count)?;
        check_len("y", y.len(), count)?;
        if let Some(z) = &z {
            check_len("z", z.len(), count)?;
        }
        if count == 0 {
            return Ok(());
        }

        let stride = mem::size_of::<f64>();
        let x = x.as_mut_ptr();
        let y = y.as_mut_ptr();
        let (z, nz) = match z {
            Some(z) => (z.as_mut_ptr(), count),
            None => (ptr::null_mut(), 0),
        };

        log::trace!("proj_trans_generic on {count} points (elevation: {})", nz > 0);

        let pj = self.pj;
        let (_, err) = unsafe {
            engine::call(self.ctx, pj, "proj_trans_generic", || {
                proj::proj_trans_generic(
                    pj,
                    proj::PJ_DIRECTION_PJ_FWD,
                    x,
                    stride,
                    count,
                    y,
                    stride,
                    count,
                    z,
                    stride,
                    nz,
                    ptr::null_mut(),
                    0,
                    0,
                )
            })
        };
        match err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Array-of-structs form of [`Transformation::transform`] with elevation.
    pub fn transform_points(&self, points: &mut [Point3]) -> Result<(), ProjError> {
        if points.is_empty() {
            return Ok(());
        }

        let stride = mem::size_of::<Point3>();
        let n = points.len();

        let first = points.as_mut_ptr();
        let (x, y, z) = unsafe {
            (
                ptr::addr_of_mut!((*first).x),
                ptr::addr_of_mut!((*first).y),
                ptr::addr_of_mut!((*first).z),
            )
        };

        log::trace!("proj_trans_generic on {n} strided points");

        let pj = self.pj;
        let (_, err) = unsafe {
            engine::call(self.ctx, pj, "proj_trans_generic", || {
                proj::proj_trans_generic(
                    pj,
                    proj::PJ_DIRECTION_PJ_FWD,
                    x,
                    stride,
                    n,
                    y,
                    stride,
                    n,
                    z,
                    stride,
                    n,
                    ptr::null_mut(),
                    0,
                    0,
                )
            })
        };
        match err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Reads the error register of this operation. `None` means no error.
    pub fn last_error(&self) -> Option<String> {
        let _guard = engine::lock();
        unsafe { engine::error_from_pj(self.ctx, self.pj, "proj_errno") }.map(|err| err.message())
    }
}

impl Drop for Transformation {
    fn drop(&mut self) {
        let _guard = engine::lock();
        unsafe {
            if !self.pj.is_null() {
                proj::proj_destroy(self.pj);
                self.pj = ptr::null_mut();
            }
            if !self.ctx.is_null() {
                proj::proj_context_destroy(self.ctx);
                self.ctx = ptr::null_mut();
            }
        }
    }
}

fn check_len(name: &'static str, len: usize, count: usize) -> Result<(), ProjError> {
    if len < count {
        return Err(ProjError::BufferTooShort { name, len, count });
    }
    Ok(())
}

/// Transforms `count` points from `source` to `target` in place with one
/// engine call. See [`Transformation::transform`].
///
/// A zero `count` succeeds without calling the engine. Every other call builds
/// and drops a coordinate operation; callers transforming repeatedly between
/// the same pair should keep a [`Transformation`] and reuse it.
pub fn transform(
    source: &Projection,
    target: &Projection,
    count: usize,
    x: &mut [f64],
    y: &mut [f64],
    z: Option<&mut [f64]>,
) -> Result<(), ProjError> {
    if count == 0 {
        check_len("x", x.len(), count)?;
        check_len("y", y.len(), count)?;
        return Ok(());
    }
    Transformation::new(source, target)?.transform(count, x, y, z)
}

/// Transforms `points` from `source` to `target` in place with one engine
/// call. Same per-call cost as [`transform`].
pub fn transform_points(
    source: &Projection,
    target: &Projection,
    points: &mut [Point3],
) -> Result<(), ProjError> {
    if points.is_empty() {
        return Ok(());
    }
    Transformation::new(source, target)?.transform_points(points)
}
