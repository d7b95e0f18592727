use std::{ffi::CString, path::PathBuf, ptr};

use proj_sys as proj;

use crate::{engine, error::ProjError, point::Point};

/// Settings applied to the PROJ context of a new [`Projection`].
#[derive(Debug, Clone, Default)]
pub struct ProjectionOptions {
    /// Extra directory searched for `proj.db` and grid files.
    pub proj_data_dir: Option<PathBuf>,
    /// Allow PROJ to download grid files from its CDN and cache them locally.
    pub enable_network: bool,
}

/// A projection definition parsed and owned by PROJ.
///
/// The handle owns its own PROJ context. Both are released when the handle is
/// dropped.
#[derive(Debug)]
pub struct Projection {
    ctx: *mut proj::PJ_CONTEXT,
    pj: *mut proj::PJ,
    // Operation run by `fwd`/`inv`. Same object as `pj` for bare PROJ strings,
    // the deriving conversion for a projected CRS, null for other CRSs.
    op: *mut proj::PJ,
    // Same object as `pj` when the definition already names a CRS, null when
    // the definition cannot be turned into one.
    crs: *mut proj::PJ,
    definition: String,
}

// SAFETY: `ctx`, `pj`, `op` and `crs` are only touched while `engine::lock` is held,
// so no two threads use the context at the same time.
unsafe impl Send for Projection {}
unsafe impl Sync for Projection {}

impl Projection {
    pub fn new(definition: &str) -> Result<Self, ProjError> {
        Self::with_options(definition, &ProjectionOptions::default())
    }

    pub fn with_options(
        definition: &str,
        options: &ProjectionOptions,
    ) -> Result<Self, ProjError> {
        let c_definition =
            CString::new(definition).map_err(|_| ProjError::NulInDefinition("definition"))?;
        let c_data_dir = data_dir_cstring(options)?;
        let c_crs_definition = if needs_crs_twin(definition) {
            Some(
                CString::new(format!("{definition} +type=crs"))
                    .map_err(|_| ProjError::NulInDefinition("definition"))?,
            )
        } else {
            None
        };

        let _guard = engine::lock();
        let ctx = unsafe { create_context(options, c_data_dir.as_ref())? };

        let pj = unsafe { proj::proj_create(ctx, c_definition.as_ptr()) };
        if pj.is_null() {
            let err = unsafe { engine::error_from_ctx(ctx, "proj_create") };
            unsafe {
                proj::proj_context_destroy(ctx);
            }
            return Err(err);
        }

        let op = if unsafe { proj::proj_is_crs(pj) } != 0 {
            let op = unsafe { proj::proj_crs_get_coordoperation(ctx, pj) };
            if op.is_null() {
                log::debug!("{definition:?} is a CRS without a conversion");
            }
            op
        } else {
            pj
        };

        let crs = match &c_crs_definition {
            Some(c_crs) => {
                let crs = unsafe { proj::proj_create(ctx, c_crs.as_ptr()) };
                if crs.is_null() {
                    let err = unsafe { engine::error_from_ctx(ctx, "proj_create") };
                    log::debug!("{definition:?} has no CRS form: {err}");
                }
                crs
            }
            None => pj,
        };

        log::debug!("created projection {definition:?}");

        Ok(Self {
            ctx,
            pj,
            op,
            crs,
            definition: definition.to_string(),
        })
    }

    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Reads the error register of this handle.
    ///
    /// Returns `None` when the register is clear, otherwise PROJ's own
    /// message for the stored code. Every operation resets the register
    /// before it runs, so the value always belongs to the most recent
    /// operation on this handle.
    pub fn last_error(&self) -> Option<String> {
        let pj = if self.op.is_null() { self.pj } else { self.op };
        let _guard = engine::lock();
        unsafe { engine::error_from_pj(self.ctx, pj, "proj_errno") }.map(|err| err.message())
    }

    fn operation(&self) -> Result<*mut proj::PJ, ProjError> {
        if self.op.is_null() {
            return Err(ProjError::NotAnOperation {
                definition: self.definition.clone(),
            });
        }
        Ok(self.op)
    }

    pub(crate) fn crs(&self) -> Result<*mut proj::PJ, ProjError> {
        if self.crs.is_null() {
            return Err(ProjError::NotACrs {
                definition: self.definition.clone(),
            });
        }
        Ok(self.crs)
    }
}

impl Drop for Projection {
    fn drop(&mut self) {
        let _guard = engine::lock();
        unsafe {
            if !self.crs.is_null() && self.crs != self.pj {
                proj::proj_destroy(self.crs);
            }
            self.crs = ptr::null_mut();
            if !self.op.is_null() && self.op != self.pj {
                proj::proj_destroy(self.op);
            }
            self.op = ptr::null_mut();
            if !self.pj.is_null() {
                proj::proj_destroy(self.pj);
                self.pj = ptr::null_mut();
            }
            if !self.ctx.is_null() {
                proj::proj_context_destroy(self.ctx);
                self.ctx = ptr::null_mut();
            }
        }
        log::debug!("released projection {:?}", self.definition);
    }
}

pub(crate) fn data_dir_cstring(options: &ProjectionOptions) -> Result<Option<CString>, ProjError> {
    options
        .proj_data_dir
        .as_ref()
        .map(|dir| CString::new(dir.to_string_lossy().as_bytes()))
        .transpose()
        .map_err(|_| ProjError::NulInDefinition("proj_data_dir"))
}

/// Creates a PROJ context configured from `options`.
///
/// # Safety
/// The caller must hold the engine lock.
pub(crate) unsafe fn create_context(
    options: &ProjectionOptions,
    data_dir: Option<&CString>,
) -> Result<*mut proj::PJ_CONTEXT, ProjError> {
    let ctx = proj::proj_context_create();
    if ctx.is_null() {
        return Err(ProjError::ContextCreation);
    }
    if options.enable_network {
        // Downloaded grid files are cached in the user's local directory.
        proj::proj_context_set_enable_network(ctx, 1);
        proj::proj_grid_cache_set_enable(ctx, 1);
    }
    if let Some(dir) = data_dir {
        let paths = [dir.as_ptr()];
        proj::proj_context_set_search_paths(ctx, paths.len() as i32, paths.as_ptr());
    }
    Ok(ctx)
}

// A bare PROJ string builds a coordinate operation; batch transforms need the
// CRS it describes.
fn needs_crs_twin(definition: &str) -> bool {
    let definition = definition.trim_start();
    (definition.starts_with('+') || definition.starts_with("proj="))
        && !definition.contains("type=crs")
}

/// Projects `point` from (longitude, latitude) in degrees to projected
/// coordinates, in place.
///
/// On failure the contents of `point` are whatever PROJ wrote and must not be
/// used. A CRS definition without a conversion (e.g. a geographic CRS) fails
/// with [`ProjError::NotAnOperation`] and leaves `point` untouched.
pub fn fwd(projection: &Projection, point: &mut Point) -> Result<(), ProjError> {
    let pj = projection.operation()?;
    let coord = proj::PJ_COORD {
        lpzt: proj::PJ_LPZT {
            lam: point.x.to_radians(),
            phi: point.y.to_radians(),
            z: 0.0,
            t: f64::INFINITY,
        },
    };
    let (out, err) = unsafe {
        engine::call(projection.ctx, pj, "proj_trans", || {
            proj::proj_trans(pj, proj::PJ_DIRECTION_PJ_FWD, coord)
        })
    };
    unsafe {
        point.x = out.xy.x;
        point.y = out.xy.y;
    }
    match err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Projects `point` from projected coordinates back to (longitude, latitude)
/// in degrees, in place.
///
/// On failure the contents of `point` are whatever PROJ wrote and must not be
/// used. Same [`ProjError::NotAnOperation`] rule as [`fwd`].
pub fn inv(projection: &Projection, point: &mut Point) -> Result<(), ProjError> {
    let pj = projection.operation()?;
    let coord = proj::PJ_COORD {
        xyzt: proj::PJ_XYZT {
            x: point.x,
            y: point.y,
            z: 0.0,
            t: f64::INFINITY,
        },
    };
    let (out, err) = unsafe {
        engine::call(projection.ctx, pj, "proj_trans", || {
            proj::proj_trans(pj, proj::PJ_DIRECTION_PJ_INV, coord)
        })
    };
    unsafe {
        point.x = out.lp.lam.to_degrees();
        point.y = out.lp.phi.to_degrees();
    }
    match err {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
