//! Access to the PROJ engine and its error register.
//!
//! The register is mutable state owned by the engine. Every operation that can
//! set it is run together with the read of the register as one unit under a
//! single process-wide lock, so a caller only ever observes the outcome of its
//! own call.

use std::{
    ffi::CStr,
    os::raw::c_char,
    sync::{Mutex, MutexGuard, PoisonError},
};

use proj_sys as proj;

use crate::error::ProjError;

static ENGINE: Mutex<()> = Mutex::new(());

/// Serializes access to the engine. A poisoned lock is recovered since the
/// guarded state is `()`.
pub(crate) fn lock() -> MutexGuard<'static, ()> {
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `op` against `pj` with the register reset right before and read right
/// after, all under the engine lock. The output of `op` is returned even when
/// the engine reported a failure.
///
/// # Safety
/// `ctx` and `pj` must be live objects created by the engine.
pub(crate) unsafe fn call<T>(
    ctx: *mut proj::PJ_CONTEXT,
    pj: *mut proj::PJ,
    context: &'static str,
    op: impl FnOnce() -> T,
) -> (T, Option<ProjError>) {
    let _guard = lock();
    proj::proj_errno_reset(pj);
    let out = op();
    let err = error_from_pj(ctx, pj, context);
    (out, err)
}

/// Reads the register of `pj`. `None` means no error.
///
/// # Safety
/// `ctx` and `pj` must be live; the caller must hold the engine lock.
pub(crate) unsafe fn error_from_pj(
    ctx: *mut proj::PJ_CONTEXT,
    pj: *mut proj::PJ,
    context: &'static str,
) -> Option<ProjError> {
    let code = proj::proj_errno(pj);
    if code == 0 {
        return None;
    }
    Some(ProjError::Engine {
        code,
        message: error_message(ctx, code),
        context,
    })
}

/// Error left on the context by a failed object creation.
///
/// # Safety
/// `ctx` must be live; the caller must hold the engine lock.
pub(crate) unsafe fn error_from_ctx(
    ctx: *mut proj::PJ_CONTEXT,
    context: &'static str,
) -> ProjError {
    let code = proj::proj_context_errno(ctx);
    ProjError::Engine {
        code,
        message: error_message(ctx, code),
        context,
    }
}

/// # Safety
/// `ctx` must be live; the caller must hold the engine lock.
pub(crate) unsafe fn error_message(ctx: *mut proj::PJ_CONTEXT, code: i32) -> String {
    let c_msg = proj::proj_context_errno_string(ctx, code);
    if c_msg.is_null() {
        return "unknown error".to_string();
    }
    CStr::from_ptr(c_msg as *const c_char)
        .to_string_lossy()
        .into_owned()
}
