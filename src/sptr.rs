//! Integer/pointer conversions for the placeholder slots.
//!
//! Values are stored in pointer-typed slots so that pointers keep their provenance. Plain
//! integers written into a slot carry none.

#[cfg(feature = "strict-provenance")]
mod implementation {
    pub(crate) fn without_provenance<T>(addr: usize) -> *const T {
        core::ptr::without_provenance(addr)
    }

    pub(crate) fn addr<T>(ptr: *const T) -> usize {
        ptr.addr()
    }
}

#[cfg(not(feature = "strict-provenance"))]
#[allow(clippy::as_conversions)]
mod implementation {
    pub(crate) fn without_provenance<T>(addr: usize) -> *const T {
        addr as _
    }

    pub(crate) fn addr<T>(ptr: *const T) -> usize {
        ptr as usize
    }
}

pub(crate) use implementation::*;
