//! Thin logging shims: forward to `tracing` when `with-tracing` is enabled,
//! compile to nothing otherwise.

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "with-tracing")]
        {
            ::tracing::debug!($($arg)*);
        };
        #[cfg(not(feature = "with-tracing"))]
        {
            if false {
                let _ = format!($($arg)*);
            }
        };
    }};
}

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "with-tracing")]
        {
            ::tracing::trace!($($arg)*);
        };
        #[cfg(not(feature = "with-tracing"))]
        {
            if false {
                let _ = format!($($arg)*);
            }
        };
    }};
}

pub(crate) use {debug, trace};
