//! Program logging.
//!
//! `trace!` forwards to `pinocchio_log::log!` when the `log` feature is on.
//! Without it the arguments are still evaluated by reference, so stripped
//! builds compile without unused-variable noise.

macro_rules! trace {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "log")]
        ::pinocchio_log::log!($fmt $(, $arg)*);
        #[cfg(not(feature = "log"))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

pub(crate) use trace;
