//! Diagnostics that go to the `log` crate when the `logging` feature is
//! enabled, and are discarded otherwise.

macro_rules! lemit {
    ($level:ident, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(feature = "logging")]
        ::log::$level!($fmt $(, $arg)*);
        #[cfg(not(feature = "logging"))]
        { $(let _ = &$arg;)* }
    }};
}

macro_rules! ltrace {
    ($($t:tt)*) => { lemit!(trace, $($t)*) };
}

macro_rules! ldebug {
    ($($t:tt)*) => { lemit!(debug, $($t)*) };
}

macro_rules! linfo {
    ($($t:tt)*) => { lemit!(info, $($t)*) };
}

macro_rules! lwarn {
    ($($t:tt)*) => { lemit!(warn, $($t)*) };
}
