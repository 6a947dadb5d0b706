//! Diagnostics routed to the RTT up channel.
//!
//! Only embedded builds with the `log` feature emit anything. Elsewhere the
//! arguments are still evaluated by reference so that call sites type-check
//! the same way on every target.

macro_rules! power_log {
    ($level:literal, $fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(all(feature = "log", target_os = "none"))]
        rtt_target::rprintln!(concat!("[", $level, "] ", $fmt) $(, $arg)*);
        #[cfg(not(all(feature = "log", target_os = "none")))]
        {
            $(let _ = &$arg;)*
        }
    }};
}

macro_rules! log_info {
    ($($t:tt)*) => {
        power_log!("INFO", $($t)*)
    };
}

macro_rules! log_warn {
    ($($t:tt)*) => {
        power_log!("WARN", $($t)*)
    };
}

/// Per-cycle tracing. Needs the `log-verbose` feature on top of `log`, as
/// it runs on every idle entry with interrupts disabled.
macro_rules! log_verbose {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{
        #[cfg(all(feature = "log-verbose", target_os = "none"))]
        power_log!("VERBOSE", $fmt $(, $arg)*);
        #[cfg(not(all(feature = "log-verbose", target_os = "none")))]
        {
            $(let _ = &$arg;)*
        }
    }};
}
