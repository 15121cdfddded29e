//! Internal logging helpers for structured packscan events.

/// Single logging target for packscan.
pub(crate) const LOG_TARGET: &str = "packscan";

macro_rules! packscan_log {
    ($level:expr, $event:expr, $fmt:expr $(, $args:expr)* $(,)?) => {{
        if log::log_enabled!($level) {
            log::log!(
                target: crate::logging::LOG_TARGET,
                $level,
                "event={} {}",
                $event,
                format_args!($fmt $(, $args)*)
            );
        }
    }};
}

pub(crate) use packscan_log;
