//! Logging shims.
//!
//! Routes the crate's log statements to `defmt` or `log` depending on the
//! enabled feature. With neither feature the statements compile away, but
//! their arguments are still borrowed so callers don't trip unused warnings.

#![allow(unused_macros)]

cfg_if::cfg_if! {
    if #[cfg(feature = "defmt")] {
        macro_rules! debug {
            ($($arg:tt)*) => { ::defmt::debug!($($arg)*) };
        }
        macro_rules! info {
            ($($arg:tt)*) => { ::defmt::info!($($arg)*) };
        }
        macro_rules! warn {
            ($($arg:tt)*) => { ::defmt::warn!($($arg)*) };
        }
        macro_rules! error {
            ($($arg:tt)*) => { ::defmt::error!($($arg)*) };
        }
    } else if #[cfg(feature = "log")] {
        macro_rules! debug {
            ($($arg:tt)*) => { ::log::debug!($($arg)*) };
        }
        macro_rules! info {
            ($($arg:tt)*) => { ::log::info!($($arg)*) };
        }
        macro_rules! warn {
            ($($arg:tt)*) => { ::log::warn!($($arg)*) };
        }
        macro_rules! error {
            ($($arg:tt)*) => { ::log::error!($($arg)*) };
        }
    } else {
        macro_rules! debug {
            ($s:literal $(, $x:expr)* $(,)?) => {{
                let _ = ($( & $x ),*);
            }};
        }
        macro_rules! info {
            ($s:literal $(, $x:expr)* $(,)?) => {{
                let _ = ($( & $x ),*);
            }};
        }
        macro_rules! warn {
            ($s:literal $(, $x:expr)* $(,)?) => {{
                let _ = ($( & $x ),*);
            }};
        }
        macro_rules! error {
            ($s:literal $(, $x:expr)* $(,)?) => {{
                let _ = ($( & $x ),*);
            }};
        }
    }
}
