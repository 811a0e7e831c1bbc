//! Standard-output/error redirection into an in-process log buffer
//! (`ConsoleCapture`), and the pure formatter that turns buffered lines
//! into styled rows above the live region (`LogLane`).

pub mod capture;
pub mod lane;

pub use capture::{ConsoleCapture, LogLine, Source};
pub use lane::{LogLaneConfig, format_rows};
