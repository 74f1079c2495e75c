pub mod compile;
pub mod harness;
pub mod link;

mod clean;
mod core;
mod feedback;

pub use clean::{CleanReport, clean, distclean};
pub use core::{COMPILE_COMMANDS, build, build_profile};
pub use feedback::FeedbackAnalyzer;
pub use test::{Tally, TestOutcome, TestSummary, Verdict, run_binaries, run_tests};
