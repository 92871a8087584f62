//! # Lootrun Compiler
//!
//! Turns a raw lootrun recording into render-ready, chunk-indexed data.
//!
//! ## Pipeline
//!
//! ```text
//! RawRecording.path
//!     │
//!     ▼  split_into_runs       (teleports >= 32 blocks break the path)
//! [run, run, ...]
//!     │
//!     ▼  resample              (per-axis cubic spline, 1/sample_rate steps)
//! [p0, p1, p2, ...]
//!     │
//!     ▼  ColorPolicy           (static or rainbow)
//! [ColoredPoint, ...]
//!     │
//!     ▼  chunk walk            (new segment on chunk change or jump)
//! CompiledInstance { chunk -> segments, chunk -> chests, chunk -> notes }
//! ```
//!
//! ## Determinism
//!
//! Compilation is a pure function of the recording and the settings. All
//! buckets are ordered maps, so two compiles of the same input compare
//! equal and iterate identically.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod compiler;
pub mod instance;
pub mod palette;
pub mod path;
pub mod spline;
pub mod vertex;

pub use compiler::{display_name, CompileMode, CompileSettings, LootrunCompiler, UNSAVED_NAME};
pub use instance::{ColoredPoint, ColoredSegment, CompiledInstance, InstanceStats};
pub use palette::{ColorPolicy, RAINBOW_PALETTE};
pub use path::{resample, split_into_runs, DEFAULT_BREAK_DISTANCE, DEFAULT_SAMPLE_RATE};
pub use spline::{AxisSpline, Knot};
pub use vertex::LineVertex;
