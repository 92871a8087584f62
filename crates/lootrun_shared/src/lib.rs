//! # Lootrun Shared
//!
//! Common types used by the recorder, the compiler and the storage layer.
//!
//! ## Contents
//!
//! - `Point3` / `BlockPos`: world positions (continuous and block-aligned)
//! - `ChunkKey`: packed 16x16 chunk coordinate used as a spatial bucket key
//! - `Argb`: 32-bit packed color
//! - `RawRecording` / `Note`: the editable, uncompiled lootrun
//!
//! ## CRITICAL RULE
//!
//! This crate holds plain data. It must never grow file I/O or
//! compilation logic; those live in `lootrun_session` and
//! `lootrun_compiler`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod chunk;
pub mod color;
pub mod math;
pub mod recording;

pub use chunk::{ChunkKey, CHUNK_SHIFT, CHUNK_SIZE};
pub use color::Argb;
pub use math::{BlockPos, Point3};
pub use recording::{Note, RawRecording};
