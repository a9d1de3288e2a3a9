//! UTF-8/UTF-16 position tracking and conversion for journal files.
//!
//! The parser works in byte offsets; editors speak (line, UTF-16 code unit)
//! pairs. This crate is the bridge: [`Span`] and [`Position`] carry byte
//! offsets produced by the lexer, [`LineIndex`] maps them to wire positions,
//! and [`WirePosition`]/[`WireRange`] are the serialized editor-facing units.

#![warn(clippy::all)]

mod convert;
mod line_index;
mod position;
mod span;
mod wire;

pub use convert::{offset_to_utf16, utf16_to_offset};
pub use line_index::LineIndex;
pub use position::{Position, Range};
pub use span::Span;
pub use wire::{WirePosition, WireRange};
