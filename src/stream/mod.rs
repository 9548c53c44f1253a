// src/stream/mod.rs

//! File streams and the stages piped through them.
//!
//! A [`FileStream`] is lazy: it records where files come from and which
//! stages they pass through, and only touches the filesystem when drained.

pub mod dest;
pub mod file;
pub mod pump;
pub mod source;
pub mod transform;

pub use dest::dest_writer;
pub use file::VirtualFile;
pub use pump::{pump, PumpCallback};
pub use source::FileStream;
pub use transform::Transform;
