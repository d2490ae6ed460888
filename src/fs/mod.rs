//! Filesystem primitives for lockwrite.

mod write;

pub use write::{FsWriter, RawWrite, write_with_mode};
