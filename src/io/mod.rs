//! I/O layer: decoding photos into `Bitmap`s (`reader`) and `writers` for
//! PNG/JPEG outputs plus JSON metadata sidecars.
pub mod reader;
pub use reader::{decode_bitmap, load_bitmap};

pub mod writers;
