//! Core building blocks: the immutable `Bitmap`, resize and pixel-buffer
//! adapters, blend functions, the compositor, the style pipeline and its
//! serialized runner. The high-level `api` module is built on these.
pub mod bitmap;
pub mod params;
pub mod processing;
pub mod runner;
