pub mod blend;
pub mod composite;
pub mod pipeline;
pub mod pixel_buffer;
pub mod resize;
