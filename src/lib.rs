#![doc = r#"
becasso: photo style transfer with blend-mode compositing.

This crate runs a style model over a photo and blends the stylized result
back onto the original. It resizes the photo to the model's fixed input size,
invokes the model through the injectable `StyleModel` trait, and scales the
output back. The original is then composited over the stylized image on a
white canvas, using one of eleven blend modes at opacity `1 - mix`. It powers
the `becasso` CLI and can be embedded in your own Rust applications.

Stability
---------
The public library API is experimental and may evolve. Breaking changes can occur.

Quick start: stylize a file
---------------------------
```rust,no_run
use std::path::Path;
use becasso::{pipeline_from_params, process_file_to_path, BlendMode, MixCoefficient, StyleParams};

fn main() -> becasso::Result<()> {
    let params = StyleParams {
        blend_mode: BlendMode::SoftLight,
        mix: MixCoefficient::new(0.7)?,
        sidecar: true,
        ..StyleParams::default()
    };
    let pipeline = pipeline_from_params(&params);
    process_file_to_path(
        Path::new("/photos/harbour.jpg"),
        Path::new("/out/harbour.png"),
        &params,
        &pipeline,
    )
}
```

Bring your own model
--------------------
Any `StyleModel` can drive the pipeline. Models consume and produce
`PixelBuffer`s of 32-bit BGRA with straight alpha at their declared size.

```rust
use becasso::{
    Bitmap, BlendMode, FnModel, ImageSize, MixCoefficient, PixelBuffer, StylePipeline,
    StyleRequest,
};

fn main() -> becasso::Result<()> {
    let size = ImageSize::square(64);
    let invert = FnModel::new("invert", size, |input: &PixelBuffer| {
        let data = input
            .as_bytes()
            .chunks_exact(4)
            .flat_map(|px| [255 - px[0], 255 - px[1], 255 - px[2], px[3]])
            .collect();
        PixelBuffer::new(input.size(), data)
            .map_err(|e| becasso::InferenceError::Runtime(e.to_string()))
    });

    let pipeline = StylePipeline::new(invert);
    let photo = Bitmap::solid(120, 80, [200, 30, 30, 255])?;
    let out = pipeline.run(&StyleRequest::new(photo, BlendMode::Multiply, MixCoefficient::HALF))?;
    assert_eq!((out.width(), out.height()), (120, 80));
    Ok(())
}
```

Serialized rendering
--------------------
`PipelineRunner` owns a pipeline on a worker thread and renders one request at
a time, which is what an interactive slider needs.

```rust,no_run
use std::sync::Arc;
use becasso::{
    load_bitmap, pipeline_from_params, BlendMode, MixCoefficient, PipelineRunner, StyleParams,
    StyleRequest,
};

fn main() -> becasso::Result<()> {
    let photo = Arc::new(load_bitmap(std::path::Path::new("/photos/cat.png"))?);
    let mut runner = PipelineRunner::spawn(pipeline_from_params(&StyleParams::default()))?;
    let pending = runner.submit(StyleRequest::new(photo, BlendMode::Overlay, MixCoefficient::new(0.3)?))?;
    let rendered = pending.wait()?;
    println!("rendered {}x{}", rendered.width(), rendered.height());
    Ok(())
}
```

Error handling
--------------
All public functions return `becasso::Result<T>`. Use `Error::stage()` to tell
input, inference and output failures apart.

Useful modules
--------------
- [`api`]: high-level entry points for files, buffers and directories.
- [`core`]: bitmaps, resize, pixel buffers, blend modes, compositor, pipeline, runner.
- [`inference`]: the `StyleModel` trait, invoker and built-in filter model.
- [`io`]: image decoding, PNG/JPEG writers, metadata sidecars.
- [`types`]: shared enums and value types.
- [`error`]: crate-level `Error` and `Result`.
"#]

pub mod api;
pub mod core;
pub mod error;
pub mod inference;
pub mod io;
pub mod types;

// Curated public API surface
// Types
pub use core::bitmap::Bitmap;
pub use core::params::StyleParams;
pub use error::{Error, PipelineStage, Result};
pub use types::{
    AlphaMode, BlendMode, ChannelOrder, DEFAULT_MODEL_INPUT_SIZE, ImageSize, MixCoefficient,
    OutputFormat, PixelLayout, StylePreset,
};

// Pipeline pieces
pub use core::processing::composite::composite;
pub use core::processing::pipeline::{StylePipeline, StyleRequest};
pub use core::processing::pixel_buffer::{PixelBuffer, to_pixel_buffer};
pub use core::processing::resize::resize_bitmap;
pub use core::runner::{PendingRender, PipelineRunner};

// Models
pub use inference::{FilterStyleModel, FnModel, InferenceError, InferenceInvoker, StyleModel};

// I/O
pub use io::writers::{RenderMetadata, write_bitmap, write_metadata_sidecar};
pub use io::{decode_bitmap, load_bitmap};

// High-level API re-exports
pub use api::{
    BatchReport, pipeline_from_params, process_bitmap, process_directory_to_path,
    process_file_to_buffer, process_file_to_path,
};
