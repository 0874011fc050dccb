use std::sync::Arc;

use tracing::{debug, info};

use crate::core::bitmap::Bitmap;
use crate::core::processing::composite::composite;
use crate::core::processing::pixel_buffer::to_pixel_buffer;
use crate::core::processing::resize::resize_bitmap;
use crate::error::{Error, Result};
use crate::inference::{InferenceInvoker, StyleModel};
use crate::types::{BlendMode, ImageSize, MixCoefficient};

/// One render: the original photo plus the compositing choices for it.
#[derive(Debug, Clone)]
pub struct StyleRequest {
    pub original: Arc<Bitmap>,
    pub blend_mode: BlendMode,
    pub mix: MixCoefficient,
}

impl StyleRequest {
    pub fn new(original: impl Into<Arc<Bitmap>>, blend_mode: BlendMode, mix: MixCoefficient) -> Self {
        Self {
            original: original.into(),
            blend_mode,
            mix,
        }
    }
}

/// Resize -> infer -> resize back -> composite, around an injected model.
pub struct StylePipeline<M> {
    invoker: InferenceInvoker<M>,
}

impl<M: StyleModel> StylePipeline<M> {
    pub fn new(model: M) -> Self {
        Self {
            invoker: InferenceInvoker::new(model),
        }
    }

    pub fn model(&self) -> &M {
        self.invoker.model()
    }

    pub fn model_input_size(&self) -> ImageSize {
        self.invoker.input_size()
    }

    /// Run the model over `original` and return the stylized image at the
    /// original's size.
    pub fn stylize(&self, original: &Bitmap) -> Result<Bitmap> {
        let input = to_pixel_buffer(original, self.invoker.input_size())?;
        let output = self.invoker.invoke(&input)?;
        let stylized = output.to_bitmap()?;
        let restored = resize_bitmap(&stylized, original.size()).map_err(|e| match e {
            Error::Resize(msg) => Error::BufferConversion(msg),
            other => other,
        })?;
        debug!(
            "Stylized {} via {} model pass",
            original.size(),
            self.invoker.input_size()
        );
        Ok(restored)
    }

    pub fn composite(
        &self,
        original: &Bitmap,
        stylized: &Bitmap,
        blend_mode: BlendMode,
        mix: MixCoefficient,
    ) -> Result<Bitmap> {
        composite(original, stylized, blend_mode, mix)
    }

    /// Full render for one request. On error the caller's original is untouched.
    pub fn run(&self, request: &StyleRequest) -> Result<Bitmap> {
        info!(
            "Rendering {} with model '{}', blend mode {}, mix {}",
            request.original.size(),
            self.invoker.model().name(),
            request.blend_mode,
            request.mix
        );
        let stylized = self.stylize(&request.original)?;
        self.composite(&request.original, &stylized, request.blend_mode, request.mix)
    }
}
