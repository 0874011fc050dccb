//! Style model boundary.
//!
//! A style model is an opaque `PixelBuffer -> PixelBuffer` function with a
//! fixed input size and a fixed output size. `InferenceInvoker` enforces that
//! contract around any `StyleModel` and turns every failure into a typed error.
use std::time::Instant;

use tracing::{debug, error};

use crate::core::processing::pixel_buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::types::ImageSize;

pub mod filter;

pub use filter::FilterStyleModel;

/// Failure reported by a style model implementation.
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("model rejected input: {0}")]
    InvalidInput(String),

    #[error("model runtime failure: {0}")]
    Runtime(String),
}

/// A pretrained, fixed-topology style-transfer network (or a stand-in for one).
pub trait StyleModel: Send {
    /// Short human-readable name, used in logs and metadata sidecars.
    fn name(&self) -> &str;

    fn input_size(&self) -> ImageSize;

    fn output_size(&self) -> ImageSize {
        self.input_size()
    }

    fn predict(&self, input: &PixelBuffer) -> std::result::Result<PixelBuffer, InferenceError>;
}

impl<M: StyleModel + ?Sized> StyleModel for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_size(&self) -> ImageSize {
        (**self).input_size()
    }

    fn output_size(&self) -> ImageSize {
        (**self).output_size()
    }

    fn predict(&self, input: &PixelBuffer) -> std::result::Result<PixelBuffer, InferenceError> {
        (**self).predict(input)
    }
}

/// Adapts a closure into a `StyleModel`. Handy for injecting stubs.
pub struct FnModel<F> {
    name: String,
    size: ImageSize,
    f: F,
}

impl<F> FnModel<F>
where
    F: Fn(&PixelBuffer) -> std::result::Result<PixelBuffer, InferenceError> + Send,
{
    pub fn new(name: impl Into<String>, size: ImageSize, f: F) -> Self {
        Self {
            name: name.into(),
            size,
            f,
        }
    }
}

impl<F> StyleModel for FnModel<F>
where
    F: Fn(&PixelBuffer) -> std::result::Result<PixelBuffer, InferenceError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn input_size(&self) -> ImageSize {
        self.size
    }

    fn predict(&self, input: &PixelBuffer) -> std::result::Result<PixelBuffer, InferenceError> {
        (self.f)(input)
    }
}

/// Checks a model's size contract on both sides of every call.
pub struct InferenceInvoker<M> {
    model: M,
}

impl<M: StyleModel> InferenceInvoker<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn input_size(&self) -> ImageSize {
        self.model.input_size()
    }

    /// Run the model synchronously on a buffer of exactly `input_size()`.
    pub fn invoke(&self, input: &PixelBuffer) -> Result<PixelBuffer> {
        let expected = self.model.input_size();
        if input.size() != expected {
            return Err(Error::ModelInputMismatch {
                expected,
                actual: input.size(),
            });
        }

        let start = Instant::now();
        let output = self.model.predict(input).map_err(|e| {
            error!("Model '{}' failed: {}", self.model.name(), e);
            Error::Inference(e)
        })?;
        debug!(
            "Model '{}' ran on {} in {:.2?}",
            self.model.name(),
            expected,
            start.elapsed()
        );

        let declared = self.model.output_size();
        if output.size() != declared {
            return Err(Error::BufferConversion(format!(
                "model '{}' produced {} output, declared {}",
                self.model.name(),
                output.size(),
                declared
            )));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(size: ImageSize, bgra: [u8; 4]) -> PixelBuffer {
        let data = bgra.repeat(size.width as usize * size.height as usize);
        PixelBuffer::new(size, data).unwrap()
    }

    #[test]
    fn passes_output_through() {
        let size = ImageSize::square(4);
        let model = FnModel::new("blue", size, move |_: &PixelBuffer| Ok(buffer(size, [255, 0, 0, 255])));
        let invoker = InferenceInvoker::new(model);
        let out = invoker.invoke(&buffer(size, [0, 0, 0, 255])).unwrap();
        assert_eq!(&out.as_bytes()[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn rejects_wrong_input_size() {
        let model = FnModel::new("id", ImageSize::square(4), |b: &PixelBuffer| Ok(b.clone()));
        let invoker = InferenceInvoker::new(model);
        let err = invoker
            .invoke(&buffer(ImageSize::square(3), [0; 4]))
            .unwrap_err();
        assert!(matches!(err, Error::ModelInputMismatch { .. }));
    }

    #[test]
    fn model_failure_is_not_swallowed() {
        let model = FnModel::new("broken", ImageSize::square(2), |_: &PixelBuffer| {
            Err(InferenceError::Runtime("device lost".into()))
        });
        let invoker = InferenceInvoker::new(model);
        let err = invoker
            .invoke(&buffer(ImageSize::square(2), [0; 4]))
            .unwrap_err();
        assert!(matches!(err, Error::Inference(InferenceError::Runtime(_))));
        assert!(err.to_string().contains("device lost"));
    }

    #[test]
    fn undeclared_output_size_is_a_conversion_error() {
        let model = FnModel::new("shrinks", ImageSize::square(4), |_: &PixelBuffer| {
            Ok(buffer(ImageSize::square(2), [0; 4]))
        });
        let invoker = InferenceInvoker::new(model);
        let err = invoker
            .invoke(&buffer(ImageSize::square(4), [0; 4]))
            .unwrap_err();
        assert!(matches!(err, Error::BufferConversion(_)));
    }

    #[test]
    fn boxed_models_are_models() {
        let model: Box<dyn StyleModel> = Box::new(FnModel::new(
            "id",
            ImageSize::square(2),
            |b: &PixelBuffer| Ok(b.clone()),
        ));
        let invoker = InferenceInvoker::new(model);
        assert_eq!(invoker.input_size(), ImageSize::square(2));
        assert_eq!(invoker.model().name(), "id");
    }
}
