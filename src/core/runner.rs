//! Serialized pipeline runner.
//!
//! Presentation code sends one `StyleRequest` per completed gesture. A single
//! worker thread owns the pipeline and renders requests strictly in
//! submission order, so two renders never overlap. Each result travels back on
//! its own reply channel instead of through shared display state.
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::core::bitmap::Bitmap;
use crate::core::processing::pipeline::{StylePipeline, StyleRequest};
use crate::error::{Error, Result};
use crate::inference::StyleModel;

struct Job {
    id: u64,
    request: StyleRequest,
    reply: Sender<Result<Bitmap>>,
}

/// Handle to a render that has been queued on a `PipelineRunner`.
#[derive(Debug)]
pub struct PendingRender {
    id: u64,
    receiver: Receiver<Result<Bitmap>>,
}

impl PendingRender {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Block until the render finishes.
    pub fn wait(self) -> Result<Bitmap> {
        self.receiver.recv().map_err(|_| Error::RunnerClosed)?
    }

    /// Non-blocking poll: `None` while the render is still queued or running.
    pub fn try_result(&self) -> Option<Result<Bitmap>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(Error::RunnerClosed)),
        }
    }
}

pub struct PipelineRunner {
    sender: Option<Sender<Job>>,
    worker: Option<JoinHandle<()>>,
    next_id: u64,
}

impl PipelineRunner {
    /// Move `pipeline` onto a dedicated worker thread.
    pub fn spawn<M>(pipeline: StylePipeline<M>) -> Result<Self>
    where
        M: StyleModel + 'static,
    {
        let (sender, receiver) = mpsc::channel::<Job>();
        let worker = thread::Builder::new()
            .name("becasso-pipeline".to_string())
            .spawn(move || {
                for job in receiver {
                    debug!("Render #{} started", job.id);
                    let result = pipeline.run(&job.request);
                    if let Err(e) = &result {
                        warn!("Render #{} failed: {}", job.id, e);
                    }
                    if job.reply.send(result).is_err() {
                        debug!("Render #{} finished after its caller went away", job.id);
                    }
                }
                info!("Pipeline runner stopped");
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            next_id: 0,
        })
    }

    /// Queue a render. Returns immediately; use the handle to collect the result.
    pub fn submit(&mut self, request: StyleRequest) -> Result<PendingRender> {
        let sender = self.sender.as_ref().ok_or(Error::RunnerClosed)?;
        self.next_id += 1;
        let id = self.next_id;
        let (reply, receiver) = mpsc::channel();
        sender
            .send(Job { id, request, reply })
            .map_err(|_| Error::RunnerClosed)?;
        debug!("Render #{} queued", id);
        Ok(PendingRender { id, receiver })
    }

    /// Submit and block for the result.
    pub fn render(&mut self, request: StyleRequest) -> Result<Bitmap> {
        self.submit(request)?.wait()
    }

    /// Stop accepting work, finish queued renders and join the worker.
    pub fn shutdown(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Pipeline worker panicked");
            }
        }
    }
}

impl Drop for PipelineRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::processing::pixel_buffer::PixelBuffer;
    use crate::inference::{FnModel, InferenceError};
    use crate::types::{BlendMode, ImageSize, MixCoefficient};
    use std::sync::Arc;

    fn echo_pipeline() -> StylePipeline<impl StyleModel + 'static> {
        StylePipeline::new(FnModel::new(
            "echo",
            ImageSize::square(8),
            |b: &PixelBuffer| Ok(b.clone()),
        ))
    }

    #[test]
    fn results_arrive_in_submission_order() {
        let mut runner = PipelineRunner::spawn(echo_pipeline()).unwrap();
        let pending: Vec<PendingRender> = (0..5u8)
            .map(|i| {
                let bmp = Bitmap::solid(8, 8, [i * 40, 0, 0, 255]).unwrap();
                runner
                    .submit(StyleRequest::new(bmp, BlendMode::Normal, MixCoefficient::ORIGINAL))
                    .unwrap()
            })
            .collect();

        let ids: Vec<u64> = pending.iter().map(PendingRender::id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        for (i, p) in pending.into_iter().enumerate() {
            let out = p.wait().unwrap();
            assert_eq!(out.rgba_at(0, 0), Some([i as u8 * 40, 0, 0, 255]));
        }
    }

    #[test]
    fn failing_render_does_not_poison_runner() {
        let model = FnModel::new("picky", ImageSize::square(4), |b: &PixelBuffer| {
            if b.as_bytes()[2] == 255 {
                Err(InferenceError::InvalidInput("too red".into()))
            } else {
                Ok(b.clone())
            }
        });
        let mut runner = PipelineRunner::spawn(StylePipeline::new(model)).unwrap();
        let red = Arc::new(Bitmap::solid(4, 4, [255, 0, 0, 255]).unwrap());
        let green = Arc::new(Bitmap::solid(4, 4, [0, 255, 0, 255]).unwrap());

        let err = runner
            .render(StyleRequest::new(red, BlendMode::Normal, MixCoefficient::HALF))
            .unwrap_err();
        assert!(matches!(err, Error::Inference(_)));

        let ok = runner
            .render(StyleRequest::new(green, BlendMode::Normal, MixCoefficient::HALF))
            .unwrap();
        assert_eq!(ok.rgba_at(0, 0), Some([0, 255, 0, 255]));
    }

    #[test]
    fn submit_after_shutdown_is_rejected() {
        let mut runner = PipelineRunner::spawn(echo_pipeline()).unwrap();
        runner.shutdown();
        let bmp = Bitmap::solid(8, 8, [0, 0, 0, 255]).unwrap();
        assert!(matches!(
            runner.submit(StyleRequest::new(bmp, BlendMode::Normal, MixCoefficient::HALF)),
            Err(Error::RunnerClosed)
        ));
    }

    #[test]
    fn try_result_eventually_yields() {
        let mut runner = PipelineRunner::spawn(echo_pipeline()).unwrap();
        let bmp = Bitmap::solid(8, 8, [9, 9, 9, 255]).unwrap();
        let pending = runner
            .submit(StyleRequest::new(bmp, BlendMode::Darken, MixCoefficient::HALF))
            .unwrap();
        runner.shutdown();
        let result = pending.try_result().expect("worker drained the queue before joining");
        assert_eq!(result.unwrap().size(), ImageSize::square(8));
    }
}
