// THEORY:
// The `parallel_pipeline` module fans independent frames out over a small pool of
// tokio worker tasks. It is used when a backlog of frames (a directory of
// captures, a recorded session) has to be read as fast as the machine allows.
//
// Key architectural principles:
// 1.  **Round-Robin Dispatch**: One dispatcher task owns the inbound queue and hands
//     tasks to the workers in turn. Workers never share a queue.
// 2.  **One Reply per Frame**: Every task carries its own oneshot sender; the caller
//     awaits exactly the reply for its frame, so results can be collected in input
//     order no matter which worker finishes first.
// 3.  **Stateless Workers**: Each worker owns a clone of the `DisplayDecoder`. A
//     reading depends only on its own frame, so there is no state to hand from one
//     frame to the next.

use crate::core_modules::threshold::ThresholdBounds;
use crate::pipeline::{ConfigError, DecoderConfig, DisplayDecoder, FrameAnalysis};
use image::RgbImage;
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("the worker pool is no longer accepting frames")]
    QueueClosed,
    #[error("worker dropped frame {frame_id} without replying")]
    WorkerDropped { frame_id: u64 },
}

pub struct FrameTask {
    pub frame_id: u64,
    pub frame: RgbImage,
    pub bounds: ThresholdBounds,
    pub submitted: Instant,
    pub result_sender: oneshot::Sender<FrameAnalysis>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<FrameTask>,
    dispatcher: JoinHandle<()>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns the dispatcher and `worker_count` workers on the current runtime.
    pub fn new(decoder: DisplayDecoder, worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<FrameTask>();

        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<FrameTask>())
            .unzip();

        // Spawn dispatcher
        let dispatcher = tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                // A closed worker drops the task, and with it the reply sender.
                let _ = worker_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        });

        // Spawn workers
        let workers = worker_receivers
            .into_iter()
            .enumerate()
            .map(|(worker_id, mut worker_receiver)| {
                let decoder = decoder.clone();
                tokio::spawn(async move {
                    while let Some(task) = worker_receiver.recv().await {
                        let analysis = decoder.decode(&task.frame, &task.bounds);
                        debug!(
                            "worker {worker_id} decoded frame {} in {:?}: {}",
                            task.frame_id,
                            task.submitted.elapsed(),
                            analysis.reading
                        );
                        let _ = task.result_sender.send(analysis);
                    }
                })
            })
            .collect();

        Self {
            task_sender,
            dispatcher,
            workers,
        }
    }

    pub async fn process_frame(
        &self,
        frame_id: u64,
        frame: RgbImage,
        bounds: ThresholdBounds,
    ) -> Result<FrameAnalysis, BatchError> {
        let (result_sender, result_receiver) = oneshot::channel();

        let task = FrameTask {
            frame_id,
            frame,
            bounds,
            submitted: Instant::now(),
            result_sender,
        };

        self.task_sender
            .send(task)
            .map_err(|_| BatchError::QueueClosed)?;

        result_receiver
            .await
            .map_err(|_| BatchError::WorkerDropped { frame_id })
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Closes the queue and waits for every worker to drain.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        let _ = self.dispatcher.await;
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Decodes many frames concurrently on a `WorkerPool`.
pub struct BatchDecoder {
    worker_pool: WorkerPool,
    frame_counter: AtomicU64,
}

impl BatchDecoder {
    /// Must be called from within a tokio runtime. `workers = None` uses one worker
    /// per logical CPU.
    pub fn new(config: DecoderConfig, workers: Option<usize>) -> Result<Self, ConfigError> {
        let decoder = DisplayDecoder::new(config)?;
        let worker_count = workers.unwrap_or_else(num_cpus::get);
        Ok(Self {
            worker_pool: WorkerPool::new(decoder, worker_count),
            frame_counter: AtomicU64::new(0),
        })
    }

    pub fn worker_count(&self) -> usize {
        self.worker_pool.worker_count()
    }

    pub async fn decode(&self, frame: RgbImage, bounds: ThresholdBounds) -> Result<FrameAnalysis, BatchError> {
        let frame_id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        self.worker_pool.process_frame(frame_id, frame, bounds).await
    }

    /// Decodes every frame with the same bounds. Results keep the input order.
    pub async fn decode_all(
        &self,
        frames: Vec<RgbImage>,
        bounds: ThresholdBounds,
    ) -> Result<Vec<FrameAnalysis>, BatchError> {
        let pending = frames.into_iter().map(|frame| self.decode(frame, bounds));
        futures::future::try_join_all(pending).await
    }

    pub async fn shutdown(self) {
        self.worker_pool.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::reading::{Reading, UnreadableCause};
    use image::Rgb;

    fn red_bounds() -> ThresholdBounds {
        ThresholdBounds::from_values([0, 100, 100, 10, 255, 255])
    }

    #[tokio::test]
    async fn zero_workers_still_gets_one() {
        let batch = BatchDecoder::new(DecoderConfig::default(), Some(0)).unwrap();
        assert_eq!(batch.worker_count(), 1);
        batch.shutdown().await;
    }

    #[tokio::test]
    async fn default_pool_matches_cpu_count() {
        let batch = BatchDecoder::new(DecoderConfig::default(), None).unwrap();
        assert_eq!(batch.worker_count(), num_cpus::get());
        batch.shutdown().await;
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_spawning() {
        let config = DecoderConfig {
            spacing_divisor: 0,
            ..DecoderConfig::default()
        };
        assert!(matches!(
            BatchDecoder::new(config, Some(2)),
            Err(ConfigError::SpacingDivisor)
        ));
    }

    #[tokio::test]
    async fn replies_follow_input_order() {
        let batch = BatchDecoder::new(DecoderConfig::default(), Some(3)).unwrap();
        // Frames of different sizes so each reply is recognisable.
        let frames: Vec<RgbImage> = (1..=7).map(|i| RgbImage::new(i * 10, i * 5)).collect();

        let results = batch.decode_all(frames, red_bounds()).await.unwrap();

        let sizes: Vec<(u32, u32)> = results.iter().map(|a| a.mask.dimensions()).collect();
        assert_eq!(sizes, (1..=7).map(|i| (i * 10, i * 5)).collect::<Vec<_>>());
        assert!(results
            .iter()
            .all(|a| a.reading == Reading::Unreadable(UnreadableCause::NoDisplayFound)));
        batch.shutdown().await;
    }

    #[tokio::test]
    async fn pool_agrees_with_the_single_frame_decoder() {
        let mut frame = RgbImage::new(40, 40);
        frame.put_pixel(3, 3, Rgb([255, 0, 0]));
        frame.put_pixel(30, 35, Rgb([255, 0, 0]));
        let decoder = DisplayDecoder::new(DecoderConfig::default()).unwrap();
        let expected = decoder.decode(&frame, &red_bounds());

        let batch = BatchDecoder::new(DecoderConfig::default(), Some(2)).unwrap();
        let analysis = batch.decode(frame, red_bounds()).await.unwrap();

        assert_eq!(analysis.reading, expected.reading);
        assert_eq!(analysis.symbols, expected.symbols);
        assert_eq!(analysis.mask, expected.mask);
        batch.shutdown().await;
    }
}
