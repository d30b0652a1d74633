// src/crawl/pool.rs
// =============================================================================
// A fixed-size pool of crawl workers that lives for a whole crawl.
//
// `size` tokio tasks share one job channel. Each job carries its own oneshot
// reply channel, so run_wave() can wait for exactly the jobs it sent: that
// wait is the barrier between waves.
//
//   scheduler --jobs--> [worker 0 .. worker N-1] --replies--> scheduler
//
// Dropping the job sender (shutdown) makes every worker's recv() return None,
// and the workers exit.
// =============================================================================

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::worker::{crawl_page, PageOutcome, WorkerContext};
use crate::error::CrawlError;

struct Job {
    url: String,
    depth: usize,
    reply: oneshot::Sender<Result<PageOutcome, CrawlError>>,
}

pub struct WorkerPool {
    jobs: Option<mpsc::UnboundedSender<Job>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    pub fn spawn(ctx: Arc<WorkerContext>, size: usize) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let mut handles = Vec::with_capacity(size);

        for worker_id in 0..size {
            let rx = rx.clone();
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                loop {
                    let job = {
                        let mut rx = rx.lock().await;
                        rx.recv().await
                    };
                    let Some(job) = job else {
                        break; // Channel closed, pool is shutting down
                    };

                    let result = crawl_page(&ctx, &job.url, job.depth)
                        .await
                        .map_err(CrawlError::from);
                    // The scheduler only goes away after collecting every reply
                    let _ = job.reply.send(result);
                }
                debug!(worker_id, "worker stopped");
            }));
        }

        Self {
            jobs: Some(tx),
            handles,
        }
    }

    // Runs one wave: every URL is handed to the pool at `depth`, and this
    // returns only when all of them have finished.
    pub async fn run_wave(
        &self,
        urls: Vec<String>,
        depth: usize,
    ) -> Vec<(String, Result<PageOutcome, CrawlError>)> {
        let mut pending = Vec::with_capacity(urls.len());
        for url in urls {
            let (reply, rx) = oneshot::channel();
            if let Some(jobs) = &self.jobs {
                // If every worker is gone the job is dropped along with its
                // reply sender, which shows up below as WorkerLost
                let _ = jobs.send(Job {
                    url: url.clone(),
                    depth,
                    reply,
                });
            }
            pending.push((url, rx));
        }

        join_all(pending.into_iter().map(|(url, rx)| async move {
            match rx.await {
                Ok(result) => (url, result),
                Err(_) => {
                    let err = CrawlError::WorkerLost { url: url.clone() };
                    (url, Err(err))
                }
            }
        }))
        .await
    }

    // Closes the job channel and waits for every worker to exit
    pub async fn shutdown(mut self) {
        self.jobs.take();
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "crawl worker panicked");
            }
        }
    }
}
