//! Session orchestration: one worker, latest-only backpressure.
//!
//! The analyzer itself is a pure frame-in/result-out component; this module
//! owns the dedicated worker thread that runs it sequentially and the
//! single-slot mailbox that drops stale frames instead of queueing them.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, warn};

use crate::analyzer::{AnalysisResult, FrameAnalyzer};
use crate::config::PipelineConfig;
use crate::frame::NativeFrame;

struct MailboxState {
    frame: Option<NativeFrame>,
    stopping: bool,
}

struct Mailbox {
    state: Mutex<MailboxState>,
    available: Condvar,
}

/// A running capture session.
///
/// Results reach the listener on the worker thread, in analysis order, one
/// per successfully analyzed frame; dropped frames produce no result. The
/// lifecycle is enforced by ownership: `stop` consumes the session, so no
/// frame can be submitted after it.
pub struct AnalysisSession {
    mailbox: Arc<Mailbox>,
    worker: JoinHandle<usize>,
}

impl AnalysisSession {
    /// Spawns the analysis worker and starts accepting frames.
    pub fn start<F>(config: PipelineConfig, mut listener: F) -> Self
    where
        F: FnMut(&AnalysisResult<'_>) + Send + 'static,
    {
        let mailbox = Arc::new(Mailbox {
            state: Mutex::new(MailboxState {
                frame: None,
                stopping: false,
            }),
            available: Condvar::new(),
        });

        let worker = thread::Builder::new()
            .name("domino-analysis".to_string())
            .spawn({
                let mailbox = Arc::clone(&mailbox);
                move || {
                    let mut analyzer = FrameAnalyzer::new(config);
                    let mut committed = 0usize;

                    loop {
                        let frame = {
                            let mut state = mailbox.state.lock();
                            loop {
                                if let Some(frame) = state.frame.take() {
                                    break frame;
                                }
                                if state.stopping {
                                    return committed;
                                }
                                mailbox.available.wait(&mut state);
                            }
                        };

                        // One synchronous unit of work per frame; a failed
                        // frame is skipped and the session keeps going.
                        match analyzer.analyze(&frame) {
                            Ok(result) => {
                                committed = result.pip_count;
                                listener(&result);
                            }
                            Err(err) => {
                                warn!(error = %err, "frame analysis failed, skipping frame");
                            }
                        }
                    }
                }
            })
            .expect("failed to spawn analysis worker");

        AnalysisSession { mailbox, worker }
    }

    /// Hands a frame to the worker.
    ///
    /// If the worker is still busy with the previous frame, the frame
    /// waiting in the slot is replaced, so analysis always runs on the
    /// most recent available frame.
    pub fn submit(&self, frame: NativeFrame) {
        let mut state = self.mailbox.state.lock();
        if state.frame.replace(frame).is_some() {
            debug!("dropped stale frame under backpressure");
        }
        self.mailbox.available.notify_one();
    }

    /// Drains the pending frame, joins the worker, and returns the final
    /// committed pip count: the count from the last delivered result.
    pub fn stop(self) -> usize {
        {
            let mut state = self.mailbox.state.lock();
            state.stopping = true;
        }
        self.mailbox.available.notify_one();

        self.worker.join().unwrap_or_else(|_| {
            error!("analysis worker panicked");
            0
        })
    }
}
