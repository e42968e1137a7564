//! Simulator engine
//!
//! A single tokio task owns the `LabSession`. Callers talk to it through a
//! `LabHandle`; every mutation, including deferred command output, is applied
//! by that task. Deferred work sits in a queue ordered by deadline and then by
//! issue order, so two outputs due at the same instant land in the order the
//! commands were typed.

use super::latency::Latency;
use super::{LabSession, LabSnapshot, Response, Submission};
use crate::data::LabStatus;
use crate::LabError;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant};
use tracing::{debug, info, info_span, warn, Instrument};

/// Notable things observers may want to react to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabEvent {
    StatusChanged(LabStatus),
    ObjectiveCompleted { id: String, description: String },
    AllObjectivesComplete,
    Finished { elapsed_secs: i64 },
}

type Reply = oneshot::Sender<Result<(), LabError>>;

enum Request {
    Execute { input: String, reply: Reply },
    Reset { reply: Reply },
    Stop { reply: Reply },
    Finish { reply: Reply },
}

/// Cheap, cloneable entry point into a running lab
#[derive(Debug, Clone)]
pub struct LabHandle {
    requests: mpsc::UnboundedSender<Request>,
    state: watch::Receiver<LabSnapshot>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Execute { input, .. } => write!(f, "Execute({:?})", input),
            Request::Reset { .. } => write!(f, "Reset"),
            Request::Stop { .. } => write!(f, "Stop"),
            Request::Finish { .. } => write!(f, "Finish"),
        }
    }
}

impl LabHandle {
    /// Submit a command line. Returns once the prompt has been echoed; the
    /// output itself shows up after the simulated delay.
    pub async fn execute(&self, input: impl Into<String>) -> Result<(), LabError> {
        let input = input.into();
        self.call(|reply| Request::Execute { input, reply }).await
    }

    pub async fn reset(&self) -> Result<(), LabError> {
        self.call(|reply| Request::Reset { reply }).await
    }

    pub async fn stop(&self) -> Result<(), LabError> {
        self.call(|reply| Request::Stop { reply }).await
    }

    /// Confirm completion; fails unless every objective is done
    pub async fn finish(&self) -> Result<(), LabError> {
        self.call(|reply| Request::Finish { reply }).await
    }

    /// Latest published state. Reports `Error` if the engine died before the
    /// lab was completed.
    pub fn snapshot(&self) -> LabSnapshot {
        let mut snapshot = self.state.borrow().clone();
        if self.state.has_changed().is_err() && snapshot.status != LabStatus::Completed {
            snapshot.status = LabStatus::Error;
        }
        snapshot
    }

    pub fn status(&self) -> LabStatus {
        self.snapshot().status
    }

    pub fn all_objectives_complete(&self) -> bool {
        self.state.borrow().all_objectives_complete()
    }

    /// Wait for the next published state
    pub async fn changed(&mut self) -> Result<(), LabError> {
        self.state.changed().await.map_err(|_| LabError::EngineClosed)
    }

    async fn call(&self, build: impl FnOnce(Reply) -> Request) -> Result<(), LabError> {
        let (reply, rx) = oneshot::channel();
        self.requests
            .send(build(reply))
            .map_err(|_| LabError::EngineClosed)?;
        rx.await.map_err(|_| LabError::EngineClosed)?
    }
}

/// Start a lab session on the current tokio runtime
pub fn spawn<L: Latency>(
    lab_id: &str,
    prompt: &str,
    latency: L,
) -> (LabHandle, mpsc::UnboundedReceiver<LabEvent>) {
    let session = LabSession::new(lab_id, prompt);
    let span = info_span!("lab", session = %session.id.short(), lab = %session.lab_id);

    let (requests_tx, requests_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(session.snapshot());

    let engine = Engine {
        last_status: session.status,
        session,
        latency,
        pending: BinaryHeap::new(),
        next_seq: 0,
        requests: requests_rx,
        state: state_tx,
        events: events_tx,
    };
    tokio::spawn(engine.run().instrument(span));

    let handle = LabHandle {
        requests: requests_tx,
        state: state_rx,
    };
    (handle, events_rx)
}

#[derive(Debug)]
enum Work {
    Boot { epoch: u64 },
    Respond(Response),
}

#[derive(Debug)]
struct Pending {
    due: Instant,
    seq: u64,
    work: Work,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due.cmp(&other.due).then(self.seq.cmp(&other.seq))
    }
}

struct Engine<L> {
    session: LabSession,
    latency: L,
    pending: BinaryHeap<Reverse<Pending>>,
    next_seq: u64,
    last_status: LabStatus,
    requests: mpsc::UnboundedReceiver<Request>,
    state: watch::Sender<LabSnapshot>,
    events: mpsc::UnboundedSender<LabEvent>,
}

impl<L: Latency> Engine<L> {
    async fn run(mut self) {
        info!(title = self.session.lab.title, "lab session started");
        let epoch = self.session.boot_epoch();
        self.schedule_boot(epoch);
        self.publish();

        loop {
            let next_due = self.pending.peek().map(|Reverse(p)| p.due);

            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.handle(request),
                    None => break,
                },
                _ = wait_until(next_due) => self.fire_due(),
            }
        }

        info!(pending = self.pending.len(), "all handles dropped, lab session closed");
    }

    fn handle(&mut self, request: Request) {
        debug!(?request, "request received");
        let (result, reply) = match request {
            Request::Execute { input, reply } => (self.execute(&input), reply),
            Request::Reset { reply } => {
                info!("lab reset");
                let epoch = self.session.reset();
                self.schedule_boot(epoch);
                (Ok(()), reply)
            }
            Request::Stop { reply } => {
                let result = self.session.stop();
                match &result {
                    Ok(()) => info!("lab stopped"),
                    Err(err) => warn!(%err, "stop rejected"),
                }
                (result, reply)
            }
            Request::Finish { reply } => {
                let result = self.session.finish();
                match &result {
                    Ok(()) => {
                        let elapsed_secs = self.session.elapsed_secs();
                        info!(elapsed_secs, "lab finished");
                        self.emit(LabEvent::Finished { elapsed_secs });
                    }
                    Err(err) => warn!(%err, "finish rejected"),
                }
                (result, reply)
            }
        };

        // Callers read the snapshot as soon as the reply lands.
        self.publish();
        let _ = reply.send(result);
    }

    fn execute(&mut self, input: &str) -> Result<(), LabError> {
        match self.session.submit(input) {
            Ok(Submission::Cleared) => {
                debug!("transcript cleared");
                Ok(())
            }
            Ok(Submission::Blank) => Ok(()),
            Ok(Submission::Deferred(response)) => {
                let delay = self.latency.response_delay();
                debug!(command = %response.command, delay_ms = delay.as_millis() as u64, "command scheduled");
                self.schedule(delay, Work::Respond(response));
                Ok(())
            }
            Err(err) => {
                warn!(%err, input, "command rejected");
                Err(err)
            }
        }
    }

    fn schedule_boot(&mut self, epoch: u64) {
        let delay = self.latency.boot_delay();
        self.schedule(delay, Work::Boot { epoch });
    }

    fn schedule(&mut self, delay: std::time::Duration, work: Work) {
        let pending = Pending {
            due: Instant::now() + delay,
            seq: self.next_seq,
            work,
        };
        self.next_seq += 1;
        self.pending.push(Reverse(pending));
    }

    fn fire_due(&mut self) {
        let now = Instant::now();
        while self.pending.peek().is_some_and(|Reverse(p)| p.due <= now) {
            if let Some(Reverse(pending)) = self.pending.pop() {
                self.apply(pending.work);
            }
        }
        self.publish();
    }

    fn apply(&mut self, work: Work) {
        match work {
            Work::Boot { epoch } => {
                if self.session.finish_boot(epoch) {
                    info!(objectives = self.session.objectives.len(), "lab environment ready");
                } else {
                    debug!(epoch, "stale boot discarded");
                }
            }
            Work::Respond(response) => {
                let was_complete = self.session.all_objectives_complete();
                if let Some(id) = self.session.deliver(&response) {
                    let description = self
                        .session
                        .objectives
                        .iter()
                        .find(|o| o.id == id)
                        .map(|o| o.description.clone())
                        .unwrap_or_default();
                    info!(objective = id, "objective completed");
                    self.emit(LabEvent::ObjectiveCompleted {
                        id: id.to_string(),
                        description,
                    });

                    if !was_complete && self.session.all_objectives_complete() {
                        info!("all objectives complete");
                        self.emit(LabEvent::AllObjectivesComplete);
                    }
                }
            }
        }
    }

    fn publish(&mut self) {
        if self.session.status != self.last_status {
            self.last_status = self.session.status;
            self.emit(LabEvent::StatusChanged(self.session.status));
        }
        self.state.send_replace(self.session.snapshot());
    }

    fn emit(&self, event: LabEvent) {
        // Nobody listening is fine; events are advisory.
        let _ = self.events.send(event);
    }
}

async fn wait_until(due: Option<Instant>) {
    match due {
        Some(due) => time::sleep_until(due).await,
        None => std::future::pending().await,
    }
}
