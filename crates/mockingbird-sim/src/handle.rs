//! Async access to a simulator owned by a single tokio task.
//!
//! The task holds the only `Simulator`; handles send requests over an mpsc
//! channel and await a oneshot reply, so requests are applied one at a time
//! in arrival order. The task exits on `shutdown` or once every handle has
//! been dropped.

use mockingbird_domain::ActionRequest;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{Result, SimError};
use crate::simulator::Simulator;
use crate::snapshot::{DynamicData, StaticData};

const REQUEST_BUFFER: usize = 64;

enum Request {
    Evolve {
        seconds: f64,
        reply: oneshot::Sender<Result<u64>>,
    },
    Action {
        requests: Vec<ActionRequest>,
        reply: oneshot::Sender<Result<usize>>,
    },
    StaticData {
        reply: oneshot::Sender<StaticData>,
    },
    DynamicData {
        reply: oneshot::Sender<DynamicData>,
    },
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct SimulatorHandle {
    tx: mpsc::Sender<Request>,
}

impl SimulatorHandle {
    /// Move `simulator` into a new task and return a handle to it.
    pub fn spawn(simulator: Simulator) -> (Self, JoinHandle<Simulator>) {
        let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
        let task = tokio::spawn(run(simulator, rx));
        (Self { tx }, task)
    }

    /// # Errors
    ///
    /// As [`Simulator::evolve`], or `Stopped` if the task has exited.
    pub async fn evolve(&self, seconds: f64) -> Result<u64> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Evolve { seconds, reply }).await?;
        rx.await.map_err(|_| SimError::Stopped)?
    }

    /// # Errors
    ///
    /// As [`Simulator::action`], or `Stopped` if the task has exited.
    pub async fn action(&self, requests: Vec<ActionRequest>) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::Action { requests, reply }).await?;
        rx.await.map_err(|_| SimError::Stopped)?
    }

    /// # Errors
    ///
    /// `Stopped` if the task has exited.
    pub async fn static_data(&self) -> Result<StaticData> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::StaticData { reply }).await?;
        rx.await.map_err(|_| SimError::Stopped)
    }

    /// # Errors
    ///
    /// `Stopped` if the task has exited.
    pub async fn dynamic_data(&self) -> Result<DynamicData> {
        let (reply, rx) = oneshot::channel();
        self.send(Request::DynamicData { reply }).await?;
        rx.await.map_err(|_| SimError::Stopped)
    }

    /// Ask the task to stop after the requests already queued.
    ///
    /// # Errors
    ///
    /// `Stopped` if the task has already exited.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(Request::Shutdown).await
    }

    async fn send(&self, request: Request) -> Result<()> {
        self.tx.send(request).await.map_err(|_| SimError::Stopped)
    }
}

async fn run(mut simulator: Simulator, mut rx: mpsc::Receiver<Request>) -> Simulator {
    info!(scenario = simulator.scenario_name(), "Simulator task started");

    while let Some(request) = rx.recv().await {
        // A dropped reply receiver just means the caller stopped waiting
        match request {
            Request::Evolve { seconds, reply } => {
                let _ = reply.send(simulator.evolve(seconds));
            }
            Request::Action { requests, reply } => {
                let _ = reply.send(simulator.action(requests));
            }
            Request::StaticData { reply } => {
                let _ = reply.send(simulator.static_data());
            }
            Request::DynamicData { reply } => {
                let _ = reply.send(simulator.dynamic_data());
            }
            Request::Shutdown => {
                debug!("Shutdown requested");
                break;
            }
        }
    }

    info!(
        scenario = simulator.scenario_name(),
        tick = simulator.state().tick_count(),
        "Simulator task stopped"
    );
    simulator
}
