//! Single-writer access to the donation and request ledgers.
//!
//! Every read and write goes through one worker thread that owns the store.
//! Handlers never touch the database directly: they hand a job to
//! [`LedgerState::run`], which queues it on a bounded MPSC channel and waits
//! for the worker's answer on a oneshot channel. Jobs therefore execute one at
//! a time, in arrival order, so two concurrent accepts against the same request
//! cannot both read the same outstanding quantity.
//!
//! The main components are:
//! - `Ledger`: the store plus the reconciliation policy, i.e. what a job sees.
//! - `LedgerState`: a clonable handle injected into the Actix application.
//! - `run_ledger_worker`: the loop draining the queue.

pub mod lifecycle;
mod operations;
pub mod proximity;
pub mod reconcile;

use crate::error::LedgerError;
use crate::store::Store;
use log::{debug, info};
use reconcile::{DecrementAndClose, ReconciliationPolicy};
use std::thread;
use tokio::sync::{mpsc, oneshot};

pub use operations::DonorHistory;

/// What a job gets to work with.
pub struct Ledger {
    pub store: Store,
    pub policy: Box<dyn ReconciliationPolicy>,
}

impl Ledger {
    pub fn new(store: Store) -> Self {
        Self::with_policy(store, Box::new(DecrementAndClose))
    }

    pub fn with_policy(store: Store, policy: Box<dyn ReconciliationPolicy>) -> Self {
        Self { store, policy }
    }
}

type LedgerJob = Box<dyn FnOnce(&mut Ledger) + Send>;

/// Handle to the ledger worker. Cloning it is cheap; all clones feed the same queue.
#[derive(Clone)]
pub struct LedgerState {
    tx: mpsc::Sender<LedgerJob>,
}

impl LedgerState {
    /// Spawns the worker thread. It stops once every handle has been dropped.
    pub fn start(ledger: Ledger, capacity: usize) -> std::io::Result<(Self, thread::JoinHandle<()>)> {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = thread::Builder::new()
            .name("ledger-worker".to_string())
            .spawn(move || run_ledger_worker(ledger, rx))?;
        Ok((Self { tx }, handle))
    }

    /// Queues `job` and waits for its result.
    pub async fn run<T, F>(&self, job: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Ledger) -> Result<T, LedgerError> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: LedgerJob = Box::new(move |ledger| {
            // The caller may have gone away (client disconnect); nothing to do then.
            let _ = reply_tx.send(job(ledger));
        });

        self.tx.send(job).await.map_err(|_| LedgerError::WorkerGone)?;
        reply_rx.await.map_err(|_| LedgerError::WorkerGone)?
    }
}

/// Executes queued jobs until all senders are gone.
///
/// Must run on a thread outside the async runtime, since it blocks on the queue.
pub fn run_ledger_worker(mut ledger: Ledger, mut rx: mpsc::Receiver<LedgerJob>) {
    info!("ledger worker started");
    while let Some(job) = rx.blocking_recv() {
        job(&mut ledger);
        debug!("ledger job done, {} queued", rx.len());
    }
    info!("ledger worker stopped");
}
