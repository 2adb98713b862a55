//! Asynchronous print queue with a self-healing worker
//!
//! [PrintQueue::submit] never blocks: jobs go into an unbounded channel, and a single worker task prints them one at a time, in submission order. Each job opens its own connection, prints, and closes it, so the printer is only ever touched by the worker.
//!
//! A supervisor checks the worker on a fixed interval. The worker holds one end of a oneshot channel for as long as it lives; once that channel reports closed, the supervisor starts a replacement against the same queue, so jobs waiting in the channel are not lost.
//!
//! ```rust,no_run
//! use quest_printer::{PrintJob, PrinterTarget, Quest};
//! use quest_printer::queue::{PrintQueue, SystemConnector};
//!
//! # async fn run() -> quest_printer::Result<()> {
//! let queue = PrintQueue::start(SystemConnector);
//! queue.submit(PrintJob::new(Quest::new("Water the plants"), PrinterTarget::spooler("Kitchen")))?;
//! // Pending jobs are printed before the queue goes away
//! queue.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;
use log::{debug, error, info, warn};
use serde::{Serialize, Deserialize};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::sync::oneshot::error::TryRecvError;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use crate::{
    Document, Error, Printer, PrinterTarget, Result,
    render::RenderOptions
};

/// Default period between two worker liveness checks
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Everything needed to print one document
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PrintJob {
    pub document: Document,
    pub target: PrinterTarget,
    #[serde(default)]
    pub options: RenderOptions
}

impl PrintJob {
    pub fn new<A: Into<Document>>(document: A, target: PrinterTarget) -> PrintJob {
        PrintJob {
            document: document.into(),
            target,
            options: RenderOptions::default()
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> PrintJob {
        self.options = options;
        self
    }
}

/// Opens printers for the worker
///
/// Called from a blocking thread, once per job.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, target: &PrinterTarget) -> Result<Printer>;
}

/// Connector for real devices, through [Printer::open](crate::Printer::open)
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemConnector;

impl Connector for SystemConnector {
    fn connect(&self, target: &PrinterTarget) -> Result<Printer> {
        Printer::open(target)
    }
}

type JobReceiver = Arc<Mutex<mpsc::UnboundedReceiver<PrintJob>>>;

/// Handle to the print queue
///
/// Dropping the handle has the same effect as [shutdown](PrintQueue::shutdown), without waiting for the queued jobs.
pub struct PrintQueue {
    sender: mpsc::UnboundedSender<PrintJob>,
    stop: oneshot::Sender<()>,
    supervisor: JoinHandle<()>
}

impl PrintQueue {
    /// Starts the worker and its supervisor. Must be called from within a tokio runtime.
    pub fn start<C: Connector>(connector: C) -> PrintQueue {
        PrintQueue::with_poll_interval(connector, POLL_INTERVAL)
    }

    /// Same as [start](PrintQueue::start), checking on the worker every `poll_interval`
    pub fn with_poll_interval<C: Connector>(connector: C, poll_interval: Duration) -> PrintQueue {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (stop, stop_receiver) = oneshot::channel();
        let supervisor = tokio::spawn(supervise(
            Arc::new(connector),
            Arc::new(Mutex::new(receiver)),
            poll_interval,
            stop_receiver
        ));
        PrintQueue {
            sender,
            stop,
            supervisor
        }
    }

    /// Enqueues a job and returns right away
    pub fn submit(&self, job: PrintJob) -> Result<()> {
        debug!("Queueing job for {}", job.target);
        self.sender.send(job).map_err(|_| Error::QueueClosed)
    }

    /// Stops accepting jobs, and waits until the already queued ones are processed
    pub async fn shutdown(self) {
        let PrintQueue{sender, stop, supervisor} = self;
        drop(sender);
        // The supervisor is gone already if it panicked, nothing to tell it then
        let _ = stop.send(());
        if let Err(e) = supervisor.await {
            warn!("Print queue supervisor ended abnormally: {}", e);
        }
    }
}

async fn supervise<C: Connector>(connector: Arc<C>, receiver: JobReceiver, poll_interval: Duration, mut stop: oneshot::Receiver<()>) {
    let (mut worker, mut alive) = spawn_worker(connector.clone(), receiver.clone());
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Either an explicit shutdown or a dropped handle
            _ = &mut stop => break,
            _ = interval.tick() => {
                if let Err(TryRecvError::Closed) = alive.try_recv() {
                    warn!("Print worker is gone, starting a new one");
                    (worker, alive) = spawn_worker(connector.clone(), receiver.clone());
                }
            }
        }
    }

    // The channel is closed now, workers return once it is drained
    loop {
        match worker.await {
            Ok(()) => break,
            Err(e) => {
                warn!("Print worker ended abnormally while draining ({}), starting a new one", e);
                worker = spawn_worker(connector.clone(), receiver.clone()).0;
            }
        }
    }
    info!("Print queue stopped");
}

/// Spawns a worker, along with the receiving end of its liveness channel
fn spawn_worker<C: Connector>(connector: Arc<C>, receiver: JobReceiver) -> (JoinHandle<()>, oneshot::Receiver<()>) {
    let (alive_sender, alive) = oneshot::channel::<()>();
    let worker = tokio::spawn(async move {
        // Dropped when the worker returns or unwinds
        let _alive = alive_sender;
        work(connector, receiver).await;
    });
    (worker, alive)
}

async fn work<C: Connector>(connector: Arc<C>, receiver: JobReceiver) {
    loop {
        let next = receiver.lock().await.recv().await;
        let job = match next {
            Some(job) => job,
            None => {
                debug!("Print queue closed and drained, worker exiting");
                return;
            }
        };

        let task_connector = connector.clone();
        let task_job = job.clone();
        match tokio::task::spawn_blocking(move || run_job(task_connector.as_ref(), &task_job)).await {
            Ok(Ok(())) => info!("Printed job for {}", job.target),
            Ok(Err(e)) => error!("Print job failed: {}. Job: {:?}", e, job),
            Err(e) if e.is_panic() => {
                error!("Print job panicked, restarting the worker. Job: {:?}", job);
                std::panic::resume_unwind(e.into_panic());
            },
            Err(e) => error!("Print job was cancelled: {}. Job: {:?}", e, job)
        }
    }
}

/// Connects, prints and closes, on the calling thread
///
/// The connection is closed on every path. A failed close fails the job, since spooler jobs are only submitted then.
fn run_job<C: Connector + ?Sized>(connector: &C, job: &PrintJob) -> Result<()> {
    let mut printer = connector.connect(&job.target)?;
    let res = printer.print_document(&job.document, &job.options);
    let closed = printer.finish();
    res.and(closed)
}
