use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError, TrySendError};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use upkeep_ai::{
    ClassificationCapability, ClassificationError, ClassificationSignal, ModelDescriptor, RuleTable,
    TableAnswer,
};

/// How often an idle worker checks for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Config for the classifier worker.
#[derive(Debug, Clone)]
pub struct ClassifierWorker {
    /// Longest a caller waits for one answer.
    pub timeout: Duration,
    /// Requests that may wait behind the one in progress.
    pub queue_capacity: usize,
}

impl Default for ClassifierWorker {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            queue_capacity: 32,
        }
    }
}

type Reply<T> = mpsc::SyncSender<Result<T, ClassificationError>>;

enum Request {
    Classify {
        text: String,
        deadline: Instant,
        reply: Reply<ClassificationSignal>,
    },
    AnswerOverTable {
        table: RuleTable,
        query: String,
        deadline: Instant,
        reply: Reply<TableAnswer>,
    },
}

struct Running {
    shutdown: mpsc::Sender<()>,
    join: thread::JoinHandle<()>,
}

struct Shared {
    name: &'static str,
    descriptor: Arc<OnceLock<ModelDescriptor>>,
    running: Mutex<Option<Running>>,
}

/// Shared, thread-safe access to a capability owned by a single worker thread.
///
/// Calls are served one at a time in arrival order. A full queue is reported
/// as `Busy`, a slow answer as `Timeout`, a stopped worker as `Unavailable`.
#[derive(Clone)]
pub struct ClassifierHandle {
    requests: mpsc::SyncSender<Request>,
    timeout: Duration,
    shared: Arc<Shared>,
}

impl fmt::Debug for ClassifierHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassifierHandle")
            .field("worker", &self.shared.name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClassifierWorker {
    /// Spawn the worker thread. `factory` runs once, on that thread; if it
    /// fails the worker exits and every call reports `Unavailable`.
    pub fn spawn<F, C>(&self, name: &'static str, factory: F) -> std::io::Result<ClassifierHandle>
    where
        F: FnOnce() -> Result<C, ClassificationError> + Send + 'static,
        C: ClassificationCapability + 'static,
    {
        let (request_tx, request_rx) = mpsc::sync_channel::<Request>(self.queue_capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let descriptor = Arc::new(OnceLock::new());

        let worker_descriptor = Arc::clone(&descriptor);
        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, factory, request_rx, shutdown_rx, worker_descriptor))?;

        Ok(ClassifierHandle {
            requests: request_tx,
            timeout: self.timeout,
            shared: Arc::new(Shared {
                name,
                descriptor,
                running: Mutex::new(Some(Running {
                    shutdown: shutdown_tx,
                    join,
                })),
            }),
        })
    }
}

impl ClassifierHandle {
    /// Stop the worker thread and wait for it. Later calls report `Unavailable`.
    pub fn shutdown(&self) {
        let running = match self.shared.running.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(r) = running {
            let _ = r.shutdown.send(());
            let _ = r.join.join();
        }
    }

    fn call<T>(
        &self,
        make: impl FnOnce(Instant, Reply<T>) -> Request,
    ) -> Result<T, ClassificationError> {
        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        let deadline = Instant::now() + self.timeout;

        match self.requests.try_send(make(deadline, reply_tx)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!(worker = self.shared.name, "classifier queue full");
                return Err(ClassificationError::Busy);
            }
            Err(TrySendError::Disconnected(_)) => return Err(self.stopped()),
        }

        match reply_rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ClassificationError::Timeout(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(self.stopped()),
        }
    }

    fn stopped(&self) -> ClassificationError {
        ClassificationError::Unavailable(format!(
            "classifier worker {} is not running",
            self.shared.name
        ))
    }
}

impl ClassificationCapability for ClassifierHandle {
    fn descriptor(&self) -> ModelDescriptor {
        self.shared
            .descriptor
            .get()
            .cloned()
            .unwrap_or_else(|| ModelDescriptor::new(self.shared.name))
    }

    fn classify(&self, text: &str) -> Result<ClassificationSignal, ClassificationError> {
        self.call(|deadline, reply| Request::Classify {
            text: text.to_string(),
            deadline,
            reply,
        })
    }

    fn answer_over_table(
        &self,
        table: &RuleTable,
        query: &str,
    ) -> Result<TableAnswer, ClassificationError> {
        self.call(|deadline, reply| Request::AnswerOverTable {
            table: table.clone(),
            query: query.to_string(),
            deadline,
            reply,
        })
    }
}

fn worker_loop<F, C>(
    name: &'static str,
    factory: F,
    requests: mpsc::Receiver<Request>,
    shutdown: mpsc::Receiver<()>,
    descriptor: Arc<OnceLock<ModelDescriptor>>,
) where
    F: FnOnce() -> Result<C, ClassificationError>,
    C: ClassificationCapability,
{
    let capability = match factory() {
        Ok(c) => c,
        Err(e) => {
            warn!(worker = name, error = %e, "classification capability failed to initialize");
            return;
        }
    };

    let model = capability.descriptor();
    info!(
        worker = name,
        model = %model.name,
        revision = ?model.revision,
        "classifier worker started"
    );
    let _ = descriptor.set(model);

    loop {
        // Shutdown has priority.
        match shutdown.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match requests.recv_timeout(POLL_INTERVAL) {
            Ok(request) => serve(name, &capability, request),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    info!(worker = name, "classifier worker stopped");
}

fn serve<C: ClassificationCapability>(name: &'static str, capability: &C, request: Request) {
    match request {
        Request::Classify {
            text,
            deadline,
            reply,
        } => {
            if Instant::now() >= deadline {
                debug!(worker = name, "dropping expired classify request");
                return;
            }
            let _ = reply.try_send(capability.classify(&text));
        }
        Request::AnswerOverTable {
            table,
            query,
            deadline,
            reply,
        } => {
            if Instant::now() >= deadline {
                debug!(worker = name, "dropping expired table request");
                return;
            }
            let _ = reply.try_send(capability.answer_over_table(&table, &query));
        }
    }
}
