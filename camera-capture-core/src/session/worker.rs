use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::models::error::CameraError;

type Job<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Called on the worker after a job panicked, with the panic message.
type Recovery<S> = Box<dyn FnMut(&mut S, &str) + Send + 'static>;

enum Message<S> {
    Run(Job<S>),
    Shutdown,
}

/// Cloneable submission side of a [`SerialWorker`].
pub struct WorkerHandle<S> {
    tx: Sender<Message<S>>,
}

impl<S> Clone for WorkerHandle<S> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

impl<S: 'static> WorkerHandle<S> {
    /// Queue `job` behind everything already submitted.
    pub fn submit<F>(&self, job: F) -> Result<(), CameraError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.tx
            .send(Message::Run(Box::new(job)))
            .map_err(|_| CameraError::WorkerStopped)
    }

    /// Queue `job` and get its return value back through a [`Pending`].
    pub fn request<T, F>(&self, job: F) -> Result<Pending<T>, CameraError>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> T + Send + 'static,
    {
        let (tx, pending) = Pending::channel();
        self.submit(move |state| {
            // The caller may have dropped the Pending; nothing to do then.
            let _ = tx.send(job(state));
        })?;
        Ok(pending)
    }
}

/// A single background thread that owns `S` and runs jobs against it in
/// submission order.
///
/// Nothing else ever touches `S`, so it needs no locking. A panicking job
/// does not take the thread down: the panic is caught, the recovery hook
/// gets a chance to put `S` back into a consistent state, and the next job
/// runs as usual.
pub struct SerialWorker<S> {
    handle: WorkerHandle<S>,
    join: Option<thread::JoinHandle<()>>,
}

impl<S: Send + 'static> SerialWorker<S> {
    pub fn spawn(name: &str, state: S) -> Result<Self, CameraError> {
        Self::spawn_with(name, |_| state)
    }

    /// Build the owned state with access to the worker's own handle, so it
    /// can queue follow-up jobs (e.g. from platform callbacks).
    pub fn spawn_with<F>(name: &str, init: F) -> Result<Self, CameraError>
    where
        F: FnOnce(WorkerHandle<S>) -> S,
    {
        Self::spawn_with_recovery(name, init, |_, _| {})
    }

    /// Like [`spawn_with`](Self::spawn_with), running `recover` on the state
    /// after any job panics.
    pub fn spawn_with_recovery<F, R>(name: &str, init: F, recover: R) -> Result<Self, CameraError>
    where
        F: FnOnce(WorkerHandle<S>) -> S,
        R: FnMut(&mut S, &str) + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded::<Message<S>>();
        let handle = WorkerHandle { tx };
        let state = init(handle.clone());
        let recover: Recovery<S> = Box::new(recover);

        let thread_name = name.to_string();
        let join = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || run_loop(&thread_name, rx, state, recover))
            .map_err(|e| CameraError::Platform(format!("failed to spawn {}: {}", name, e)))?;

        Ok(Self {
            handle,
            join: Some(join),
        })
    }

    pub fn handle(&self) -> WorkerHandle<S> {
        self.handle.clone()
    }

    pub fn submit<F>(&self, job: F) -> Result<(), CameraError>
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.handle.submit(job)
    }

    pub fn request<T, F>(&self, job: F) -> Result<Pending<T>, CameraError>
    where
        T: Send + 'static,
        F: FnOnce(&mut S) -> T + Send + 'static,
    {
        self.handle.request(job)
    }

    /// Let queued jobs finish, then stop the thread and drop the state.
    pub fn shutdown(&mut self) {
        let _ = self.handle.tx.send(Message::Shutdown);
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                log::error!("camera worker panicked");
            }
        }
    }
}

impl<S> Drop for SerialWorker<S> {
    fn drop(&mut self) {
        let _ = self.handle.tx.send(Message::Shutdown);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn run_loop<S>(name: &str, rx: Receiver<Message<S>>, mut state: S, mut recover: Recovery<S>) {
    while let Ok(message) = rx.recv() {
        let job = match message {
            Message::Run(job) => job,
            Message::Shutdown => break,
        };
        let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| job(&mut state))) else {
            continue;
        };
        let message = panic_message(payload.as_ref());
        log::error!("{}: job panicked: {}", name, message);
        if panic::catch_unwind(AssertUnwindSafe(|| recover(&mut state, &message))).is_err() {
            log::error!("{}: recovery after panic panicked too", name);
        }
    }
    log::debug!("{} exiting", name);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// One-shot reply from the worker.
pub struct Pending<T> {
    rx: Receiver<T>,
}

impl<T> Pending<T> {
    fn channel() -> (Sender<T>, Self) {
        let (tx, rx) = crossbeam_channel::bounded(1);
        (tx, Self { rx })
    }

    /// Block until the worker has run the job.
    pub fn wait(self) -> Result<T, CameraError> {
        self.rx.recv().map_err(|_| CameraError::WorkerStopped)
    }

    pub fn wait_timeout(self, timeout: Duration) -> Result<T, CameraError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => CameraError::Timeout,
            RecvTimeoutError::Disconnected => CameraError::WorkerStopped,
        })
    }

    /// Non-blocking check.
    pub fn try_take(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}
