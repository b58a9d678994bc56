//! Named serial task queues.
//!
//! A [`TaskScheduler`] runs posted closures one at a time in post order.
//! The threaded backend owns a worker thread; the manual backend keeps tasks
//! queued until [`TaskScheduler::run_pending`] is called, which makes
//! asynchronous sub-steps deterministic in tests.

use crate::error::DmError;

use log::{debug, error, trace, warn};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

type Task = Box<dyn FnOnce() + Send + 'static>;

enum Backend {
    Worker {
        sender: Mutex<Option<Sender<(String, Task)>>>,
        handle: Mutex<Option<JoinHandle<()>>>,
    },
    Manual {
        queue: Mutex<VecDeque<(String, Task)>>,
    },
}

#[derive(Default)]
struct Outstanding {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Outstanding {
    fn add(&self) {
        *self.count.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// A single serial queue of tasks.
pub struct TaskScheduler {
    name: String,
    backend: Backend,
    outstanding: std::sync::Arc<Outstanding>,
}

impl TaskScheduler {
    /// Create a scheduler backed by its own worker thread.
    ///
    /// A task that panics is logged and the worker moves on to the next one.
    pub fn new(name: &str) -> Result<Self, DmError> {
        let (sender, receiver) = mpsc::channel::<(String, Task)>();
        let outstanding = std::sync::Arc::new(Outstanding::default());
        let worker_outstanding = outstanding.clone();
        let queue_name = name.to_string();

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                for (task_name, task) in receiver {
                    trace!("{}: running {}", queue_name, task_name);
                    if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
                        error!("{}: task {} panicked", queue_name, task_name);
                    }
                    worker_outstanding.done();
                }
                debug!("{}: worker exiting", queue_name);
            })?;

        Ok(Self {
            name: name.to_string(),
            backend: Backend::Worker {
                sender: Mutex::new(Some(sender)),
                handle: Mutex::new(Some(handle)),
            },
            outstanding,
        })
    }

    /// Create a scheduler whose tasks only run from [`Self::run_pending`].
    pub fn manual(name: &str) -> Self {
        Self {
            name: name.to_string(),
            backend: Backend::Manual {
                queue: Mutex::new(VecDeque::new()),
            },
            outstanding: std::sync::Arc::new(Outstanding::default()),
        }
    }

    /// Queue name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Post a task to run after every task posted before it.
    pub fn post_async_task<F>(&self, task: F, task_name: &str)
    where
        F: FnOnce() + Send + 'static,
    {
        trace!("{}: post {}", self.name, task_name);
        self.outstanding.add();
        match &self.backend {
            Backend::Worker { sender, .. } => {
                let sent = match sender.lock().as_ref() {
                    Some(sender) => sender.send((task_name.to_string(), Box::new(task))).is_ok(),
                    None => false,
                };
                if !sent {
                    warn!("{}: worker gone, dropping {}", self.name, task_name);
                    self.outstanding.done();
                }
            }
            Backend::Manual { queue } => {
                queue.lock().push_back((task_name.to_string(), Box::new(task)));
            }
        }
    }

    /// Number of tasks posted but not yet finished.
    pub fn pending(&self) -> usize {
        *self.outstanding.count.lock()
    }

    /// Run queued tasks on the calling thread until the queue is empty,
    /// including tasks posted by running tasks. Returns how many ran.
    ///
    /// Does nothing on a threaded scheduler.
    pub fn run_pending(&self) -> usize {
        let Backend::Manual { queue } = &self.backend else {
            return 0;
        };
        let mut ran = 0;
        loop {
            let next = queue.lock().pop_front();
            let Some((task_name, task)) = next else {
                break;
            };
            trace!("{}: running {}", self.name, task_name);
            task();
            self.outstanding.done();
            ran += 1;
        }
        ran
    }

    /// Block until every posted task has finished.
    ///
    /// On a manual scheduler this drains the queue on the calling thread.
    pub fn wait_idle(&self) {
        if let Backend::Manual { .. } = &self.backend {
            self.run_pending();
            return;
        }
        let mut count = self.outstanding.count.lock();
        while *count > 0 {
            self.outstanding.idle.wait(&mut count);
        }
    }
}

impl Drop for TaskScheduler {
    fn drop(&mut self) {
        if let Backend::Worker { sender, handle } = &self.backend {
            sender.lock().take();
            if let Some(handle) = handle.lock().take() {
                if handle.thread().id() == std::thread::current().id() {
                    return;
                }
                if handle.join().is_err() {
                    warn!("{}: worker panicked", self.name);
                }
            }
        }
    }
}

impl std::fmt::Debug for TaskScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskScheduler")
            .field("name", &self.name)
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_worker_runs_in_post_order() {
        let scheduler = TaskScheduler::new("test-power").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..16 {
            let seen = seen.clone();
            scheduler.post_async_task(move || seen.lock().push(i), "push");
        }
        scheduler.wait_idle();
        assert_eq!(*seen.lock(), (0..16).collect::<Vec<_>>());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_worker_survives_panicking_task() {
        let scheduler = TaskScheduler::new("test-panic").unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        scheduler.post_async_task(|| panic!("power service gone"), "boom");
        let after = seen.clone();
        scheduler.post_async_task(move || after.lock().push("after"), "after");

        scheduler.wait_idle();
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(*seen.lock(), vec!["after"]);
    }

    #[test]
    fn test_manual_runs_nested_posts() {
        let scheduler = Arc::new(TaskScheduler::manual("test-manual"));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let inner = scheduler.clone();
        let outer_seen = seen.clone();
        scheduler.post_async_task(
            move || {
                outer_seen.lock().push("outer");
                let nested_seen = outer_seen.clone();
                inner.post_async_task(move || nested_seen.lock().push("nested"), "nested");
            },
            "outer",
        );
        assert!(seen.lock().is_empty());
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.run_pending(), 2);
        assert_eq!(*seen.lock(), vec!["outer", "nested"]);
    }
}
