//! Per-key serialized task execution.
//!
//! A `SerialLane` owns one worker thread and runs submitted tasks strictly
//! one at a time: normal tasks in submission order, priority tasks ahead of
//! any not-yet-started normal task. A running task is never preempted. The
//! lane is the sole synchronization mechanism for the compiled artifact of
//! its key, which is why artifact swap-and-close needs no further locking.
//!
//! Lanes are created once per filename by the registry and run for the life
//! of the process; they have no fatal failure mode. A panicking task is
//! caught, logged, and the lane keeps serving.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a not-yet-started task, used to drop pending work when a
/// replacement is submitted. Dropping work that already started is not
/// supported; the replacement then just queues normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(u64);

struct QueueEntry {
    id: u64,
    task: Task,
}

#[derive(Default)]
struct LaneQueue {
    normal: VecDeque<QueueEntry>,
    priority: VecDeque<QueueEntry>,
    next_id: u64,
    running: bool,
    shutdown: bool,
}

impl LaneQueue {
    fn take_next(&mut self) -> Option<QueueEntry> {
        self.priority
            .pop_front()
            .or_else(|| self.normal.pop_front())
    }

    fn is_drained(&self) -> bool {
        !self.running && self.priority.is_empty() && self.normal.is_empty()
    }
}

/// Single-worker prioritized FIFO queue bound to one lexicon filename.
pub struct SerialLane {
    name: String,
    queue: Mutex<LaneQueue>,
    work_ready: Condvar,
    idle: Condvar,
    terminated: AtomicBool,
}

impl SerialLane {
    /// Create a lane and spawn its worker thread.
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        let lane = Arc::new(Self {
            name: name.into(),
            queue: Mutex::new(LaneQueue::default()),
            work_ready: Condvar::new(),
            idle: Condvar::new(),
            terminated: AtomicBool::new(false),
        });
        let worker = Arc::clone(&lane);
        thread::spawn(move || worker.run());
        lane
    }

    /// Queue a task behind all previously submitted normal tasks.
    pub fn submit(&self, task: impl FnOnce() + Send + 'static) {
        self.enqueue(Box::new(task), true);
    }

    /// Queue a task ahead of every not-yet-started normal task. Priority
    /// tasks run FIFO among themselves and never preempt a running task.
    pub fn submit_priority(&self, task: impl FnOnce() + Send + 'static) {
        self.enqueue(Box::new(task), false);
    }

    /// Queue `task`, first dropping the pending task behind `prev` if it has
    /// not started executing yet. Returns the handle to hand back on the
    /// next replacement, or `None` if the lane has shut down.
    ///
    /// A burst of replace submissions therefore collapses into a single
    /// effective tail execution.
    pub fn submit_replacing(
        &self,
        prev: Option<TaskHandle>,
        task: impl FnOnce() + Send + 'static,
    ) -> Option<TaskHandle> {
        let mut q = self.queue.lock();
        if q.shutdown {
            tracing::warn!(lane = %self.name, "task submitted after shutdown, dropping");
            return None;
        }
        if let Some(TaskHandle(id)) = prev {
            q.normal.retain(|entry| entry.id != id);
        }
        let id = q.next_id;
        q.next_id += 1;
        q.normal.push_back(QueueEntry {
            id,
            task: Box::new(task),
        });
        self.work_ready.notify_one();
        Some(TaskHandle(id))
    }

    /// Stop accepting tasks. Already-queued tasks still drain, then the
    /// worker exits. Intended for tests and controlled teardown; lanes
    /// normally live for the whole process.
    pub fn shutdown(&self) {
        {
            let mut q = self.queue.lock();
            q.shutdown = true;
        }
        self.work_ready.notify_all();
    }

    /// No task running and nothing queued.
    pub fn is_idle(&self) -> bool {
        self.queue.lock().is_drained()
    }

    /// Number of queued, not-yet-started tasks.
    pub fn pending_count(&self) -> usize {
        let q = self.queue.lock();
        q.normal.len() + q.priority.len()
    }

    /// Whether the worker thread has exited after [`SerialLane::shutdown`].
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Block until the lane is idle, up to `timeout`. Returns whether the
    /// lane was observed idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut q = self.queue.lock();
        while !q.is_drained() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if self.idle.wait_until(&mut q, deadline).timed_out() {
                return q.is_drained();
            }
        }
        true
    }

    fn enqueue(&self, task: Task, normal: bool) {
        let mut q = self.queue.lock();
        if q.shutdown {
            tracing::warn!(lane = %self.name, "task submitted after shutdown, dropping");
            return;
        }
        let id = q.next_id;
        q.next_id += 1;
        let entry = QueueEntry { id, task };
        if normal {
            q.normal.push_back(entry);
        } else {
            q.priority.push_back(entry);
        }
        self.work_ready.notify_one();
    }

    fn run(&self) {
        loop {
            let task = {
                let mut q = self.queue.lock();
                loop {
                    if let Some(entry) = q.take_next() {
                        q.running = true;
                        break Some(entry.task);
                    }
                    if q.shutdown {
                        break None;
                    }
                    self.work_ready.wait(&mut q);
                }
            };
            let Some(task) = task else { break };

            if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
                tracing::error!(
                    lane = %self.name,
                    "lane task panicked: {}",
                    panic_message(payload.as_ref())
                );
            }

            let mut q = self.queue.lock();
            q.running = false;
            if q.is_drained() {
                self.idle.notify_all();
            }
        }
        self.terminated.store(true, Ordering::SeqCst);
        self.idle.notify_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "opaque panic payload"
    }
}
