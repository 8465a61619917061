use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// A repeating callback. Returning `Break` ends the schedule.
pub type Task = Box<dyn FnMut() -> ControlFlow<()> + Send + 'static>;

// ---------------------------------------------------------------------------
// Cancellation handle
// ---------------------------------------------------------------------------

/// Cancels one schedule. Clones refer to the same schedule.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
    cancelled: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Something that can fire a task at a fixed period.
///
/// A scheduler must never run two invocations of the same task at once.
/// Cancellation stops future invocations; callers that need a hard
/// "nothing after this returns" guarantee check their own state inside the
/// task as well.
pub trait Scheduler {
    fn schedule_repeating(&mut self, period: Duration, task: Task) -> TaskHandle;
}

// ---------------------------------------------------------------------------
// Thread scheduler
// ---------------------------------------------------------------------------

/// Runs each schedule on its own background thread.
///
/// Deadlines advance by whole periods from the start instant, so a slow
/// tick does not shift every later one.
#[derive(Debug, Default)]
pub struct ThreadScheduler;

impl Scheduler for ThreadScheduler {
    fn schedule_repeating(&mut self, period: Duration, mut task: Task) -> TaskHandle {
        let handle = TaskHandle::default();
        let token = handle.clone();
        let period = period.max(Duration::from_millis(1));
        let spawned = thread::Builder::new()
            .name("ramp-clock".into())
            .spawn(move || {
                let mut deadline = Instant::now();
                loop {
                    if token.is_cancelled() {
                        break;
                    }
                    if task().is_break() {
                        break;
                    }
                    let Some(next) = deadline.checked_add(period) else {
                        log::error!("clock period {period:?} overflows the monotonic clock");
                        break;
                    };
                    deadline = next;
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    } else {
                        // Fell behind; skip missed slots rather than bursting.
                        deadline = now;
                    }
                }
                log::trace!("clock thread exiting");
            });
        if let Err(e) = spawned {
            log::error!("failed to spawn clock thread: {e}");
            handle.cancel();
        }
        handle
    }
}

// ---------------------------------------------------------------------------
// Manual scheduler
// ---------------------------------------------------------------------------

struct Scheduled {
    handle: TaskHandle,
    task: Task,
}

/// Fires tasks only when told to. Lets tests step playback deterministically.
/// Clones share the same task list.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    tasks: Arc<Mutex<Vec<Scheduled>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire every live task `ticks` times, in schedule order.
    pub fn advance(&self, ticks: usize) {
        for _ in 0..ticks {
            let mut tasks = self.lock();
            for scheduled in tasks.iter_mut() {
                if scheduled.handle.is_cancelled() {
                    continue;
                }
                if (scheduled.task)().is_break() {
                    scheduled.handle.cancel();
                }
            }
            tasks.retain(|s| !s.handle.is_cancelled());
        }
    }

    /// Number of schedules that have not been cancelled or finished.
    pub fn active(&self) -> usize {
        self.lock()
            .iter()
            .filter(|s| !s.handle.is_cancelled())
            .count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Scheduled>> {
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_repeating(&mut self, _period: Duration, task: Task) -> TaskHandle {
        let handle = TaskHandle::default();
        self.lock().push(Scheduled {
            handle: handle.clone(),
            task,
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_task(counter: &Arc<AtomicUsize>, limit: usize) -> Task {
        let counter = Arc::clone(counter);
        Box::new(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if n >= limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
    }

    #[test]
    fn manual_scheduler_stops_on_break() {
        let mut clock = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        clock.schedule_repeating(Duration::from_millis(16), counting_task(&counter, 3));
        clock.advance(10);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(clock.active(), 0);
    }

    #[test]
    fn manual_scheduler_honours_cancel() {
        let mut clock = ManualScheduler::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle =
            clock.schedule_repeating(Duration::from_millis(16), counting_task(&counter, 100));
        clock.advance(2);
        handle.cancel();
        clock.advance(5);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn thread_scheduler_ends_when_the_next_deadline_overflows() {
        let mut clock = ThreadScheduler;
        let counter = Arc::new(AtomicUsize::new(0));
        clock.schedule_repeating(Duration::MAX, counting_task(&counter, 100));
        let deadline = Instant::now() + Duration::from_secs(5);
        while counter.load(Ordering::SeqCst) < 1 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        thread::sleep(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn thread_scheduler_runs_until_break() {
        let mut clock = ThreadScheduler;
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = clock.schedule_repeating(Duration::from_millis(1), counting_task(&counter, 5));
        let deadline = Instant::now() + Duration::from_secs(5);
        while counter.load(Ordering::SeqCst) < 5 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(2));
        }
        thread::sleep(Duration::from_millis(20));
        assert_eq!(counter.load(Ordering::SeqCst), 5);
        assert!(!handle.is_cancelled());
    }
}
