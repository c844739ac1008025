//! Deferred actions handed to the controlling thread
//!
//! Callbacks fired on other threads (input readers, timers, UI events) must
//! not touch the controller directly. They enqueue an action instead, and
//! the controlling thread runs it on its next tick.

use crossbeam::queue::SegQueue;
use std::sync::Arc;
use tracing::trace;

/// An action to run on the controlling thread against host `H`
pub type DeferredAction<H> = Box<dyn FnOnce(&mut H) + Send + 'static>;

/// Enqueue side of the queue; cheap to clone and safe to use from any thread
pub struct DeferredSender<H> {
    queue: Arc<SegQueue<DeferredAction<H>>>,
}

impl<H> Clone for DeferredSender<H> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<H> DeferredSender<H> {
    pub fn enqueue<F>(&self, action: F)
    where
        F: FnOnce(&mut H) + Send + 'static,
    {
        self.queue.push(Box::new(action));
    }
}

/// Drain side of the queue, owned by the controlling thread
pub struct DeferredQueue<H> {
    queue: Arc<SegQueue<DeferredAction<H>>>,
}

impl<H> Default for DeferredQueue<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> DeferredQueue<H> {
    pub fn new() -> Self {
        Self {
            queue: Arc::new(SegQueue::new()),
        }
    }

    pub fn sender(&self) -> DeferredSender<H> {
        DeferredSender {
            queue: Arc::clone(&self.queue),
        }
    }

    pub fn enqueue<F>(&self, action: F)
    where
        F: FnOnce(&mut H) + Send + 'static,
    {
        self.queue.push(Box::new(action));
    }

    /// Number of actions waiting
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Run, in FIFO order, the actions that were queued when the drain
    /// started. Actions enqueued while draining wait for the next drain.
    pub fn drain(&mut self, host: &mut H) -> usize {
        let pending = self.queue.len();
        let mut ran = 0;
        while ran < pending {
            let Some(action) = self.queue.pop() else {
                break;
            };
            action(host);
            ran += 1;
        }
        if ran > 0 {
            trace!(ran, "drained deferred actions");
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_drain_runs_in_fifo_order() {
        let mut queue: DeferredQueue<Vec<u32>> = DeferredQueue::new();
        for i in 0..5 {
            queue.enqueue(move |log: &mut Vec<u32>| log.push(i));
        }

        let mut log = Vec::new();
        assert_eq!(queue.drain(&mut log), 5);
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_actions_enqueued_during_drain_wait_for_next_tick() {
        struct Host {
            sender: DeferredSender<Host>,
            log: Vec<&'static str>,
        }

        let mut queue: DeferredQueue<Host> = DeferredQueue::new();
        let mut host = Host {
            sender: queue.sender(),
            log: Vec::new(),
        };
        queue.enqueue(|host: &mut Host| {
            host.log.push("first");
            host.sender.enqueue(|host: &mut Host| host.log.push("follow-up"));
        });

        assert_eq!(queue.drain(&mut host), 1);
        assert_eq!(host.log, vec!["first"]);
        assert_eq!(queue.len(), 1);

        assert_eq!(queue.drain(&mut host), 1);
        assert_eq!(host.log, vec!["first", "follow-up"]);
    }

    #[test]
    fn test_enqueue_from_other_threads() {
        let mut queue: DeferredQueue<Vec<usize>> = DeferredQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for i in 0..25 {
                        sender.enqueue(move |log: &mut Vec<usize>| log.push(t * 100 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut log = Vec::new();
        assert_eq!(queue.drain(&mut log), 100);
        // Each producer's actions keep their relative order.
        for t in 0..4 {
            let mine: Vec<_> = log.iter().copied().filter(|v| v / 100 == t).collect();
            assert_eq!(mine, (0..25).map(|i| t * 100 + i).collect::<Vec<_>>());
        }
    }
}
