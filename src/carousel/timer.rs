use std::fmt;
use std::time::Duration;

use async_std::channel::{self, Sender};
use async_std::task;
use futures_lite::future;
use tracing::trace;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

/// A live repeating timer. Dropping it stops the ticks.
pub struct Timer {
    id: TimerId,
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Timer {
    pub fn new(id: TimerId, cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Timer {
            id,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            trace!(timer = self.id.0, "timer cancelled");
            cancel();
        }
    }
}

impl fmt::Debug for Timer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer").field("id", &self.id).finish()
    }
}

pub trait Scheduler {
    /// Starts ticking every `period` until the returned timer is dropped.
    fn arm(&mut self, period: Duration) -> Timer;
}

/// Runs each timer as an async-std task that posts `on_tick(id)` into a channel.
pub struct AsyncStdScheduler<E> {
    events: Sender<E>,
    on_tick: fn(TimerId) -> E,
    next_id: u64,
}

impl<E> AsyncStdScheduler<E> {
    pub fn new(events: Sender<E>, on_tick: fn(TimerId) -> E) -> Self {
        AsyncStdScheduler {
            events,
            on_tick,
            next_id: 0,
        }
    }
}

impl<E: Send + 'static> Scheduler for AsyncStdScheduler<E> {
    fn arm(&mut self, period: Duration) -> Timer {
        self.next_id += 1;
        let id = TimerId(self.next_id);

        // Dropping `stop` closes the channel, which wakes the task up and ends it.
        let (stop, stopped) = channel::bounded::<()>(1);
        let events = self.events.clone();
        let on_tick = self.on_tick;

        task::spawn(async move {
            loop {
                let tick = async {
                    task::sleep(period).await;
                    true
                };
                let cancelled = async {
                    let _ = stopped.recv().await;
                    false
                };
                if !future::or(cancelled, tick).await {
                    break;
                }
                if events.send(on_tick(id)).await.is_err() {
                    break;
                }
            }
            trace!(timer = id.0, "timer task finished");
        });

        trace!(timer = id.0, ?period, "timer armed");
        Timer::new(id, move || drop(stop))
    }
}

/// Hands out timers that never tick, for one-shot renders.
#[derive(Debug, Default)]
pub struct InertScheduler {
    next_id: u64,
}

impl Scheduler for InertScheduler {
    fn arm(&mut self, _period: Duration) -> Timer {
        self.next_id += 1;
        Timer::new(TimerId(self.next_id), || {})
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_std::channel;

    use super::*;

    #[async_std::test]
    async fn ticks_until_dropped() {
        let (tx, rx) = channel::unbounded();
        let mut scheduler = AsyncStdScheduler::new(tx, |id| id);

        let timer = scheduler.arm(Duration::from_millis(5));
        assert_eq!(rx.recv().await.unwrap(), timer.id());
        assert_eq!(rx.recv().await.unwrap(), timer.id());
        drop(timer);

        // Drain anything posted before the cancel landed, then expect silence.
        async_std::task::sleep(Duration::from_millis(20)).await;
        while rx.try_recv().is_ok() {}
        async_std::task::sleep(Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn every_timer_gets_a_fresh_id() {
        let (tx, _rx) = channel::unbounded();
        let mut scheduler = AsyncStdScheduler::new(tx, |id| id);

        let a = scheduler.arm(Duration::from_secs(60));
        let b = scheduler.arm(Duration::from_secs(60));
        assert_ne!(a.id(), b.id());
    }
}
