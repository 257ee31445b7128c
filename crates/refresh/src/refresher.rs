use std::any::Any;
use std::fmt::Debug;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio::time::{self, sleep, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, DropGuard};

pub const DEFAULT_TICK: Duration = Duration::from_millis(5000);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// Wait for the next tick.
    Continue,
    ContinueAfter(Duration),
    /// Throw the refresher away and start over with a fresh one.
    Restart,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisionStrategy {
    Restart,
    Resume,
    Stop,
}

#[async_trait]
pub trait Refresher {
    type Error: Debug + Send;

    /// Name used in log messages.
    fn name(&self) -> &'static str;

    /// Called once per tick to fetch data and publish a new view.
    async fn run(&mut self) -> Result<Continuation, Self::Error>;

    /// Specifies how long to wait between calls to the `run` method.
    fn tick(&self) -> Duration {
        DEFAULT_TICK
    }

    /// Defines a backoff function, used to progressively increase the waiting
    /// time when consecutive failures happen.
    fn backoff(&self, last_backoff: Duration) -> Duration {
        (last_backoff + self.tick()).min(MAX_BACKOFF)
    }

    /// Specifies the behavior if the refresher returns an error.
    fn on_error(&mut self, _error: Self::Error) -> SupervisionStrategy {
        SupervisionStrategy::Resume
    }

    /// Specifies the behavior if the refresher panics.
    fn on_panic(&mut self, _error: Box<dyn Any + Send>) -> SupervisionStrategy {
        SupervisionStrategy::Restart
    }
}

/// Handle of a spawned refresher. Dropping it stops the refresher as well.
pub struct RefreshHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
    _guard: DropGuard,
}

impl RefreshHandle {
    /// No tick starts after this. A tick in flight is dropped at its next
    /// await point.
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled() || self.task.is_finished()
    }

    /// Waits until the refresher exited on its own or after `stop`.
    pub async fn join(self) {
        if let Err(why) = self.task.await {
            log::error!("refresher task failed: {why}");
        }
    }
}

async fn supervise<R, F>(factory: F)
where
    R: Refresher + Send,
    F: Fn() -> R + Send,
{
    let mut refresher = factory();
    let mut interval = time::interval(refresher.tick());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut backoff = refresher.tick();
    loop {
        interval.tick().await;
        let result = AssertUnwindSafe(refresher.run()).catch_unwind().await;
        let result = match result {
            Ok(Ok(continuation)) => Ok(continuation),
            Ok(Err(why)) => {
                log::error!("{} failed: {:?}", refresher.name(), why);
                Err(refresher.on_error(why))
            }
            Err(why) => {
                log::error!("{} panicked", refresher.name());
                Err(refresher.on_panic(why))
            }
        };

        let strategy = match result {
            Ok(continuation) => {
                backoff = refresher.tick();
                match continuation {
                    Continuation::Continue => {}
                    Continuation::ContinueAfter(delay) => {
                        sleep(delay).await;
                        interval.reset_immediately();
                    }
                    Continuation::Restart => {
                        log::info!("restarting {}", refresher.name());
                        refresher = factory();
                    }
                    Continuation::Exit => {
                        log::info!("{} exited", refresher.name());
                        return;
                    }
                }
                continue;
            }
            Err(strategy) => strategy,
        };

        match strategy {
            SupervisionStrategy::Restart => {
                log::info!("restarting {}", refresher.name());
                refresher = factory();
            }
            SupervisionStrategy::Resume => {}
            SupervisionStrategy::Stop => {
                log::info!("{} stopped after failure", refresher.name());
                return;
            }
        }
        backoff = refresher.backoff(backoff);
        sleep(backoff).await;
        interval.reset_immediately();
    }
}

/// Runs refreshers built by `factory` on the tokio runtime until the
/// returned handle is stopped or dropped. The factory is called again
/// whenever a refresher has to be restarted.
pub fn spawn<R, F>(factory: F) -> RefreshHandle
where
    R: Refresher + Send + 'static,
    F: Fn() -> R + Send + 'static,
{
    let token = CancellationToken::new();
    let cancelled = token.clone();
    let task = tokio::spawn(async move {
        tokio::select! {
            _ = cancelled.cancelled() => log::debug!("refresher cancelled"),
            _ = supervise(factory) => {}
        }
    });
    RefreshHandle {
        _guard: token.clone().drop_guard(),
        token,
        task,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;

    struct Counter {
        runs: Arc<AtomicUsize>,
        fail_on: Option<usize>,
        exit_after: usize,
    }

    #[async_trait]
    impl Refresher for Counter {
        type Error = String;

        fn name(&self) -> &'static str {
            "counter"
        }

        async fn run(&mut self) -> Result<Continuation, Self::Error> {
            let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            if Some(run) == self.fail_on {
                return Err(format!("run {run} failed"));
            }
            if run >= self.exit_after {
                return Ok(Continuation::Exit);
            }
            Ok(Continuation::Continue)
        }

        fn tick(&self) -> Duration {
            Duration::from_millis(10)
        }
    }

    #[tokio::test]
    async fn runs_until_exit() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let handle = spawn(move || Counter {
            runs: counter.clone(),
            fail_on: Some(2),
            exit_after: 4,
        });
        handle.join().await;
        assert_eq!(runs.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn stop_ends_the_loop() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let handle = spawn(move || Counter {
            runs: counter.clone(),
            fail_on: None,
            exit_after: usize::MAX,
        });
        sleep(Duration::from_millis(35)).await;
        handle.stop();
        assert!(handle.is_stopped());
        let seen = runs.load(Ordering::SeqCst);
        assert!(seen >= 1);
        handle.join().await;
        sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), seen);
    }
}
