use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::Instrument;

use super::SessionEvent;

/// Spawns a detached task inside a span named after it.
pub(crate) fn spawn_task<F>(name: String, future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let span = tracing::info_span!("task", task_name = %name);
    tokio::spawn(future.instrument(span))
}

/// A single-shot timer slot. Arming it again aborts whatever was armed before.
pub(crate) struct RoundTimer {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl RoundTimer {
    pub(crate) fn new(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    pub(crate) fn arm(
        &mut self,
        delay: Duration,
        events: UnboundedSender<SessionEvent>,
        event: SessionEvent,
    ) {
        let handle = spawn_task(self.name.to_string(), async move {
            tokio::time::sleep(delay).await;
            // receiver gone means the session was dropped
            let _ = events.send(event);
        });
        if let Some(existing) = self.handle.replace(handle) {
            existing.abort();
        }
    }

    pub(crate) fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RoundTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
