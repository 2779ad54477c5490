//! The periodic rollover task.

use std::{sync::Arc, time::Duration};

use daychain_core::persist::StateStore;
use tokio::{
  sync::oneshot,
  task::JoinHandle,
  time::{self, MissedTickBehavior},
};

use crate::tracker::Tracker;

/// Handle to a running rollover loop. Call [`RolloverTask::stop`] on
/// teardown; once it returns no further tick will touch the tracker.
pub struct RolloverTask {
  shutdown: oneshot::Sender<()>,
  handle:   JoinHandle<()>,
}

impl RolloverTask {
  /// Spawn a loop that ticks `tracker` every `period`. The first tick runs
  /// immediately so state left over from a previous session catches up.
  pub fn spawn<S>(tracker: Arc<Tracker<S>>, period: Duration) -> Self
  where
    S: StateStore + 'static,
  {
    let (shutdown, mut stop) = oneshot::channel();

    let handle = tokio::spawn(async move {
      let mut interval = time::interval(period);
      interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

      loop {
        tokio::select! {
          _ = &mut stop => break,
          _ = interval.tick() => {
            if let Err(e) = tracker.tick().await {
              tracing::warn!("rollover tick failed: {e}");
            }
          }
        }
      }
      tracing::debug!("rollover loop stopped");
    });

    Self { shutdown, handle }
  }

  /// Signal the loop to exit and wait for it.
  pub async fn stop(self) {
    // The receiver is gone only if the task already ended.
    let _ = self.shutdown.send(());
    if let Err(e) = self.handle.await {
      tracing::warn!("rollover loop ended abnormally: {e}");
    }
  }
}
