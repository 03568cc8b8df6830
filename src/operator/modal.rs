use std::time::Duration;

use crate::foundation::error::{RenderqError, RenderqResult};
use crate::host::{RenderHost, TimerHandle};
use crate::scheduler::task_scheduler::{StepOutcome, TaskScheduler};

/// Events the host dispatches to a running modal operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// The operator's polling timer fired.
    Timer,
    /// The user pressed ESC.
    Cancel,
    /// Any other input; ignored.
    Other,
}

/// Host-native operator states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalStatus {
    /// Started; the host keeps routing events to the operator.
    RunningModal,
    /// Still running; the event is also handled by the host.
    PassThrough,
    /// The job completed.
    Finished,
    /// The job was cancelled.
    Cancelled,
}

/// The single host command that runs a render job modally.
pub struct RenderOperator {
    scheduler: TaskScheduler,
    poll_interval: Duration,
    timer: Option<TimerHandle>,
}

impl RenderOperator {
    /// Host command id.
    pub const ID: &'static str = "render.video_sculpting";
    /// Host menu label.
    pub const LABEL: &'static str = "Render Essentials";

    /// Operator over `scheduler`, ticking every `poll_interval` once executed.
    pub fn new(scheduler: TaskScheduler, poll_interval: Duration) -> Self {
        Self {
            scheduler,
            poll_interval,
            timer: None,
        }
    }

    /// The scheduler the operator drives.
    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    /// The registered timer while the operator runs.
    pub fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Lock the interface and register the polling timer.
    pub fn execute(&mut self, host: &mut dyn RenderHost) -> RenderqResult<ModalStatus> {
        if self.timer.is_some() {
            return Err(RenderqError::validation(format!(
                "operator '{}' is already running",
                Self::ID
            )));
        }
        host.set_lock_interface(true);
        self.timer = Some(host.event_timer_add(self.poll_interval));
        tracing::info!(
            operator = Self::ID,
            label = Self::LABEL,
            poll_ms = self.poll_interval.as_millis() as u64,
            pending = self.scheduler.pending(),
            "render job started"
        );
        Ok(ModalStatus::RunningModal)
    }

    /// Handle one host event: cancel on ESC, step the scheduler on timer ticks, pass everything
    /// else through. The timer and interface lock are released on any terminal status.
    pub fn modal(
        &mut self,
        host: &mut dyn RenderHost,
        event: HostEvent,
    ) -> RenderqResult<ModalStatus> {
        match event {
            HostEvent::Cancel => {
                self.scheduler.cancel();
                self.release(host);
                tracing::info!("CANCELLED");
                Ok(ModalStatus::Cancelled)
            }
            HostEvent::Timer => match self.scheduler.step(host)? {
                StepOutcome::Finished => {
                    self.release(host);
                    tracing::info!("FINISHED");
                    Ok(ModalStatus::Finished)
                }
                StepOutcome::Cancelled => {
                    self.release(host);
                    Ok(ModalStatus::Cancelled)
                }
                StepOutcome::Rendered | StepOutcome::Busy => Ok(ModalStatus::PassThrough),
            },
            HostEvent::Other => Ok(ModalStatus::PassThrough),
        }
    }

    fn release(&mut self, host: &mut dyn RenderHost) {
        if let Some(timer) = self.timer.take() {
            host.event_timer_remove(timer);
        }
        host.set_lock_interface(false);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/operator/modal.rs"]
mod tests;
