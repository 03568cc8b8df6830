pub(crate) mod state;
pub(crate) mod task_scheduler;
