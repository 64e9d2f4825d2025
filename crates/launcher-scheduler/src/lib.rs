//! # cc-launcher Scheduler
//!
//! Drives stored jobs off cron expressions and records every execution.
//!
//! - [`JobScheduler`]: timers, the running-process registry, CRUD, manual runs
//! - [`CronSchedule`]: five-field cron parsing and evaluation in local time
//! - [`CompletionSink`]: execution logs, run metadata, notifications, events

pub mod cron;
mod error;
mod events;
mod manual;
mod scheduler;
mod sink;
mod timer;

pub use cron::{CronError, CronSchedule};
pub use error::{SchedulerError, SchedulerResult};
pub use events::SchedulerEvent;
pub use manual::{ManualOutcome, ManualRequest};
pub use scheduler::{FireOutcome, JobScheduler, JobSchedulerBuilder};
pub use sink::{CompletionSink, notification_body, notification_title};
pub use timer::{CronTimer, SystemClock, TimerClock};
