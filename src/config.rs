//! Process configuration.
//!
//! Every option can be given on the command line or through the environment.

use crate::executor::executor::ExecutorConfig;
use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "text-task-service", about = "Translation and summarization over HTTP")]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    pub bind: SocketAddr,

    /// Number of task workers.
    #[arg(long, env = "WORKERS", default_value_t = 4)]
    pub workers: usize,

    /// Maximum number of queued, not yet dequeued, tasks.
    #[arg(long, env = "QUEUE_CAPACITY", default_value_t = 1024)]
    pub queue_capacity: usize,

    /// How long a submission may wait for the queue to accept it.
    #[arg(long, env = "ENQUEUE_TIMEOUT_MS", default_value_t = 500)]
    pub enqueue_timeout_ms: u64,

    /// Upper bound on a single text-service call, sync or async.
    #[arg(long, env = "TASK_TIMEOUT_SECS", default_value_t = 60)]
    pub task_timeout_secs: u64,

    #[arg(long, env = "TEXT_SERVICE_URL", default_value = "http://127.0.0.1:8000")]
    pub text_service_url: String,

    /// Per-request HTTP timeout towards the text service.
    #[arg(long, env = "TEXT_SERVICE_TIMEOUT_SECS", default_value_t = 30)]
    pub text_service_timeout_secs: u64,

    #[arg(long, env = "TEXT_SERVICE_RETRIES", default_value_t = 3)]
    pub text_service_retries: usize,

    /// Log filter, e.g. `info` or `text_task_service=debug`.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Seconds between task statistics log lines. 0 disables them.
    #[arg(long, env = "STATS_INTERVAL_SECS", default_value_t = 30)]
    pub stats_interval_secs: u64,
}

impl Config {
    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn text_service_timeout(&self) -> Duration {
        Duration::from_secs(self.text_service_timeout_secs)
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            worker_count: self.workers.max(1),
            task_timeout: self.task_timeout(),
        }
    }
}
