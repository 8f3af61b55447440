pub mod config;
pub mod logging;

pub mod bench;
pub mod codec;
pub mod control;
pub mod job;
pub mod logger;
pub mod plan;
pub mod queue;
pub mod scheduler;
pub mod storage;
pub mod worker;
