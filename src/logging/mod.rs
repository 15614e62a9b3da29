pub mod exchange_log;
pub mod exchange_logger;
