// src/logging/exchange_logger.rs

use std::io::Write;
use std::sync::Arc;
use tokio::sync::mpsc::{self, Receiver, Sender};
use tokio::task;
use tokio::time::{self, Duration};
use tracing_appender::rolling;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::MakeWriter;

use crate::logging::exchange_log::ExchangeLog;

/// 日志保留时长（小时）
const RETENTION_HOURS: u64 = 72;
/// 滚动文件名前缀，清理时只处理这些文件
const LOG_FILE_PREFIX: &str = "admatic_exchange.json";

/// 往返日志写入器
/// 日志先进入 mpsc 通道，后台任务按批量或定时写入按小时滚动的文件。
pub struct ExchangeLogger {
    sender: Sender<String>,
}

impl ExchangeLogger {
    /// - `log_dir`: 日志目录
    /// - `buffer_size`: 通道缓冲区大小
    /// - `batch_size`: 攒够多少条写一次
    /// - `flush_interval`: 定时刷盘间隔（毫秒）
    pub fn new(log_dir: &str, buffer_size: usize, batch_size: usize, flush_interval: u64) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let appender = Arc::new(rolling::hourly(log_dir, LOG_FILE_PREFIX));

        tokio::spawn(Self::background_log_writer(appender, receiver, batch_size, flush_interval));

        // 每小时清理一次过期文件
        let log_dir = log_dir.to_string();
        tokio::spawn(async move {
            loop {
                Self::cleanup_old_logs(&log_dir, RETENTION_HOURS).await;
                time::sleep(Duration::from_secs(3600)).await;
            }
        });

        Arc::new(Self { sender })
    }

    pub async fn log(&self, entry: &ExchangeLog) {
        if let Err(e) = self.sender.send(entry.to_json()).await {
            tracing::error!("Failed to send exchange log: {}", e);
        }
    }

    async fn background_log_writer(
        appender: Arc<RollingFileAppender>,
        mut receiver: Receiver<String>,
        batch_size: usize,
        flush_interval: u64,
    ) {
        let mut buffer = Vec::new();
        let mut interval = time::interval(Duration::from_millis(flush_interval));

        loop {
            tokio::select! {
                entry = receiver.recv() => {
                    match entry {
                        Some(line) => {
                            buffer.push(line);
                            if buffer.len() >= batch_size {
                                Self::write_logs_to_disk(appender.clone(), &mut buffer).await;
                            }
                        }
                        // 所有 sender 已释放，写完剩余日志后退出
                        None => {
                            Self::write_logs_to_disk(appender.clone(), &mut buffer).await;
                            break;
                        }
                    }
                }
                _ = interval.tick() => {
                    Self::write_logs_to_disk(appender.clone(), &mut buffer).await;
                }
            }
        }
    }

    async fn write_logs_to_disk(appender: Arc<RollingFileAppender>, buffer: &mut Vec<String>) {
        if buffer.is_empty() {
            return;
        }
        let content = buffer.join("\n") + "\n";
        buffer.clear();

        let result = task::spawn_blocking(move || {
            let mut writer = appender.make_writer();
            writer.write_all(content.as_bytes())
        })
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Failed to write exchange logs: {}", e),
            Err(e) => tracing::error!("Exchange log writer task failed: {}", e),
        }
    }

    async fn cleanup_old_logs(log_dir: &str, retention_hours: u64) {
        use std::time::{Duration as StdDuration, SystemTime};
        let retention = StdDuration::from_secs(retention_hours * 3600);
        let now = SystemTime::now();

        let mut dir = match tokio::fs::read_dir(log_dir).await {
            Ok(dir) => dir,
            Err(e) => {
                tracing::warn!("Failed to read log directory {}: {}", log_dir, e);
                return;
            }
        };

        while let Ok(Some(entry)) = dir.next_entry().await {
            if !entry.file_name().to_string_lossy().starts_with(LOG_FILE_PREFIX) {
                continue;
            }
            let path = entry.path();
            let Ok(modified) = entry.metadata().await.and_then(|m| m.modified()) else {
                continue;
            };
            if now.duration_since(modified).unwrap_or_default() > retention {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => tracing::info!("Deleted old log file: {:?}", path),
                    Err(e) => tracing::warn!("Failed to delete old log file {:?}: {}", path, e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logs_are_flushed_to_disk() {
        let dir = std::env::temp_dir().join(format!("admatic-exchange-log-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let dir_str = dir.to_str().unwrap().to_string();

        let logger = ExchangeLogger::new(&dir_str, 16, 1, 50);
        logger.log(&ExchangeLog::new("auction-log-test", 1)).await;
        time::sleep(Duration::from_millis(300)).await;

        let mut found = false;
        for entry in std::fs::read_dir(&dir).unwrap() {
            let content = std::fs::read_to_string(entry.unwrap().path()).unwrap();
            found |= content.contains("auction-log-test");
        }
        assert!(found);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_only_touches_exchange_logs() {
        let dir = std::env::temp_dir().join(format!("admatic-exchange-cleanup-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let stale = std::time::SystemTime::now() - Duration::from_secs((RETENTION_HOURS + 1) * 3600);

        let exchange = dir.join(format!("{}.2024-01-01-00", LOG_FILE_PREFIX));
        let runtime = dir.join("admatic_adapter.json.2024-01-01-00");
        for path in [&exchange, &runtime] {
            let file = std::fs::File::create(path).unwrap();
            file.set_modified(stale).unwrap();
        }

        ExchangeLogger::cleanup_old_logs(dir.to_str().unwrap(), RETENTION_HOURS).await;

        assert!(!exchange.exists());
        assert!(runtime.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
