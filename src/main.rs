// src/main.rs

use axum::serve;
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

use admatic_adapter::adapter::AdmaticAdapter;
use admatic_adapter::config::adapters::{CategorySource, EmptyCategorySource, FileCategorySource};
use admatic_adapter::config::config_manager::AdapterConfig;
use admatic_adapter::logging::exchange_logger::ExchangeLogger;
use admatic_adapter::transport::vendor_client::VendorClient;
use admatic_adapter::{api, mock_vendor, AppState};

#[derive(Parser, Debug)]
#[command(author = "whiteCcinn", version, about = "AdMatic bid adapter service")]
struct CliArgs {
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
    #[arg(long, default_value = "logs")]
    log_dir: String,
    /// AdMatic 竞价地址，默认正式地址
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// brand_category_id -> IAB 子类目 JSON 文件
    #[arg(long)]
    categories: Option<String>,
    /// 启动本地模拟 AdMatic 的端口
    #[arg(long)]
    mock_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化全局 tracing 日志
    let log_file = rolling::hourly(&args.log_dir, "admatic_adapter.json");
    let (non_blocking, _guard) = tracing_appender::non_blocking(log_file);
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().json().with_writer(non_blocking));
    tracing::subscriber::set_global_default(subscriber)?;
    info!("AdMatic adapter starting on port {}", args.port);

    let categories: Box<dyn CategorySource> = match &args.categories {
        Some(file) => Box::new(FileCategorySource::new(file)),
        None => Box::new(EmptyCategorySource),
    };

    // 启用模拟服务时，未指定 endpoint 则指向本地模拟地址
    let endpoint = match (&args.endpoint, args.mock_port) {
        (Some(endpoint), _) => Some(endpoint.clone()),
        (None, Some(port)) => Some(format!("http://127.0.0.1:{}/prebid/v3/bidrequest", port)),
        (None, None) => None,
    };
    let config = AdapterConfig::from_args(endpoint.as_deref(), args.timeout_ms, &*categories);
    info!(endpoint = %config.endpoint_url, timeout_ms = config.timeout_ms, "adapter configured");

    let state = Arc::new(AppState {
        client: VendorClient::new(config.timeout_ms),
        adapter: AdmaticAdapter::new(config),
        exchange_logger: ExchangeLogger::new(&args.log_dir, 1000, 100, 1000),
    });

    if let Some(port) = args.mock_port {
        tokio::spawn(async move {
            if let Err(e) = mock_vendor::start_mock_vendor_server(port).await {
                error!("Mock AdMatic server stopped: {}", e);
            }
        });
    }

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("AdMatic adapter running at http://{}", addr);

    serve(listener, api::router(state))
        .with_graceful_shutdown(async {
            let _ = signal::ctrl_c().await;
            info!("Shutting down gracefully...");
        })
        .await?;

    info!("AdMatic adapter shut down.");
    Ok(())
}
