//! AdMatic 出价适配器
//!
//! 把宿主拍卖系统的广告位请求翻译成 AdMatic 协议请求，
//! 再把 AdMatic 响应翻译回标准化出价。

pub mod adapter;
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod mock_vendor;
pub mod model;
pub mod transport;
pub mod wire;

use std::sync::Arc;

use adapter::AdmaticAdapter;
use logging::exchange_logger::ExchangeLogger;
use transport::vendor_client::VendorClient;

pub struct AppState {
    pub adapter: AdmaticAdapter,
    pub client: VendorClient,
    pub exchange_logger: Arc<ExchangeLogger>,
}
