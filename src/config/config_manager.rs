use std::collections::HashMap;

use crate::config::adapters::CategorySource;
use crate::wire::request::Sdk;

pub const BIDDER_CODE: &str = "admatic";
pub const ENDPOINT_URL: &str = "https://ads4.admatic.com.tr/prebid/v3/bidrequest";
pub const IFRAME_SYNC_URL: &str = "https://ads4.admatic.com.tr/prebid/static/usersync/v3/async_usersync.html";
pub const IMAGE_SYNC_URL: &str = "https://ads4.admatic.com.tr/prebid/v3/bidrequest/usersync";
pub const SDK_SOURCE: &str = "pbjs";
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// 适配器配置
#[derive(Clone, Debug)]
pub struct AdapterConfig {
    pub bidder_code: String,
    pub endpoint_url: String,
    pub iframe_sync_url: String,
    pub image_sync_url: String,
    pub sdk: Sdk,
    /// 请求 AdMatic 的超时（毫秒）
    pub timeout_ms: u64,
    /// brand_category_id -> IAB 子类目
    pub brand_categories: HashMap<String, String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            bidder_code: BIDDER_CODE.to_string(),
            endpoint_url: ENDPOINT_URL.to_string(),
            iframe_sync_url: IFRAME_SYNC_URL.to_string(),
            image_sync_url: IMAGE_SYNC_URL.to_string(),
            sdk: Sdk {
                source: SDK_SOURCE.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            timeout_ms: DEFAULT_TIMEOUT_MS,
            brand_categories: HashMap::new(),
        }
    }
}

impl AdapterConfig {
    /// 命令行参数覆盖默认值，类目表从 source 读取
    pub fn from_args(endpoint: Option<&str>, timeout_ms: Option<u64>, categories: &dyn CategorySource) -> Self {
        let mut config = AdapterConfig::default();
        if let Some(endpoint) = endpoint {
            config.endpoint_url = endpoint.to_string();
        }
        if let Some(timeout_ms) = timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        config.brand_categories = categories.brand_categories();
        config
    }
}
