// src/wire/request.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adapter::native::NativeLayout;
use crate::adapter::sizes::Size;
use crate::model::media_type::MediaType;
use crate::model::context::Screen;

/// 发往 AdMatic 的请求体，一次拍卖一个。
/// 字段名即兼容性契约，驼峰与下划线混用是服务端的约定。
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WireRequest {
    /// 每个广告位一项，顺序与输入一致
    pub request: Vec<WireEntry>,
    pub sdk: Sdk,
    #[serde(rename = "auctionId")]
    pub auction_id: String,
    pub bidder: String,
    #[serde(rename = "bidderRequestId")]
    pub bidder_request_id: String,
    /// 取自第一个广告位，类型不做转换
    pub pid: Value,
    pub wid: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nocount: Option<Value>,
    pub screen: WireScreen,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr_consent: Option<WireGdprConsent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_detection: Option<ReferrerDetection>,
}

/// 单个广告位
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WireEntry {
    #[serde(rename = "adUnitCode")]
    pub ad_unit_code: String,
    #[serde(rename = "bidId")]
    pub bid_id: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_size: Option<Size>,
    pub sizes: Vec<Size>,
    pub ad_types: Vec<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidfloor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_asset_url: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<WireNative>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WireNative {
    pub layouts: Vec<NativeLayout>,
}

/// 客户端标识
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Sdk {
    pub source: String,
    pub version: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireScreen {
    pub width: u32,
    pub height: u32,
}

impl From<Screen> for WireScreen {
    fn from(screen: Screen) -> Self {
        Self {
            width: screen.width,
            height: screen.height,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireGdprConsent {
    #[serde(default)]
    pub consent_string: Option<String>,
    #[serde(default)]
    pub consent_required: Option<bool>,
}

/// 引用页检测，URL 均已做 URI 组件编码
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReferrerDetection {
    pub rd_ref: String,
    pub rd_top: bool,
    pub rd_ifs: u32,
    pub rd_stk: String,
}

/// 交给宿主传输层执行的请求描述
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerRequest {
    pub method: String,
    pub url: String,
    pub data: WireRequest,
    pub bidder: String,
}

impl ServerRequest {
    /// 序列化后的请求体
    pub fn payload_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.data)
    }
}
