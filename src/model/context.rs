// src/model/context.rs

use serde::{Deserialize, Serialize};

/// 一次拍卖内所有广告位共享的上下文
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuctionContext {
    /// 宿主侧的 bidder code，用于诊断日志
    #[serde(default)]
    pub bidder_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer_info: Option<RefererInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr_consent: Option<GdprConsent>,
    /// 由宿主注入的视口尺寸，不读取任何全局环境
    #[serde(default)]
    pub screen: Screen,
}

/// 引用页检测结果
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RefererInfo {
    pub referer: String,
    #[serde(default)]
    pub reached_top: bool,
    #[serde(default)]
    pub num_iframes: u32,
    #[serde(default)]
    pub stack: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GdprConsent {
    #[serde(default)]
    pub consent_string: Option<String>,
    #[serde(default)]
    pub gdpr_applies: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
}
