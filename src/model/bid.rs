// src/model/bid.rs

use serde::Serialize;
use serde_json::Value;

use crate::adapter::renderer::RendererBinding;
use crate::model::media_type::{MediaType, VideoContext};
use crate::wire::response::NativeImage;

/// 交给宿主的标准化出价
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBid {
    /// 对应原始请求的 bidId
    pub request_id: String,
    pub cpm: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub net_revenue: bool,
    /// 有效期（秒）
    pub ttl: u32,
    pub ad_unit_code: String,
    pub media_type: MediaType,
    #[serde(flatten)]
    pub payload: BidPayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<BidMeta>,
    /// 仅 outstream 视频存在
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renderer: Option<RendererBinding>,
}

impl NormalizedBid {
    /// "宽x高"，没有尺寸的格式返回 None
    pub fn size(&self) -> Option<(u32, u32)> {
        match &self.payload {
            BidPayload::Banner(b) => b.width.zip(b.height),
            BidPayload::Video(v) => v.width.zip(v.height),
            BidPayload::Native { .. } => None,
        }
    }
}

/// 按格式区分的内容
#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum BidPayload {
    Banner(BannerPayload),
    Video(VideoPayload),
    Native { native: NativeAd },
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct BannerPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// 创意 HTML，可能追加了展示像素
    pub ad: String,
}

#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vast_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vast_imp_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<AdpodInfo>,
}

/// 长视频（adpod）位的附加信息
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdpodInfo {
    pub context: VideoContext,
    pub duration_seconds: u64,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BidMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iab_sub_cat_id: Option<String>,
}

/// 标准化后的原生广告字段
#[derive(Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NativeAd {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sponsored_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_trackers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impression_trackers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub javascript_trackers: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<NativeImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<NativeImage>,
}
