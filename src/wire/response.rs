// src/wire/response.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OfferError;

/// 传输层交回的结果：要么有响应体，要么带错误描述
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ServerResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<WireResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServerResponse {
    pub fn ok(body: WireResponse) -> Self {
        Self {
            body: Some(body),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            body: None,
            error: Some(error.into()),
        }
    }
}

/// AdMatic 响应体。
/// tags 以原始 JSON 保存，逐个解析，单个 tag 格式错误不影响其它 tag。
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WireResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
}

impl WireResponse {
    pub fn from_tags(tags: &[Tag]) -> Result<Self, serde_json::Error> {
        let tags = tags.iter().map(serde_json::to_value).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tags: Some(tags) })
    }
}

/// 单个广告位的响应容器。
/// ads 保持原始 JSON，只有被选中的 rtb offer 才做强类型解析。
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Tag {
    /// 对应请求里的 bidId
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_id: Option<Value>,
    #[serde(default)]
    pub ads: Vec<Value>,
}

impl Tag {
    /// null 返回 Ok(None)，结构不符返回 MalformedTag
    pub fn from_raw(raw: &Value) -> Result<Option<Tag>, OfferError> {
        if raw.is_null() {
            return Ok(None);
        }
        serde_json::from_value(raw.clone())
            .map(Some)
            .map_err(|e| OfferError::MalformedTag(e.to_string()))
    }

    /// 第一个 rtb 非空的 ad。其它 ad 不解析，格式再乱也不影响结果。
    pub fn rtb_offer(&self) -> Result<Ad, OfferError> {
        let raw = self
            .ads
            .iter()
            .find(|ad| ad.get("rtb").is_some_and(|rtb| !rtb.is_null()))
            .ok_or(OfferError::NoRtbOffer)?;
        Ad::deserialize(raw).map_err(|e| OfferError::MalformedOffer(e.to_string()))
    }
}

/// 候选广告
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Ad {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtb: Option<Rtb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_category_id: Option<Value>,
}

/// rtb 内容：banner / video / native 三选一，外加 tracker
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Rtb {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<RtbBanner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<RtbVideo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<RtbNative>,
    /// 保留原始 JSON，解析失败只影响展示像素
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trackers: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RtbBanner {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RtbVideo {
    #[serde(default)]
    pub player_width: Option<u32>,
    #[serde(default)]
    pub player_height: Option<u32>,
    #[serde(default)]
    pub asset_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// 可能带小数
    #[serde(default)]
    pub duration_ms: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RtbNative {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub desc2: Option<String>,
    #[serde(default)]
    pub ctatext: Option<String>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(default)]
    pub sponsored: Option<String>,
    #[serde(default)]
    pub privacy_link: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub downloads: Option<Value>,
    #[serde(default)]
    pub likes: Option<Value>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub saleprice: Option<Value>,
    #[serde(default)]
    pub link: Option<NativeLink>,
    #[serde(default)]
    pub displayurl: Option<String>,
    #[serde(default)]
    pub impression_trackers: Option<Vec<String>>,
    #[serde(default)]
    pub javascript_trackers: Option<Value>,
    #[serde(default)]
    pub main_img: Option<NativeImage>,
    #[serde(default)]
    pub icon: Option<NativeImage>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct NativeLink {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub click_trackers: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NativeImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}
