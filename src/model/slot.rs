// src/model/slot.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::model::media_type::{MediaType, VideoContext};

/// 原生广告素材请求：素材 key（title、body、image ...）-> 参数
pub type NativeAssetRequest = BTreeMap<String, Map<String, Value>>;

/// 宿主拍卖系统中的单个广告位竞价请求
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InternalBidRequest {
    pub auction_id: String,
    #[serde(default)]
    pub bidder: String,
    pub bidder_request_id: String,
    pub bid_id: String,
    #[serde(default)]
    pub transaction_id: String,
    pub ad_unit_code: String,
    /// 原始尺寸：[w, h] 或 [[w, h], ...]，元素可以是数字或数字字符串
    #[serde(default)]
    pub sizes: Value,
    /// 旧版单一格式字段
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_types: Option<MediaTypes>,
    pub params: SlotParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<RendererOptions>,
}

/// AdMatic 广告位参数
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SlotParams {
    /// 发布商 ID，字符串或数字，原样透传
    #[serde(default)]
    pub pid: Option<Value>,
    /// 网站 ID，字符串或数字，原样透传
    #[serde(default)]
    pub wid: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bidfloor: Option<f64>,
    /// 不计数标记，原样透传
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nocount: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_params: Option<NativeAssetRequest>,
}

impl SlotParams {
    /// pid 与 wid 都存在且为真值（非空字符串、非 0 数字）才是合法广告位
    pub fn is_valid(&self) -> bool {
        self.pid.as_ref().is_some_and(is_truthy) && self.wid.as_ref().is_some_and(is_truthy)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MediaTypes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoMediaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<Value>,
}

impl MediaTypes {
    pub fn is_empty(&self) -> bool {
        self.banner.is_none() && self.video.is_none() && self.native.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct VideoMediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<VideoContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_size: Option<Value>,
}

/// 宿主为 outstream 渲染器提供的配置
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RendererOptions {
    #[serde(default)]
    pub options: Value,
}

impl InternalBidRequest {
    pub fn video_media_type(&self) -> Option<&VideoMediaType> {
        self.media_types.as_ref().and_then(|m| m.video.as_ref())
    }

    pub fn video_context(&self) -> Option<VideoContext> {
        self.video_media_type().and_then(|v| v.context)
    }

    pub fn wants_video(&self) -> bool {
        self.media_type == Some(MediaType::Video) || self.video_media_type().is_some()
    }

    /// instream 需要 asset_url（vastUrl），outstream 不需要
    pub fn requires_asset_url(&self) -> bool {
        self.media_type == Some(MediaType::Video)
            || (self.video_media_type().is_some()
                && self.video_context() != Some(VideoContext::Outstream))
    }

    pub fn wants_native(&self) -> bool {
        self.media_type == Some(MediaType::Native)
            || self.media_types.as_ref().is_some_and(|m| m.native.is_some())
    }

    /// 未声明任何格式时默认 banner
    pub fn wants_banner(&self) -> bool {
        let nothing_declared = self.media_type.is_none()
            && self.media_types.as_ref().map_or(true, MediaTypes::is_empty);
        nothing_declared
            || self.media_type == Some(MediaType::Banner)
            || self.media_types.as_ref().is_some_and(|m| m.banner.is_some())
    }

    pub fn renderer_options(&self) -> Value {
        self.renderer
            .as_ref()
            .map(|r| r.options.clone())
            .unwrap_or_else(|| Value::Object(Map::new()))
    }
}
