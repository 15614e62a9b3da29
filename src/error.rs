// src/error.rs

use thiserror::Error;

/// 适配器级错误：构建请求、传输、配置
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdapterError {
    /// 没有任何广告位，无法构建请求
    #[error("no bid requests to build a wire request from")]
    EmptyBatch,

    /// 广告位缺少 pid / wid
    #[error("bid request {bid_id} is missing pid or wid")]
    InvalidSlot { bid_id: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("config error: {0}")]
    Config(String),
}

/// 单个 offer 被丢弃的原因，只用于诊断，不会向上传播
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OfferError {
    #[error("malformed tag: {0}")]
    MalformedTag(String),

    /// 选中的 rtb offer 字段类型不符
    #[error("malformed offer: {0}")]
    MalformedOffer(String),

    #[error("tag has no rtb offer")]
    NoRtbOffer,

    #[error("offer price is zero")]
    ZeroPrice,

    #[error("offer has no price")]
    MissingPrice,

    #[error("unsupported ad_type: {0}")]
    UnsupportedAdType(String),

    /// tag.uuid 无法对应到任何原始 bidId
    #[error("no bid request matches uuid {0}")]
    UnknownRequest(String),

    #[error("offer has no {0} payload")]
    MissingPayload(&'static str),
}
