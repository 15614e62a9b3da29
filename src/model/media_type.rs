// src/model/media_type.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 广告格式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Banner,
    Video,
    Native,
}

impl MediaType {
    /// 本适配器支持的全部格式
    pub const SUPPORTED: [MediaType; 3] = [MediaType::Banner, MediaType::Video, MediaType::Native];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Banner => "banner",
            MediaType::Video => "video",
            MediaType::Native => "native",
        }
    }

    /// 将响应中的 ad_type 映射为格式，无法识别的一律按 banner 处理
    pub fn from_ad_type(ad_type: &str) -> Self {
        ad_type.parse().unwrap_or(MediaType::Banner)
    }
}

impl FromStr for MediaType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "banner" => Ok(MediaType::Banner),
            "video" => Ok(MediaType::Video),
            "native" => Ok(MediaType::Native),
            _ => Err(format!("Invalid value for MediaType: {}", value)),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 视频播放场景
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VideoContext {
    Instream,
    Outstream,
    Adpod,
    #[serde(other)]
    Other,
}
