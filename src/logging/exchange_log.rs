use chrono::{FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::adapter::interpreter::{DroppedOffer, Interpretation};

/// **一次 AdMatic 往返的日志**
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExchangeLog {
    pub timestamp: String,          // 记录时间（东八区）
    pub log_type: String,           // 固定为 "admatic_exchange"
    pub auction_id: String,
    pub slot_count: usize,          // 请求中的广告位数
    pub bid_count: usize,           // 解析出的出价数
    pub status: String,             // "success" / "no_bid" / "transport_error"
    pub elapsed_ms: Option<u128>,   // 请求耗时
    pub error: Option<String>,
    pub dropped_offers: Vec<DroppedOfferLog>,
}

/// **被丢弃的 offer**
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DroppedOfferLog {
    pub uuid: Option<String>,
    pub reason: String,
}

impl From<&DroppedOffer> for DroppedOfferLog {
    fn from(offer: &DroppedOffer) -> Self {
        Self {
            uuid: offer.uuid.clone(),
            reason: offer.reason.clone(),
        }
    }
}

impl ExchangeLog {
    pub fn new(auction_id: &str, slot_count: usize) -> Self {
        let now = Utc::now();
        let timestamp = match FixedOffset::east_opt(8 * 3600) {
            Some(tz) => now.with_timezone(&tz).to_rfc3339(),
            None => now.to_rfc3339(),
        };
        Self {
            timestamp,
            log_type: "admatic_exchange".to_string(),
            auction_id: auction_id.to_string(),
            slot_count,
            bid_count: 0,
            status: "no_bid".to_string(),
            elapsed_ms: None,
            error: None,
            dropped_offers: Vec::new(),
        }
    }

    /// **记录传输失败**
    pub fn set_transport_error(&mut self, error: &str, elapsed_ms: u128) {
        self.status = "transport_error".to_string();
        self.error = Some(error.to_string());
        self.elapsed_ms = Some(elapsed_ms);
    }

    /// **记录解析结果**
    pub fn set_interpretation(&mut self, result: &Interpretation, elapsed_ms: u128) {
        self.bid_count = result.bids.len();
        self.elapsed_ms = Some(elapsed_ms);
        self.dropped_offers = result.dropped.iter().map(DroppedOfferLog::from).collect();
        if self.bid_count > 0 {
            self.status = "success".to_string();
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
