//! AdMatic 出价适配器：宿主竞价请求 <-> AdMatic 协议

pub mod interpreter;
pub mod native;
pub mod renderer;
pub mod request_builder;
pub mod sizes;
pub mod user_sync;

use crate::config::config_manager::AdapterConfig;
use crate::error::AdapterError;
use crate::model::bid::NormalizedBid;
use crate::model::context::AuctionContext;
use crate::model::media_type::MediaType;
use crate::model::slot::{InternalBidRequest, SlotParams};
use crate::wire::request::ServerRequest;
use crate::wire::response::ServerResponse;

use interpreter::Interpretation;
use user_sync::{SyncOptions, UserSync};

pub struct AdmaticAdapter {
    config: AdapterConfig,
}

impl AdmaticAdapter {
    pub fn new(config: AdapterConfig) -> Self {
        Self { config }
    }

    pub fn code(&self) -> &str {
        &self.config.bidder_code
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn supported_media_types(&self) -> &'static [MediaType] {
        &MediaType::SUPPORTED
    }

    pub fn is_bid_request_valid(&self, params: &SlotParams) -> bool {
        params.is_valid()
    }

    /// 一批广告位合成一个 POST 请求
    pub fn build_requests(
        &self,
        slots: &[InternalBidRequest],
        context: &AuctionContext,
    ) -> Result<ServerRequest, AdapterError> {
        let data = request_builder::build_wire_request(slots, context, &self.config.sdk)?;
        Ok(ServerRequest {
            method: "POST".to_string(),
            url: self.config.endpoint_url.clone(),
            data,
            bidder: self.config.bidder_code.clone(),
        })
    }

    pub fn interpret_response(&self, response: &ServerResponse, slots: &[InternalBidRequest]) -> Vec<NormalizedBid> {
        self.interpret_response_detailed(response, slots).bids
    }

    /// 同 `interpret_response`，额外返回被丢弃的 offer
    pub fn interpret_response_detailed(
        &self,
        response: &ServerResponse,
        slots: &[InternalBidRequest],
    ) -> Interpretation {
        interpreter::interpret_wire_response(
            response,
            slots,
            &self.config.bidder_code,
            &self.config.brand_categories,
        )
    }

    pub fn get_user_syncs(&self, options: SyncOptions, response_count: usize) -> Vec<UserSync> {
        user_sync::user_syncs(
            options,
            response_count,
            &self.config.iframe_sync_url,
            &self.config.image_sync_url,
        )
    }
}
