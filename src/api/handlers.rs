use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::adapter::interpreter::Interpretation;
use crate::adapter::user_sync::{SyncOptions, UserSync};
use crate::logging::exchange_log::ExchangeLog;
use crate::model::bid::NormalizedBid;
use crate::model::context::AuctionContext;
use crate::model::slot::InternalBidRequest;
use crate::wire::request::ServerRequest;
use crate::wire::response::ServerResponse;
use crate::AppState;

#[derive(Deserialize, Debug)]
pub struct BuildPayload {
    pub slots: Vec<InternalBidRequest>,
    #[serde(default)]
    pub context: AuctionContext,
}

#[derive(Deserialize, Debug)]
pub struct InterpretPayload {
    pub response: ServerResponse,
    pub slots: Vec<InternalBidRequest>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserSyncPayload {
    #[serde(default)]
    pub sync_options: SyncOptions,
    #[serde(default)]
    pub response_count: usize,
}

#[derive(Serialize, Debug)]
pub struct AuctionResult {
    pub bids: Vec<NormalizedBid>,
    pub rejected_slots: Vec<String>,
}

/// 只保留 pid / wid 齐全的广告位，返回 (合法, 被拒绝的 bidId)
fn split_valid(state: &AppState, slots: Vec<InternalBidRequest>) -> (Vec<InternalBidRequest>, Vec<String>) {
    let (valid, invalid): (Vec<_>, Vec<_>) = slots
        .into_iter()
        .partition(|slot| state.adapter.is_bid_request_valid(&slot.params));
    let rejected = invalid.into_iter().map(|slot| slot.bid_id).collect();
    (valid, rejected)
}

/// **只构建请求，不发送**
pub async fn handle_build(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BuildPayload>,
) -> Result<Json<ServerRequest>, (StatusCode, Json<Value>)> {
    let (slots, rejected) = split_valid(&state, payload.slots);
    if !rejected.is_empty() {
        warn!(rejected = ?rejected, "bid requests missing pid or wid");
    }

    state
        .adapter
        .build_requests(&slots, &payload.context)
        .map(Json)
        .map_err(|e| (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string(), "rejected": rejected }))))
}

/// **解析宿主转交的 AdMatic 响应**
pub async fn handle_interpret(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<InterpretPayload>,
) -> Json<Vec<NormalizedBid>> {
    Json(state.adapter.interpret_response(&payload.response, &payload.slots))
}

/// **完整往返：校验、构建、发送、解析**
pub async fn handle_auction(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BuildPayload>,
) -> (StatusCode, Json<AuctionResult>) {
    let (slots, rejected_slots) = split_valid(&state, payload.slots);

    let request = match state.adapter.build_requests(&slots, &payload.context) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "no admatic request built");
            return (
                StatusCode::NO_CONTENT,
                Json(AuctionResult { bids: vec![], rejected_slots }),
            );
        }
    };

    let mut exchange_log = ExchangeLog::new(&request.data.auction_id, slots.len());
    let (response, elapsed) = state.client.send(&request).await;

    let result: Interpretation = state.adapter.interpret_response_detailed(&response, &slots);
    match &response.error {
        Some(error) => exchange_log.set_transport_error(error, elapsed),
        None => exchange_log.set_interpretation(&result, elapsed),
    }
    state.exchange_logger.log(&exchange_log).await;

    info!(
        auction_id = %request.data.auction_id,
        bids = result.bids.len(),
        dropped = result.dropped.len(),
        "admatic auction finished"
    );

    let status = if result.bids.is_empty() { StatusCode::NO_CONTENT } else { StatusCode::OK };
    (status, Json(AuctionResult { bids: result.bids, rejected_slots }))
}

pub async fn handle_user_sync(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UserSyncPayload>,
) -> Json<Vec<UserSync>> {
    Json(state.adapter.get_user_syncs(payload.sync_options, payload.response_count))
}
