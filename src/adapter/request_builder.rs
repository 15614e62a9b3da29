// src/adapter/request_builder.rs

use serde_json::{Map, Value};
use tracing::debug;

use crate::adapter::native::build_native_layout;
use crate::adapter::sizes::{normalize_sizes, Size};
use crate::error::AdapterError;
use crate::model::context::{AuctionContext, GdprConsent, RefererInfo};
use crate::model::media_type::MediaType;
use crate::model::slot::InternalBidRequest;
use crate::wire::request::{ReferrerDetection, Sdk, WireEntry, WireGdprConsent, WireNative, WireRequest};

/// 允许透传到 video{} 的参数
pub const VIDEO_TARGETING: [&str; 8] = [
    "id",
    "mimes",
    "minduration",
    "maxduration",
    "startdelay",
    "skippable",
    "playback_method",
    "frameworks",
];

/// 把一批已校验的广告位和拍卖上下文组装成一个 AdMatic 请求
pub fn build_wire_request(
    slots: &[InternalBidRequest],
    context: &AuctionContext,
    sdk: &Sdk,
) -> Result<WireRequest, AdapterError> {
    let first = slots.first().ok_or(AdapterError::EmptyBatch)?;

    let request: Vec<WireEntry> = slots.iter().map(build_entry).collect();

    debug!(
        auction_id = %first.auction_id,
        slots = request.len(),
        "built admatic wire request"
    );

    Ok(WireRequest {
        request,
        sdk: sdk.clone(),
        auction_id: first.auction_id.clone(),
        bidder: first.bidder.clone(),
        bidder_request_id: first.bidder_request_id.clone(),
        pid: first.params.pid.clone().unwrap_or_default(),
        wid: first.params.wid.clone().unwrap_or_default(),
        url: context.referer_info.as_ref().map(|r| r.referer.clone()),
        nocount: first.params.nocount.clone(),
        screen: context.screen.into(),
        gdpr_consent: context.gdpr_consent.as_ref().map(gdpr_block),
        referrer_detection: context.referer_info.as_ref().map(referrer_block),
    })
}

fn build_entry(slot: &InternalBidRequest) -> WireEntry {
    let mut sizes = normalize_sizes(&slot.sizes);
    let primary_size = sizes.first().copied();
    let mut ad_types = Vec::new();
    let mut require_asset_url = None;
    let mut native = None;

    if slot.wants_video() {
        ad_types.push(MediaType::Video);
    }
    if slot.requires_asset_url() {
        require_asset_url = Some(true);
    }

    if slot.wants_native() {
        ad_types.push(MediaType::Native);
        if sizes.is_empty() {
            sizes = vec![Size::new(1.0, 1.0)];
        }
        if let Some(assets) = &slot.params.native_params {
            native = Some(WireNative {
                layouts: vec![build_native_layout(assets)],
            });
        }
    }

    if slot.wants_banner() {
        ad_types.push(MediaType::Banner);
    }

    WireEntry {
        ad_unit_code: slot.ad_unit_code.clone(),
        bid_id: slot.bid_id.clone(),
        transaction_id: slot.transaction_id.clone(),
        primary_size,
        sizes,
        ad_types,
        bidfloor: slot.params.bidfloor.filter(|f| *f != 0.0 && !f.is_nan()),
        require_asset_url,
        video: slot.params.video.as_ref().map(video_targeting),
        native,
    }
}

fn video_targeting(params: &Map<String, Value>) -> Map<String, Value> {
    params
        .iter()
        .filter(|(key, _)| VIDEO_TARGETING.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn gdpr_block(consent: &GdprConsent) -> WireGdprConsent {
    WireGdprConsent {
        consent_string: consent.consent_string.clone(),
        consent_required: consent.gdpr_applies,
    }
}

fn referrer_block(info: &RefererInfo) -> ReferrerDetection {
    ReferrerDetection {
        rd_ref: urlencoding::encode(&info.referer).into_owned(),
        rd_top: info.reached_top,
        rd_ifs: info.num_iframes,
        rd_stk: info
            .stack
            .iter()
            .map(|url| urlencoding::encode(url).into_owned())
            .collect::<Vec<_>>()
            .join(","),
    }
}
