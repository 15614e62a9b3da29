// src/adapter/interpreter.rs

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error};

use crate::adapter::renderer::RendererBinding;
use crate::error::OfferError;
use crate::model::bid::{AdpodInfo, BannerPayload, BidMeta, BidPayload, NativeAd, NormalizedBid, VideoPayload};
use crate::model::media_type::{MediaType, VideoContext};
use crate::model::slot::InternalBidRequest;
use crate::wire::response::{Ad, RtbNative, RtbVideo, ServerResponse, Tag};

pub const DEFAULT_TTL: u32 = 300;
pub const VIDEO_TTL: u32 = 3600;

/// 解析结果：成功的出价，以及被丢弃的 offer（仅用于日志）
#[derive(Serialize, Debug, Default)]
pub struct Interpretation {
    pub bids: Vec<NormalizedBid>,
    pub dropped: Vec<DroppedOffer>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DroppedOffer {
    pub uuid: Option<String>,
    pub reason: String,
}

/// 解析 AdMatic 响应。
///
/// 传输错误或没有响应体时返回空结果；单个 tag 的任何问题只会丢弃该 tag，
/// 不会影响其它 tag，也不会向上返回错误。
pub fn interpret_wire_response(
    response: &ServerResponse,
    slots: &[InternalBidRequest],
    bidder_code: &str,
    brand_categories: &HashMap<String, String>,
) -> Interpretation {
    let mut result = Interpretation::default();

    let body = match (&response.error, &response.body) {
        (None, Some(body)) => body,
        (error, _) => {
            let mut message = format!("in response for {} adapter", bidder_code);
            if let Some(error) = error {
                message.push_str(&format!(": {}", error));
            }
            error!("{}", message);
            return result;
        }
    };

    for raw in body.tags.iter().flatten() {
        let tag = match Tag::from_raw(raw) {
            Ok(Some(tag)) => tag,
            Ok(None) => continue,
            Err(reason) => {
                result.drop_offer(raw.get("uuid").and_then(Value::as_str).map(String::from), reason);
                continue;
            }
        };

        match interpret_tag(raw, &tag, slots, brand_categories) {
            Ok(bid) => result.bids.push(bid),
            Err(reason) => result.drop_offer(tag.uuid.clone(), reason),
        }
    }

    result
}

impl Interpretation {
    fn drop_offer(&mut self, uuid: Option<String>, reason: OfferError) {
        debug!(uuid = ?uuid, reason = %reason, "admatic offer dropped");
        self.dropped.push(DroppedOffer {
            uuid,
            reason: reason.to_string(),
        });
    }
}

fn interpret_tag(
    raw: &Value,
    tag: &Tag,
    slots: &[InternalBidRequest],
    brand_categories: &HashMap<String, String>,
) -> Result<NormalizedBid, OfferError> {
    let ad = tag.rtb_offer()?;

    let cpm = ad.cpm.ok_or(OfferError::MissingPrice)?;
    if cpm == 0.0 {
        return Err(OfferError::ZeroPrice);
    }

    let ad_type = ad.ad_type.as_deref().unwrap_or_default();
    if !MediaType::SUPPORTED.iter().any(|m| m.as_str() == ad_type) {
        return Err(OfferError::UnsupportedAdType(ad_type.to_string()));
    }

    let uuid = tag.uuid.as_deref().unwrap_or_default();
    let slot = slots
        .iter()
        .find(|s| s.bid_id == uuid)
        .ok_or_else(|| OfferError::UnknownRequest(uuid.to_string()))?;

    new_bid(raw, &ad, cpm, slot, brand_categories)
}

fn new_bid(
    raw: &Value,
    ad: &Ad,
    cpm: f64,
    slot: &InternalBidRequest,
    brand_categories: &HashMap<String, String>,
) -> Result<NormalizedBid, OfferError> {
    let rtb = ad.rtb.as_ref().ok_or(OfferError::NoRtbOffer)?;

    let mut bid = NormalizedBid {
        request_id: slot.bid_id.clone(),
        cpm,
        creative_id: ad.creative_id.clone(),
        deal_id: ad.deal_id.clone(),
        currency: ad.currency.clone(),
        net_revenue: true,
        ttl: DEFAULT_TTL,
        ad_unit_code: slot.ad_unit_code.clone(),
        media_type: MediaType::from_ad_type(ad.ad_type.as_deref().unwrap_or_default()),
        payload: BidPayload::Banner(BannerPayload::default()),
        meta: None,
        renderer: None,
    };

    if let Some(video) = &rtb.video {
        bid.ttl = VIDEO_TTL;
        let mut payload = VideoPayload {
            width: video.player_width,
            height: video.player_height,
            vast_url: video.asset_url.clone(),
            vast_imp_url: ad.notify_url.clone(),
            video: None,
        };

        if slot.video_context() == Some(VideoContext::Adpod) {
            bid.meta = Some(BidMeta {
                iab_sub_cat_id: ad
                    .brand_category_id
                    .as_ref()
                    .and_then(category_key)
                    .and_then(|id| brand_categories.get(&id).cloned()),
            });
            payload.video = Some(adpod_info(video));
        }

        if let Some(url) = &ad.renderer_url {
            bid.renderer = Some(RendererBinding {
                id: ad.renderer_id.clone(),
                url: url.clone(),
                config: slot.renderer_options(),
                ad_unit_code: slot.ad_unit_code.clone(),
                ad_response: outstream_ad_response(raw),
            });
        }

        bid.payload = BidPayload::Video(payload);
    } else if let Some(native) = &rtb.native {
        bid.payload = BidPayload::Native {
            native: native_ad(native),
        };
    } else {
        let banner = rtb.banner.as_ref().ok_or(OfferError::MissingPayload("banner"))?;
        let mut ad_markup = banner.content.clone();
        match impression_pixel(rtb.trackers.as_ref()) {
            Some(pixel) => ad_markup.push_str(&pixel),
            None => error!(request_id = %bid.request_id, "Error appending tracking pixel"),
        }
        bid.payload = BidPayload::Banner(BannerPayload {
            width: banner.width,
            height: banner.height,
            ad: ad_markup,
        });
    }

    Ok(bid)
}

fn adpod_info(video: &RtbVideo) -> AdpodInfo {
    AdpodInfo {
        context: VideoContext::Adpod,
        // 向下取整；负数与 NaN 饱和为 0
        duration_seconds: (video.duration_ms.unwrap_or_default() / 1000.0).floor() as u64,
    }
}

fn category_key(id: &Value) -> Option<String> {
    match id {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn native_ad(native: &RtbNative) -> NativeAd {
    let link = native.link.as_ref();
    NativeAd {
        title: native.title.clone(),
        body: native.desc.clone(),
        body2: native.desc2.clone(),
        cta: native.ctatext.clone(),
        rating: native.rating.clone(),
        sponsored_by: native.sponsored.clone(),
        privacy_link: native.privacy_link.clone(),
        address: native.address.clone(),
        downloads: native.downloads.clone(),
        likes: native.likes.clone(),
        phone: native.phone.clone(),
        price: native.price.clone(),
        sale_price: native.saleprice.clone(),
        click_url: link.and_then(|l| l.url.clone()),
        display_url: native.displayurl.clone(),
        click_trackers: link.and_then(|l| l.click_trackers.clone()),
        impression_trackers: native.impression_trackers.clone(),
        javascript_trackers: native.javascript_trackers.clone(),
        image: native.main_img.clone(),
        icon: native.icon.clone(),
    }
}

/// outstream 渲染器使用的 tag：`ad` 为第一个 ad，`ad.video` 为其 rtb.video
fn outstream_ad_response(raw: &Value) -> Value {
    let mut response = raw.clone();
    let first_ad = raw.get("ads").and_then(|ads| ads.get(0)).cloned();
    if let (Some(obj), Some(mut ad)) = (response.as_object_mut(), first_ad) {
        if let Some(video) = ad.get("rtb").and_then(|rtb| rtb.get("video")).cloned() {
            if let Some(ad_obj) = ad.as_object_mut() {
                ad_obj.insert("video".to_string(), video);
            }
        }
        obj.insert("ad".to_string(), ad);
    }
    response
}

/// 由第一个 tracker 的第一个展示地址生成隐藏像素，数据缺失或格式不对时返回 None
pub fn impression_pixel(trackers: Option<&Value>) -> Option<String> {
    let url = trackers?.get(0)?.get("impression_urls")?.get(0)?.as_str()?;
    Some(track_pixel_html(url))
}

pub fn track_pixel_html(url: &str) -> String {
    format!(
        "<div style=\"position:absolute;left:0px;top:0px;visibility:hidden;\"><img src=\"{}\"></div>",
        encode_uri(url)
    )
}

/// 编码完整 URI，保留 URI 保留字符
fn encode_uri(url: &str) -> String {
    const KEEP: &str = ";,/?:@&=+$-_.!~*'()#";
    let mut out = String::with_capacity(url.len());
    let mut buf = [0u8; 4];
    for c in url.chars() {
        if c.is_ascii_alphanumeric() || KEEP.contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::response::WireResponse;
    use serde_json::json;

    fn slot(bid_id: &str, media_types: Value) -> InternalBidRequest {
        serde_json::from_value(json!({
            "auctionId": "auction-1",
            "bidder": "admatic",
            "bidderRequestId": "req-1",
            "bidId": bid_id,
            "transactionId": "tx",
            "adUnitCode": format!("div-{bid_id}"),
            "sizes": [[300, 250]],
            "mediaTypes": media_types,
            "params": {"pid": "1", "wid": "2"},
            "renderer": {"options": {"skippable": true}}
        }))
        .unwrap()
    }

    fn response(tags: Value) -> ServerResponse {
        ServerResponse::ok(serde_json::from_value::<WireResponse>(json!({ "tags": tags })).unwrap())
    }

    fn interpret(resp: &ServerResponse, slots: &[InternalBidRequest]) -> Interpretation {
        interpret_wire_response(resp, slots, "admatic", &HashMap::new())
    }

    fn banner_tag(uuid: &str, cpm: f64) -> Value {
        json!({
            "uuid": uuid,
            "tag_id": 11,
            "ads": [{
                "ad_type": "banner",
                "cpm": cpm,
                "currency": "USD",
                "creative_id": 123,
                "deal_id": "deal-9",
                "rtb": {
                    "banner": {"width": 300, "height": 250, "content": "<div>ad</div>"},
                    "trackers": [{"impression_urls": ["https://t.example.com/imp?id=1&x=a b"]}]
                }
            }]
        })
    }

    #[test]
    fn test_transport_error_yields_no_bids() {
        let result = interpret(&ServerResponse::failed("timeout"), &[slot("b-1", json!({}))]);
        assert!(result.bids.is_empty());
        let result = interpret(&ServerResponse::default(), &[slot("b-1", json!({}))]);
        assert!(result.bids.is_empty());
    }

    #[test]
    fn test_missing_tags_yield_no_bids() {
        let resp = ServerResponse::ok(WireResponse::default());
        assert!(interpret(&resp, &[slot("b-1", json!({}))]).bids.is_empty());
    }

    #[test]
    fn test_banner_bid_with_pixel() {
        let result = interpret(&response(json!([banner_tag("b-1", 1.5)])), &[slot("b-1", json!({"banner": {}}))]);
        assert_eq!(result.bids.len(), 1);
        let bid = &result.bids[0];
        assert_eq!(bid.request_id, "b-1");
        assert_eq!(bid.cpm, 1.5);
        assert_eq!(bid.ttl, DEFAULT_TTL);
        assert!(bid.net_revenue);
        assert_eq!(bid.media_type, MediaType::Banner);
        assert_eq!(bid.ad_unit_code, "div-b-1");
        assert_eq!(bid.creative_id, Some(json!(123)));
        match &bid.payload {
            BidPayload::Banner(b) => {
                assert_eq!((b.width, b.height), (Some(300), Some(250)));
                assert!(b.ad.starts_with("<div>ad</div><div style="));
                assert!(b.ad.contains("https://t.example.com/imp?id=1&x=a%20b"));
            }
            other => panic!("expected banner payload, got {:?}", other),
        }
    }

    #[test]
    fn test_banner_without_trackers_keeps_markup() {
        let mut tag = banner_tag("b-1", 2.0);
        tag["ads"][0]["rtb"]["trackers"] = json!("broken");
        let result = interpret(&response(json!([tag])), &[slot("b-1", json!({}))]);
        assert_eq!(result.bids.len(), 1);
        match &result.bids[0].payload {
            BidPayload::Banner(b) => assert_eq!(b.ad, "<div>ad</div>"),
            other => panic!("expected banner payload, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_price_is_dropped() {
        let result = interpret(&response(json!([banner_tag("b-1", 0.0)])), &[slot("b-1", json!({}))]);
        assert!(result.bids.is_empty());
        assert_eq!(result.dropped[0].reason, OfferError::ZeroPrice.to_string());
    }

    #[test]
    fn test_unsupported_ad_type_is_dropped() {
        let mut tag = banner_tag("b-1", 1.0);
        tag["ads"][0]["ad_type"] = json!("audio");
        let result = interpret(&response(json!([tag])), &[slot("b-1", json!({}))]);
        assert!(result.bids.is_empty());
        assert_eq!(result.dropped[0].uuid.as_deref(), Some("b-1"));
    }

    #[test]
    fn test_unknown_uuid_drops_only_that_tag() {
        let tags = json!([banner_tag("nope", 1.0), null, banner_tag("b-2", 2.0), {"uuid": "b-3", "ads": 5}]);
        let slots = [slot("b-1", json!({})), slot("b-2", json!({}))];
        let result = interpret(&response(tags), &slots);
        assert_eq!(result.bids.len(), 1);
        assert_eq!(result.bids[0].request_id, "b-2");
        assert_eq!(result.dropped.len(), 2);
        assert_eq!(result.dropped[0].reason, OfferError::UnknownRequest("nope".into()).to_string());
        assert_eq!(result.dropped[1].uuid.as_deref(), Some("b-3"));
    }

    #[test]
    fn test_tag_without_rtb_offer_is_skipped() {
        let tags = json!([{"uuid": "b-1", "ads": [{"cpm": 1.0, "ad_type": "banner"}]}, {"uuid": "b-1"}]);
        let result = interpret(&response(tags), &[slot("b-1", json!({}))]);
        assert!(result.bids.is_empty());
    }

    #[test]
    fn test_bids_keep_tag_order() {
        let tags = json!([banner_tag("b-2", 2.0), banner_tag("b-1", 1.0)]);
        let slots = [slot("b-1", json!({})), slot("b-2", json!({}))];
        let ids: Vec<_> = interpret(&response(tags), &slots)
            .bids
            .into_iter()
            .map(|b| b.request_id)
            .collect();
        assert_eq!(ids, vec!["b-2", "b-1"]);
    }

    fn video_tag(uuid: &str, renderer: bool) -> Value {
        let mut ad = json!({
            "ad_type": "video",
            "cpm": 4.2,
            "currency": "EUR",
            "notify_url": "https://n.example.com/notify",
            "brand_category_id": 10,
            "rtb": {"video": {"player_width": 640, "player_height": 480, "asset_url": "https://v.example.com/vast.xml", "duration_ms": 30999}}
        });
        if renderer {
            ad["renderer_url"] = json!("https://cdn.example.com/outstream.js");
            ad["renderer_id"] = json!(2);
        }
        json!({"uuid": uuid, "tag_id": 77, "ads": [ad]})
    }

    #[test]
    fn test_instream_video_bid() {
        let slots = [slot("b-1", json!({"video": {"context": "instream"}}))];
        let result = interpret(&response(json!([video_tag("b-1", false)])), &slots);
        let bid = &result.bids[0];
        assert_eq!(bid.ttl, VIDEO_TTL);
        assert_eq!(bid.media_type, MediaType::Video);
        assert!(bid.renderer.is_none());
        assert!(bid.meta.is_none());
        match &bid.payload {
            BidPayload::Video(v) => {
                assert_eq!((v.width, v.height), (Some(640), Some(480)));
                assert_eq!(v.vast_url.as_deref(), Some("https://v.example.com/vast.xml"));
                assert_eq!(v.vast_imp_url.as_deref(), Some("https://n.example.com/notify"));
                assert!(v.video.is_none());
            }
            other => panic!("expected video payload, got {:?}", other),
        }
    }

    #[test]
    fn test_outstream_video_carries_renderer_binding() {
        let slots = [slot("b-1", json!({"video": {"context": "outstream"}}))];
        let result = interpret(&response(json!([video_tag("b-1", true)])), &slots);
        let binding = result.bids[0].renderer.as_ref().expect("renderer binding");
        assert_eq!(binding.url, "https://cdn.example.com/outstream.js");
        assert_eq!(binding.id, Some(json!(2)));
        assert_eq!(binding.config, json!({"skippable": true}));
        assert_eq!(binding.ad_unit_code, "div-b-1");
        assert_eq!(binding.ad_response["ad"]["video"]["player_width"], 640);
        assert_eq!(binding.ad_response["uuid"], "b-1");
    }

    #[test]
    fn test_adpod_video_gets_category_and_duration() {
        let slots = [slot("b-1", json!({"video": {"context": "adpod"}}))];
        let categories = HashMap::from([("10".to_string(), "IAB1-5".to_string())]);
        let result = interpret_wire_response(&response(json!([video_tag("b-1", false)])), &slots, "admatic", &categories);
        let bid = &result.bids[0];
        assert_eq!(bid.meta.as_ref().and_then(|m| m.iab_sub_cat_id.as_deref()), Some("IAB1-5"));
        match &bid.payload {
            BidPayload::Video(v) => assert_eq!(
                v.video,
                Some(AdpodInfo { context: VideoContext::Adpod, duration_seconds: 30 })
            ),
            other => panic!("expected video payload, got {:?}", other),
        }
    }

    #[test]
    fn test_fractional_duration_is_truncated() {
        let mut tag = video_tag("b-1", false);
        tag["ads"][0]["rtb"]["video"]["duration_ms"] = json!(15000.5);

        let adpod = [slot("b-1", json!({"video": {"context": "adpod"}}))];
        let result = interpret(&response(json!([tag.clone()])), &adpod);
        assert!(result.dropped.is_empty());
        match &result.bids[0].payload {
            BidPayload::Video(v) => assert_eq!(v.video.as_ref().map(|i| i.duration_seconds), Some(15)),
            other => panic!("expected video payload, got {:?}", other),
        }

        let instream = [slot("b-1", json!({"video": {"context": "instream"}}))];
        assert_eq!(interpret(&response(json!([tag])), &instream).bids.len(), 1);
    }

    #[test]
    fn test_negative_duration_saturates_to_zero() {
        let mut tag = video_tag("b-1", false);
        tag["ads"][0]["rtb"]["video"]["duration_ms"] = json!(-500.0);
        let slots = [slot("b-1", json!({"video": {"context": "adpod"}}))];
        match &interpret(&response(json!([tag])), &slots).bids[0].payload {
            BidPayload::Video(v) => assert_eq!(v.video.as_ref().map(|i| i.duration_seconds), Some(0)),
            other => panic!("expected video payload, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_sibling_ad_does_not_drop_offer() {
        let mut tag = video_tag("b-1", false);
        let offer = tag["ads"][0].clone();
        tag["ads"] = json!([{"ad_type": "banner", "cpm": "n/a"}, offer]);

        let slots = [slot("b-1", json!({"video": {"context": "instream"}}))];
        let result = interpret(&response(json!([tag])), &slots);
        assert!(result.dropped.is_empty());
        assert_eq!(result.bids.len(), 1);
        assert_eq!(result.bids[0].cpm, 4.2);
    }

    #[test]
    fn test_malformed_offer_drops_only_its_tag() {
        let mut broken = banner_tag("b-1", 1.0);
        broken["ads"][0]["rtb"]["banner"]["width"] = json!("wide");
        let slots = [slot("b-1", json!({})), slot("b-2", json!({}))];
        let result = interpret(&response(json!([broken, banner_tag("b-2", 2.0)])), &slots);
        assert_eq!(result.bids.len(), 1);
        assert_eq!(result.bids[0].request_id, "b-2");
        assert_eq!(result.dropped[0].uuid.as_deref(), Some("b-1"));
        assert!(result.dropped[0].reason.starts_with("malformed offer"));
    }

    #[test]
    fn test_native_bid_fields() {
        let tag = json!({
            "uuid": "b-1",
            "ads": [{
                "ad_type": "native",
                "cpm": 0.8,
                "rtb": {"native": {
                    "title": "Title",
                    "desc": "Body",
                    "desc2": "Body 2",
                    "ctatext": "Buy",
                    "rating": 4.5,
                    "sponsored": "Brand",
                    "privacy_link": "https://p.example.com",
                    "phone": "555",
                    "saleprice": "9.99",
                    "displayurl": "example.com",
                    "link": {"url": "https://click.example.com", "click_trackers": ["https://ct.example.com"]},
                    "impression_trackers": ["https://it.example.com"],
                    "main_img": {"url": "https://img.example.com/a.png", "width": 1200, "height": 627}
                }}
            }]
        });
        let result = interpret(&response(json!([tag])), &[slot("b-1", json!({"native": {}}))]);
        let bid = &result.bids[0];
        assert_eq!(bid.media_type, MediaType::Native);
        assert_eq!(bid.ttl, DEFAULT_TTL);
        match &bid.payload {
            BidPayload::Native { native } => {
                assert_eq!(native.title.as_deref(), Some("Title"));
                assert_eq!(native.body.as_deref(), Some("Body"));
                assert_eq!(native.body2.as_deref(), Some("Body 2"));
                assert_eq!(native.cta.as_deref(), Some("Buy"));
                assert_eq!(native.sponsored_by.as_deref(), Some("Brand"));
                assert_eq!(native.sale_price, Some(json!("9.99")));
                assert_eq!(native.click_url.as_deref(), Some("https://click.example.com"));
                assert_eq!(native.click_trackers, Some(vec!["https://ct.example.com".to_string()]));
                assert_eq!(native.image.as_ref().and_then(|i| i.width), Some(1200));
                assert!(native.icon.is_none());
            }
            other => panic!("expected native payload, got {:?}", other),
        }
    }

    #[test]
    fn test_banner_offer_without_payload_is_dropped() {
        let tag = json!({"uuid": "b-1", "ads": [{"ad_type": "banner", "cpm": 1.0, "rtb": {}}]});
        let result = interpret(&response(json!([tag])), &[slot("b-1", json!({}))]);
        assert!(result.bids.is_empty());
        assert_eq!(result.dropped[0].reason, OfferError::MissingPayload("banner").to_string());
    }

    #[test]
    fn test_pixel_helper() {
        assert!(impression_pixel(None).is_none());
        assert!(impression_pixel(Some(&json!([]))).is_none());
        assert!(impression_pixel(Some(&json!([{"impression_urls": []}]))).is_none());
        let pixel = impression_pixel(Some(&json!([{"impression_urls": ["https://a.example.com/i?x=1"]}]))).unwrap();
        assert_eq!(
            pixel,
            "<div style=\"position:absolute;left:0px;top:0px;visibility:hidden;\"><img src=\"https://a.example.com/i?x=1\"></div>"
        );
    }
}
