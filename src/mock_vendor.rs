use axum::{routing::post, serve, Router};
use rand::Rng;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::time::{sleep, Duration};
use tracing::info;
use uuid::Uuid;

use crate::model::media_type::MediaType;
use crate::wire::request::{WireEntry, WireRequest};
use crate::wire::response::{Ad, Rtb, RtbBanner, RtbNative, RtbVideo, Tag, WireResponse};

/// 模拟 AdMatic 竞价
/// 每个广告位按第一个 ad_type 随机生成出价，约一成广告位不出价（cpm 为 0）。
/// 请求体按 text/plain 发送，这里自行解析。
async fn handle_vendor_bid(body: String) -> axum::Json<WireResponse> {
    let request: WireRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            info!("Mock AdMatic received an unreadable request: {}", e);
            return axum::Json(WireResponse::default());
        }
    };
    info!(
        "Mock AdMatic received request: auction_id={}, slots={}",
        request.auction_id,
        request.request.len()
    );

    // 模拟处理延迟（20 ~ 120 毫秒）
    let delay_ms = rand::thread_rng().gen_range(20..120);
    sleep(Duration::from_millis(delay_ms)).await;

    let response = request
        .request
        .iter()
        .map(mock_tag)
        .collect::<Result<Vec<Tag>, _>>()
        .and_then(|tags| WireResponse::from_tags(&tags));
    match response {
        Ok(response) => axum::Json(response),
        Err(e) => {
            info!("Mock AdMatic failed to encode tags: {}", e);
            axum::Json(WireResponse::default())
        }
    }
}

fn mock_tag(entry: &WireEntry) -> serde_json::Result<Tag> {
    let mut rng = rand::thread_rng();
    let floor = entry.bidfloor.unwrap_or(0.5);
    let cpm = if rng.gen_bool(0.1) { 0.0 } else { floor * rng.gen_range(1.0..2.5) };
    let ad_type = entry.ad_types.first().copied().unwrap_or(MediaType::Banner);
    let creative_id = rng.gen_range(100_000..999_999u64);
    let (width, height) = entry
        .primary_size
        .filter(|s| s.is_numeric())
        .map(|s| (s.width as u32, s.height as u32))
        .unwrap_or((300, 250));

    let rtb = match ad_type {
        MediaType::Banner => Rtb {
            banner: Some(RtbBanner {
                width: Some(width),
                height: Some(height),
                content: format!("<div class=\"admatic-mock\">Mock AdMatic Banner {}</div>", creative_id),
            }),
            trackers: Some(json!([{
                "impression_urls": [format!("http://mock-admatic.local/imp?bid={}", entry.bid_id)]
            }])),
            ..Default::default()
        },
        MediaType::Video => Rtb {
            video: Some(RtbVideo {
                player_width: Some(640),
                player_height: Some(360),
                asset_url: Some(format!("http://mock-admatic.local/vast/{}.xml", creative_id)),
                content: None,
                duration_ms: Some(rng.gen_range(5_000.0..30_000.0)),
            }),
            ..Default::default()
        },
        MediaType::Native => Rtb {
            native: Some(RtbNative {
                title: Some("Mock AdMatic Native".to_string()),
                desc: Some("Native ad body".to_string()),
                ctatext: Some("Learn more".to_string()),
                sponsored: Some("AdMatic".to_string()),
                impression_trackers: Some(vec![format!("http://mock-admatic.local/imp?bid={}", entry.bid_id)]),
                ..Default::default()
            }),
            ..Default::default()
        },
    };

    let ad = Ad {
        rtb: Some(rtb),
        cpm: Some(cpm),
        ad_type: Some(ad_type.to_string()),
        creative_id: Some(json!(creative_id)),
        deal_id: None,
        currency: Some("USD".to_string()),
        renderer_url: None,
        renderer_id: None,
        notify_url: Some(format!("http://mock-admatic.local/notify/{}", Uuid::new_v4())),
        brand_category_id: None,
    };

    Ok(Tag {
        uuid: Some(entry.bid_id.clone()),
        tag_id: Some(json!(creative_id % 1000)),
        ads: vec![serde_json::to_value(ad)?],
    })
}

/// 启动模拟 AdMatic 服务，路由与正式地址一致：`/prebid/v3/bidrequest`
pub async fn start_mock_vendor_server(port: u16) -> std::io::Result<()> {
    let app = Router::new().route("/prebid/v3/bidrequest", post(handle_vendor_bid));

    let addr = format!("0.0.0.0:{}", port);
    info!("Mock AdMatic running at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    serve(listener, app).await
}
