// src/adapter/renderer.rs

use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info, warn};

use crate::model::bid::NormalizedBid;

/// outstream 视频出价携带的渲染器绑定
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RendererBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// 外部渲染脚本地址
    pub url: String,
    /// 宿主在广告位上配置的 renderer.options
    pub config: Value,
    pub ad_unit_code: String,
    /// 渲染器需要的原始 tag，`ad` 指向第一个 ad，`ad.video` 指向其 rtb.video
    pub ad_response: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    Installed,
    Loaded,
    Playing,
    Ended,
}

/// 播放器上报的事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEvent {
    Impression,
    Loaded,
    Ended,
}

impl VideoEvent {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "impression" => Some(VideoEvent::Impression),
            "loaded" => Some(VideoEvent::Loaded),
            "ended" => Some(VideoEvent::Ended),
            _ => None,
        }
    }
}

/// 交给外部播放器的渲染参数
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OutstreamRenderRequest {
    pub tag_id: Option<Value>,
    pub sizes: Vec<(u32, u32)>,
    /// 渲染目标元素 id，即 adUnitCode
    pub target_id: String,
    pub uuid: Option<Value>,
    pub ad_response: Value,
    pub renderer_options: Value,
}

/// 外部视频渲染库
pub trait OutstreamPlayer {
    fn render_ad(&mut self, request: OutstreamRenderRequest);
}

/// 页面元素操作，播放结束时隐藏广告位
pub trait DisplayTarget {
    fn hide(&mut self, element_id: &str);
}

pub type RenderAction = Box<dyn FnOnce(&mut dyn OutstreamPlayer)>;

/// outstream 渲染器。
///
/// 外部脚本加载完成前提交的动作进入队列，加载完成时按提交顺序执行且只执行一次；
/// 加载后提交的动作立即执行。没有取消，一直运行到 `Ended`。
pub struct OutstreamRenderer {
    binding: RendererBinding,
    state: RendererState,
    pending: VecDeque<RenderAction>,
    player: Box<dyn OutstreamPlayer>,
    target: Box<dyn DisplayTarget>,
}

impl fmt::Debug for OutstreamRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutstreamRenderer")
            .field("binding", &self.binding)
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl OutstreamRenderer {
    pub fn install(
        binding: RendererBinding,
        player: Box<dyn OutstreamPlayer>,
        target: Box<dyn DisplayTarget>,
    ) -> Self {
        debug!(url = %binding.url, ad_unit = %binding.ad_unit_code, "outstream renderer installed");
        Self {
            binding,
            state: RendererState::Installed,
            pending: VecDeque::new(),
            player,
            target,
        }
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn binding(&self) -> &RendererBinding {
        &self.binding
    }

    pub fn config(&self) -> &Value {
        &self.binding.config
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// 提交一个渲染动作
    pub fn push(&mut self, action: RenderAction) {
        match self.state {
            RendererState::Installed => self.pending.push_back(action),
            RendererState::Loaded | RendererState::Playing => self.run(action),
            RendererState::Ended => {
                warn!(ad_unit = %self.binding.ad_unit_code, "render action after video ended, dropped");
            }
        }
    }

    /// 外部脚本加载完成，清空队列
    pub fn on_resource_loaded(&mut self) {
        if self.state != RendererState::Installed {
            return;
        }
        self.state = RendererState::Loaded;
        for action in std::mem::take(&mut self.pending) {
            self.run(action);
        }
    }

    /// 为出价排队一次 outstream 渲染
    pub fn render(&mut self, bid: &NormalizedBid) {
        let ad_response = &self.binding.ad_response;
        let request = OutstreamRenderRequest {
            tag_id: ad_response.get("tag_id").cloned(),
            sizes: bid.size().into_iter().collect(),
            target_id: bid.ad_unit_code.clone(),
            uuid: ad_response.get("uuid").cloned(),
            ad_response: ad_response.clone(),
            renderer_options: self.binding.config.clone(),
        };
        self.push(Box::new(move |player: &mut dyn OutstreamPlayer| player.render_ad(request)));
    }

    pub fn handle_video_event(&mut self, event: VideoEvent) {
        match event {
            VideoEvent::Impression => info!("AdMatic outstream video impression event"),
            VideoEvent::Loaded => info!("AdMatic outstream video loaded event"),
            VideoEvent::Ended => {
                info!("AdMatic outstream renderer video event");
                self.state = RendererState::Ended;
                self.target.hide(&self.binding.ad_unit_code);
            }
        }
    }

    fn run(&mut self, action: RenderAction) {
        action(self.player.as_mut());
        if self.state == RendererState::Loaded {
            self.state = RendererState::Playing;
        }
    }
}
