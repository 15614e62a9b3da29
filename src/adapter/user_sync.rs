// src/adapter/user_sync.rs

use serde::{Deserialize, Serialize};

/// 宿主允许的同步方式
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default)]
#[serde(rename_all = "camelCase")]
pub struct SyncOptions {
    #[serde(default)]
    pub iframe_enabled: bool,
    #[serde(default)]
    pub pixel_enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    Iframe,
    Image,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSync {
    #[serde(rename = "type")]
    pub sync_type: SyncType,
    pub url: String,
}

/// iframe 同步只看权限；图片同步还要求至少收到过一个响应
pub fn user_syncs(options: SyncOptions, response_count: usize, iframe_url: &str, image_url: &str) -> Vec<UserSync> {
    let mut syncs = Vec::new();
    if options.iframe_enabled {
        syncs.push(UserSync {
            sync_type: SyncType::Iframe,
            url: iframe_url.to_string(),
        });
    }
    if options.pixel_enabled && response_count > 0 {
        syncs.push(UserSync {
            sync_type: SyncType::Image,
            url: image_url.to_string(),
        });
    }
    syncs
}

#[cfg(test)]
mod tests {
    use super::*;

    const IFRAME: &str = "https://sync.example.com/iframe.html";
    const IMAGE: &str = "https://sync.example.com/pixel";

    #[test]
    fn test_iframe_sync_without_responses() {
        let opts = SyncOptions { iframe_enabled: true, pixel_enabled: true };
        let syncs = user_syncs(opts, 0, IFRAME, IMAGE);
        assert_eq!(syncs, vec![UserSync { sync_type: SyncType::Iframe, url: IFRAME.into() }]);
    }

    #[test]
    fn test_image_sync_needs_a_response() {
        let opts = SyncOptions { iframe_enabled: false, pixel_enabled: true };
        assert!(user_syncs(opts, 0, IFRAME, IMAGE).is_empty());
        let syncs = user_syncs(opts, 1, IFRAME, IMAGE);
        assert_eq!(syncs, vec![UserSync { sync_type: SyncType::Image, url: IMAGE.into() }]);
    }

    #[test]
    fn test_both_syncs() {
        let opts = SyncOptions { iframe_enabled: true, pixel_enabled: true };
        let syncs = user_syncs(opts, 3, IFRAME, IMAGE);
        assert_eq!(syncs.len(), 2);
        assert_eq!(syncs[0].sync_type, SyncType::Iframe);
        assert_eq!(syncs[1].sync_type, SyncType::Image);
        assert!(user_syncs(SyncOptions::default(), 3, IFRAME, IMAGE).is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let sync = UserSync { sync_type: SyncType::Image, url: IMAGE.into() };
        assert_eq!(
            serde_json::to_value(&sync).unwrap(),
            serde_json::json!({"type": "image", "url": IMAGE})
        );
    }
}
