// src/adapter/native.rs

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};

use crate::model::slot::NativeAssetRequest;

/// 发送给 AdMatic 的原生广告 layout：服务端字段名 -> 参数
pub type NativeLayout = BTreeMap<String, Map<String, Value>>;

/// 素材 key 到服务端字段的映射项
#[derive(Debug, Clone)]
pub struct NativeMapping {
    pub server_name: &'static str,
    /// 总是合并进请求的参数
    pub required_params: Option<Map<String, Value>>,
    /// 调用方除必需参数外什么都没给时补上的参数
    pub minimum_params: Option<Map<String, Value>>,
}

impl NativeMapping {
    fn rename(server_name: &'static str) -> Self {
        Self {
            server_name,
            required_params: None,
            minimum_params: None,
        }
    }

    fn with_defaults(server_name: &'static str, required: Value, minimum: Value) -> Self {
        Self {
            server_name,
            required_params: required.as_object().cloned(),
            minimum_params: minimum.as_object().cloned(),
        }
    }
}

static NATIVE_MAPPING: Lazy<HashMap<&'static str, NativeMapping>> = Lazy::new(|| {
    HashMap::from([
        ("body", NativeMapping::rename("description")),
        ("body2", NativeMapping::rename("desc2")),
        ("cta", NativeMapping::rename("ctatext")),
        (
            "image",
            NativeMapping::with_defaults("main_image", json!({"required": true}), json!({"sizes": [{}]})),
        ),
        (
            "icon",
            NativeMapping::with_defaults("icon", json!({"required": true}), json!({"sizes": [{}]})),
        ),
        ("sponsoredBy", NativeMapping::rename("sponsored_by")),
        ("privacyLink", NativeMapping::rename("privacy_link")),
        ("salePrice", NativeMapping::rename("saleprice")),
        ("displayUrl", NativeMapping::rename("displayurl")),
    ])
});

/// 查找映射项，没有映射的 key 原样透传
pub fn lookup(key: &str) -> Option<&'static NativeMapping> {
    NATIVE_MAPPING.get(key)
}

pub fn build_native_layout(requested: &NativeAssetRequest) -> NativeLayout {
    requested
        .iter()
        .map(|(key, params)| {
            let Some(mapping) = lookup(key) else {
                return (key.clone(), params.clone());
            };

            let mut merged = mapping.required_params.clone().unwrap_or_default();
            merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));

            if let (Some(required), Some(minimum)) = (&mapping.required_params, &mapping.minimum_params) {
                let has_extra = params.keys().any(|k| !required.contains_key(k));
                if !has_extra {
                    merged.extend(minimum.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }

            (mapping.server_name.to_string(), merged)
        })
        .collect()
}
