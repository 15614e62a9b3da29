// src/adapter/sizes.rs

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// 规范化后的广告位尺寸。
///
/// 无法解析的维度保留为 NaN，序列化时输出为 `null`。
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct Size {
    #[serde(serialize_with = "serialize_dimension", deserialize_with = "deserialize_dimension")]
    pub width: f64,
    #[serde(serialize_with = "serialize_dimension", deserialize_with = "deserialize_dimension")]
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// 两个维度都是有效数字
    pub fn is_numeric(&self) -> bool {
        !self.width.is_nan() && !self.height.is_nan()
    }
}

// NaN != NaN，比较时把两个 NaN 视为相同
impl PartialEq for Size {
    fn eq(&self, other: &Self) -> bool {
        let same = |a: f64, b: f64| a == b || (a.is_nan() && b.is_nan());
        same(self.width, other.width) && same(self.height, other.height)
    }
}

fn serialize_dimension<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() || value.is_infinite() {
        serializer.serialize_none()
    } else {
        serializer.serialize_i64(*value as i64)
    }
}

fn deserialize_dimension<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// 把 `[w, h]` 或 `[[w, h], ...]` 转成有序的尺寸列表。
/// 非数组输入返回空列表。
pub fn normalize_sizes(requested: &Value) -> Vec<Size> {
    let Some(items) = requested.as_array() else {
        return Vec::new();
    };

    if items.len() == 2 && !items[0].is_array() {
        return vec![Size::new(parse_int(&items[0]), parse_int(&items[1]))];
    }

    items
        .iter()
        .map(|item| match item.as_array() {
            Some(pair) => Size::new(
                pair.first().map_or(f64::NAN, parse_int),
                pair.get(1).map_or(f64::NAN, parse_int),
            ),
            None => Size::new(f64::NAN, f64::NAN),
        })
        .collect()
}

/// 整数前缀解析：数字向零取整，字符串取前导的十进制数字，其余为 NaN
fn parse_int(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map_or(f64::NAN, f64::trunc),
        Value::String(s) => parse_int_prefix(s),
        _ => f64::NAN,
    }
}

fn parse_int_prefix(s: &str) -> f64 {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<f64>() {
        Ok(n) if negative => -n,
        Ok(n) => n,
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_bare_pair_becomes_single_entry() {
        assert_eq!(normalize_sizes(&json!([300, 250])), vec![Size::new(300.0, 250.0)]);
    }

    #[test]
    fn test_pair_list_keeps_order() {
        assert_eq!(
            normalize_sizes(&json!([[300, 250], [728, 90]])),
            vec![Size::new(300.0, 250.0), Size::new(728.0, 90.0)]
        );
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        assert_eq!(normalize_sizes(&json!(["300", "250px"])), vec![Size::new(300.0, 250.0)]);
        assert_eq!(normalize_sizes(&json!([[" 320", "50"]])), vec![Size::new(320.0, 50.0)]);
        assert_eq!(normalize_sizes(&json!([300.9, 250.2])), vec![Size::new(300.0, 250.0)]);
    }

    #[test]
    fn test_non_array_input_is_empty() {
        assert!(normalize_sizes(&json!(null)).is_empty());
        assert!(normalize_sizes(&json!({"w": 300})).is_empty());
        assert!(normalize_sizes(&json!("300x250")).is_empty());
        assert!(normalize_sizes(&json!(300)).is_empty());
        assert!(normalize_sizes(&json!([])).is_empty());
    }

    #[test]
    fn test_malformed_entries_become_nan() {
        let sizes = normalize_sizes(&json!(["abc", 250]));
        assert_eq!(sizes.len(), 1);
        assert!(sizes[0].width.is_nan());
        assert_eq!(sizes[0].height, 250.0);
        assert!(!sizes[0].is_numeric());

        let sizes = normalize_sizes(&json!([[300, 250], "728x90", [true]]));
        assert_eq!(sizes.len(), 3);
        assert!(sizes[0].is_numeric());
        assert!(sizes[1].width.is_nan() && sizes[1].height.is_nan());
        assert!(sizes[2].width.is_nan() && sizes[2].height.is_nan());
    }

    #[test]
    fn test_serialization_uses_integers_and_null() {
        let encoded = serde_json::to_value(Size::new(300.0, f64::NAN)).unwrap();
        assert_eq!(encoded, json!({"width": 300, "height": null}));
    }

    proptest! {
        #[test]
        fn prop_pair_list_preserves_length_and_order(pairs in prop::collection::vec((1u32..2000, 1u32..2000), 0..8)) {
            // 恰好两项且首项不是数组才是裸尺寸，这里每项都是数组
            let input = Value::Array(pairs.iter().map(|(w, h)| json!([w, h])).collect());
            let sizes = normalize_sizes(&input);
            prop_assert_eq!(sizes.len(), pairs.len());
            for (size, (w, h)) in sizes.iter().zip(pairs.iter()) {
                prop_assert_eq!(size.width, *w as f64);
                prop_assert_eq!(size.height, *h as f64);
            }
        }
    }
}
