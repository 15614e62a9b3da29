// src/config/adapters.rs

use serde_json::Result as JsonResult;
use std::collections::HashMap;
use std::fs;
use tracing::warn;

/// brand_category_id -> IAB 子类目映射的来源
pub trait CategorySource: Send + Sync {
    fn brand_categories(&self) -> HashMap<String, String>;
}

/// 从 JSON 文件读取映射，例如 `{"10": "IAB1-5"}`
pub struct FileCategorySource {
    pub file: String,
}

impl FileCategorySource {
    pub fn new(file: &str) -> Self {
        Self { file: file.to_string() }
    }
}

impl CategorySource for FileCategorySource {
    fn brand_categories(&self) -> HashMap<String, String> {
        let content = match fs::read_to_string(&self.file) {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %self.file, error = %e, "brand category file not readable, using empty table");
                return HashMap::new();
            }
        };
        let table: JsonResult<HashMap<String, String>> = serde_json::from_str(&content);
        table.unwrap_or_else(|e| {
            warn!(file = %self.file, error = %e, "brand category file is not a string map");
            HashMap::new()
        })
    }
}

/// 不提供任何映射
pub struct EmptyCategorySource;

impl CategorySource for EmptyCategorySource {
    fn brand_categories(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
