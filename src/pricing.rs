use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 上游返回的用量计数，缺失字段按约定取默认值
/// (output_images 默认为 1，单张生成是最常见情况)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetrics {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub input_images: u64,
    #[serde(default = "default_output_images")]
    pub output_images: u64,
}

fn default_output_images() -> u64 {
    1
}

impl Default for UsageMetrics {
    fn default() -> Self {
        Self {
            prompt_tokens: 0,
            completion_tokens: 0,
            input_images: 0,
            output_images: default_output_images(),
        }
    }
}

/// 单模型费率，按每 1000 单位 (token 或图像) 计价
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitPrices {
    pub input_tokens: f64,
    pub output_tokens: f64,
    pub input_images: f64,
    pub output_images: f64,
}

/// 图像计数的计价口径，整表统一，不允许逐条目混用
///
/// 内置费率表按每 1000 张列价，使用 [`ImagePriceUnit::PerThousandImages`]；
/// 若调用方自建的表按单张列价，构造时选 [`ImagePriceUnit::PerImage`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePriceUnit {
    #[default]
    PerThousandImages,
    PerImage,
}

impl ImagePriceUnit {
    fn scale(&self, count: u64) -> f64 {
        match self {
            ImagePriceUnit::PerThousandImages => count as f64 / 1_000.0,
            ImagePriceUnit::PerImage => count as f64,
        }
    }
}

/// 单次调用的成本报告，构造后不再变更
#[derive(Debug, Clone, Serialize)]
pub struct CostReport {
    pub usage: UsageMetrics,
    pub total_cost_usd: f64,
    pub model_used: String,
}

/// 模型 -> 费率映射，查不到的模型退化到保守的默认条目，查询永不失败
#[derive(Debug, Clone)]
pub struct PricingTable {
    prices: HashMap<String, UnitPrices>,
    default: UnitPrices,
    image_unit: ImagePriceUnit,
}

impl PricingTable {
    pub fn new(default: UnitPrices, image_unit: ImagePriceUnit) -> Self {
        Self {
            prices: HashMap::new(),
            default,
            image_unit,
        }
    }

    /// OpenRouter 各图像模型的内置费率，单位为每 1K token / 每 1K 张
    ///
    /// OpenRouter 没有费率查询接口，价格调整后需要手动同步这张表。
    pub fn builtin() -> Self {
        let mut table = Self::new(
            UnitPrices {
                input_tokens: 0.0003,
                output_tokens: 0.0025,
                input_images: 1.0,
                output_images: 1.0,
            },
            ImagePriceUnit::PerThousandImages,
        );

        table.insert(
            "google/gemini-2.5-flash-image",
            UnitPrices {
                input_tokens: 0.0003,  // $0.30 / 1M 输入 token
                output_tokens: 0.0025, // $2.50 / 1M 输出 token
                input_images: 1.238,
                output_images: 0.03,
            },
        );
        table.insert(
            "google/gemini-2.5-flash-image-preview",
            UnitPrices {
                input_tokens: 0.0003,
                output_tokens: 0.0025,
                input_images: 1.238,
                output_images: 0.03,
            },
        );
        table.insert(
            "openai/gpt-5-image",
            UnitPrices {
                input_tokens: 0.01, // $10.00 / 1M
                output_tokens: 0.01,
                input_images: 0.01,
                output_images: 0.04,
            },
        );
        table.insert(
            "openai/gpt-5-image-mini",
            UnitPrices {
                input_tokens: 0.0025, // $2.50 / 1M
                output_tokens: 0.002, // $2.00 / 1M
                input_images: 0.0025,
                output_images: 0.008,
            },
        );

        table
    }

    pub fn insert(&mut self, model: impl Into<String>, prices: UnitPrices) {
        self.prices.insert(model.into(), prices);
    }

    pub fn prices_for(&self, model: &str) -> &UnitPrices {
        self.prices.get(model).unwrap_or(&self.default)
    }

    pub fn image_unit(&self) -> ImagePriceUnit {
        self.image_unit
    }

    /// 按表内费率对一次调用的用量计价
    ///
    /// total = prompt_tokens/1000 * input_tokens
    ///       + completion_tokens/1000 * output_tokens
    ///       + scale(input_images) * input_images
    ///       + scale(output_images) * output_images
    ///
    /// scale 由整表的 [`ImagePriceUnit`] 决定。
    pub fn cost(&self, usage: &UsageMetrics, model: &str) -> CostReport {
        let prices = self.prices_for(model);

        let total_cost_usd = (usage.prompt_tokens as f64 / 1_000.0) * prices.input_tokens
            + (usage.completion_tokens as f64 / 1_000.0) * prices.output_tokens
            + self.image_unit.scale(usage.input_images) * prices.input_images
            + self.image_unit.scale(usage.output_images) * prices.output_images;

        CostReport {
            usage: usage.clone(),
            total_cost_usd,
            model_used: model.to_string(),
        }
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::builtin()
    }
}
