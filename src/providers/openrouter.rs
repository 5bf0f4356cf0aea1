use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client as HttpClient;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::{
    artifact::ImageArtifact,
    config::OpenRouterConfig,
    errors::{DriverError, ImageOperation, Result},
    pricing::{CostReport, PricingTable},
    wire::{
        payload::{ImageRequestParams, ModelFamily},
        resolve_size,
        response::{DEFAULT_SHAPE_ORDER, ResponseShape, WireResponse},
    },
};

/// OpenRouter 网关的文生图驱动
///
/// 同一网关背后挂着多个模型族，载荷形状按模型前缀分发，响应按已知形状
/// 优先序解析，调用结束后按内置费率表估算本次成本。
///
/// # 使用示例
///
/// ```no_run
/// let mut driver = OpenRouterImageDriver::from_config(&config, None)?;
/// let artifact = driver
///     .text_to_image(&["a red fox in snow".to_string()], None)
///     .await?;
/// if let Some(cost) = driver.last_generation_cost() {
///     println!("${:.6}", cost.total_cost_usd);
/// }
/// ```
pub struct OpenRouterImageDriver {
    http_client: HttpClient,
    config: OpenRouterConfig,
    model: String,
    pricing: PricingTable,
    shape_order: Vec<ResponseShape>,
    last_generation_cost: Option<CostReport>,
}

impl OpenRouterImageDriver {
    pub fn from_config(config: &OpenRouterConfig, model_override: Option<&str>) -> Result<Self> {
        let http_client = HttpClient::builder()
            .user_agent("OpenRouterImageAPI/0.1")
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            model: model_override
                .map(|value| value.to_string())
                .unwrap_or_else(|| config.model.clone()),
            config: config.clone(),
            pricing: PricingTable::builtin(),
            shape_order: DEFAULT_SHAPE_ORDER.to_vec(),
            last_generation_cost: None,
        })
    }

    /// 替换费率表，用于自定义价目或测试
    pub fn with_pricing(mut self, pricing: PricingTable) -> Self {
        self.pricing = pricing;
        self
    }

    /// 替换响应形状的匹配优先序
    pub fn with_shape_order(mut self, shape_order: Vec<ResponseShape>) -> Self {
        self.shape_order = shape_order;
        self
    }

    /// 最近一次成功生成的成本报告，后写覆盖，非历史记录
    pub fn last_generation_cost(&self) -> Option<&CostReport> {
        self.last_generation_cost.as_ref()
    }

    pub async fn text_to_image(
        &mut self,
        prompts: &[String],
        _negative_prompts: Option<&[String]>,
    ) -> Result<ImageArtifact> {
        let prompt = prompts.join(", ");
        if prompt.is_empty() {
            return Err(DriverError::other("提示词为空"));
        }

        let family = ModelFamily::for_model(&self.model);
        let params = ImageRequestParams {
            model: &self.model,
            prompt: &prompt,
            size: &self.config.image_size,
            aspect_ratio: self.config.aspect_ratio.as_deref(),
            quality: &self.config.quality,
            style: &self.config.style,
        };
        let payload = family.build_payload(&params)?;

        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.endpoint
        );
        debug!(target: "openrouter", model = %self.model, family = ?family, "发送图像生成请求");

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriverError::UpstreamRequestFailed { status, body });
        }

        let text = response.text().await?;
        let body = WireResponse::decode(&text)?;

        self.assemble_artifact(&body, &prompt)
    }

    /// 解码后的响应体到图像制品的组装：取图、计价、写元数据
    fn assemble_artifact(&mut self, body: &WireResponse, prompt: &str) -> Result<ImageArtifact> {
        let b64 = body.extract_base64(&self.shape_order)?;
        let data = BASE64_STANDARD.decode(b64.as_bytes())?;

        let usage = body.usage();
        let cost = self.pricing.cost(&usage, &self.model);
        let (width, height) = resolve_size(&self.config.image_size);

        let mut metadata = Map::new();
        metadata.insert("prompt".to_string(), Value::String(prompt.to_string()));
        metadata.insert("model".to_string(), Value::String(self.model.clone()));
        metadata.insert(
            "usage".to_string(),
            json!({
                "prompt_tokens": cost.usage.prompt_tokens,
                "completion_tokens": cost.usage.completion_tokens,
                "input_images": cost.usage.input_images,
                "output_images": cost.usage.output_images,
                "total_cost_usd": cost.total_cost_usd,
                "model_used": cost.model_used,
            }),
        );

        debug!(
            target: "openrouter",
            bytes = data.len(),
            cost_usd = cost.total_cost_usd,
            "图像生成完成"
        );

        let artifact = ImageArtifact::with_metadata(data, "png", width, height, metadata);
        self.last_generation_cost = Some(cost);
        Ok(artifact)
    }

    pub async fn image_inpainting(
        &mut self,
        _prompts: &[String],
        _image: &[u8],
    ) -> Result<ImageArtifact> {
        Err(DriverError::unsupported(ImageOperation::Inpainting))
    }

    pub async fn image_outpainting(
        &mut self,
        _prompts: &[String],
        _image: &[u8],
    ) -> Result<ImageArtifact> {
        Err(DriverError::unsupported(ImageOperation::Outpainting))
    }

    pub async fn image_variation(&mut self, _image: &[u8]) -> Result<ImageArtifact> {
        Err(DriverError::unsupported(ImageOperation::Variation))
    }
}
