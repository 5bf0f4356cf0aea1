use serde::Serialize;
use serde_json::Value;

use crate::errors::Result;

/// 厂商前缀 -> 模型族注册表，新增提供方只需追加条目，不改分支逻辑
const FAMILY_REGISTRY: &[(&str, ModelFamily)] = &[
    ("google/", ModelFamily::Gemini),
    ("openai/", ModelFamily::OpenAiImage),
];

/// 尺寸 -> 宽高比映射，按需扩充
const SIZE_TO_ASPECT_RATIO: &[(&str, &str)] = &[
    ("1024x1024", "1:1"),
    ("832x1248", "2:3"),
    ("1248x832", "3:2"),
    ("864x1184", "3:4"),
    ("1184x864", "4:3"),
    ("896x1152", "4:5"),
    ("1152x896", "5:4"),
    ("768x1344", "9:16"),
    ("1344x768", "16:9"),
    ("1536x672", "21:9"),
];

const DEFAULT_ASPECT_RATIO: &str = "1:1";

/// 模型标识前缀对应的行为族，决定发往网关的载荷形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    /// google/ 前缀：聊天消息 + image_config.aspect_ratio
    Gemini,
    /// openai/ 前缀：直接图像生成字段 (n/size/quality/style/response_format)
    OpenAiImage,
    /// 未注册前缀：最小公共字段，保底形状
    Generic,
}

impl ModelFamily {
    pub fn for_model(model: &str) -> Self {
        FAMILY_REGISTRY
            .iter()
            .find(|(prefix, _)| model.starts_with(prefix))
            .map(|(_, family)| *family)
            .unwrap_or(ModelFamily::Generic)
    }

    /// 按模型族构造 JSON 载荷，键序即结构体字段声明序
    pub fn build_payload(&self, params: &ImageRequestParams<'_>) -> Result<Value> {
        let messages = vec![ChatMessage {
            role: "user",
            content: params.prompt,
        }];
        let modalities = vec!["image", "text"];

        let value = match self {
            ModelFamily::Gemini => serde_json::to_value(GeminiImageRequest {
                model: params.model,
                messages,
                modalities,
                image_config: ImageConfig {
                    aspect_ratio: params
                        .aspect_ratio
                        .unwrap_or_else(|| aspect_ratio_for(params.size)),
                },
            })?,
            ModelFamily::OpenAiImage => serde_json::to_value(OpenAiImageRequest {
                model: params.model,
                messages,
                modalities,
                n: 1,
                size: params.size,
                quality: params.quality,
                style: params.style,
                response_format: "b64_json",
            })?,
            ModelFamily::Generic => serde_json::to_value(GenericImageRequest {
                model: params.model,
                messages,
                modalities,
                n: 1,
                size: params.size,
                response_format: "b64_json",
            })?,
        };

        Ok(value)
    }
}

/// 构造载荷所需的请求参数，全部借用，调用期内不可变
#[derive(Debug, Clone, Copy)]
pub struct ImageRequestParams<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub size: &'a str,
    pub aspect_ratio: Option<&'a str>,
    pub quality: &'a str,
    pub style: &'a str,
}

fn aspect_ratio_for(size: &str) -> &'static str {
    SIZE_TO_ASPECT_RATIO
        .iter()
        .find(|(entry, _)| *entry == size)
        .map(|(_, ratio)| *ratio)
        .unwrap_or(DEFAULT_ASPECT_RATIO)
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ImageConfig<'a> {
    aspect_ratio: &'a str,
}

#[derive(Serialize)]
struct GeminiImageRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    modalities: Vec<&'a str>,
    image_config: ImageConfig<'a>,
}

#[derive(Serialize)]
struct OpenAiImageRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    modalities: Vec<&'a str>,
    n: u32,
    size: &'a str,
    quality: &'a str,
    style: &'a str,
    response_format: &'a str,
}

#[derive(Serialize)]
struct GenericImageRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    modalities: Vec<&'a str>,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}
