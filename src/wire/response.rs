use serde::Deserialize;

use crate::{
    errors::{DriverError, Result},
    pricing::UsageMetrics,
};

/// 已知的响应形状，同一逻辑调用可能以任一形状返回，取决于底层模型族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// data[0].b64_json — 图像生成 API 的直接形状
    DataB64Json,
    /// choices[0].message.images[0].image_url.url — 聊天补全形状，data URI 编码
    ChatImageDataUri,
}

/// 默认匹配顺序：先查直接形状，再查聊天形状
pub const DEFAULT_SHAPE_ORDER: [ResponseShape; 2] =
    [ResponseShape::DataB64Json, ResponseShape::ChatImageDataUri];

impl ResponseShape {
    /// 尝试按本形状从响应中取出 base64 图像串
    pub fn extract(&self, body: &WireResponse) -> Option<String> {
        match self {
            ResponseShape::DataB64Json => body.data.first()?.b64_json.clone(),
            ResponseShape::ChatImageDataUri => {
                let url = body
                    .choices
                    .first()?
                    .message
                    .as_ref()?
                    .images
                    .first()?
                    .image_url
                    .as_ref()?
                    .url
                    .as_str();
                data_uri_base64(url).map(str::to_string)
            }
        }
    }
}

/// data:image/...;base64,<payload> 取逗号后的载荷部分
fn data_uri_base64(url: &str) -> Option<&str> {
    if !url.starts_with("data:image") {
        return None;
    }
    url.split_once(',').map(|(_, b64)| b64)
}

/// 网关响应的宽容解码：两种形状的字段都可缺省
#[derive(Debug, Default, Deserialize)]
pub struct WireResponse {
    #[serde(default)]
    data: Vec<DataEntry>,
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<UsageMetrics>,
}

impl WireResponse {
    pub fn decode(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(DriverError::MalformedResponse)
    }

    /// 按给定优先序逐个尝试形状，全部落空报 NoImageDataFound
    pub fn extract_base64(&self, shape_order: &[ResponseShape]) -> Result<String> {
        shape_order
            .iter()
            .find_map(|shape| shape.extract(self))
            .ok_or(DriverError::NoImageDataFound)
    }

    /// usage 段缺失时按默认用量处理 (单张输出图)
    pub fn usage(&self) -> UsageMetrics {
        self.usage.clone().unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
struct DataEntry {
    #[serde(default)]
    b64_json: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireChoice {
    #[serde(default)]
    message: Option<WireMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMessage {
    #[serde(default)]
    images: Vec<WireImage>,
}

#[derive(Debug, Default, Deserialize)]
struct WireImage {
    #[serde(default)]
    image_url: Option<WireImageUrl>,
}

#[derive(Debug, Default, Deserialize)]
struct WireImageUrl {
    #[serde(default)]
    url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> WireResponse {
        WireResponse::decode(&value.to_string()).unwrap()
    }

    #[test]
    fn data_shape_yields_b64_json() {
        let body = decode(json!({ "data": [{ "b64_json": "QUJD" }] }));
        assert_eq!(body.extract_base64(&DEFAULT_SHAPE_ORDER).unwrap(), "QUJD");
    }

    #[test]
    fn chat_shape_yields_data_uri_payload() {
        let body = decode(json!({
            "choices": [{
                "message": {
                    "images": [{ "image_url": { "url": "data:image/png;base64,QUJD" } }]
                }
            }]
        }));
        assert_eq!(body.extract_base64(&DEFAULT_SHAPE_ORDER).unwrap(), "QUJD");
    }

    #[test]
    fn neither_shape_reports_no_image_data() {
        let body = decode(json!({ "choices": [{ "message": { "content": "no image" } }] }));
        assert!(matches!(
            body.extract_base64(&DEFAULT_SHAPE_ORDER),
            Err(DriverError::NoImageDataFound)
        ));
    }

    #[test]
    fn non_image_data_uri_is_ignored() {
        let body = decode(json!({
            "choices": [{
                "message": {
                    "images": [{ "image_url": { "url": "https://example.com/cat.png" } }]
                }
            }]
        }));
        assert!(matches!(
            body.extract_base64(&DEFAULT_SHAPE_ORDER),
            Err(DriverError::NoImageDataFound)
        ));
    }

    #[test]
    fn shape_order_decides_priority_when_both_present() {
        let body = decode(json!({
            "data": [{ "b64_json": "RkVGRQ==" }],
            "choices": [{
                "message": {
                    "images": [{ "image_url": { "url": "data:image/png;base64,QUJD" } }]
                }
            }]
        }));

        assert_eq!(body.extract_base64(&DEFAULT_SHAPE_ORDER).unwrap(), "RkVGRQ==");

        let reversed = [ResponseShape::ChatImageDataUri, ResponseShape::DataB64Json];
        assert_eq!(body.extract_base64(&reversed).unwrap(), "QUJD");
    }

    #[test]
    fn missing_usage_defaults_to_single_output_image() {
        let body = decode(json!({ "data": [{ "b64_json": "QUJD" }] }));
        let usage = body.usage();
        assert_eq!(usage.prompt_tokens, 0);
        assert_eq!(usage.output_images, 1);
    }

    #[test]
    fn usage_section_is_read_when_present() {
        let body = decode(json!({
            "data": [{ "b64_json": "QUJD" }],
            "usage": { "prompt_tokens": 100, "completion_tokens": 50 }
        }));
        let usage = body.usage();
        assert_eq!(usage.prompt_tokens, 100);
        assert_eq!(usage.completion_tokens, 50);
        assert_eq!(usage.input_images, 0);
        assert_eq!(usage.output_images, 1);
    }

    #[test]
    fn invalid_json_is_malformed_response() {
        assert!(matches!(
            WireResponse::decode("not json"),
            Err(DriverError::MalformedResponse(_))
        ));
    }
}
