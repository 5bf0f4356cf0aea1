use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DriverError>;

/// 尚未实现的图像操作，调用方可直接 match，无需检查错误文本
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOperation {
    Inpainting,
    Outpainting,
    Variation,
}

impl ImageOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageOperation::Inpainting => "inpainting",
            ImageOperation::Outpainting => "outpainting",
            ImageOperation::Variation => "variation",
        }
    }
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("上游请求失败 ({status}): {body}")]
    UpstreamRequestFailed { status: StatusCode, body: String },

    #[error("响应 JSON 解析失败: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("响应中未找到 base64 图像数据")]
    NoImageDataFound,

    #[error("图像 Base64 解码失败: {0}")]
    InvalidImageData(#[from] base64::DecodeError),

    #[error("图像操作暂不支持: {}", .0.as_str())]
    UnsupportedOperation(ImageOperation),

    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON 序列化失败: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("内部错误: {0}")]
    Other(String),
}

impl DriverError {
    pub fn unsupported(operation: ImageOperation) -> Self {
        Self::UnsupportedOperation(operation)
    }

    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}

impl From<anyhow::Error> for DriverError {
    fn from(value: anyhow::Error) -> Self {
        Self::Other(value.to_string())
    }
}
