use serde_json::{Map, Value};

/// 一次生成调用产出的图像制品，所有权交给调用方
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    pub data: Vec<u8>,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub metadata: Map<String, Value>,
}

impl ImageArtifact {
    pub fn with_metadata(
        data: Vec<u8>,
        format: impl Into<String>,
        width: u32,
        height: u32,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            data,
            format: format.into(),
            width,
            height,
            metadata,
        }
    }
}
