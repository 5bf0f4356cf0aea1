use std::path::PathBuf;

use chrono::Utc;
use serde_json::{Map, Value, json};
use tokio::fs;
use uuid::Uuid;

use crate::{artifact::ImageArtifact, errors::Result};

/// 把生成的图像连同 .meta.json 边车文件落盘到制品目录
pub struct ArtifactWriter {
    root: PathBuf,
}

impl ArtifactWriter {
    pub async fn new(root: PathBuf) -> Result<Self> {
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub async fn persist(&self, artifact: &ImageArtifact) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).await?;
        let now = Utc::now();
        let timestamp = now.format("%Y%m%d_%H%M%S");
        let id = Uuid::new_v4();
        let base_name = format!("image_{}_{}", timestamp, &id.to_string()[..8]);

        let file_name = format!("{}.{}", base_name, artifact.format);
        let file_path = self.root.join(&file_name);
        fs::write(&file_path, &artifact.data).await?;

        let mut meta = Map::new();
        meta.insert("artifact".to_string(), json!(file_name));
        meta.insert("format".to_string(), json!(artifact.format));
        meta.insert("width".to_string(), json!(artifact.width));
        meta.insert("height".to_string(), json!(artifact.height));
        meta.insert("created_at".to_string(), json!(now.to_rfc3339()));

        if let Some(prompt) = artifact
            .metadata
            .get("prompt")
            .and_then(|value| value.as_str())
        {
            meta.insert("prompt".to_string(), Value::String(prompt.to_string()));
        }

        if !artifact.metadata.is_empty() {
            meta.insert(
                "metadata".to_string(),
                Value::Object(artifact.metadata.clone()),
            );
        }

        let meta_value = Value::Object(meta);

        let meta_path = self.root.join(format!("{}.meta.json", base_name));
        fs::write(&meta_path, serde_json::to_vec_pretty(&meta_value)?).await?;

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persist_writes_image_and_sidecar() {
        let dir = std::env::temp_dir().join(format!("artifact_writer_{}", Uuid::new_v4()));
        let writer = ArtifactWriter::new(dir.clone()).await.unwrap();

        let mut metadata = Map::new();
        metadata.insert("prompt".to_string(), json!("a red fox in snow"));
        let artifact =
            ImageArtifact::with_metadata(b"ABC".to_vec(), "png", 832, 1248, metadata);

        let path = writer.persist(&artifact).await.unwrap();
        assert!(path.exists());
        assert_eq!(fs::read(&path).await.unwrap(), b"ABC");

        let meta_path = dir.join(format!(
            "{}.meta.json",
            path.file_stem().unwrap().to_string_lossy()
        ));
        let meta: Value =
            serde_json::from_slice(&fs::read(&meta_path).await.unwrap()).unwrap();
        assert_eq!(meta["prompt"], "a red fox in snow");
        assert_eq!(meta["width"], 832);
        assert_eq!(meta["height"], 1248);

        fs::remove_dir_all(&dir).await.ok();
    }
}
