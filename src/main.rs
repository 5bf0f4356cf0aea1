mod artifact;
mod config;
mod errors;
mod pricing;
mod providers;
mod util;
mod wire;

use crate::{errors::Result, providers::OpenRouterImageDriver, util::ArtifactWriter};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    init_tracing();

    let prompts: Vec<String> = std::env::args().skip(1).collect();
    if prompts.is_empty() {
        eprintln!("用法: OpenRouterImageAPI <提示词> [更多提示词...]");
        std::process::exit(1);
    }

    let config = config::AppConfig::load()?;
    let writer = ArtifactWriter::new(config.artifacts_dir.clone()).await?;

    let mut driver = OpenRouterImageDriver::from_config(&config.openrouter, None)?;

    info!(target: "agent", prompt = %prompts.join(", "), "开始生成图像");
    let image = driver.text_to_image(&prompts, None).await?;
    let path = writer.persist(&image).await?;

    if let Some(cost) = driver.last_generation_cost() {
        info!(
            target: "agent",
            path = %path.display(),
            model = %cost.model_used,
            prompt_tokens = cost.usage.prompt_tokens,
            completion_tokens = cost.usage.completion_tokens,
            output_images = cost.usage.output_images,
            cost_usd = %format!("{:.6}", cost.total_cost_usd),
            "图像已保存"
        );
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();

    info!("tracing initialized");
}
