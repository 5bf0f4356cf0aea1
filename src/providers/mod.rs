mod openrouter;

pub use openrouter::OpenRouterImageDriver;
