pub mod payload;
pub mod response;

/// 尺寸解析失败时的兜底值，仅用于制品元数据
pub const FALLBACK_SIZE: (u32, u32) = (1024, 1024);

/// 解析 "宽x高" 尺寸串，任何解析失败都退化到 1024x1024
pub fn resolve_size(size: &str) -> (u32, u32) {
    let Some((width, height)) = size.split_once('x') else {
        return FALLBACK_SIZE;
    };

    match (width.trim().parse::<u32>(), height.trim().parse::<u32>()) {
        (Ok(width), Ok(height)) if width > 0 && height > 0 => (width, height),
        _ => FALLBACK_SIZE,
    }
}
