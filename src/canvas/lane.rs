//! 弹幕的垂直槽位：随机散布，不做几何排布
//!
//! 滚动弹幕在 [字号, 屏高] 内均匀随机；顶部/底部弹幕贴边，
//! 加一点垂直抖动避免完全叠在一起。

use crate::DanmuType;
use rand::Rng;

/// 顶部/底部弹幕的垂直抖动上限，像素
const STATIC_JITTER: f64 = 50.0;

pub fn place(
    r#type: DanmuType,
    font_px: f64,
    length: f64,
    width: f64,
    height: f64,
    rng: &mut impl Rng,
) -> (f64, f64) {
    match r#type {
        DanmuType::Float => (width, pick(rng, font_px, height)),
        DanmuType::Top => (
            ((width - length) / 2.0).max(0.0),
            font_px + pick(rng, 0.0, STATIC_JITTER),
        ),
        DanmuType::Bottom => (
            ((width - length) / 2.0).max(0.0),
            height - font_px - pick(rng, 0.0, STATIC_JITTER),
        ),
    }
}

fn pick(rng: &mut impl Rng, lo: f64, hi: f64) -> f64 {
    // 极小的画布上界可能不大于下界
    if hi <= lo {
        lo
    } else {
        rng.gen_range(lo..hi)
    }
}
