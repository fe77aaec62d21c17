//! 已激活、带位置信息的弹幕

use crate::{Danmu, DanmuType};
use std::time::{Duration, Instant};

/// 顶部/底部弹幕的停留时间
const STATIC_LIFETIME: Duration = Duration::from_secs(3);

pub struct Drawable {
    pub danmu: Danmu,
    pub x: f64,
    pub y: f64,
    /// 激活时算好的像素长度
    pub length: f64,
    /// 水平速度，像素每秒；静止弹幕为 0
    pub velocity: f64,
    pub shown_at: Instant,
}

impl Drawable {
    pub fn new(danmu: Danmu, x: f64, y: f64, length: f64, velocity: f64) -> Self {
        Drawable {
            danmu,
            x,
            y,
            length,
            velocity,
            shown_at: Instant::now(),
        }
    }

    /// 推进一帧，dt 为上一帧到现在的秒数
    pub fn advance(&mut self, dt: f64) {
        if self.velocity > 0.0 {
            self.x -= self.velocity * dt;
        }
    }

    pub fn finished(&self) -> bool {
        match self.danmu.r#type {
            // 右边缘完全滑出左侧
            DanmuType::Float => self.x + self.length < 0.0,
            DanmuType::Top | DanmuType::Bottom => self.shown_at.elapsed() >= STATIC_LIFETIME,
        }
    }
}
