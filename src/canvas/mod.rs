//! 决定弹幕的出生位置和速度
mod lane;

use crate::{config::OverlayConfig, Danmu, DanmuType, Drawable};
use rand::{rngs::StdRng, SeedableRng};

/// speed=1 时滚动弹幕穿屏的秒数，纯调参常数
const CROSS_BASE_S: f64 = 8.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub width: f64,
    pub height: f64,
    /// 计算弹幕宽度时的比例，字体很宽时需要调大避免重叠
    pub width_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 1280.0,
            height: 720.0,
            width_ratio: 1.2,
        }
    }
}

impl Config {
    pub fn canvas(self) -> Canvas {
        Canvas {
            config: self,
            rng: StdRng::from_entropy(),
        }
    }

    /// 固定随机种子，测试用
    pub fn canvas_with_seed(self, seed: u64) -> Canvas {
        Canvas {
            config: self,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

pub struct Canvas {
    pub config: Config,
    rng: StdRng,
}

impl Canvas {
    pub fn resize(&mut self, width: f64, height: f64) {
        self.config.width = width;
        self.config.height = height;
    }

    pub fn measure(&self, danmu: &Danmu, font_scale: f64) -> f64 {
        danmu.length(font_scale, self.config.width_ratio)
    }

    /// 弹幕激活：分配出生坐标并算好速度
    pub fn shoot(&mut self, danmu: Danmu, overlay: &OverlayConfig) -> Drawable {
        let font_px = danmu.fontsize as f64 * overlay.font_size;
        let length = self.measure(&danmu, overlay.font_size);
        let (x, y) = lane::place(
            danmu.r#type,
            font_px,
            length,
            self.config.width,
            self.config.height,
            &mut self.rng,
        );
        let velocity = match danmu.r#type {
            DanmuType::Float => (self.config.width + length) / CROSS_BASE_S * overlay.speed,
            DanmuType::Top | DanmuType::Bottom => 0.0,
        };
        Drawable::new(danmu, x, y, length, velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn danmu(content: &str, r#type: DanmuType) -> Danmu {
        Danmu {
            id: 1,
            timeline_s: 0.0,
            content: content.to_string(),
            r#type,
            fontsize: 25,
            rgb: (255, 255, 255),
        }
    }

    fn canvas() -> Canvas {
        Config {
            width: 800.0,
            height: 600.0,
            width_ratio: 1.2,
        }
        .canvas_with_seed(42)
    }

    #[test]
    fn scroll_spawns_at_right_edge() {
        let mut canvas = canvas();
        let d = canvas.shoot(danmu("abcd", DanmuType::Float), &OverlayConfig::default());
        assert_eq!(d.x, 800.0);
        // (800 + 80) / 8 = 110 px/s
        assert!((d.velocity - 110.0).abs() < 1e-9);
    }

    #[test]
    fn velocity_scales_with_speed() {
        let mut canvas = canvas();
        let cfg = OverlayConfig {
            speed: 2.0,
            ..OverlayConfig::default()
        };
        let d = canvas.shoot(danmu("abcd", DanmuType::Float), &cfg);
        assert!((d.velocity - 220.0).abs() < 1e-9);
    }

    #[test]
    fn static_types_are_centered_and_still() {
        let mut canvas = canvas();
        let d = canvas.shoot(danmu("abcd", DanmuType::Top), &OverlayConfig::default());
        // 长度 80，居中于 (800 - 80) / 2
        assert!((d.x - 360.0).abs() < 1e-9);
        assert_eq!(d.velocity, 0.0);

        let d = canvas.shoot(danmu("abcd", DanmuType::Bottom), &OverlayConfig::default());
        assert!((d.x - 360.0).abs() < 1e-9);
        assert_eq!(d.velocity, 0.0);
    }

    #[test]
    fn font_scale_affects_length_and_velocity() {
        let mut canvas = canvas();
        let cfg = OverlayConfig {
            font_size: 2.0,
            ..OverlayConfig::default()
        };
        let d = canvas.shoot(danmu("abcd", DanmuType::Float), &cfg);
        assert!((d.length - 160.0).abs() < 1e-9);
        assert!((d.velocity - 120.0).abs() < 1e-9);
    }
}
