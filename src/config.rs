//! 用户可调的弹幕设置，跨会话持久化

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 持久化文件名，也就是设置的存储键
const CONFIG_FILE: &str = "danmaku-config.json";

/// 基准并发数，乘上密度取整就是同屏弹幕上限
const MAX_ACTIVE_BASE: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    /// 弹幕总开关
    pub enabled: bool,
    /// 全局不透明度，0 ~ 1
    pub opacity: f64,
    /// 滚动速度倍率，0.5 ~ 2
    pub speed: f64,
    /// 字号倍率，0.5 ~ 2
    pub font_size: f64,
    /// 密度，0 ~ 1，决定同屏弹幕上限
    pub density: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            enabled: true,
            opacity: 0.8,
            speed: 1.0,
            font_size: 1.0,
            density: 0.6,
        }
    }
}

impl OverlayConfig {
    /// 同屏弹幕上限，至少为 1
    pub fn max_active(&self) -> usize {
        ((MAX_ACTIVE_BASE * self.density).floor() as usize).max(1)
    }

    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        if let Some(speed) = patch.speed {
            self.speed = speed;
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size;
        }
        if let Some(density) = patch.density {
            self.density = density;
        }
    }
}

/// 增量更新，None 表示不动
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    pub enabled: Option<bool>,
    pub opacity: Option<f64>,
    pub speed: Option<f64>,
    pub font_size: Option<f64>,
    pub density: Option<f64>,
}

/// 设置的落盘位置
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("找不到用户配置目录")?;
        Ok(dir.join("danmu2tty").join(CONFIG_FILE))
    }

    /// 文件缺失或损坏一律回落到默认值，不报错
    pub fn load(&self) -> OverlayConfig {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return OverlayConfig::default(),
        };
        match serde_json::from_slice(&bytes) {
            Ok(config) => config,
            Err(e) => {
                warn!("弹幕设置损坏，使用默认值：{}", e);
                OverlayConfig::default()
            }
        }
    }

    pub fn save(&self, config: &OverlayConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(config)?;
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("写入弹幕设置 {} 失败", self.path.display()))
    }
}
