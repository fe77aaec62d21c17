use std::{collections::HashSet, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use serde::Deserialize;

use crate::{
    config::{ConfigPatch, ConfigStore},
    source, term, CanvasConfig, DanmuStore, InputType, Overlay,
};

#[derive(Parser, Debug, Deserialize)]
#[clap(version, about = "在终端里实时播放弹幕")]
pub struct Args {
    #[clap(help = "弹幕来源：XML / JSON 文件，或返回弹幕列表的 http(s) 接口")]
    pub input: String,

    #[clap(long = "from", help = "起始播放时间，单位为 s", default_value = "0")]
    #[serde(default)]
    pub from: f64,

    #[clap(long = "fps", help = "帧率上限", default_value = "30")]
    #[serde(default = "default_fps")]
    pub fps: u64,

    #[clap(
        long = "width-ratio",
        help = "计算弹幕宽度时的比例，如果你的字体很宽为避免重叠需要调大这个数值",
        default_value = "1.2"
    )]
    #[serde(default = "default_width_ratio")]
    pub width_ratio: f64,

    #[clap(
        long = "denylist",
        help = "黑名单，需要过滤的关键词列表文件，每行一个关键词"
    )]
    #[serde(default)]
    pub denylist: Option<PathBuf>,

    #[clap(long = "config", help = "弹幕设置的存储路径，默认在用户配置目录下")]
    #[serde(default)]
    pub config: Option<PathBuf>,

    #[clap(long = "opacity", help = "本次播放的不透明度，覆盖存储的设置")]
    #[serde(default)]
    pub opacity: Option<f64>,

    #[clap(long = "speed", help = "本次播放的速度倍率，覆盖存储的设置")]
    #[serde(default)]
    pub speed: Option<f64>,

    #[clap(long = "font-size", help = "本次播放的字号倍率，覆盖存储的设置")]
    #[serde(default)]
    pub font_size: Option<f64>,

    #[clap(long = "density", help = "本次播放的弹幕密度，覆盖存储的设置")]
    #[serde(default)]
    pub density: Option<f64>,
}

fn default_fps() -> u64 {
    30
}

fn default_width_ratio() -> f64 {
    1.2
}

impl Args {
    pub fn check(&mut self) -> Result<()> {
        if self.fps == 0 {
            anyhow::bail!("fps 不能为 0");
        }
        if self.from < 0.0 {
            anyhow::bail!("起始时间不能为负");
        }
        if let Some(f) = self.denylist.as_ref() {
            if !f.exists() {
                anyhow::bail!("黑名单文件不存在");
            }
            if f.is_dir() {
                anyhow::bail!("黑名单文件不能是目录");
            }
        }
        Ok(())
    }

    pub fn denylist(&self) -> Result<Option<HashSet<String>>> {
        match self.denylist.as_ref() {
            None => Ok(None),
            Some(path) => {
                let denylist = std::fs::read_to_string(path)?;
                let list = denylist
                    .split('\n')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                Ok(Some(list))
            }
        }
    }

    /// 命令行覆盖项，只对本次播放生效，不落盘
    fn patch(&self) -> ConfigPatch {
        ConfigPatch {
            enabled: None,
            opacity: self.opacity,
            speed: self.speed,
            font_size: self.font_size,
            density: self.density,
        }
    }

    pub async fn run(self) -> Result<()> {
        let input: InputType = self.input.parse()?;
        let denylist = self.denylist()?;

        // 加载失败不致命，按“这个视频没有弹幕”继续
        let records = match source::load(&input, denylist.as_ref()).await {
            Ok(records) => records,
            Err(e) => {
                warn!("弹幕加载失败，以空列表继续播放：{:?}", e);
                vec![]
            }
        };
        info!("共加载 {} 条弹幕", records.len());
        let store = DanmuStore::new(records);

        let persist = match self.config.clone() {
            Some(path) => ConfigStore::new(path),
            None => ConfigStore::new(ConfigStore::default_path()?),
        };
        let mut config = persist.load();
        config.apply(self.patch());

        let canvas = CanvasConfig {
            width_ratio: self.width_ratio,
            ..CanvasConfig::default()
        }
        .canvas();
        let overlay = Overlay::new(canvas, config, Some(persist));

        term::play(&store, overlay, &self)
    }
}
