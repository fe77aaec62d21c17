//! 一个弹幕实例，但是没有位置信息

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum DanmuType {
    /// 从右往左滚动的普通弹幕
    #[default]
    #[serde(rename = "scroll")]
    Float,
    #[serde(rename = "top")]
    Top,
    #[serde(rename = "bottom")]
    Bottom,
}

/// 接口下发的弹幕记录，字段为
/// `id, content, time, type (scroll|top|bottom), color, font_size`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Danmu {
    /// 在一个视频内唯一；XML 来源取 dmid
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "time")]
    pub timeline_s: f64,
    pub content: String,
    #[serde(rename = "type", default)]
    pub r#type: DanmuType,
    #[serde(rename = "font_size", default = "default_fontsize")]
    pub fontsize: u32,
    #[serde(rename = "color", default = "default_rgb", deserialize_with = "de_rgb")]
    pub rgb: (u8, u8, u8),
}

fn default_fontsize() -> u32 {
    25
}

fn default_rgb() -> (u8, u8, u8) {
    (0xff, 0xff, 0xff)
}

/// 颜色可能是 0xRRGGBB 数字，也可能是 "#RRGGBB" 字符串
fn de_rgb<'de, D>(deserializer: D) -> Result<(u8, u8, u8), D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Num(u32),
        Text(String),
    }
    match Repr::deserialize(deserializer)? {
        Repr::Num(n) => Ok(split_rgb(n)),
        Repr::Text(s) => {
            let hex = s.trim_start_matches('#');
            let n = u32::from_str_radix(hex, 16)
                .map_err(|_| serde::de::Error::custom(format!("颜色解析错误：{s}")))?;
            Ok(split_rgb(n))
        }
    }
}

pub(crate) fn split_rgb(n: u32) -> (u8, u8, u8) {
    (((n >> 16) & 0xff) as u8, ((n >> 8) & 0xff) as u8, (n & 0xff) as u8)
}

impl Danmu {
    /// 计算弹幕的“像素长度”，会乘上一个缩放因子
    ///
    /// 汉字算一个全宽，英文算 2/3 宽
    pub fn length(&self, font_scale: f64, width_ratio: f64) -> f64 {
        let cells: u32 = self
            .content
            .chars()
            .map(|ch| if ch.is_ascii() { 2 } else { 3 })
            .sum();
        self.fontsize as f64 * font_scale * cells as f64 / 3.0 * width_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_weights_ascii_narrower() {
        let mut danmu = Danmu {
            id: 1,
            timeline_s: 0.0,
            content: "abcd".to_string(),
            r#type: DanmuType::Float,
            fontsize: 25,
            rgb: (255, 255, 255),
        };
        // 4 个 ASCII：25 * 8/3 * 1.2 = 80
        assert!((danmu.length(1.0, 1.2) - 80.0).abs() < 1e-9);

        danmu.content = "全宽汉字".to_string();
        // 4 个全宽：25 * 4 * 1.2 = 120
        assert!((danmu.length(1.0, 1.2) - 120.0).abs() < 1e-9);
        // 字号缩放是线性的
        assert!((danmu.length(2.0, 1.2) - 240.0).abs() < 1e-9);
    }

    #[test]
    fn deserialize_backend_record() {
        let danmu: Danmu = serde_json::from_str(
            r##"{"id":7,"content":"测试","time":12.5,"type":"top","color":"#ff6600","font_size":18}"##,
        )
        .unwrap();
        assert_eq!(danmu.id, 7);
        assert_eq!(danmu.r#type, DanmuType::Top);
        assert_eq!(danmu.fontsize, 18);
        assert_eq!(danmu.rgb, (0xff, 0x66, 0x00));
    }

    #[test]
    fn deserialize_defaults() {
        let danmu: Danmu =
            serde_json::from_str(r#"{"content":"x","time":1.0,"color":16711680}"#).unwrap();
        assert_eq!(danmu.r#type, DanmuType::Float);
        assert_eq!(danmu.fontsize, 25);
        assert_eq!(danmu.rgb, (0xff, 0, 0));
    }
}
