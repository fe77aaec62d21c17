use anyhow::Result;
use std::path::PathBuf;

/// 弹幕来源：本地文件或 http(s) 接口
#[derive(Debug, PartialEq, Eq)]
pub enum InputType {
    /// B 站风格的弹幕 XML 文件
    Xml(PathBuf),
    /// 弹幕列表 JSON 文件
    Json(PathBuf),
    /// 返回弹幕列表 JSON 的接口
    Url(url::Url),
}

impl std::str::FromStr for InputType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("http") {
            let url = url::Url::parse(s)?;
            anyhow::ensure!(
                matches!(url.scheme(), "http" | "https"),
                "不支持的协议 {}",
                url.scheme()
            );
            info!("输入类型为 URL");
            return Ok(InputType::Url(url));
        }

        let path = PathBuf::from(s);
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Ok(InputType::Json(path))
        } else {
            Ok(InputType::Xml(path))
        }
    }
}
