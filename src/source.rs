//! 弹幕加载：本地文件或 http 接口，一次取全量

use crate::{Danmu, InputType, Parser};
use anyhow::{Context, Result};
use std::{collections::HashSet, fs::File, io::BufReader, path::Path};

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.60 Safari/537.36";

/// 加载一个视频的全部弹幕，失败直接上抛，由调用方决定降级
pub async fn load(input: &InputType, denylist: Option<&HashSet<String>>) -> Result<Vec<Danmu>> {
    let mut records = match input {
        InputType::Xml(path) => from_xml(path)?,
        InputType::Json(path) => from_json(path)?,
        InputType::Url(url) => fetch(url).await?,
    };
    if let Some(deny) = denylist {
        let before = records.len();
        records.retain(|d| !deny.iter().any(|word| d.content.contains(word)));
        info!("黑名单过滤掉 {} 条弹幕", before - records.len());
    }
    Ok(records)
}

fn from_xml(path: &Path) -> Result<Vec<Danmu>> {
    Parser::from_path(path)?.collect()
}

fn from_json(path: &Path) -> Result<Vec<Danmu>> {
    let file = File::open(path).with_context(|| format!("打开 {} 失败", path.display()))?;
    serde_json::from_reader(BufReader::new(file)).context("JSON 文件解析错误")
}

async fn fetch(url: &url::Url) -> Result<Vec<Danmu>> {
    let client = reqwest::ClientBuilder::new().user_agent(USER_AGENT).build()?;
    let resp = client
        .get(url.clone())
        .send()
        .await?
        .error_for_status()
        .context("弹幕接口返回错误")?;
    resp.json().await.context("响应 body 无法解析为弹幕列表")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DanmuType;

    fn write_temp(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "danmu2tty-source-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn load_json_file() {
        let path = write_temp(
            "list.json",
            r##"[{"id":1,"content":"第一条","time":1.5,"type":"scroll","color":16777215,"font_size":25},
                {"id":2,"content":"第二条","time":3.0,"type":"bottom","color":"#00ff00"}]"##,
        );
        let records = load(&InputType::Json(path), None).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].r#type, DanmuType::Bottom);
        assert_eq!(records[1].rgb, (0, 0xff, 0));
    }

    #[tokio::test]
    async fn denylist_filters_by_keyword() {
        let path = write_temp(
            "deny.json",
            r#"[{"id":1,"content":"广告弹幕","time":1.0},
                {"id":2,"content":"正常弹幕","time":2.0}]"#,
        );
        let deny: HashSet<String> = ["广告".to_string()].into_iter().collect();
        let records = load(&InputType::Json(path), Some(&deny)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 2);
    }

    #[tokio::test]
    async fn missing_file_propagates_error() {
        let input = InputType::Json("/不存在/的/路径.json".into());
        assert!(load(&input, None).await.is_err());
    }
}
