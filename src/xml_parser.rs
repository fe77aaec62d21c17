use crate::danmu::{split_rgb, Danmu, DanmuType};
use anyhow::{bail, Context, Result};
use quick_xml::Reader;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read, Seek},
    path::Path,
};

/// 流式解析 B 站风格的弹幕 XML，迭代产出 [`Danmu`]
pub struct Parser<R: BufRead> {
    count: usize,
    reader: Reader<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> Parser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            count: 0,
            reader: Reader::from_reader(reader),
            buf: Vec::new(),
        }
    }
}

impl Parser<BufReader<File>> {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("打开 {} 失败", path.display()))?;
        // 对于 HDD、docker 之类的场景，磁盘 IO 是非常大的瓶颈。使用大缓存
        let mut reader = BufReader::with_capacity(10 << 20, file);
        let mut bom_buf = [0u8; 3];
        reader.read_exact(&mut bom_buf)?;
        if bom_buf != [0xEF, 0xBB, 0xBF] {
            reader.seek(std::io::SeekFrom::Start(0))?;
        }
        Ok(Parser::new(reader))
    }
}

impl<R: BufRead> Iterator for Parser<R> {
    type Item = Result<Danmu>;

    fn next(&mut self) -> Option<Result<Danmu>> {
        use quick_xml::events::Event;

        /// 一个简单的状态机
        enum Status {
            // on <d> -> WaitForContent
            Start,
            // on text -> WaitForEnd
            WaitForContent(Danmu),
            // on </d> -> return
            WaitForEnd(Danmu),
        }

        let mut status = Status::Start;
        loop {
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .context("XML 文件解析错误");
            let event = match event {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };

            match event {
                Event::Eof => {
                    return None;
                }
                Event::Start(start) if start.local_name().as_ref() == b"d" => {
                    let p_attr = start
                        .attributes()
                        .filter_map(|r| r.ok())
                        .find(|attr| attr.key.as_ref() == b"p");
                    let Some(p_attr) = p_attr else {
                        return Some(Err(anyhow::anyhow!(
                            "弹幕 <d> 中没找到 p 属性，xml 文件可能有错误"
                        )));
                    };
                    let p_attr_s = match std::str::from_utf8(p_attr.value.as_ref())
                        .context("非法 UTF-8 字符")
                    {
                        Ok(s) => s,
                        Err(e) => return Some(Err(e)),
                    };

                    match Danmu::from_xml_p_attr(p_attr_s).context("p 属性解析错误") {
                        Ok(Some(parsed)) => {
                            status = Status::WaitForContent(parsed);
                        }
                        Ok(None) => {
                            status = Status::Start;
                        }
                        Err(e) => return Some(Err(e)),
                    };
                }
                Event::End(end) if end.local_name().as_ref() == b"d" => match status {
                    Status::WaitForEnd(mut danmu) => {
                        self.count += 1;
                        if danmu.id == 0 {
                            // 老格式没有 dmid，退回用序号做 id
                            danmu.id = self.count as u64;
                        }
                        return Some(Ok(danmu));
                    }
                    _ => continue,
                },
                Event::Text(text) => {
                    let s = match std::str::from_utf8(&text).context("非法 UTF-8 字符") {
                        Ok(s) => s.to_string(),
                        Err(e) => return Some(Err(e)),
                    };
                    match status {
                        Status::WaitForContent(mut danmu) => {
                            danmu.content = s;
                            status = Status::WaitForEnd(danmu);
                        }
                        _ => continue,
                    }
                }
                _ => {
                    continue;
                }
            }
        }
    }
}

impl Danmu {
    /// 从哔哩哔哩的弹幕格式解析
    ///
    /// `<d p="p" user="user"> content </d>`
    /// 其中，p = 0.581,1,25,14893055,1647777083220,0,398452452,0
    /// 分别为：
    /// 1. 时间（秒）
    /// 2. 弹幕类型（1 为滚动弹幕，4 为底部弹幕，5 对应顶部，6 对应反向弹幕）
    /// 3. 字体大小（默认 25）
    /// 4. 弹幕颜色（如 14893055）
    /// 5. 弹幕毫秒级时间戳
    /// 6. 弹幕池
    /// 7. 用户标识
    /// 8. dmid，弹幕的行 id，可能为 0
    pub fn from_xml_p_attr(p_attr: &str) -> Result<Option<Self>> {
        let mut iter = p_attr.split(',');
        let timeline_s = iter
            .next()
            .context("p 属性中没有时间")?
            .parse()
            .context("时间解析错误")?;
        let type_num: u32 = iter
            .next()
            .context("p 属性中没有弹幕类型")?
            .parse()
            .context("弹幕类型解析错误")?;
        let Some(r#type) = DanmuType::from_xml_num(type_num) else {
            return Ok(None);
        };
        let fontsize: u32 = iter
            .next()
            .context("p 属性中没有字体大小")?
            .parse()
            .context("字体大小解析错误")?;

        let rgb: u32 = iter
            .next()
            .context("p 属性中没有颜色")?
            .parse()
            .context("颜色解析错误")?;
        // rgb 是个数字，一般情况下为 0xRRGGBB，但是偶尔也有 RRRGGGBBB(dec)
        let rgb = if (rgb >> 24) == 0 {
            split_rgb(rgb)
        } else if rgb <= 255255255 {
            const K: u32 = 1000;
            (
                (((rgb / K / K) % K) & 0xff) as u8,
                (((rgb / K) % K) & 0xff) as u8,
                ((rgb % K) & 0xff) as u8,
            )
        } else {
            bail!("颜色解析错误：颜色为 {:x}", rgb);
        };

        // 跳过时间戳、弹幕池、用户标识，取 dmid
        let id = iter.nth(3).and_then(|s| s.parse().ok()).unwrap_or(0);

        Ok(Some(Self {
            id,
            timeline_s,
            content: String::new(),
            r#type,
            fontsize,
            rgb,
        }))
    }
}

impl DanmuType {
    /// 不认识的类型（高级弹幕、代码弹幕等）返回 None，调用方跳过；
    /// 反向弹幕按滚动处理
    pub fn from_xml_num(num: u32) -> Option<Self> {
        match num {
            1 | 6 => Some(DanmuType::Float),
            4 => Some(DanmuType::Bottom),
            5 => Some(DanmuType::Top),
            _ => None,
        }
    }
}
