//! 一个视频的全部弹幕，加载后只读

use crate::Danmu;
use float_ord::FloatOrd;

pub struct DanmuStore {
    /// 按 timeline_s 升序
    records: Vec<Danmu>,
}

impl DanmuStore {
    pub fn new(mut records: Vec<Danmu>) -> Self {
        records.sort_unstable_by_key(|d| FloatOrd(d.timeline_s));
        Self { records }
    }

    pub fn empty() -> Self {
        Self { records: vec![] }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 最后一条弹幕的时间，空列表为 0
    pub fn total_duration(&self) -> f64 {
        self.records.last().map(|d| d.timeline_s).unwrap_or(0.0)
    }

    /// 时间窗口 [now - epsilon, now + epsilon]（闭区间）内的弹幕
    pub fn query_window(&self, now: f64, epsilon: f64) -> &[Danmu] {
        let lo = self
            .records
            .partition_point(|d| d.timeline_s < now - epsilon);
        let hi = self
            .records
            .partition_point(|d| d.timeline_s <= now + epsilon);
        &self.records[lo..hi]
    }
}
