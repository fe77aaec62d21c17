//! 弹幕引擎：按播放时钟激活弹幕，每帧推进并回收
//!
//! 宿主的职责：播放时钟每次更新时调用 [`Overlay::on_time_update`]，
//! 每个显示帧调用 [`Overlay::render_frame`]。两者都在同一个线程上，
//! 激活永远发生在同一拍的渲染之前。

use crate::{
    canvas::Canvas,
    config::{ConfigPatch, ConfigStore, OverlayConfig},
    store::DanmuStore,
    surface::Surface,
};
use std::collections::VecDeque;

/// 激活窗口的半径，秒。弹幕时间落在 [now - ε, now + ε] 内才会激活
const ACTIVATION_EPS_S: f64 = 0.1;

/// 播放时钟前后跳变超过这个值视为 seek，清空全部在屏弹幕
const SEEK_RESET_S: f64 = 1.0;

pub struct Overlay {
    config: OverlayConfig,
    persist: Option<ConfigStore>,
    canvas: Canvas,
    /// 在屏弹幕，插入顺序即绘制顺序，队头最老
    active: VecDeque<crate::Drawable>,
    /// 窗口内已经激活过的 (id, 弹幕时间)，防止重复激活
    recent: Vec<(u64, f64)>,
    last_time: Option<f64>,
}

impl Overlay {
    pub fn new(canvas: Canvas, config: OverlayConfig, persist: Option<ConfigStore>) -> Self {
        Overlay {
            config,
            persist,
            canvas,
            active: VecDeque::new(),
            recent: Vec::new(),
            last_time: None,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// 更新设置并落盘，下一拍生效
    pub fn update_config(&mut self, patch: ConfigPatch) {
        self.config.apply(patch);
        if let Some(store) = self.persist.as_ref() {
            if let Err(e) = store.save(&self.config) {
                warn!("保存弹幕设置失败：{:?}", e);
            }
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.canvas.resize(width, height);
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// 渲染循环是否应该运行
    pub fn is_running(&self, playing: bool) -> bool {
        self.config.enabled && playing
    }

    /// seek 或卸载：丢弃全部在屏弹幕
    pub fn clear(&mut self) {
        self.active.clear();
        self.recent.clear();
    }

    /// 播放时钟更新，决定哪些弹幕被激活
    pub fn on_time_update(&mut self, store: &DanmuStore, now: f64, playing: bool) {
        if let Some(last) = self.last_time {
            if (now - last).abs() > SEEK_RESET_S {
                debug!("时间跳变 {:.2}s -> {:.2}s，清空在屏弹幕", last, now);
                self.clear();
            }
        }
        self.last_time = Some(now);

        if !playing || !self.config.enabled {
            return;
        }

        // 弹幕时间滑出窗口后才允许遗忘，保证同窗口内不会二次激活
        self.recent.retain(|(_, t)| *t >= now - ACTIVATION_EPS_S);

        // 上限每拍从当前设置重算，密度调低时立刻生效
        let cap = self.config.max_active();
        while self.active.len() > cap {
            self.active.pop_front();
        }

        let candidates: Vec<_> = store
            .query_window(now, ACTIVATION_EPS_S)
            .iter()
            .filter(|d| !self.recent.iter().any(|(id, _)| *id == d.id))
            .cloned()
            .collect();
        for danmu in candidates {
            if self.active.len() >= cap {
                // 满了就把最老的挤掉
                self.active.pop_front();
            }
            self.recent.push((danmu.id, danmu.timeline_s));
            let drawable = self.canvas.shoot(danmu, &self.config);
            self.active.push_back(drawable);
        }
    }

    /// 画一帧并推进状态，dt 为距上一帧的秒数
    pub fn render_frame(&mut self, surface: &mut dyn Surface, dt: f64) {
        if !surface.is_ready() {
            // 表面还没挂载，这帧什么都不做
            return;
        }
        surface.clear();
        if !self.config.enabled {
            return;
        }
        surface.set_alpha(self.config.opacity);

        for d in self.active.iter_mut() {
            let font_px = d.danmu.fontsize as f64 * self.config.font_size;
            surface.draw_text(d.x, d.y, &d.danmu.content, d.danmu.rgb, font_px);
            d.advance(dt);
        }
        self.active.retain(|d| !d.finished());
    }
}
