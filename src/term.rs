//! 终端宿主：crossterm 渲染表面和播放循环
//!
//! 终端没有真正的像素，这里把一个字符格折算成 16x32 像素，
//! ASCII 算 1 格、其他字符算 2 格，和 [`Danmu::length`] 的
//! 权重模型保持一致。最后一行留给 HUD。

use crate::{
    cli::Args,
    config::ConfigPatch,
    overlay::Overlay,
    store::DanmuStore,
    surface::Surface,
};
use anyhow::Result;
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Color, Print, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::{
    io::{self, Stdout, Write},
    time::{Duration, Instant},
};

/// 一个字符格折算的像素宽高；32 恰好是一行弹幕的高度
const CELL_W: f64 = 16.0;
const CELL_H: f64 = 32.0;

/// 方向键一次 seek 的秒数
const SEEK_STEP_S: f64 = 5.0;

/// 播完之后留给最后一批弹幕飘完的时间
const TAIL_S: f64 = 10.0;

pub struct TermSurface {
    out: Stdout,
    cols: u16,
    rows: u16,
    alpha: f64,
}

impl TermSurface {
    pub fn new() -> Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(TermSurface {
            out: io::stdout(),
            cols,
            rows,
            alpha: 1.0,
        })
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
    }

    pub fn flush(&mut self) -> Result<()> {
        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }

    pub fn draw_hud(&mut self, line: &str) {
        let row = self.rows.saturating_sub(1);
        let mut budget = self.cols as i64;
        let visible: String = line
            .chars()
            .take_while(|ch| {
                budget -= cell_width(*ch);
                budget >= 0
            })
            .collect();
        let _ = queue!(
            self.out,
            cursor::MoveTo(0, row),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::DarkGrey),
            Print(visible),
        );
    }
}

fn cell_width(ch: char) -> i64 {
    if ch.is_ascii() {
        1
    } else {
        2
    }
}

impl Surface for TermSurface {
    fn size(&self) -> (f64, f64) {
        (
            self.cols as f64 * CELL_W,
            self.rows.saturating_sub(1) as f64 * CELL_H,
        )
    }

    fn is_ready(&self) -> bool {
        self.cols >= 2 && self.rows >= 2
    }

    fn clear(&mut self) {
        let _ = queue!(self.out, BeginSynchronizedUpdate, Clear(ClearType::All));
    }

    fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, rgb: (u8, u8, u8), _font_px: f64) {
        // 终端画不了半透明，把颜色往黑压来模拟
        let color = Color::Rgb {
            r: (rgb.0 as f64 * self.alpha) as u8,
            g: (rgb.1 as f64 * self.alpha) as u8,
            b: (rgb.2 as f64 * self.alpha) as u8,
        };
        // y 是基线，折算到行
        let max_row = self.rows.saturating_sub(2) as i64;
        let row = ((y / CELL_H).round() as i64 - 1).clamp(0, max_row) as u16;

        let mut col = (x / CELL_W).floor() as i64;
        let cols = self.cols as i64;
        let _ = queue!(self.out, SetForegroundColor(color));
        for ch in text.chars() {
            let w = cell_width(ch);
            // 左右两侧越界的字符裁掉
            if col >= 0 && col + w <= cols {
                let _ = queue!(self.out, cursor::MoveTo(col as u16, row), Print(ch));
            }
            col += w;
            if col >= cols {
                break;
            }
        }
    }
}

/// 播放入口：接管终端，结束后无论成败都恢复
pub fn play(store: &DanmuStore, mut overlay: Overlay, args: &Args) -> Result<()> {
    let mut surface = TermSurface::new()?;
    let (width, height) = surface.size();
    overlay.resize(width, height);

    terminal::enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, cursor::Hide, DisableLineWrap)?;
    let ret = run(store, &mut overlay, &mut surface, args);
    let _ = execute!(io::stdout(), EnableLineWrap, cursor::Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    ret
}

fn run(
    store: &DanmuStore,
    overlay: &mut Overlay,
    surface: &mut TermSurface,
    args: &Args,
) -> Result<()> {
    let frame_budget = frame_budget(args.fps);
    let total = store.total_duration() + TAIL_S;
    let mut clock = args.from.min(total);
    let mut playing = true;
    let mut dirty = true;
    let mut last_frame = Instant::now();

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    dirty = true;
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char(' ') => playing = !playing,
                        KeyCode::Left => clock = (clock - SEEK_STEP_S).max(0.0),
                        KeyCode::Right => clock = (clock + SEEK_STEP_S).min(total),
                        KeyCode::Char('d') => {
                            let enabled = overlay.config().enabled;
                            overlay.update_config(ConfigPatch {
                                enabled: Some(!enabled),
                                ..ConfigPatch::default()
                            });
                        }
                        KeyCode::Char(c) => tune(overlay, c),
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    dirty = true;
                    surface.resize(cols, rows);
                    let (width, height) = Surface::size(surface);
                    overlay.resize(width, height);
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        if playing {
            clock += dt;
            if clock > total {
                // 播完从头再来；这是一次超过 1s 的跳变，会清掉在屏弹幕
                clock = 0.0;
            }
        }

        overlay.on_time_update(store, clock, playing);

        // 暂停或关闭弹幕时渲染挂起，只有状态变化时补一帧；
        // 补帧只是重画，dt 给 0，不能推进位置
        if overlay.is_running(playing) || dirty {
            let dt = if overlay.is_running(playing) { dt } else { 0.0 };
            overlay.render_frame(surface, dt);
            surface.draw_hud(&hud_line(overlay, clock, total, playing));
            surface.flush()?;
            dirty = false;
        }

        if let Some(remaining) = frame_budget.checked_sub(frame_start.elapsed()) {
            // 睡到下一帧，有输入会提前醒
            event::poll(remaining)?;
        }
    }
}

/// 整数毫秒会把高 fps 截断成 0，按秒的小数算
fn frame_budget(fps: u64) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}

fn tune(overlay: &mut Overlay, key: char) {
    let cfg = overlay.config();
    let patch = match key {
        '-' => ConfigPatch {
            speed: Some((cfg.speed - 0.25).max(0.5)),
            ..ConfigPatch::default()
        },
        '=' => ConfigPatch {
            speed: Some((cfg.speed + 0.25).min(2.0)),
            ..ConfigPatch::default()
        },
        '[' => ConfigPatch {
            density: Some((cfg.density - 0.1).max(0.0)),
            ..ConfigPatch::default()
        },
        ']' => ConfigPatch {
            density: Some((cfg.density + 0.1).min(1.0)),
            ..ConfigPatch::default()
        },
        '9' => ConfigPatch {
            opacity: Some((cfg.opacity - 0.1).max(0.0)),
            ..ConfigPatch::default()
        },
        '0' => ConfigPatch {
            opacity: Some((cfg.opacity + 0.1).min(1.0)),
            ..ConfigPatch::default()
        },
        ',' => ConfigPatch {
            font_size: Some((cfg.font_size - 0.1).max(0.5)),
            ..ConfigPatch::default()
        },
        '.' => ConfigPatch {
            font_size: Some((cfg.font_size + 0.1).min(2.0)),
            ..ConfigPatch::default()
        },
        _ => return,
    };
    overlay.update_config(patch);
}

fn hud_line(overlay: &Overlay, clock: f64, total: f64, playing: bool) -> String {
    let cfg = overlay.config();
    format!(
        "{:>7.1}s / {:.0}s {} | 弹幕[d]:{} 速度[-=]:{:.2} 密度[[]]:{:.1} 透明[90]:{:.1} 字号[,.]:{:.1} | 在屏 {}",
        clock,
        total,
        if playing { "播放" } else { "暂停" },
        if cfg.enabled { "开" } else { "关" },
        cfg.speed,
        cfg.density,
        cfg.opacity,
        cfg.font_size,
        overlay.active_count(),
    )
}
