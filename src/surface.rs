//! 渲染表面抽象：引擎只负责算位置，画字交给宿主

/// 一个 2D 绘制表面。坐标为像素，y 是文字基线。
pub trait Surface {
    /// 可绘制区域的像素尺寸
    fn size(&self) -> (f64, f64);

    /// 表面是否就绪；未就绪时引擎整帧静默跳过，就绪后自动恢复
    fn is_ready(&self) -> bool {
        true
    }

    fn clear(&mut self);

    /// 全局不透明度，0 ~ 1，对之后的所有绘制生效
    fn set_alpha(&mut self, alpha: f64);

    /// 画一条弹幕文本；实现负责描边等可读性处理
    fn draw_text(&mut self, x: f64, y: f64, text: &str, rgb: (u8, u8, u8), font_px: f64);
}
