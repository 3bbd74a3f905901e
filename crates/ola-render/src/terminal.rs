use ola_core::color::{Rgba, blend_over};
use ola_core::frame::FrameBuffer;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

/// Logical canvas size matching a terminal area in half-block mode.
///
/// Each cell covers one pixel horizontally and two vertically.
///
/// # Example
/// ```
/// use ratatui::layout::Rect;
/// use ola_render::terminal::canvas_size_for;
/// assert_eq!(canvas_size_for(Rect::new(0, 0, 80, 24)), (80.0, 48.0));
/// ```
#[must_use]
pub fn canvas_size_for(area: Rect) -> (f64, f64) {
    (f64::from(area.width), f64::from(area.height) * 2.0)
}

/// Écrit un `FrameBuffer` dans un `ratatui::Buffer` en demi-blocs (▄).
///
/// Le pixel du haut va dans le bg, celui du bas dans le fg. Les pixels sont
/// composités sur `background` avant d'être convertis en couleurs terminal.
/// Frames larger than the area are sampled down, smaller ones are stretched.
pub fn render_halfblock(buf: &mut Buffer, area: Rect, frame: &FrameBuffer, background: Rgba) {
    let bg_px = [background.r, background.g, background.b, 255];
    let flatten = |x: u32, y: u32| -> Color {
        let (r, g, b, a) = frame.pixel(x, y);
        let px = blend_over(bg_px, Rgba::new(r, g, b, f32::from(a) / 255.0), 1.0);
        Color::Rgb(px[0], px[1], px[2])
    };

    let pixel_w = u32::from(area.width).max(1);
    let pixel_h = (u32::from(area.height) * 2).max(1);

    for cy in 0..area.height {
        for cx in 0..area.width {
            let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) else {
                continue;
            };
            if frame.is_empty() {
                let c = Color::Rgb(background.r, background.g, background.b);
                cell.set_char(' ').set_fg(c).set_bg(c);
                continue;
            }
            let px = (u32::from(cx) * frame.width / pixel_w).min(frame.width - 1);
            let py_top = (u32::from(cy) * 2 * frame.height / pixel_h).min(frame.height - 1);
            let py_bot = ((u32::from(cy) * 2 + 1) * frame.height / pixel_h).min(frame.height - 1);

            cell.set_char('▄')
                .set_fg(flatten(px, py_bot))
                .set_bg(flatten(px, py_top));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_and_bottom_pixels_map_to_bg_and_fg() {
        let mut frame = FrameBuffer::new(2, 2);
        frame.data[0..4].copy_from_slice(&[255, 0, 0, 255]);
        frame.data[8..12].copy_from_slice(&[0, 0, 255, 255]);

        let area = Rect::new(0, 0, 2, 1);
        let mut buf = Buffer::empty(area);
        render_halfblock(&mut buf, area, &frame, Rgba::opaque(0, 0, 0));

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▄");
        assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.fg, Color::Rgb(0, 0, 255));
        assert_eq!(buf[(1, 0)].fg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn transparent_pixels_show_background() {
        let frame = FrameBuffer::new(4, 4);
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        render_halfblock(&mut buf, area, &frame, Rgba::opaque(10, 10, 10));
        assert_eq!(buf[(3, 1)].bg, Color::Rgb(10, 10, 10));
    }

    #[test]
    fn empty_frame_paints_background() {
        let frame = FrameBuffer::new(0, 0);
        let area = Rect::new(0, 0, 3, 3);
        let mut buf = Buffer::empty(area);
        render_halfblock(&mut buf, area, &frame, Rgba::opaque(1, 2, 3));
        assert_eq!(buf[(2, 2)].bg, Color::Rgb(1, 2, 3));
        assert_eq!(buf[(2, 2)].symbol(), " ");
    }
}
