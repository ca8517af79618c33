use crate::ui::{ScreenName, ScreenView};
use crate::Viewport;

pub(crate) const CLEAR_COLOR: [u8; 4] = [12, 14, 20, 255];
const PROGRESS_TRACK_COLOR: [u8; 4] = [40, 44, 56, 255];
const PROGRESS_FILL_COLOR: [u8; 4] = [90, 200, 255, 255];
const PROGRESS_TRACK_HEIGHT_PX: i32 = 16;
const PROGRESS_TRACK_INSET_PX: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelRect {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
}

pub(crate) fn panel_color(name: ScreenName) -> [u8; 4] {
    match name {
        ScreenName::Login => [38, 70, 110, 255],
        ScreenName::Home => [46, 96, 72, 255],
        ScreenName::Hud => [30, 30, 36, 255],
        ScreenName::Loading => [28, 34, 52, 255],
        ScreenName::Death => [110, 30, 30, 255],
        ScreenName::Error => [140, 70, 20, 255],
    }
}

/// Centered panel covering 60% by 40% of the viewport.
pub(crate) fn panel_rect(viewport: Viewport) -> PixelRect {
    let width = (viewport.width as i64 * 3 / 5) as i32;
    let height = (viewport.height as i64 * 2 / 5) as i32;
    PixelRect {
        x: (viewport.width as i32 - width) / 2,
        y: (viewport.height as i32 - height) / 2,
        width,
        height,
    }
}

/// Track along the bottom of the panel, inset on three sides.
pub(crate) fn progress_track_rect(panel: PixelRect) -> PixelRect {
    PixelRect {
        x: panel.x + PROGRESS_TRACK_INSET_PX,
        y: panel.y + panel.height - PROGRESS_TRACK_INSET_PX - PROGRESS_TRACK_HEIGHT_PX,
        width: (panel.width - 2 * PROGRESS_TRACK_INSET_PX).max(0),
        height: PROGRESS_TRACK_HEIGHT_PX,
    }
}

pub(crate) fn progress_fill_rect(track: PixelRect, ratio: f32) -> PixelRect {
    let ratio = if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    };
    PixelRect {
        width: (track.width as f32 * ratio).round() as i32,
        ..track
    }
}

pub(crate) fn draw_screen(frame: &mut [u8], viewport: Viewport, view: &ScreenView) {
    let panel = panel_rect(viewport);
    draw_filled_rect(frame, viewport, panel, panel_color(view.name));

    if let Some(ratio) = view.progress {
        let track = progress_track_rect(panel);
        draw_filled_rect(frame, viewport, track, PROGRESS_TRACK_COLOR);
        draw_filled_rect(
            frame,
            viewport,
            progress_fill_rect(track, ratio),
            PROGRESS_FILL_COLOR,
        );
    }
}

pub(crate) fn clear(frame: &mut [u8], color: [u8; 4]) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color);
    }
}

fn draw_filled_rect(frame: &mut [u8], viewport: Viewport, rect: PixelRect, color: [u8; 4]) {
    let start_x = rect.x.max(0);
    let start_y = rect.y.max(0);
    let end_x = rect.x.saturating_add(rect.width).min(viewport.width as i32);
    let end_y = rect.y.saturating_add(rect.height).min(viewport.height as i32);
    if end_x <= start_x || end_y <= start_y {
        return;
    }

    let width = viewport.width as usize;
    for py in start_y..end_y {
        for px in start_x..end_x {
            write_pixel_rgba(frame, width, px as usize, py as usize, color);
        }
    }
}

fn write_pixel_rgba(frame: &mut [u8], width: usize, x: usize, y: usize, color: [u8; 4]) {
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }

    frame[byte_offset..end].copy_from_slice(&color);
}
