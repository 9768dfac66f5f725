//! Backend-neutral 2D draw commands

use glam::Vec2;

/// One 2D canvas primitive. Colors are CSS color strings.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear to transparent; the surface background shows through
    Clear { width: f32, height: f32 },
    FillRect {
        pos: Vec2,
        size: Vec2,
        color: &'static str,
    },
    FillEllipse {
        center: Vec2,
        radii: Vec2,
        color: &'static str,
    },
    RoundedRect {
        pos: Vec2,
        size: Vec2,
        radius: f32,
        color: &'static str,
    },
    Triangle {
        points: [Vec2; 3],
        color: &'static str,
    },
    /// Centered text
    Text {
        text: &'static str,
        pos: Vec2,
        font: &'static str,
        color: &'static str,
    },
    /// Global alpha for following commands
    SetAlpha(f32),
}

impl DrawCommand {
    pub fn rect(x: f32, y: f32, w: f32, h: f32, color: &'static str) -> Self {
        DrawCommand::FillRect {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            color,
        }
    }

    pub fn ellipse(cx: f32, cy: f32, rx: f32, ry: f32, color: &'static str) -> Self {
        DrawCommand::FillEllipse {
            center: Vec2::new(cx, cy),
            radii: Vec2::new(rx, ry),
            color,
        }
    }

    pub fn color(&self) -> Option<&'static str> {
        match self {
            DrawCommand::FillRect { color, .. }
            | DrawCommand::FillEllipse { color, .. }
            | DrawCommand::RoundedRect { color, .. }
            | DrawCommand::Triangle { color, .. }
            | DrawCommand::Text { color, .. } => Some(color),
            DrawCommand::Clear { .. } | DrawCommand::SetAlpha(_) => None,
        }
    }
}
