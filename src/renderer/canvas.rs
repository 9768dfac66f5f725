//! Canvas 2D backend

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::commands::DrawCommand;
use crate::config::CanvasConfig;
use crate::error::GameError;

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Look up the canvas and its 2D context. Fails if either is missing.
    pub fn from_config(config: &CanvasConfig) -> Result<Self, GameError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| GameError::RenderTargetMissing(config.element_id.clone()))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(&config.element_id)
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| GameError::RenderTargetMissing(config.element_id.clone()))?;

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|c| c.dyn_into().ok())
            .ok_or_else(|| GameError::ContextUnavailable(config.element_id.clone()))?;

        canvas.set_width(config.width as u32);
        canvas.set_height(config.height as u32);
        log::info!(
            "Canvas #{} ready: {}x{}",
            config.element_id,
            config.width,
            config.height
        );

        Ok(Self { canvas, ctx })
    }

    pub fn element(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Draw one frame
    pub fn present(&self, commands: &[DrawCommand]) {
        let ctx = &self.ctx;
        for command in commands {
            match command {
                DrawCommand::Clear { width, height } => {
                    ctx.clear_rect(0.0, 0.0, *width as f64, *height as f64);
                }
                DrawCommand::FillRect { pos, size, color } => {
                    ctx.set_fill_style_str(color);
                    ctx.fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
                }
                DrawCommand::FillEllipse {
                    center,
                    radii,
                    color,
                } => {
                    ctx.set_fill_style_str(color);
                    ctx.begin_path();
                    let _ = ctx.ellipse(
                        center.x as f64,
                        center.y as f64,
                        radii.x as f64,
                        radii.y as f64,
                        0.0,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.fill();
                }
                DrawCommand::RoundedRect {
                    pos,
                    size,
                    radius,
                    color,
                } => {
                    let (x, y, w, h, r) = (
                        pos.x as f64,
                        pos.y as f64,
                        size.x as f64,
                        size.y as f64,
                        *radius as f64,
                    );
                    ctx.set_fill_style_str(color);
                    ctx.begin_path();
                    ctx.move_to(x + r, y);
                    ctx.line_to(x + w - r, y);
                    ctx.quadratic_curve_to(x + w, y, x + w, y + r);
                    ctx.line_to(x + w, y + h - r);
                    ctx.quadratic_curve_to(x + w, y + h, x + w - r, y + h);
                    ctx.line_to(x + r, y + h);
                    ctx.quadratic_curve_to(x, y + h, x, y + h - r);
                    ctx.line_to(x, y + r);
                    ctx.quadratic_curve_to(x, y, x + r, y);
                    ctx.close_path();
                    ctx.fill();
                }
                DrawCommand::Triangle { points, color } => {
                    ctx.set_fill_style_str(color);
                    ctx.begin_path();
                    ctx.move_to(points[0].x as f64, points[0].y as f64);
                    ctx.line_to(points[1].x as f64, points[1].y as f64);
                    ctx.line_to(points[2].x as f64, points[2].y as f64);
                    ctx.close_path();
                    ctx.fill();
                }
                DrawCommand::Text {
                    text,
                    pos,
                    font,
                    color,
                } => {
                    ctx.set_fill_style_str(color);
                    ctx.set_font(font);
                    ctx.set_text_align("center");
                    ctx.set_text_baseline("middle");
                    let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                }
                DrawCommand::SetAlpha(alpha) => ctx.set_global_alpha(*alpha as f64),
            }
        }
    }
}
