//! Draw command generation for each entity

use glam::Vec2;
use std::f32::consts::PI;

use super::commands::DrawCommand;
use crate::consts::LOGO_SIZE;
use crate::settings::ObstacleStyle;
use crate::sim::{Cloud, Ground, Obstacle, Player, Session};

const LOGO_BLUE: &str = "#405BFF";
const CLASSIC_OUTER: &str = "#654321";
const CLASSIC_INNER: &str = "#8B4513";
const GROUND_FILL: &str = "#8B4513";
const GROUND_SEGMENT: &str = "#A0522D";
const GROUND_SEGMENT_WIDTH: f32 = 8.0;

/// Full frame: clear, clouds, ground, player, obstacles
pub fn scene(session: &Session) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(64 + session.ground.segments.len());
    commands.push(DrawCommand::Clear {
        width: session.width,
        height: crate::consts::CANVAS_HEIGHT,
    });
    for c in &session.clouds {
        cloud(c, &mut commands);
    }
    ground(&session.ground, &mut commands);
    player(&session.player, &mut commands);
    for o in &session.obstacles {
        obstacle(o, session.obstacle_style, &mut commands);
    }
    commands
}

/// Dinosaur: tail, legs, body, spikes, head, eye
pub fn player(p: &Player, out: &mut Vec<DrawCommand>) {
    let Vec2 { x, y } = p.pos;
    let Vec2 { x: w, y: h } = p.size;
    let skin = p.skin.hex();
    let dark = p.skin.darker();
    let light = p.skin.lighter();

    // Idle bob only while grounded
    let bounce = if p.airborne {
        0.0
    } else {
        (p.animation_frame * 2.0).sin() * 0.5
    };

    // Tail
    out.push(DrawCommand::ellipse(x - 8.0, y + 8.0 + bounce, 10.0, 4.0, skin));
    out.push(DrawCommand::rect(x - 4.0, y + 6.0 + bounce, 6.0, 6.0, skin));

    // Legs alternate half a cycle apart
    let leg_y = y + h - 3.0;
    let (back, front) = if p.airborne {
        (0.0, 0.0)
    } else {
        (
            p.animation_frame.sin() * 2.0,
            (p.animation_frame + PI).sin() * 2.0,
        )
    };
    out.push(DrawCommand::rect(x + 3.0 + back, leg_y, 3.0, 8.0, dark));
    out.push(DrawCommand::rect(x + 12.0 + front, leg_y, 3.0, 8.0, dark));
    out.push(DrawCommand::rect(x + 2.0 + back, leg_y + 7.0, 5.0, 2.0, dark));
    out.push(DrawCommand::rect(x + 11.0 + front, leg_y + 7.0, 5.0, 2.0, dark));

    out.push(DrawCommand::RoundedRect {
        pos: Vec2::new(x, y + 5.0 + bounce),
        size: Vec2::new(w, h - 8.0),
        radius: 3.0,
        color: skin,
    });
    out.push(DrawCommand::rect(x + 2.0, y + 6.0 + bounce, w - 4.0, 2.0, dark));
    out.push(DrawCommand::rect(x + 3.0, y + 12.0 + bounce, w - 6.0, 4.0, light));

    for i in 0..3 {
        let sx = x + 4.0 + i as f32 * 4.0;
        let sy = y + 4.0 + bounce;
        out.push(DrawCommand::Triangle {
            points: [
                Vec2::new(sx, sy),
                Vec2::new(sx + 2.0, sy - 3.0),
                Vec2::new(sx + 4.0, sy),
            ],
            color: dark,
        });
    }

    // Neck and head
    out.push(DrawCommand::rect(x + w - 2.0, y + 2.0 + bounce, 6.0, 8.0, skin));
    out.push(DrawCommand::ellipse(x + w + 2.0, y - 2.0 + bounce, 8.0, 6.0, skin));

    out.push(DrawCommand::ellipse(x + w + 5.0, y - 1.0 + bounce, 2.5, 2.0, "white"));
    out.push(DrawCommand::ellipse(x + w + 6.0, y - 1.0 + bounce, 1.0, 1.0, "black"));
    out.push(DrawCommand::ellipse(
        x + w + 8.0,
        y + 1.0 + bounce,
        0.8,
        0.5,
        "rgba(0, 0, 0, 0.3)",
    ));
}

/// Stack of logo tiles, or a plain brown block
pub fn obstacle(o: &Obstacle, style: ObstacleStyle, out: &mut Vec<DrawCommand>) {
    match style {
        ObstacleStyle::Classic => {
            out.push(DrawCommand::rect(o.pos.x, o.pos.y, o.size.x, o.size.y, CLASSIC_OUTER));
            out.push(DrawCommand::rect(
                o.pos.x + 2.0,
                o.pos.y + 2.0,
                o.size.x - 4.0,
                o.size.y - 4.0,
                CLASSIC_INNER,
            ));
        }
        ObstacleStyle::Logos => {
            for i in 0..o.kind.logo_count() {
                logo(Vec2::new(o.pos.x, o.pos.y + i as f32 * LOGO_SIZE), out);
            }
        }
    }
}

fn logo(at: Vec2, out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand::RoundedRect {
        pos: at + Vec2::ONE,
        size: Vec2::splat(LOGO_SIZE - 2.0),
        radius: 6.0,
        color: LOGO_BLUE,
    });
    out.push(DrawCommand::Text {
        text: "LD",
        pos: at + Vec2::splat(LOGO_SIZE / 2.0),
        font: "bold 12px Arial",
        color: "white",
    });

    // Flag in the top-right corner
    let fx = at.x + LOGO_SIZE - 8.0;
    let fy = at.y + 4.0;
    out.push(DrawCommand::rect(fx, fy, 1.0, 6.0, "white"));
    out.push(DrawCommand::Triangle {
        points: [
            Vec2::new(fx + 1.0, fy),
            Vec2::new(fx + 6.0, fy + 2.0),
            Vec2::new(fx + 1.0, fy + 4.0),
        ],
        color: "white",
    });
}

/// Three offset white blocks at the cloud's opacity
pub fn cloud(c: &Cloud, out: &mut Vec<DrawCommand>) {
    let Vec2 { x, y } = c.pos;
    let Vec2 { x: w, y: h } = c.size;
    out.push(DrawCommand::SetAlpha(c.opacity));
    out.push(DrawCommand::rect(x, y, w, h, "white"));
    out.push(DrawCommand::rect(x + 10.0, y - 5.0, w - 10.0, h, "white"));
    out.push(DrawCommand::rect(x + 5.0, y + 5.0, w - 5.0, h, "white"));
    out.push(DrawCommand::SetAlpha(1.0));
}

/// Ground strip with raised texture segments
pub fn ground(g: &Ground, out: &mut Vec<DrawCommand>) {
    out.push(DrawCommand::rect(0.0, g.y, g.width, g.height, GROUND_FILL));
    for s in &g.segments {
        out.push(DrawCommand::rect(
            s.x,
            g.y - s.height,
            GROUND_SEGMENT_WIDTH,
            s.height,
            GROUND_SEGMENT,
        ));
    }
}
