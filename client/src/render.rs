use web_sys::CanvasRenderingContext2d;

use rectviz_shared::Polygon;

use crate::geometry::{ScreenRect, ViewportTransform};
use crate::state::SessionState;

const BEST_BACKGROUND: &str = "#064e3b";
const BACKGROUND: &str = "#000000";
const POLYGON_COLOR: &str = "#ffffff";
const BEST_COLOR: &str = "#10b981";
const CONTAINED_COLOR: &str = "#ffffff";
const REJECTED_COLOR: &str = "#6b7280";
const RECT_FILL_ALPHA: &str = "60";
const LINE_WIDTH: f64 = 2.0;
const BANNER_TEXT: &str = "✓ BEST";
const BANNER_FONT: &str = "bold 20px sans-serif";
const BANNER_TOP: f64 = 10.0;

/// Everything one surface needs drawn, already in screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfacePaint {
    pub background: &'static str,
    /// Polygon outline: move to the first point, then line to each of the rest.
    pub outline: Vec<(f64, f64)>,
    pub rect: Option<(ScreenRect, &'static str)>,
    pub best_banner: bool,
}

impl SurfacePaint {
    pub fn plan(state: &SessionState, worker_id: usize, transform: &ViewportTransform) -> Self {
        let worker = state.worker(worker_id);
        let found_best = worker.is_some_and(|worker| worker.found_best);
        let rect = worker.and_then(|worker| {
            let rect = worker.rect?;
            let color = if found_best {
                BEST_COLOR
            } else if worker.contained {
                CONTAINED_COLOR
            } else {
                REJECTED_COLOR
            };
            Some((transform.rect_to_screen(&rect), color))
        });
        Self {
            background: if found_best { BEST_BACKGROUND } else { BACKGROUND },
            outline: state
                .polygon
                .as_ref()
                .map(|polygon| outline(polygon, transform))
                .unwrap_or_default(),
            rect,
            best_banner: found_best,
        }
    }
}

fn outline(polygon: &Polygon, transform: &ViewportTransform) -> Vec<(f64, f64)> {
    let Some(first) = polygon.edges.first() else {
        return Vec::new();
    };
    std::iter::once(transform.world_to_screen(first.p1))
        .chain(
            polygon
                .edges
                .iter()
                .map(|edge| transform.world_to_screen(edge.p2)),
        )
        .collect()
}

pub fn paint(ctx: &CanvasRenderingContext2d, width: f64, height: f64, plan: &SurfacePaint) {
    ctx.set_fill_style_str(plan.background);
    ctx.fill_rect(0.0, 0.0, width, height);

    if let Some(((x, y), rest)) = plan.outline.split_first() {
        ctx.set_stroke_style_str(POLYGON_COLOR);
        ctx.set_line_width(LINE_WIDTH);
        ctx.begin_path();
        ctx.move_to(*x, *y);
        for (x, y) in rest {
            ctx.line_to(*x, *y);
        }
        ctx.stroke();
    }

    if let Some((rect, color)) = plan.rect {
        ctx.set_fill_style_str(&format!("{color}{RECT_FILL_ALPHA}"));
        ctx.fill_rect(rect.x, rect.y, rect.width, rect.height);
        ctx.set_stroke_style_str(color);
        ctx.set_line_width(LINE_WIDTH);
        ctx.stroke_rect(rect.x, rect.y, rect.width, rect.height);
    }

    if plan.best_banner {
        ctx.set_fill_style_str(BEST_COLOR);
        ctx.set_font(BANNER_FONT);
        ctx.set_text_align("center");
        ctx.set_text_baseline("top");
        let _ = ctx.fill_text(BANNER_TEXT, width / 2.0, BANNER_TOP);
    }
}

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;
