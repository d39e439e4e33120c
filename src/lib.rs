//! orthoglyph — an orthogonal grid router and junction-aware box-drawing
//! renderer for pre-positioned flowchart diagrams (spec.md §1).
//!
//! Grounded on the teacher's `lib.rs` (`render_dsl`: parse, lay out, route,
//! paint, return the rendered string) for the shape of the top-level
//! entry point, with parsing and layout dropped per spec.md §1's explicit
//! non-goals and node-box painting added in their place (SPEC_FULL.md §6
//! supplement — the teacher painted boxes too, just from its own AST
//! rather than pre-positioned input).

pub mod canvas;
pub mod charset;
pub mod config;
pub mod diagram;
pub mod error;
pub mod geometry;
pub mod junction;
pub mod obstacle;
pub mod pathfind;
pub mod ports;
pub mod render;
pub mod router;

use tracing::debug;

use canvas::{CellStyle, Color};
use charset::{BoxChars, LineStyle, UnicodeLevel};
use config::RenderSettings;
use diagram::{Diagram, DiagramType, Node};
use error::RenderError;
use render::path_renderer::{draw_path, CornerMode, RenderOptions};
use router::{Router, RoutedPath};

/// Which border glyph set a node's `style`/`box-style` hints select
/// (spec.md §6). Shapes beyond a plain rectangle — circle, diamond,
/// hexagon, stadium — aren't part of this renderer's scope; they fall
/// back to the plain rectangle border rather than attempting bespoke
/// ASCII-art outlines.
fn border_chars(node: &Node, level: UnicodeLevel) -> BoxChars {
    if !matches!(level, UnicodeLevel::Extended | UnicodeLevel::Full) {
        return BoxChars::for_level(level);
    }
    match node.hint("style").or_else(|| node.hint("box-style")) {
        Some("double") => BoxChars::double(),
        Some("rounded") => BoxChars::rounded(),
        _ => BoxChars::for_level(level),
    }
}

fn node_style(node: &Node, color_enabled: bool) -> CellStyle {
    if !color_enabled {
        return CellStyle::default();
    }
    CellStyle {
        color: node.hint("color").or_else(|| node.hint("border-color")).and_then(Color::parse),
        bold: node.hint_is("bold", "true"),
    }
}

fn connection_style(conn: &diagram::Connection, color_enabled: bool) -> CellStyle {
    if !color_enabled {
        return CellStyle::default();
    }
    CellStyle {
        color: conn.hint("color").and_then(Color::parse),
        bold: conn.is_bold(),
    }
}

fn paint_node(canvas: &mut canvas::Canvas, node: &Node, settings: &RenderSettings) {
    let bc = border_chars(node, settings.unicode_level);
    canvas.draw_box(node.bounds(), &bc);
    let style = node_style(node, settings.color);
    let b = node.bounds();
    for col in b.x..b.right() {
        for row in b.y..b.bottom() {
            canvas.set_style(col, row, style.clone());
        }
    }

    let inner_width = (b.width - 2).max(0) as usize;
    for (i, line) in node.text.iter().enumerate() {
        let row = b.y + 1 + i as i64;
        if row >= b.bottom() - 1 {
            break;
        }
        let line_width = unicode_width::UnicodeWidthStr::width(line.as_str());
        let pad = inner_width.saturating_sub(line_width) / 2;
        canvas.write_str(b.x + 1 + pad as i64, row, line);
    }
}

fn paint_connection(
    canvas: &mut canvas::Canvas,
    conn: &diagram::Connection,
    routed: &RoutedPath,
    settings: &RenderSettings,
) {
    let options = RenderOptions {
        draw_arrow_at_end: true,
        draw_arrow_at_start: conn.is_bidirectional(),
        is_connection: true,
        mode: CornerMode::Standard,
        line_style: LineStyle::from_hint(conn.hint("style")),
        unicode_level: settings.unicode_level,
        style: connection_style(conn, settings.color),
    };
    draw_path(canvas, &routed.path, &options);

    if let Some(label) = &conn.label {
        if !label.is_empty() {
            let mid = routed.path.points[routed.path.points.len() / 2];
            canvas.write_str(mid.x, (mid.y - 1).max(0), label);
        }
    }
}

fn canvas_dimensions(diagram: &Diagram, routed: &[RoutedPath]) -> (usize, usize) {
    let mut max_x = 1i64;
    let mut max_y = 1i64;
    for node in &diagram.nodes {
        max_x = max_x.max(node.bounds().right() + 1);
        max_y = max_y.max(node.bounds().bottom() + 1);
    }
    for r in routed {
        for p in &r.path.points {
            max_x = max_x.max(p.x + 2);
            max_y = max_y.max(p.y + 2);
        }
    }
    (max_x as usize, max_y as usize)
}

/// Validates, routes, and paints `diagram` onto a text canvas, returning
/// the rendered string (spec.md §1, §7: any failure aborts with no
/// partial output).
pub fn render(diagram: &Diagram, settings: &RenderSettings) -> Result<String, RenderError> {
    if diagram.diagram_type != DiagramType::Flowchart {
        return Err(RenderError::Unsupported(diagram.diagram_type));
    }
    if let Some(id) = diagram.duplicate_node_id() {
        return Err(RenderError::InputInvalid { connection_id: id });
    }
    for conn in &diagram.connections {
        if diagram.node(conn.from).is_none() || diagram.node(conn.to).is_none() {
            return Err(RenderError::InputInvalid { connection_id: conn.id });
        }
    }

    debug!(nodes = diagram.nodes.len(), connections = diagram.connections.len(), "rendering diagram");

    let router = Router::new(&diagram.nodes, settings);
    let routed = router.route_all(&diagram.connections)?;

    let (width, height) = canvas_dimensions(diagram, &routed);
    let mut canvas = canvas::Canvas::new(width, height, BoxChars::for_level(settings.unicode_level));

    for node in &diagram.nodes {
        paint_node(&mut canvas, node, settings);
    }

    let routed_by_id: std::collections::HashMap<u64, &RoutedPath> =
        routed.iter().map(|r| (r.connection_id, r)).collect();
    for conn in &diagram.connections {
        if let Some(r) = routed_by_id.get(&conn.id) {
            paint_connection(&mut canvas, conn, r, settings);
        }
    }

    if settings.color {
        Ok(canvas.render_to_ansi_string())
    } else {
        Ok(canvas.render_to_string())
    }
}
