//! End-to-end scenarios (spec.md §8): full `render()` calls against
//! whole diagrams, plus the router/pathfinder boundary cases.

use orthoglyph::config::RenderSettings;
use orthoglyph::diagram::{Connection, Diagram, DiagramType, Node};
use orthoglyph::error::RenderError;
use orthoglyph::geometry::{Bounds, Direction, Point};
use orthoglyph::pathfind::astar;
use orthoglyph::pathfind::smart::SmartPathfinder;
use orthoglyph::ports::PortManager;

fn node(id: u64, x: i64, y: i64, w: i64, h: i64) -> Node {
    Node::new(id, x, y, w, h)
}

fn flowchart(nodes: Vec<Node>, connections: Vec<Connection>) -> Diagram {
    Diagram {
        diagram_type: DiagramType::Flowchart,
        nodes,
        connections,
    }
}

#[test]
fn two_horizontal_boxes_single_connection() {
    let diagram = flowchart(
        vec![node(1, 5, 5, 10, 5), node(2, 25, 5, 10, 5)],
        vec![Connection::new(1, 1, 2)],
    );
    let settings = RenderSettings::default();
    let out = orthoglyph::render(&diagram, &settings).unwrap();
    assert!(out.contains("┌────────┐"));
    assert!(out.contains('▶'));
}

#[test]
fn two_vertical_boxes_single_connection() {
    let diagram = flowchart(
        vec![node(1, 5, 2, 10, 4), node(2, 5, 20, 10, 4)],
        vec![Connection::new(1, 1, 2)],
    );
    let settings = RenderSettings::default();
    let out = orthoglyph::render(&diagram, &settings).unwrap();
    assert!(out.contains('▼'));
}

#[test]
fn three_node_chain_detours_around_middle_obstacle() {
    let diagram = flowchart(
        vec![node(1, 0, 10, 6, 3), node(2, 40, 10, 6, 3), node(3, 20, 10, 8, 3)],
        vec![Connection::new(1, 1, 2)],
    );
    let settings = RenderSettings::default();
    let out = orthoglyph::render(&diagram, &settings).unwrap();
    assert!(!out.is_empty());

    // The direct Manhattan route between the two outer nodes is blocked
    // by the middle one, so the detour must cost strictly more than a
    // straight line over the same span would.
    let cm = settings.cost_model;
    let blocked = |p: Point| Bounds::new(20, 10, 8, 3).contains(p);
    let straight = astar::search(Point::new(6, 11), Point::new(40, 11), &|_| false, &cm).unwrap();
    let detoured = astar::search(Point::new(6, 11), Point::new(40, 11), &blocked, &cm).unwrap();
    assert!(detoured.cost > straight.cost);
}

#[test]
fn self_loop_renders_five_point_inverted_u() {
    let diagram = flowchart(vec![node(1, 5, 5, 12, 4)], vec![Connection::new(1, 1, 1)]);
    let settings = RenderSettings::default();
    let out = orthoglyph::render(&diagram, &settings).unwrap();
    assert!(out.contains('┐'));
    assert!(out.contains('┘'));
}

#[test]
fn port_stacking_under_four_connections_to_a_narrow_node() {
    let pm = PortManager::new(1, 1, 3, 2);
    let target = node(9, 0, 0, 4, 4);
    let ports: Vec<_> = (1..=4).map(|id| pm.reserve(&target, Direction::East, id).unwrap()).collect();
    assert!(ports.iter().any(|p| p.stack_level > 0));
    let points: std::collections::HashSet<_> = ports.iter().map(|p| p.point).collect();
    assert_eq!(points.len(), ports.len());
}

#[test]
fn repeated_identical_search_is_a_cache_hit() {
    let pf = SmartPathfinder::new(10, 50_000);
    let cm = RenderSettings::default().cost_model;
    let blocked = |p: Point| Bounds::new(10, -2, 4, 5).contains(p);
    let first = pf.find_path(Point::new(0, 0), Point::new(20, 0), &blocked, &cm).unwrap();
    let second = pf.find_path(Point::new(0, 0), Point::new(20, 0), &blocked, &cm).unwrap();
    assert_eq!(first.points, second.points);
    assert_eq!(pf.cache().hits(), 1);
    assert_eq!(pf.cache().misses(), 1);
}

#[test]
fn start_equals_end_search_is_zero_cost_single_point() {
    let cm = RenderSettings::default().cost_model;
    let path = astar::search(Point::new(4, 4), Point::new(4, 4), &|_| false, &cm).unwrap();
    assert_eq!(path.points, vec![Point::new(4, 4)]);
    assert_eq!(path.cost, 0);
}

#[test]
fn blocked_start_point_is_an_error() {
    let cm = RenderSettings::default().cost_model;
    let blocked = |p: Point| p == Point::new(2, 2);
    assert!(astar::search(Point::new(2, 2), Point::new(9, 9), &blocked, &cm).is_err());
}

#[test]
fn fully_walled_off_target_is_a_routing_failure() {
    let cm = RenderSettings::default().cost_model;
    let blocked = |p: Point| p.x == 5;
    assert!(astar::search(Point::new(0, 0), Point::new(10, 0), &blocked, &cm).is_err());
}

#[test]
fn exactly_one_free_port_candidate_is_returned() {
    let pm = PortManager::new(1, 1, 3, 2);
    // East edge length is the node's height; margin 1 on a 3-row node
    // leaves only position 1 between the margins.
    let target = node(1, 0, 0, 5, 3);
    let available = pm.available(&target, Direction::East);
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].position, 1);
}

#[test]
fn closed_rectangle_path_renders_corners_without_junctions() {
    use orthoglyph::canvas::Canvas;
    use orthoglyph::charset::{BoxChars, UnicodeLevel};
    use orthoglyph::geometry::Path;
    use orthoglyph::render::path_renderer::{draw_path, CornerMode, RenderOptions};

    let mut canvas = Canvas::new(15, 10, BoxChars::for_level(UnicodeLevel::Full));
    let path = Path::new(
        vec![
            Point::new(2, 2),
            Point::new(8, 2),
            Point::new(8, 6),
            Point::new(2, 6),
            Point::new(2, 2),
        ],
        1,
    );
    let options = RenderOptions {
        mode: CornerMode::PreserveCorners,
        ..Default::default()
    };
    draw_path(&mut canvas, &path, &options);
    assert_eq!(canvas.get(2, 2), '┌');
    assert_eq!(canvas.get(8, 2), '┐');
    assert_eq!(canvas.get(8, 6), '┘');
    assert_eq!(canvas.get(2, 6), '└');
    assert_eq!(canvas.get(5, 2), '─');
    assert_eq!(canvas.get(2, 4), '│');
}

#[test]
fn rejects_unsupported_sequence_diagrams() {
    let diagram = flowchart(vec![], vec![]);
    let mut sequence = diagram;
    sequence.diagram_type = DiagramType::Sequence;
    let err = orthoglyph::render(&sequence, &RenderSettings::default()).unwrap_err();
    assert!(matches!(err, RenderError::Unsupported(DiagramType::Sequence)));
}
