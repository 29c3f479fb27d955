use crate::geometry::{NodeBox, Point};
use crate::options::LinkType;

/// Geometry of one routed link
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LinkPath {
    pub start: Point,
    pub end: Point,
    pub control_points: Option<(Point, Point)>,
}

/// Route a link from the right edge of `source` to the left edge of `target`
///
/// Curved links get two control points halfway between the endpoints, one
/// level with each end, giving an S-curve that leaves and enters
/// horizontally.
pub(crate) fn route_link(source: &NodeBox, target: &NodeBox, link_type: LinkType) -> LinkPath {
    let start = source.right_anchor();
    let end = target.left_anchor();

    let control_points = match link_type {
        LinkType::Straight => None,
        LinkType::CBezier => {
            let mid_x = start.x + ((end.x - start.x) / 2.0).floor();
            Some((Point::new(mid_x, start.y), Point::new(mid_x, end.y)))
        }
    };

    LinkPath {
        start,
        end,
        control_points,
    }
}
