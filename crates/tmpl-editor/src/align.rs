//! Batch alignment of selected objects.

use std::fmt;
use std::str::FromStr;
use tmpl_core::id::ObjectId;
use tmpl_core::model::page_rect;
use tmpl_core::scene::SceneGraph;

/// Which edge or center line to line objects up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignEdge {
    Left,
    /// Horizontal center.
    Center,
    Right,
    Top,
    /// Vertical center.
    Middle,
    Bottom,
}

impl AlignEdge {
    pub const ALL: [AlignEdge; 6] = [
        AlignEdge::Left,
        AlignEdge::Center,
        AlignEdge::Right,
        AlignEdge::Top,
        AlignEdge::Middle,
        AlignEdge::Bottom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlignEdge::Left => "left",
            AlignEdge::Center => "center",
            AlignEdge::Right => "right",
            AlignEdge::Top => "top",
            AlignEdge::Middle => "middle",
            AlignEdge::Bottom => "bottom",
        }
    }
}

impl fmt::Display for AlignEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlignEdge {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AlignEdge::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| format!("unknown alignment edge `{s}`"))
    }
}

/// Move the unlocked objects among `ids` so their `edge` lines up.
///
/// With two or more ids the reference is the union of their unrotated
/// extents; with one it is the page. Only `left`/`top` change. Returns how
/// many objects actually moved.
pub fn align_objects(scene: &mut SceneGraph, ids: &[ObjectId], edge: AlignEdge) -> usize {
    let reference = if ids.len() > 1 {
        match scene.extent_of(ids) {
            Some(r) => r,
            None => return 0,
        }
    } else {
        page_rect()
    };

    let mut moved = 0;
    for id in ids {
        let Some(obj) = scene.get_mut(*id) else {
            continue;
        };
        if obj.locked {
            continue;
        }
        let extent = obj.geometry.extent();
        let (dx, dy) = match edge {
            AlignEdge::Left => (reference.x0 - extent.x0, 0.0),
            AlignEdge::Center => (reference.center().x - extent.center().x, 0.0),
            AlignEdge::Right => (reference.x1 - extent.x1, 0.0),
            AlignEdge::Top => (0.0, reference.y0 - extent.y0),
            AlignEdge::Middle => (0.0, reference.center().y - extent.center().y),
            AlignEdge::Bottom => (0.0, reference.y1 - extent.y1),
        };
        if dx != 0.0 || dy != 0.0 {
            obj.translate(dx, dy);
            moved += 1;
        }
    }
    log::debug!("align {edge}: moved {moved} of {} objects", ids.len());
    moved
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tmpl_core::factory;
    use tmpl_core::model::PAGE_WIDTH;

    fn three_rects() -> (SceneGraph, Vec<ObjectId>) {
        let mut scene = SceneGraph::new();
        let ids = vec![
            scene.add(factory::rectangle(40.0, 200.0)),
            scene.add(factory::rectangle(300.0, 60.0)),
            scene.add(factory::circle(180.0, 400.0)),
        ];
        (scene, ids)
    }

    #[test]
    fn left_uses_minimum_left() {
        let (mut scene, ids) = three_rects();
        assert_eq!(align_objects(&mut scene, &ids, AlignEdge::Left), 2);
        for id in &ids {
            let g = scene.get(*id).unwrap().geometry;
            assert_eq!(g.left, 40.0);
        }
        assert_eq!(scene.get(ids[2]).unwrap().geometry.width, 80.0);
    }

    #[test]
    fn right_and_bottom_use_far_edges() {
        let (mut scene, ids) = three_rects();
        align_objects(&mut scene, &ids, AlignEdge::Right);
        align_objects(&mut scene, &ids, AlignEdge::Bottom);
        for id in &ids {
            let e = scene.get(*id).unwrap().geometry.extent();
            assert_eq!(e.x1, 420.0);
            assert_eq!(e.y1, 480.0);
        }
    }

    #[test]
    fn middle_centers_vertically() {
        let (mut scene, ids) = three_rects();
        align_objects(&mut scene, &ids, AlignEdge::Middle);
        for id in &ids {
            assert_eq!(scene.get(*id).unwrap().geometry.extent().center().y, 270.0);
        }
    }

    #[test]
    fn single_object_aligns_to_page() {
        let mut scene = SceneGraph::new();
        let id = scene.add(factory::rectangle(10.0, 10.0));
        align_objects(&mut scene, &[id], AlignEdge::Center);
        let e = scene.get(id).unwrap().geometry.extent();
        assert_eq!(e.center().x, PAGE_WIDTH / 2.0);
        assert_eq!(e.y0, 10.0);
    }

    #[test]
    fn locked_members_stay_put() {
        let (mut scene, ids) = three_rects();
        scene.get_mut(ids[1]).unwrap().locked = true;
        align_objects(&mut scene, &ids, AlignEdge::Top);
        assert_eq!(scene.get(ids[1]).unwrap().geometry.top, 60.0);
        assert_eq!(scene.get(ids[0]).unwrap().geometry.top, 60.0);
        assert_eq!(scene.get(ids[2]).unwrap().geometry.top, 60.0);
    }

    #[test]
    fn edge_names_parse() {
        for edge in AlignEdge::ALL {
            assert_eq!(edge.as_str().parse::<AlignEdge>(), Ok(edge));
        }
        assert!("diagonal".parse::<AlignEdge>().is_err());
    }
}
