use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use tracing::warn;

use super::OutputKey;
use crate::sys::geometry::Rect;

/// Identifier the protocol side uses for a layer-shell surface.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

/// Shell-chrome stacking tier, bottom to top.
#[derive(
    Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Background = 0,
    Bottom = 1,
    #[default]
    Top = 2,
    Overlay = 3,
}

impl Layer {
    pub const COUNT: usize = 4;

    /// The tiers that sit above tiled clients, topmost first.
    pub const ABOVE_SHELL: [Layer; 2] = [Layer::Overlay, Layer::Top];

    pub fn index(self) -> usize { self as usize }

    /// Layers from overlay down to background.
    pub fn top_down() -> impl Iterator<Item = Layer> { Layer::iter().rev() }
}

bitflags! {
    #[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    #[serde(transparent)]
    pub struct Anchor: u32 {
        const TOP = 1;
        const BOTTOM = 2;
        const LEFT = 4;
        const RIGHT = 8;
    }
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Margin {
    #[serde(default)]
    pub top: i32,
    #[serde(default)]
    pub right: i32,
    #[serde(default)]
    pub bottom: i32,
    #[serde(default)]
    pub left: i32,
}

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum KeyboardInteractivity {
    #[default]
    None,
    Exclusive,
    OnDemand,
}

impl KeyboardInteractivity {
    pub fn is_interactive(self) -> bool { self != KeyboardInteractivity::None }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// The double-buffered state a layer surface commits.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerSurfaceState {
    #[serde(default)]
    pub layer: Layer,
    #[serde(default)]
    pub anchor: Anchor,
    /// Zero on an axis means "stretch between the anchored edges".
    #[serde(default)]
    pub desired_width: u32,
    #[serde(default)]
    pub desired_height: u32,
    #[serde(default)]
    pub margin: Margin,
    /// Positive reserves space, `0` avoids reserved space, `-1` ignores it.
    #[serde(default)]
    pub exclusive_zone: i32,
    #[serde(default)]
    pub keyboard_interactivity: KeyboardInteractivity,
}

impl LayerSurfaceState {
    pub fn is_exclusive(&self) -> bool { self.exclusive_zone > 0 }

    pub fn exclusive_edge(&self) -> Option<Edge> {
        let a = self.anchor;
        let horiz = Anchor::LEFT | Anchor::RIGHT;
        let vert = Anchor::TOP | Anchor::BOTTOM;
        if a == Anchor::TOP || a == Anchor::TOP | horiz {
            Some(Edge::Top)
        } else if a == Anchor::BOTTOM || a == Anchor::BOTTOM | horiz {
            Some(Edge::Bottom)
        } else if a == Anchor::LEFT || a == Anchor::LEFT | vert {
            Some(Edge::Left)
        } else if a == Anchor::RIGHT || a == Anchor::RIGHT | vert {
            Some(Edge::Right)
        } else {
            None
        }
    }

    /// Resolves where the surface goes given the output's full box and the
    /// space still unreserved. When `reserve` is set and the surface has a
    /// positive exclusive zone, `usable` is shrunk on the anchored edge.
    pub fn configure(&self, full: Rect, usable: &mut Rect, reserve: bool) -> Rect {
        let bounds = if self.exclusive_zone == -1 { full } else { *usable };
        let anchor = self.anchor;
        let margin = self.margin;

        let (x, width) = place_axis(
            bounds.x,
            bounds.width,
            i32::try_from(self.desired_width).unwrap_or(i32::MAX),
            anchor.contains(Anchor::LEFT),
            anchor.contains(Anchor::RIGHT),
            margin.left,
            margin.right,
        );
        let (y, height) = place_axis(
            bounds.y,
            bounds.height,
            i32::try_from(self.desired_height).unwrap_or(i32::MAX),
            anchor.contains(Anchor::TOP),
            anchor.contains(Anchor::BOTTOM),
            margin.top,
            margin.bottom,
        );

        let mut geometry = Rect::new(x, y, width, height);
        if geometry.width < 0 || geometry.height < 0 {
            warn!(?geometry, "layer surface resolved to a negative size");
            geometry.width = geometry.width.max(0);
            geometry.height = geometry.height.max(0);
        }

        if reserve && self.is_exclusive() {
            self.reserve(usable);
        }
        geometry
    }

    fn reserve(&self, usable: &mut Rect) {
        let zone = self.exclusive_zone;
        match self.exclusive_edge() {
            Some(Edge::Top) => {
                let taken = zone.saturating_add(self.margin.top);
                usable.y = usable.y.saturating_add(taken);
                usable.height = usable.height.saturating_sub(taken);
            }
            Some(Edge::Bottom) => {
                usable.height = usable.height.saturating_sub(zone.saturating_add(self.margin.bottom))
            }
            Some(Edge::Left) => {
                let taken = zone.saturating_add(self.margin.left);
                usable.x = usable.x.saturating_add(taken);
                usable.width = usable.width.saturating_sub(taken);
            }
            Some(Edge::Right) => {
                usable.width = usable.width.saturating_sub(zone.saturating_add(self.margin.right))
            }
            None => {}
        }
        usable.width = usable.width.max(0);
        usable.height = usable.height.max(0);
    }
}

/// Positions one axis of a layer surface. Returns `(origin, length)`.
///
/// Saturates on out-of-range client values.
fn place_axis(
    start: i32,
    extent: i32,
    desired: i32,
    lead: bool,
    trail: bool,
    lead_margin: i32,
    trail_margin: i32,
) -> (i32, i32) {
    let centered = || start.saturating_add(extent / 2).saturating_sub(desired / 2);
    if desired == 0 {
        let margins = lead_margin.saturating_add(trail_margin);
        (start.saturating_add(lead_margin), extent.saturating_sub(margins))
    } else if lead && trail {
        (centered(), desired)
    } else if lead {
        (start.saturating_add(lead_margin), desired)
    } else if trail {
        let end = start.saturating_add(extent).saturating_sub(desired);
        (end.saturating_sub(trail_margin), desired)
    } else {
        (centered(), desired)
    }
}

#[derive(Debug, Clone)]
pub struct LayerSurface {
    pub id: LayerId,
    /// `None` once the output went away; such a surface is inert until the
    /// protocol side destroys it.
    pub output: Option<OutputKey>,
    pub current: LayerSurfaceState,
    pub geometry: Rect,
    pub mapped: bool,
}

impl LayerSurface {
    pub fn new(id: LayerId, output: OutputKey, state: LayerSurfaceState) -> LayerSurface {
        LayerSurface {
            id,
            output: Some(output),
            current: state,
            geometry: Rect::default(),
            mapped: false,
        }
    }

    pub fn layer(&self) -> Layer { self.current.layer }

    pub fn wants_keyboard(&self) -> bool {
        self.mapped && self.current.keyboard_interactivity.is_interactive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

    fn bar(anchor: Anchor, height: u32, zone: i32) -> LayerSurfaceState {
        LayerSurfaceState {
            layer: Layer::Top,
            anchor,
            desired_height: height,
            exclusive_zone: zone,
            ..Default::default()
        }
    }

    #[test]
    fn top_bar_reserves_its_height() {
        let state = bar(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 30, 30);
        let mut usable = SCREEN;
        let geometry = state.configure(SCREEN, &mut usable, true);
        assert_eq!(geometry, Rect::new(0, 0, 1920, 30));
        assert_eq!(usable, Rect::new(0, 30, 1920, 1050));
    }

    #[test]
    fn bottom_bar_with_margin() {
        let mut state = bar(Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT, 20, 20);
        state.margin = Margin { bottom: 5, left: 10, right: 10, top: 0 };
        let mut usable = SCREEN;
        let geometry = state.configure(SCREEN, &mut usable, true);
        assert_eq!(geometry, Rect::new(10, 1055, 1900, 20));
        assert_eq!(usable, Rect::new(0, 0, 1920, 1055));
    }

    #[test]
    fn left_dock_shrinks_from_the_left() {
        let state = LayerSurfaceState {
            anchor: Anchor::LEFT | Anchor::TOP | Anchor::BOTTOM,
            desired_width: 64,
            exclusive_zone: 64,
            ..Default::default()
        };
        let mut usable = SCREEN;
        let geometry = state.configure(SCREEN, &mut usable, true);
        assert_eq!(geometry, Rect::new(0, 0, 64, 1080));
        assert_eq!(usable, Rect::new(64, 0, 1856, 1080));
    }

    #[test]
    fn unanchored_surface_is_centered_and_reserves_nothing() {
        let state = LayerSurfaceState {
            desired_width: 400,
            desired_height: 200,
            exclusive_zone: 50,
            ..Default::default()
        };
        assert_eq!(state.exclusive_edge(), None);
        let mut usable = SCREEN;
        let geometry = state.configure(SCREEN, &mut usable, true);
        assert_eq!(geometry, Rect::new(760, 440, 400, 200));
        assert_eq!(usable, SCREEN);
    }

    #[test]
    fn corner_anchor_has_no_exclusive_edge() {
        let state = bar(Anchor::TOP | Anchor::LEFT, 30, 30);
        assert_eq!(state.exclusive_edge(), None);
    }

    #[test]
    fn negative_zone_uses_full_area() {
        let wallpaper = LayerSurfaceState {
            layer: Layer::Background,
            anchor: Anchor::all(),
            exclusive_zone: -1,
            ..Default::default()
        };
        let mut usable = Rect::new(0, 30, 1920, 1050);
        assert_eq!(wallpaper.configure(SCREEN, &mut usable, true), SCREEN);
        assert_eq!(usable, Rect::new(0, 30, 1920, 1050));
    }

    #[test]
    fn unreserved_configure_leaves_usable_area() {
        let state = bar(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 30, 30);
        let mut usable = SCREEN;
        state.configure(SCREEN, &mut usable, false);
        assert_eq!(usable, SCREEN);
    }

    #[test]
    fn oversized_zone_clamps_usable_area_to_zero() {
        let state = bar(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 30, 5000);
        let mut usable = SCREEN;
        state.configure(SCREEN, &mut usable, true);
        assert_eq!(usable.height, 0);
        assert_eq!(usable.area(), 0);
    }

    #[test]
    fn extreme_client_values_saturate() {
        let mut state = bar(Anchor::TOP | Anchor::LEFT | Anchor::RIGHT, 30, i32::MAX);
        state.margin.top = 1;
        let mut usable = SCREEN;
        let geometry = state.configure(SCREEN, &mut usable, true);
        assert_eq!(geometry, Rect::new(0, 1, 1920, 30));
        assert_eq!(usable, Rect::new(0, i32::MAX, 1920, 0));

        let state = LayerSurfaceState {
            anchor: Anchor::RIGHT,
            desired_width: u32::MAX,
            desired_height: u32::MAX,
            margin: Margin { top: i32::MIN, right: i32::MAX, bottom: i32::MAX, left: i32::MIN },
            exclusive_zone: i32::MAX,
            ..Default::default()
        };
        let mut usable = SCREEN;
        let geometry = state.configure(SCREEN, &mut usable, true);
        assert_eq!(geometry.width, i32::MAX);
        assert_eq!(geometry.height, i32::MAX);
        assert_eq!(usable.width, 0);
    }

    #[test]
    fn top_down_walks_overlay_first() {
        assert_eq!(
            Layer::top_down().collect::<Vec<_>>(),
            vec![Layer::Overlay, Layer::Top, Layer::Bottom, Layer::Background]
        );
    }
}
