//! Turns the visible clients of one output into placements.
//!
//! Policies live in [`systems`]; the engine applies the rules shared by all
//! of them: fullscreen clients cover the monitor, floating clients keep their
//! geometry unless it overflows the usable area, and everything else is
//! handed to the active policy in tiling order.

pub mod systems;

use serde::{Deserialize, Serialize};
use tracing::trace;

pub use systems::{
    FloatingLayoutSystem, LayoutSystem, LayoutSystemKind, MonocleLayoutSystem, TileLayoutSystem,
};

use crate::common::config::{LayoutMode, LayoutSettings};
use crate::model::ClientKey;
use crate::sys::geometry::Rect;

/// Per-output parameters for one arrangement pass.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub monitor: Rect,
    pub usable: Rect,
    pub master_factor: f64,
    pub master_count: u32,
}

/// A visible client as the layout sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutInput {
    pub key: ClientKey,
    pub geometry: Rect,
    pub floating: bool,
    pub fullscreen: bool,
}

#[derive(Debug, Clone)]
pub struct LayoutEngine {
    systems: Vec<LayoutSystemKind>,
}

impl LayoutEngine {
    pub fn new(settings: &LayoutSettings) -> LayoutEngine {
        let mut systems: Vec<LayoutSystemKind> =
            settings.layouts.iter().copied().map(LayoutSystemKind::from).collect();
        if systems.is_empty() {
            systems.push(LayoutSystemKind::from(LayoutMode::Tile));
        }
        LayoutEngine { systems }
    }

    pub fn len(&self) -> usize { self.systems.len() }

    pub fn is_empty(&self) -> bool { self.systems.is_empty() }

    /// Unknown indices fall back to the first layout.
    fn system(&self, index: usize) -> &LayoutSystemKind {
        self.systems.get(index).unwrap_or(&self.systems[0])
    }

    pub fn symbol(&self, index: usize, visible: usize) -> String {
        self.system(index).symbol(visible)
    }

    pub fn is_floating(&self, index: usize) -> bool {
        matches!(self.system(index), LayoutSystemKind::Floating(_))
    }

    /// `clients` must be the output's visible clients in tiling order.
    pub fn arrange(
        &self,
        index: usize,
        params: &LayoutParams,
        clients: &[LayoutInput],
    ) -> Vec<(ClientKey, Rect)> {
        let mut placements = Vec::with_capacity(clients.len());
        let mut tiled = Vec::with_capacity(clients.len());
        for client in clients {
            if client.fullscreen {
                placements.push((client.key, params.monitor));
            } else if client.floating {
                placements.push((client.key, client.geometry.clamp_within(&params.usable)));
            } else {
                tiled.push(*client);
            }
        }
        trace!(layout = index, tiled = tiled.len(), "arranging");
        placements.extend(self.system(index).arrange(params, &tiled));
        placements
    }

    /// Number of clients the active policy will receive.
    pub fn tiled_count(clients: &[LayoutInput]) -> usize {
        clients.iter().filter(|c| !c.floating && !c.fullscreen).count()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use slotmap::SlotMap;

    use super::*;

    const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

    fn params(usable: Rect) -> LayoutParams {
        LayoutParams {
            monitor: SCREEN,
            usable,
            master_factor: 0.5,
            master_count: 1,
        }
    }

    fn inputs(n: usize) -> Vec<LayoutInput> {
        let mut keys: SlotMap<ClientKey, ()> = SlotMap::with_key();
        (0..n)
            .map(|_| LayoutInput {
                key: keys.insert(()),
                geometry: Rect::new(100, 100, 400, 300),
                floating: false,
                fullscreen: false,
            })
            .collect()
    }

    #[test]
    fn floating_clients_skip_the_policy() {
        let engine = LayoutEngine::new(&LayoutSettings::default());
        let mut clients = inputs(2);
        clients[1].floating = true;
        clients[1].geometry = Rect::new(1800, 100, 400, 300);

        let placements = engine.arrange(0, &params(SCREEN), &clients);
        assert_eq!(
            placements,
            vec![
                (clients[1].key, Rect::new(1520, 100, 400, 300)),
                (clients[0].key, SCREEN),
            ]
        );
    }

    #[test]
    fn floating_client_inside_usable_area_is_not_moved() {
        let engine = LayoutEngine::new(&LayoutSettings::default());
        let mut clients = inputs(1);
        clients[0].floating = true;
        let usable = Rect::new(0, 30, 1920, 1050);
        let placements = engine.arrange(0, &params(usable), &clients);
        assert_eq!(placements, vec![(clients[0].key, clients[0].geometry)]);
    }

    #[test]
    fn fullscreen_covers_the_monitor() {
        let engine = LayoutEngine::new(&LayoutSettings::default());
        let mut clients = inputs(2);
        clients[0].fullscreen = true;
        let usable = Rect::new(0, 30, 1920, 1050);
        let placements = engine.arrange(0, &params(usable), &clients);
        assert_eq!(placements[0], (clients[0].key, SCREEN));
        assert_eq!(placements[1], (clients[1].key, usable));
    }

    #[test]
    fn symbols_and_fallback() {
        let engine = LayoutEngine::new(&LayoutSettings::default());
        assert_eq!(engine.symbol(0, 3), "[]=");
        assert_eq!(engine.symbol(1, 3), "><>");
        assert_eq!(engine.symbol(2, 3), "[3]");
        assert_eq!(engine.symbol(2, 0), "[M]");
        assert_eq!(engine.symbol(42, 1), "[]=");
        assert!(engine.is_floating(1));

        let empty = LayoutEngine::new(&LayoutSettings { layouts: vec![], ..Default::default() });
        assert_eq!(empty.len(), 1);
    }
}
