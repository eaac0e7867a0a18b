use tracing::{debug, trace};

use super::Reactor;
use crate::model::{Layer, LayerKey, OutputKey, Surface};
use crate::sys::geometry::Rect;
use crate::sys::scene::SceneNode;

impl Reactor {
    /// Positions every layer surface on `output`, recomputes its usable area
    /// and settles keyboard exclusivity.
    ///
    /// Surfaces reserving space go first, overlay down to background and
    /// newest first within a layer; each shrinks what is left for the ones
    /// after it. A changed usable area re-tiles the output before the
    /// remaining surfaces are placed inside it.
    pub fn arrange_layers(&mut self, key: OutputKey) {
        let Some(output) = self.outputs.get(key) else {
            return;
        };
        if !output.enabled {
            trace!(output = ?output.id, "output disabled, skipping layer arrangement");
            return;
        }
        let full = output.monitor;
        let ordered: Vec<LayerKey> = Layer::top_down()
            .flat_map(|layer| output.layer_surfaces(layer).iter().rev().copied())
            .collect();

        let mut usable = full;
        self.place_layer_surfaces(&ordered, full, &mut usable, true);

        let changed = match self.outputs.get_mut(key) {
            Some(output) if output.usable != usable => {
                debug!(output = ?output.id, ?usable, "usable area changed");
                output.usable = usable;
                true
            }
            _ => false,
        };
        if changed {
            self.arrange(key);
        }

        self.place_layer_surfaces(&ordered, full, &mut usable, false);
        self.scan_exclusive_focus(key);
    }

    fn place_layer_surfaces(
        &mut self,
        keys: &[LayerKey],
        full: Rect,
        usable: &mut Rect,
        exclusive: bool,
    ) {
        for &key in keys {
            let Some(surface) = self.layers.get_mut(key) else {
                continue;
            };
            if surface.current.is_exclusive() != exclusive {
                continue;
            }
            // Only mapped surfaces take space away from clients.
            let geometry = surface.current.configure(full, usable, surface.mapped);
            surface.geometry = geometry;
            self.scene.place(SceneNode::Layer(surface.id), geometry);
        }
    }

    /// Gives keyboard focus to the newest mapped, keyboard-interactive
    /// surface in the overlay or top layer of `output`.
    fn scan_exclusive_focus(&mut self, key: OutputKey) {
        if self.locked {
            trace!("session locked, skipping exclusivity scan");
            return;
        }
        if self.in_drag {
            trace!("drag in progress, deferring exclusivity scan");
            self.exclusive_rescan_pending = true;
            return;
        }
        let Some(output) = self.outputs.get(key) else {
            return;
        };
        let candidate = Layer::ABOVE_SHELL
            .iter()
            .flat_map(|&layer| output.layer_surfaces(layer).iter().rev().copied())
            .find(|&k| self.layers.get(k).is_some_and(|l| l.wants_keyboard()));
        let Some(candidate) = candidate else {
            return;
        };
        if self.exclusive_focus == Some(candidate) {
            return;
        }
        let Some(id) = self.layers.get(candidate).map(|l| l.id) else {
            return;
        };

        self.focus(None, false);
        debug!(layer = ?id, "layer surface takes keyboard focus");
        self.exclusive_focus = Some(candidate);
        self.keyboard_focus = Some(Surface::Layer(candidate));
        self.scene.keyboard_enter(SceneNode::Layer(id));
    }

    /// Re-runs layer arrangement on every output.
    pub(super) fn arrange_all_layers(&mut self) {
        for key in self.output_order.clone() {
            self.arrange_layers(key);
        }
    }
}
