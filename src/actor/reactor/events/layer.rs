use tracing::{debug, trace, warn};

use crate::actor::reactor::Reactor;
use crate::model::{LayerId, LayerSurface, LayerSurfaceState, OutputId, Surface};
use crate::sys::scene::{SceneLayer, SceneNode};

pub struct LayerEventHandler;

impl LayerEventHandler {
    /// Attaches a new layer surface to its output (the selected one if it
    /// did not name one) and arranges it once so it learns its size.
    pub fn handle_layer_created(
        reactor: &mut Reactor,
        id: LayerId,
        output: Option<OutputId>,
        state: LayerSurfaceState,
    ) {
        if reactor.layer_ids.contains_key(&id) {
            warn!(?id, "layer surface created twice");
            return;
        }
        let Some(output) =
            output.and_then(|o| reactor.output_key(o)).or(reactor.selected_output)
        else {
            warn!(?id, "no output for layer surface, closing it");
            reactor.scene.close_layer_surface(id);
            return;
        };

        let key = reactor.layers.insert(LayerSurface::new(id, output, state));
        reactor.layer_ids.insert(id, key);
        if let Some(output) = reactor.outputs.get_mut(output) {
            output.insert_layer_surface(state.layer, key);
        }
        reactor.scene.reparent(SceneNode::Layer(id), SceneLayer::for_shell_layer(state.layer));
        reactor.arrange_layers(output);
    }

    pub fn handle_layer_committed(
        reactor: &mut Reactor,
        id: LayerId,
        state: LayerSurfaceState,
        mapped: bool,
    ) {
        let Some(&key) = reactor.layer_ids.get(&id) else {
            debug!(?id, "commit for unknown layer surface");
            return;
        };
        let Some(surface) = reactor.layers.get_mut(key) else {
            return;
        };
        let Some(output) = surface.output.filter(|&o| reactor.outputs.contains_key(o)) else {
            trace!(?id, "commit for layer surface without output");
            return;
        };

        let old_state = surface.current;
        let was_mapped = surface.mapped;
        surface.current = state;
        surface.mapped = mapped;

        if old_state.layer != state.layer {
            if let Some(output) = reactor.outputs.get_mut(output) {
                output.remove_layer_surface(old_state.layer, key);
                output.insert_layer_surface(state.layer, key);
            }
            reactor.scene.reparent(SceneNode::Layer(id), SceneLayer::for_shell_layer(state.layer));
        }
        if old_state == state && was_mapped == mapped {
            return;
        }
        if was_mapped != mapped {
            reactor.scene.set_enabled(SceneNode::Layer(id), mapped);
        }

        let unmapped = was_mapped && !mapped;
        if unmapped && reactor.exclusive_focus == Some(key) {
            reactor.exclusive_focus = None;
        }
        reactor.arrange_layers(output);

        if unmapped && reactor.keyboard_focus == Some(Surface::Layer(key)) {
            debug!(?id, "focused layer surface unmapped, returning focus");
            reactor.refocus();
        }
    }

    pub fn handle_layer_destroyed(reactor: &mut Reactor, id: LayerId) {
        let Some(key) = reactor.layer_ids.remove(&id) else {
            debug!(?id, "destroy for unknown layer surface");
            return;
        };
        let Some(surface) = reactor.layers.get(key) else {
            return;
        };
        let (layer, output) = (surface.layer(), surface.output);

        // Unlink before the surface goes away.
        if let Some(output) = output.and_then(|o| reactor.outputs.get_mut(o)) {
            output.remove_layer_surface(layer, key);
        }
        if reactor.exclusive_focus == Some(key) {
            reactor.exclusive_focus = None;
        }
        let had_focus = reactor.keyboard_focus == Some(Surface::Layer(key));
        if had_focus {
            reactor.keyboard_focus = None;
        }
        reactor.layers.remove(key);
        reactor.scene.remove(SceneNode::Layer(id));

        if let Some(output) = output.filter(|&o| reactor.outputs.contains_key(o)) {
            reactor.arrange_layers(output);
        }
        if had_focus {
            reactor.refocus();
        }
    }
}
