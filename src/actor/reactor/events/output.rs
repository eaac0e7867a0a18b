use tracing::{debug, info, warn};

use crate::actor::reactor::{Reactor, ReactorError};
use crate::model::{ClientKey, Output, OutputId, OutputKey, Surface, TagSet};
use crate::sys::geometry::Rect;
use crate::sys::scene::{SceneLayer, SceneNode};

pub struct OutputEventHandler;

impl OutputEventHandler {
    pub fn handle_output_added(
        reactor: &mut Reactor,
        id: OutputId,
        name: String,
        geometry: Rect,
        enabled: bool,
    ) {
        if reactor.output_ids.contains_key(&id) {
            warn!(?id, "output added twice, treating as a state change");
            Self::handle_output_state_changed(reactor, id, geometry, enabled);
            return;
        }

        let layout_count = reactor.layout_engine.len();
        let (layout, master_factor, master_count) = match reactor.config.monitor_rule(&name) {
            Some(rule) => (rule.layout.min(layout_count - 1), rule.master_factor, rule.master_count),
            None => (0, reactor.config.layout.master_factor, reactor.config.layout.master_count),
        };
        let alternate = if layout_count > 1 && layout != 1 { 1 } else { 0 };

        info!(?id, %name, ?geometry, enabled, "output added");
        let output = Output::new(
            id,
            name,
            geometry,
            enabled,
            [layout, alternate],
            master_factor,
            master_count,
        );
        let key = reactor.outputs.insert(output);
        reactor.output_ids.insert(id, key);
        reactor.output_order.push(key);

        let backdrop = SceneNode::FullscreenBackdrop(id);
        reactor.scene.reparent(backdrop, SceneLayer::Fullscreen);
        reactor.scene.place(backdrop, geometry);
        reactor.scene.set_enabled(backdrop, false);

        if reactor.selected_output.is_none() {
            reactor.selected_output = Some(key);
        }

        reactor.arrange_layers(key);
        reactor.arrange(key);
        Self::adopt_orphans(reactor);
    }

    pub fn handle_output_state_changed(
        reactor: &mut Reactor,
        id: OutputId,
        geometry: Rect,
        enabled: bool,
    ) {
        let Some(key) = reactor.output_key(id) else {
            debug!(?id, "state change for unknown output");
            return;
        };
        let Some(output) = reactor.outputs.get_mut(key) else {
            return;
        };
        let origin_delta = (geometry.x - output.monitor.x, geometry.y - output.monitor.y);
        output.monitor = geometry;
        output.enabled = enabled;
        reactor.scene.place(SceneNode::FullscreenBackdrop(id), geometry);

        // Floating clients travel with the output.
        if origin_delta != (0, 0) {
            for (_, client) in reactor.clients.iter_mut() {
                if client.output == Some(key) && client.floating {
                    client.geometry = client.geometry.translate(origin_delta.0, origin_delta.1);
                }
            }
        }

        if !enabled && reactor.selected_output == Some(key) {
            if let Some(other) = Self::first_enabled_output(reactor) {
                reactor.selected_output = Some(other);
            }
        }

        reactor.arrange_layers(key);
        reactor.arrange(key);
        Self::adopt_orphans(reactor);
        reactor.refocus();
    }

    /// Tears down an output: its layer surfaces are closed and its clients
    /// move to the newly selected output, keeping their tags.
    pub fn handle_output_removed(reactor: &mut Reactor, id: OutputId) -> Result<(), ReactorError> {
        let Some(key) = reactor.output_ids.remove(&id) else {
            debug!(?id, "removal of unknown output");
            return Ok(());
        };
        info!(?id, "output removed");

        if let Some(output) = reactor.outputs.get_mut(key) {
            for layer_key in output.take_layer_surfaces() {
                let Some(surface) = reactor.layers.get_mut(layer_key) else {
                    continue;
                };
                surface.output = None;
                let layer_id = surface.id;
                if reactor.exclusive_focus == Some(layer_key) {
                    reactor.exclusive_focus = None;
                }
                if reactor.keyboard_focus == Some(Surface::Layer(layer_key)) {
                    reactor.keyboard_focus = None;
                }
                reactor.scene.close_layer_surface(layer_id);
            }
        }

        let Some(removed) = reactor.outputs.remove(key) else {
            return Ok(());
        };
        reactor.output_order.retain(|&k| k != key);
        reactor.scene.remove(SceneNode::FullscreenBackdrop(id));

        if reactor.outputs.is_empty() {
            return Err(ReactorError::NoOutputRemaining { removed: id });
        }

        if reactor.selected_output == Some(key) || reactor.selected_output.is_none() {
            reactor.selected_output =
                Self::first_enabled_output(reactor).or_else(|| reactor.output_order.first().copied());
        }
        let Some(target) = reactor.selected_output else {
            return Ok(());
        };
        let target_origin = reactor.outputs.get(target).map(|o| (o.monitor.x, o.monitor.y));

        let orphans: Vec<ClientKey> = reactor
            .tiling_order
            .iter()
            .filter(|&k| reactor.clients.get(k).is_some_and(|c| c.output == Some(key)))
            .collect();
        for client_key in orphans {
            let Some(client) = reactor.clients.get_mut(client_key) else {
                continue;
            };
            client.output = None;
            if let (true, Some((x, y))) = (client.floating, target_origin) {
                client.geometry =
                    client.geometry.translate(x - removed.monitor.x, y - removed.monitor.y);
            }
            let tags = client.tags;
            reactor.set_client_output(client_key, Some(target), tags);
        }

        reactor.arrange_layers(target);
        reactor.arrange(target);
        reactor.refocus();
        Ok(())
    }

    fn first_enabled_output(reactor: &Reactor) -> Option<OutputKey> {
        reactor
            .output_order
            .iter()
            .copied()
            .find(|&k| reactor.outputs.get(k).is_some_and(|o| o.enabled))
    }

    /// Clients mapped while no output existed land on the selected output.
    fn adopt_orphans(reactor: &mut Reactor) {
        let Some(selected) = reactor.selected_output else {
            return;
        };
        if !reactor.outputs.get(selected).is_some_and(|o| o.enabled) {
            return;
        }
        let orphans: Vec<(ClientKey, TagSet)> = reactor
            .tiling_order
            .iter()
            .filter_map(|k| reactor.clients.get(k).map(|c| (k, c)))
            .filter(|(_, c)| c.output.is_none() && c.mapped)
            .map(|(k, c)| (k, c.tags))
            .collect();
        for (client_key, tags) in orphans {
            reactor.set_client_output(client_key, Some(selected), tags);
        }
    }
}
