use tracing::{debug, trace, warn};

use crate::actor::reactor::Reactor;
use crate::model::{Client, ClientId, ClientInfo, Surface};
use crate::sys::scene::{BorderState, SceneLayer, SceneNode};

pub struct ClientEventHandler;

impl ClientEventHandler {
    pub fn handle_client_mapped(reactor: &mut Reactor, id: ClientId, info: ClientInfo) {
        if let Some(key) = reactor.client_key(id) {
            if reactor.clients.get(key).is_some_and(|c| c.mapped) {
                warn!(?id, "client mapped twice");
                return;
            }
            // Re-mapped after an unmap; start from the new description.
            reactor.clients.remove(key);
            reactor.client_ids.remove(&id);
        }

        let mut client = Client::new(id, &info, reactor.config.settings.border_width);
        client.mapped = true;
        let node = SceneNode::Client(id);

        if client.is_unmanaged() {
            let geometry = client.geometry;
            let key = reactor.clients.insert(client);
            reactor.client_ids.insert(id, key);
            reactor.scene.reparent(node, SceneLayer::Float);
            reactor.scene.place(node, geometry);
            if info.wants_focus && !reactor.locked && reactor.exclusive_focus.is_none() {
                reactor.keyboard_focus = Some(Surface::Unmanaged(key));
                reactor.scene.keyboard_enter(node);
            }
            return;
        }

        let rules = reactor.config.match_rules(info.app_id.as_deref(), info.title.as_deref());
        if let Some(floating) = rules.floating {
            client.floating = floating;
        }
        client.tags = rules.tags;
        let scene_layer = Reactor::scene_layer_for(&client);

        let key = reactor.clients.insert(client);
        reactor.client_ids.insert(id, key);
        reactor.tiling_order.push_front(key);
        if reactor.config.settings.focus_on_map {
            reactor.focus_order.push_front(key);
        } else {
            reactor.focus_order.push_back(key);
        }
        reactor.scene.reparent(node, scene_layer);
        reactor.scene.set_border(id, BorderState::Unfocused);

        let output = rules
            .output
            .and_then(|index| reactor.output_order.get(index).copied())
            .or(reactor.selected_output);
        debug!(?id, ?output, tags = ?rules.tags, "client mapped");
        reactor.set_client_output(key, output, rules.tags);

        if info.fullscreen {
            reactor.set_fullscreen(key, true);
        }
    }

    pub fn handle_client_unmapped(reactor: &mut Reactor, id: ClientId) {
        let Some(key) = reactor.client_key(id) else {
            debug!(?id, "unmap for unknown client");
            return;
        };
        let Some(client) = reactor.clients.get_mut(key) else {
            return;
        };
        if !client.mapped {
            trace!(?id, "client already unmapped");
            return;
        }
        client.mapped = false;
        let unmanaged = client.is_unmanaged();

        if unmanaged {
            if reactor.keyboard_focus == Some(Surface::Unmanaged(key)) {
                reactor.keyboard_focus = None;
                reactor.refocus();
            }
        } else {
            reactor.tiling_order.remove(key);
            reactor.set_client_output(key, None, Default::default());
            reactor.focus_order.remove(key);
            if reactor.keyboard_focus == Some(Surface::Toplevel(key)) {
                reactor.keyboard_focus = None;
            }
        }
        reactor.scene.remove(SceneNode::Client(id));
    }

    pub fn handle_client_destroyed(reactor: &mut Reactor, id: ClientId) {
        let mapped =
            reactor.client_key(id).and_then(|k| reactor.clients.get(k)).is_some_and(|c| c.mapped);
        if mapped {
            Self::handle_client_unmapped(reactor, id);
        }
        let Some(key) = reactor.client_ids.remove(&id) else {
            debug!(?id, "destroy for unknown client");
            return;
        };
        reactor.tiling_order.remove(key);
        reactor.focus_order.remove(key);
        if reactor.keyboard_focus.and_then(|s| s.client()) == Some(key) {
            reactor.keyboard_focus = None;
        }
        reactor.clients.remove(key);
    }

    pub fn handle_fullscreen_request(reactor: &mut Reactor, id: ClientId, fullscreen: bool) {
        let Some(key) = reactor.client_key(id) else {
            debug!(?id, "fullscreen request for unknown client");
            return;
        };
        reactor.set_fullscreen(key, fullscreen);
    }

    /// A client asking for attention is marked urgent unless it already has
    /// focus.
    pub fn handle_urgent(reactor: &mut Reactor, id: ClientId) {
        let Some(key) = reactor.client_key(id) else {
            return;
        };
        if reactor.keyboard_focus == Some(Surface::Toplevel(key)) {
            return;
        }
        if let Some(client) = reactor.clients.get_mut(key) {
            client.urgent = true;
            reactor.scene.set_border(id, BorderState::Urgent);
        }
    }

    pub fn handle_focus_request(reactor: &mut Reactor, id: Option<ClientId>, lift: bool) {
        match id {
            None => reactor.focus(None, lift),
            Some(id) => match reactor.client_key(id) {
                Some(key) if reactor.clients.get(key).is_some_and(|c| c.mapped) => {
                    reactor.focus(Some(key), lift)
                }
                _ => debug!(?id, "focus request for unknown or unmapped client"),
            },
        }
    }
}
