//! The Reactor's job is to keep the model coherent while the world changes
//! under it.
//!
//! It owns every output, client and layer surface, takes events from the
//! protocol side, and describes the resulting arrangement to the [`Scene`].
//! Every mutation that can move something funnels through here: layer
//! surfaces are arranged first, the usable area they leave is handed to the
//! layout engine, and focus is re-evaluated last. Each event is fully
//! processed before [`Reactor::handle_event`] returns.

mod error;
mod focus;
mod layers;
mod replay;
mod tags;

mod events {
    pub mod client;
    pub mod command;
    pub mod layer;
    pub mod output;
    pub mod system;
}

#[cfg(test)]
mod testing;

pub use error::ReactorError;
use events::client::ClientEventHandler;
use events::command::CommandEventHandler;
use events::layer::LayerEventHandler;
use events::output::OutputEventHandler;
use events::system::SystemEventHandler;
pub use replay::{Record, ReplayError, replay};
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tracing::{debug, instrument, trace};

use crate::actor;
use crate::common::collections::HashMap;
use crate::common::config::{Config, Modifiers};
use crate::layout_engine::{LayoutEngine, LayoutInput, LayoutParams};
use crate::model::{
    Client, ClientId, ClientInfo, ClientKey, ClientOrder, Layer, LayerId, LayerKey, LayerSurface,
    LayerSurfaceState, Output, OutputId, OutputKey, Surface, TagSet,
};
use crate::sys::geometry::Rect;
use crate::sys::scene::{Scene, SceneLayer, SceneNode};

pub type Sender = actor::Sender<Event>;
pub type Receiver = actor::Receiver<Event>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// A display became available. The first one becomes the selected
    /// output.
    OutputAdded {
        id: OutputId,
        name: String,
        geometry: Rect,
        enabled: bool,
    },
    /// Mode change, move, or enable toggle.
    OutputStateChanged {
        id: OutputId,
        geometry: Rect,
        enabled: bool,
    },
    OutputRemoved(OutputId),

    ClientMapped {
        id: ClientId,
        info: ClientInfo,
    },
    ClientUnmapped(ClientId),
    ClientDestroyed(ClientId),
    ClientRequestFullscreen {
        id: ClientId,
        fullscreen: bool,
    },
    ClientUrgent(ClientId),
    /// A click or activation request. `None` clears focus.
    ClientFocusRequested {
        id: Option<ClientId>,
        lift: bool,
    },

    LayerSurfaceCreated {
        id: LayerId,
        output: Option<OutputId>,
        state: LayerSurfaceState,
    },
    LayerSurfaceCommitted {
        id: LayerId,
        state: LayerSurfaceState,
        mapped: bool,
    },
    LayerSurfaceDestroyed(LayerId),

    SessionLocked(bool),
    DragStarted,
    DragEnded,

    /// A decoded key press, matched against the configured bindings.
    Key {
        modifiers: Modifiers,
        keysym: u32,
    },
    Command(Command),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Prev,
}

/// User-level operations. Commands without an explicit target act on the
/// selected output and its focused client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    View(TagSet),
    ViewPrevious,
    ToggleView(u32),
    SetTags {
        output: Option<OutputId>,
        mask: TagSet,
    },
    Tag(TagSet),
    ToggleTag {
        client: Option<ClientId>,
        bit: u32,
    },
    /// `index: None` toggles back to the other layout slot.
    SetLayout {
        output: Option<OutputId>,
        index: Option<usize>,
    },
    /// Below 1.0 the value is a delta; from 1.0 up it sets `value - 1.0`.
    SetMasterFactor(f64),
    IncMaster(i32),
    FocusStack(Direction),
    FocusOutput(Direction),
    TagOutput(Direction),
    ToggleFloating,
    ToggleFullscreen,
    Quit,
}

pub struct Reactor {
    config: Config,
    tag_mask: TagSet,
    layout_engine: LayoutEngine,
    scene: Box<dyn Scene>,
    record: Record,
    outputs: SlotMap<OutputKey, Output>,
    output_ids: HashMap<OutputId, OutputKey>,
    /// Outputs in the order they appeared; used for direction cycling.
    output_order: Vec<OutputKey>,
    selected_output: Option<OutputKey>,
    clients: SlotMap<ClientKey, Client>,
    client_ids: HashMap<ClientId, ClientKey>,
    tiling_order: ClientOrder,
    focus_order: ClientOrder,
    layers: SlotMap<LayerKey, LayerSurface>,
    layer_ids: HashMap<LayerId, LayerKey>,
    keyboard_focus: Option<Surface>,
    exclusive_focus: Option<LayerKey>,
    locked: bool,
    in_drag: bool,
    exclusive_rescan_pending: bool,
    quit_requested: bool,
}

/// A serializable picture of the current arrangement.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub selected_output: Option<OutputId>,
    pub focused_client: Option<ClientId>,
    pub exclusive_focus: Option<LayerId>,
    pub outputs: Vec<OutputSnapshot>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OutputSnapshot {
    pub id: OutputId,
    pub name: String,
    pub enabled: bool,
    pub monitor: Rect,
    pub usable: Rect,
    pub active_tags: TagSet,
    pub layout_symbol: String,
    pub clients: Vec<ClientSnapshot>,
    pub layers: Vec<LayerSnapshot>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClientSnapshot {
    pub id: ClientId,
    pub geometry: Rect,
    pub tags: TagSet,
    pub floating: bool,
    pub fullscreen: bool,
    pub visible: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LayerSnapshot {
    pub id: LayerId,
    pub layer: Layer,
    pub geometry: Rect,
    pub mapped: bool,
}

impl Reactor {
    pub fn new(config: Config, scene: Box<dyn Scene>, record: Record) -> Reactor {
        Reactor {
            tag_mask: config.tag_mask(),
            layout_engine: LayoutEngine::new(&config.layout),
            config,
            scene,
            record,
            outputs: SlotMap::with_key(),
            output_ids: HashMap::default(),
            output_order: Vec::new(),
            selected_output: None,
            clients: SlotMap::with_key(),
            client_ids: HashMap::default(),
            tiling_order: ClientOrder::new(),
            focus_order: ClientOrder::new(),
            layers: SlotMap::with_key(),
            layer_ids: HashMap::default(),
            keyboard_focus: None,
            exclusive_focus: None,
            locked: false,
            in_drag: false,
            exclusive_rescan_pending: false,
            quit_requested: false,
        }
    }

    /// Drains `events` until the channel closes or a quit command arrives.
    pub fn run(&mut self, mut events: Receiver) -> Result<(), ReactorError> {
        while let Some((span, event)) = events.blocking_recv() {
            let _guard = span.enter();
            self.handle_event(event)?;
            if self.quit_requested {
                debug!("quit requested, leaving event loop");
                break;
            }
        }
        Ok(())
    }

    fn log_event(&self, event: &Event) {
        match event {
            Event::LayerSurfaceCommitted { .. } | Event::Key { .. } => trace!(?event, "Event"),
            _ => debug!(?event, "Event"),
        }
    }

    #[instrument(name = "reactor::handle_event", skip(self), fields(event=?event))]
    pub fn handle_event(&mut self, event: Event) -> Result<(), ReactorError> {
        self.log_event(&event);
        self.record.on_event(&event);

        match event {
            Event::OutputAdded { id, name, geometry, enabled } => {
                OutputEventHandler::handle_output_added(self, id, name, geometry, enabled)
            }
            Event::OutputStateChanged { id, geometry, enabled } => {
                OutputEventHandler::handle_output_state_changed(self, id, geometry, enabled)
            }
            Event::OutputRemoved(id) => {
                return OutputEventHandler::handle_output_removed(self, id);
            }
            Event::ClientMapped { id, info } => {
                ClientEventHandler::handle_client_mapped(self, id, info)
            }
            Event::ClientUnmapped(id) => ClientEventHandler::handle_client_unmapped(self, id),
            Event::ClientDestroyed(id) => ClientEventHandler::handle_client_destroyed(self, id),
            Event::ClientRequestFullscreen { id, fullscreen } => {
                ClientEventHandler::handle_fullscreen_request(self, id, fullscreen)
            }
            Event::ClientUrgent(id) => ClientEventHandler::handle_urgent(self, id),
            Event::ClientFocusRequested { id, lift } => {
                ClientEventHandler::handle_focus_request(self, id, lift)
            }
            Event::LayerSurfaceCreated { id, output, state } => {
                LayerEventHandler::handle_layer_created(self, id, output, state)
            }
            Event::LayerSurfaceCommitted { id, state, mapped } => {
                LayerEventHandler::handle_layer_committed(self, id, state, mapped)
            }
            Event::LayerSurfaceDestroyed(id) => LayerEventHandler::handle_layer_destroyed(self, id),
            Event::SessionLocked(locked) => SystemEventHandler::handle_session_locked(self, locked),
            Event::DragStarted => SystemEventHandler::handle_drag_started(self),
            Event::DragEnded => SystemEventHandler::handle_drag_ended(self),
            Event::Key { modifiers, keysym } => {
                CommandEventHandler::handle_key(self, modifiers, keysym)
            }
            Event::Command(command) => CommandEventHandler::handle_command(self, command),
        }
        Ok(())
    }

    /// The visibility predicate: `client` sits on `output` and shares a tag
    /// with its active set.
    pub fn visible(&self, client: ClientKey, output: OutputKey) -> bool {
        let (Some(c), Some(o)) = (self.clients.get(client), self.outputs.get(output)) else {
            return false;
        };
        c.output == Some(output) && c.tags.intersects(o.active_tags())
    }

    /// Shows, hides and places every client on `output`.
    pub fn arrange(&mut self, key: OutputKey) {
        let Some(output) = self.outputs.get(key) else {
            return;
        };
        let output_id = output.id;
        let enabled = output.enabled;
        let layout = output.active_layout();
        let params = LayoutParams {
            monitor: output.monitor,
            usable: output.usable,
            master_factor: output.master_factor,
            master_count: output.master_count,
        };

        let shown: Vec<(ClientId, bool)> = self
            .clients
            .iter()
            .filter(|(_, c)| c.output == Some(key))
            .map(|(k, c)| (c.id, self.visible(k, key)))
            .collect();
        for (id, visible) in shown {
            self.scene.set_enabled(SceneNode::Client(id), visible);
        }

        self.update_backdrop(key);

        let inputs: Vec<LayoutInput> = self
            .tiling_order
            .iter()
            .filter(|&k| self.visible(k, key))
            .filter_map(|k| {
                self.clients.get(k).map(|c| LayoutInput {
                    key: k,
                    geometry: c.geometry,
                    floating: c.floating,
                    fullscreen: c.fullscreen,
                })
            })
            .collect();

        let symbol = self.layout_engine.symbol(layout, LayoutEngine::tiled_count(&inputs));
        if let Some(output) = self.outputs.get_mut(key) {
            output.set_symbol(&symbol);
        }

        if !enabled {
            trace!(output = ?output_id, "output disabled, skipping layout");
            return;
        }

        for (k, geometry) in self.layout_engine.arrange(layout, &params, &inputs) {
            if let Some(client) = self.clients.get_mut(k) {
                client.geometry = geometry;
                self.scene.place(SceneNode::Client(client.id), geometry);
            }
        }
    }

    /// Shows the fullscreen backdrop exactly when the top client of `key` is
    /// fullscreen.
    pub(super) fn update_backdrop(&mut self, key: OutputKey) {
        let Some(output) = self.outputs.get(key) else {
            return;
        };
        let output_id = output.id;
        let fullscreen_on_top =
            self.focus_top(key).and_then(|k| self.clients.get(k)).is_some_and(|c| c.fullscreen);
        self.scene.set_enabled(SceneNode::FullscreenBackdrop(output_id), fullscreen_on_top);
    }

    /// Moves a client to `output`, or detaches it with `None`. Empty `tags`
    /// adopt the new output's active set.
    fn set_client_output(&mut self, key: ClientKey, output: Option<OutputKey>, tags: TagSet) {
        let Some(client) = self.clients.get_mut(key) else {
            return;
        };
        let old = client.output;
        if old == output {
            return;
        }
        client.output = output;
        client.prev_geometry = client.geometry;

        if let Some(old) = old {
            self.arrange(old);
        }

        match output.and_then(|o| self.outputs.get(o).map(|out| (o, out.active_tags(), out.usable))) {
            Some((new, active, usable)) => {
                if let Some(client) = self.clients.get_mut(key) {
                    client.tags = if tags.is_empty() { active } else { tags };
                    if client.floating {
                        client.geometry = client.geometry.clamp_within(&usable);
                    }
                }
                self.arrange(new);
            }
            None => {
                if let Some(client) = self.clients.get_mut(key) {
                    if !tags.is_empty() {
                        client.tags = tags;
                    }
                }
            }
        }
        self.refocus();
    }

    fn scene_layer_for(client: &Client) -> SceneLayer {
        if client.fullscreen {
            SceneLayer::Fullscreen
        } else if client.floating {
            SceneLayer::Float
        } else {
            SceneLayer::Tile
        }
    }

    fn set_floating(&mut self, key: ClientKey, floating: bool) {
        let Some(client) = self.clients.get_mut(key) else {
            return;
        };
        client.floating = floating;
        let layer = Self::scene_layer_for(client);
        let (id, output) = (client.id, client.output);
        self.scene.reparent(SceneNode::Client(id), layer);
        if let Some(output) = output {
            self.arrange(output);
        }
    }

    fn set_fullscreen(&mut self, key: ClientKey, fullscreen: bool) {
        let Some(client) = self.clients.get_mut(key) else {
            return;
        };
        client.fullscreen = fullscreen;
        let Some(output) = client.output else {
            return;
        };
        if fullscreen {
            client.prev_geometry = client.geometry;
        } else {
            client.geometry = client.prev_geometry;
        }
        let id = client.id;
        let geometry = client.geometry;
        let layer = Self::scene_layer_for(client);
        self.scene.reparent(SceneNode::Client(id), layer);
        if !fullscreen {
            self.scene.place(SceneNode::Client(id), geometry);
        }
        self.arrange(output);
    }

    /// The focused client, if it is shown on the selected output.
    fn selected_client(&self) -> Option<ClientKey> {
        let first = self.focus_order.front()?;
        let output = self.selected_output?;
        self.visible(first, output).then_some(first)
    }

    fn output_key(&self, id: OutputId) -> Option<OutputKey> { self.output_ids.get(&id).copied() }

    fn client_key(&self, id: ClientId) -> Option<ClientKey> { self.client_ids.get(&id).copied() }

    pub fn quit_requested(&self) -> bool { self.quit_requested }

    pub fn selected_output(&self) -> Option<OutputId> {
        self.selected_output.and_then(|k| self.outputs.get(k)).map(|o| o.id)
    }

    pub fn usable_area(&self, id: OutputId) -> Option<Rect> {
        self.output_key(id).and_then(|k| self.outputs.get(k)).map(|o| o.usable)
    }

    pub fn active_tags(&self, id: OutputId) -> Option<TagSet> {
        self.output_key(id).and_then(|k| self.outputs.get(k)).map(|o| o.active_tags())
    }

    pub fn layout_symbol(&self, id: OutputId) -> Option<String> {
        self.output_key(id).and_then(|k| self.outputs.get(k)).map(|o| o.symbol().to_string())
    }

    pub fn client_geometry(&self, id: ClientId) -> Option<Rect> {
        self.client_key(id).and_then(|k| self.clients.get(k)).map(|c| c.geometry)
    }

    pub fn client_tags(&self, id: ClientId) -> Option<TagSet> {
        self.client_key(id).and_then(|k| self.clients.get(k)).map(|c| c.tags)
    }

    pub fn client_output(&self, id: ClientId) -> Option<OutputId> {
        let client = self.client_key(id).and_then(|k| self.clients.get(k))?;
        client.output.and_then(|o| self.outputs.get(o)).map(|o| o.id)
    }

    pub fn is_floating(&self, id: ClientId) -> bool {
        self.client_key(id).and_then(|k| self.clients.get(k)).is_some_and(|c| c.floating)
    }

    pub fn is_urgent(&self, id: ClientId) -> bool {
        self.client_key(id).and_then(|k| self.clients.get(k)).is_some_and(|c| c.urgent)
    }

    /// Whether the client is shown on the output it belongs to.
    pub fn is_visible(&self, id: ClientId) -> bool {
        let Some(key) = self.client_key(id) else {
            return false;
        };
        self.clients.get(key).and_then(|c| c.output).is_some_and(|o| self.visible(key, o))
    }

    /// Clients shown on `id`, in tiling order.
    pub fn visible_clients(&self, id: OutputId) -> Vec<ClientId> {
        let Some(output) = self.output_key(id) else {
            return Vec::new();
        };
        self.tiling_order
            .iter()
            .filter(|&k| self.visible(k, output))
            .filter_map(|k| self.clients.get(k).map(|c| c.id))
            .collect()
    }

    pub fn focus_order(&self) -> Vec<ClientId> {
        self.focus_order.iter().filter_map(|k| self.clients.get(k).map(|c| c.id)).collect()
    }

    /// The client holding keyboard focus, if any.
    pub fn focused_client(&self) -> Option<ClientId> {
        let key = self.keyboard_focus?.client()?;
        self.clients.get(key).map(|c| c.id)
    }

    pub fn exclusive_focus(&self) -> Option<LayerId> {
        self.exclusive_focus.and_then(|k| self.layers.get(k)).map(|l| l.id)
    }

    pub fn layer_geometry(&self, id: LayerId) -> Option<Rect> {
        self.layer_ids.get(&id).and_then(|&k| self.layers.get(k)).map(|l| l.geometry)
    }

    pub fn snapshot(&self) -> Snapshot {
        let outputs = self
            .output_order
            .iter()
            .filter_map(|&key| self.outputs.get(key).map(|output| (key, output)))
            .map(|(key, output)| OutputSnapshot {
                id: output.id,
                name: output.name.clone(),
                enabled: output.enabled,
                monitor: output.monitor,
                usable: output.usable,
                active_tags: output.active_tags(),
                layout_symbol: output.symbol().to_string(),
                clients: self
                    .tiling_order
                    .iter()
                    .filter_map(|k| self.clients.get(k).map(|c| (k, c)))
                    .filter(|(_, c)| c.output == Some(key))
                    .map(|(k, c)| ClientSnapshot {
                        id: c.id,
                        geometry: c.geometry,
                        tags: c.tags,
                        floating: c.floating,
                        fullscreen: c.fullscreen,
                        visible: self.visible(k, key),
                    })
                    .collect(),
                layers: Layer::top_down()
                    .flat_map(move |layer| output.layer_surfaces(layer).iter().rev())
                    .filter_map(|&k| self.layers.get(k))
                    .map(|l| LayerSnapshot {
                        id: l.id,
                        layer: l.layer(),
                        geometry: l.geometry,
                        mapped: l.mapped,
                    })
                    .collect(),
            })
            .collect();
        Snapshot {
            selected_output: self.selected_output(),
            focused_client: self.focused_client(),
            exclusive_focus: self.exclusive_focus(),
            outputs,
        }
    }
}
