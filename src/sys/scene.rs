//! The scene graph collaborator.
//!
//! The policy core never renders anything itself; it describes the result of
//! every arrangement pass to a [`Scene`]. [`RecordingScene`] keeps an
//! in-memory model of those requests for replays and tests.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use super::geometry::Rect;
use crate::common::collections::{BTreeMap, HashMap, HashSet};
use crate::model::{ClientId, Layer, LayerId, OutputId};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SceneNode {
    Client(ClientId),
    Layer(LayerId),
    /// The black rectangle drawn behind a fullscreen client.
    FullscreenBackdrop(OutputId),
}

/// Scene stacking tiers, bottom to top.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum SceneLayer {
    Background,
    Bottom,
    Tile,
    Float,
    Fullscreen,
    Top,
    Overlay,
    Block,
}

impl SceneLayer {
    pub fn for_shell_layer(layer: Layer) -> SceneLayer {
        match layer {
            Layer::Background => SceneLayer::Background,
            Layer::Bottom => SceneLayer::Bottom,
            Layer::Top => SceneLayer::Top,
            Layer::Overlay => SceneLayer::Overlay,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BorderState {
    Focused,
    Unfocused,
    Urgent,
}

pub trait Scene {
    fn place(&mut self, node: SceneNode, geometry: Rect);
    fn set_enabled(&mut self, node: SceneNode, enabled: bool);
    fn reparent(&mut self, node: SceneNode, layer: SceneLayer);
    fn raise_to_top(&mut self, node: SceneNode);
    fn set_border(&mut self, client: ClientId, state: BorderState);
    fn set_activated(&mut self, client: ClientId, activated: bool);
    fn keyboard_enter(&mut self, node: SceneNode);
    fn keyboard_clear(&mut self);
    /// Asks the protocol side to close a layer surface whose output is gone.
    fn close_layer_surface(&mut self, id: LayerId);
    fn remove(&mut self, node: SceneNode);
}

/// A request as it was issued to the scene, in order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SceneRequest {
    Place(SceneNode, Rect),
    SetEnabled(SceneNode, bool),
    Reparent(SceneNode, SceneLayer),
    RaiseToTop(SceneNode),
    SetBorder(ClientId, BorderState),
    SetActivated(ClientId, bool),
    KeyboardEnter(SceneNode),
    KeyboardClear,
    CloseLayerSurface(LayerId),
    Remove(SceneNode),
}

#[derive(Debug, Default)]
struct SceneModel {
    requests: Vec<SceneRequest>,
    positions: HashMap<SceneNode, Rect>,
    enabled: HashMap<SceneNode, bool>,
    stacks: BTreeMap<SceneLayer, Vec<SceneNode>>,
    borders: HashMap<ClientId, BorderState>,
    activated: HashSet<ClientId>,
    keyboard_focus: Option<SceneNode>,
    closed: Vec<LayerId>,
}

impl SceneModel {
    fn unlink(&mut self, node: SceneNode) -> Option<SceneLayer> {
        for (layer, stack) in self.stacks.iter_mut() {
            if let Some(pos) = stack.iter().position(|n| *n == node) {
                stack.remove(pos);
                return Some(*layer);
            }
        }
        None
    }
}

/// A [`Scene`] that only remembers what it was told. Cloning shares the
/// underlying model, so a test can hand one clone to the reactor and inspect
/// the other.
#[derive(Debug, Default, Clone)]
pub struct RecordingScene(Rc<RefCell<SceneModel>>);

impl RecordingScene {
    pub fn new() -> Self { Self::default() }

    /// Drains the request log.
    pub fn take_requests(&self) -> Vec<SceneRequest> {
        std::mem::take(&mut self.0.borrow_mut().requests)
    }

    pub fn position(&self, node: SceneNode) -> Option<Rect> {
        self.0.borrow().positions.get(&node).copied()
    }

    /// Nodes start out enabled until told otherwise.
    pub fn is_enabled(&self, node: SceneNode) -> bool {
        self.0.borrow().enabled.get(&node).copied().unwrap_or(true)
    }

    /// Every parented node, bottom to top.
    pub fn stacking_order(&self) -> Vec<SceneNode> {
        let model = self.0.borrow();
        SceneLayer::iter()
            .flat_map(|layer| model.stacks.get(&layer).into_iter().flatten().copied())
            .collect()
    }

    pub fn scene_layer(&self, node: SceneNode) -> Option<SceneLayer> {
        let model = self.0.borrow();
        model.stacks.iter().find(|(_, stack)| stack.contains(&node)).map(|(layer, _)| *layer)
    }

    pub fn keyboard_focus(&self) -> Option<SceneNode> { self.0.borrow().keyboard_focus }

    pub fn is_activated(&self, client: ClientId) -> bool {
        self.0.borrow().activated.contains(&client)
    }

    pub fn border(&self, client: ClientId) -> Option<BorderState> {
        self.0.borrow().borders.get(&client).copied()
    }

    pub fn closed_layer_surfaces(&self) -> Vec<LayerId> { self.0.borrow().closed.clone() }
}

impl Scene for RecordingScene {
    fn place(&mut self, node: SceneNode, geometry: Rect) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::Place(node, geometry));
        model.positions.insert(node, geometry);
    }

    fn set_enabled(&mut self, node: SceneNode, enabled: bool) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::SetEnabled(node, enabled));
        model.enabled.insert(node, enabled);
    }

    fn reparent(&mut self, node: SceneNode, layer: SceneLayer) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::Reparent(node, layer));
        model.unlink(node);
        model.stacks.entry(layer).or_default().push(node);
    }

    fn raise_to_top(&mut self, node: SceneNode) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::RaiseToTop(node));
        if let Some(layer) = model.unlink(node) {
            model.stacks.entry(layer).or_default().push(node);
        }
    }

    fn set_border(&mut self, client: ClientId, state: BorderState) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::SetBorder(client, state));
        model.borders.insert(client, state);
    }

    fn set_activated(&mut self, client: ClientId, activated: bool) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::SetActivated(client, activated));
        if activated {
            model.activated.insert(client);
        } else {
            model.activated.remove(&client);
        }
    }

    fn keyboard_enter(&mut self, node: SceneNode) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::KeyboardEnter(node));
        model.keyboard_focus = Some(node);
    }

    fn keyboard_clear(&mut self) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::KeyboardClear);
        model.keyboard_focus = None;
    }

    fn close_layer_surface(&mut self, id: LayerId) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::CloseLayerSurface(id));
        model.closed.push(id);
    }

    fn remove(&mut self, node: SceneNode) {
        let mut model = self.0.borrow_mut();
        model.requests.push(SceneRequest::Remove(node));
        model.unlink(node);
        model.positions.remove(&node);
        model.enabled.remove(&node);
        if model.keyboard_focus == Some(node) {
            model.keyboard_focus = None;
        }
        if let SceneNode::Client(id) = node {
            model.borders.remove(&id);
            model.activated.remove(&id);
        }
    }
}
