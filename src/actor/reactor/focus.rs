use tracing::trace;

use super::{Direction, Reactor};
use crate::model::{ClientKey, Layer, OutputKey, Surface};
use crate::sys::scene::{BorderState, SceneNode};

impl Reactor {
    /// Hands keyboard focus to `target`, or clears it with `None`.
    ///
    /// Nothing moves while the session is locked, and a layer surface holding
    /// exclusive focus turns away every client request. The fullscreen
    /// backdrop of every output the change touches follows the new top client.
    pub fn focus(&mut self, target: Option<ClientKey>, lift: bool) {
        let before = self.keyboard_focus.and_then(|s| self.surface_output(s));
        self.set_keyboard_focus(target, lift);
        let after = target.and_then(|k| self.clients.get(k)).and_then(|c| c.output);
        for output in [before, after, self.selected_output].into_iter().flatten() {
            self.update_backdrop(output);
        }
    }

    fn surface_output(&self, surface: Surface) -> Option<OutputKey> {
        match surface {
            Surface::Layer(key) => self.layers.get(key).and_then(|l| l.output),
            Surface::Toplevel(key) | Surface::Unmanaged(key) => {
                self.clients.get(key).and_then(|c| c.output)
            }
        }
    }

    fn set_keyboard_focus(&mut self, target: Option<ClientKey>, lift: bool) {
        if self.locked {
            trace!("session locked, ignoring focus change");
            return;
        }
        if target.is_some() && self.exclusive_focus.is_some() {
            trace!("exclusive layer focus held, ignoring client focus");
            return;
        }

        let old = self.keyboard_focus;
        let target = target.and_then(|k| self.clients.get(k).map(|c| (k, c.id, c.surface(k))));

        if let Some((_, id, surface)) = target {
            if lift {
                self.scene.raise_to_top(SceneNode::Client(id));
            }
            if old == Some(surface) {
                return;
            }
        }

        if let Some((key, id, Surface::Toplevel(_))) = target {
            self.focus_order.move_to_front(key);
            if let Some(client) = self.clients.get_mut(key) {
                client.urgent = false;
                if client.output.is_some() {
                    self.selected_output = client.output;
                }
            }
            if self.exclusive_focus.is_none() && !self.in_drag {
                self.scene.set_border(id, BorderState::Focused);
            }
        }

        if let Some(old) = old {
            if target.map(|(_, _, surface)| surface) != Some(old) && !self.release_focus(old) {
                return;
            }
        }

        let Some((_, id, surface)) = target else {
            self.keyboard_focus = None;
            self.scene.keyboard_clear();
            return;
        };
        self.keyboard_focus = Some(surface);
        self.scene.keyboard_enter(SceneNode::Client(id));
        self.scene.set_activated(id, true);
    }

    /// Takes focus away from `old`. Returns false if `old` keeps it: a
    /// mapped layer surface above the clients is never displaced.
    fn release_focus(&mut self, old: Surface) -> bool {
        match old {
            Surface::Layer(key) => {
                let holds = self
                    .layers
                    .get(key)
                    .is_some_and(|l| l.mapped && l.output.is_some() && l.layer() >= Layer::Top);
                !holds
            }
            Surface::Toplevel(key) => {
                if let Some(client) = self.clients.get(key) {
                    let border =
                        if client.urgent { BorderState::Urgent } else { BorderState::Unfocused };
                    let id = client.id;
                    self.scene.set_border(id, border);
                    self.scene.set_activated(id, false);
                }
                true
            }
            Surface::Unmanaged(_) => true,
        }
    }

    /// First client in focus order shown on `output`.
    pub fn focus_top(&self, output: OutputKey) -> Option<ClientKey> {
        self.focus_order.find(|k| self.visible(k, output))
    }

    pub fn raise_and_focus(&mut self, client: ClientKey) { self.focus(Some(client), true); }

    /// Focuses the top client of the selected output.
    pub(super) fn refocus(&mut self) {
        let top = self.selected_output.and_then(|o| self.focus_top(o));
        self.focus(top, true);
    }

    /// Cycles focus through the selected output's visible clients in tiling
    /// order, wrapping at either end.
    pub fn focus_stack(&mut self, direction: Direction) {
        let Some(selected) = self.selected_client() else {
            return;
        };
        if self.clients.get(selected).is_some_and(|c| c.fullscreen) {
            return;
        }
        let Some(output) = self.selected_output else {
            return;
        };
        let candidates: Vec<ClientKey> =
            self.tiling_order.iter().filter(|&k| self.visible(k, output)).collect();
        let Some(pos) = candidates.iter().position(|&k| k == selected) else {
            return;
        };
        let n = candidates.len();
        let next = match direction {
            Direction::Next => candidates[(pos + 1) % n],
            Direction::Prev => candidates[(pos + n - 1) % n],
        };
        self.focus(Some(next), true);
    }

    /// The output after (or before) the selected one, wrapping.
    pub(super) fn output_in_direction(&self, direction: Direction) -> Option<OutputKey> {
        let selected = self.selected_output?;
        let pos = self.output_order.iter().position(|&k| k == selected)?;
        let n = self.output_order.len();
        let index = match direction {
            Direction::Next => (pos + 1) % n,
            Direction::Prev => (pos + n - 1) % n,
        };
        self.output_order.get(index).copied()
    }

    /// Moves the selection to the next enabled output in `direction`.
    pub fn focus_output(&mut self, direction: Direction) {
        if self.selected_output.is_none() {
            return;
        }
        for _ in 0..self.output_order.len() {
            let Some(next) = self.output_in_direction(direction) else {
                return;
            };
            self.selected_output = Some(next);
            if self.outputs.get(next).is_some_and(|o| o.enabled) {
                break;
            }
        }
        self.refocus();
    }
}
