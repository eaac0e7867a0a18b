use tracing::{trace, warn};

use super::{Direction, Reactor};
use crate::model::{ClientKey, OutputKey, TagSet};

impl Reactor {
    /// Shows `mask` on `output`, keeping the previous set one
    /// [`view_previous`](Self::view_previous) away. Bits beyond the
    /// configured tags are dropped; an empty or unchanged mask does nothing.
    pub fn set_active_tags(&mut self, output: OutputKey, mask: TagSet) {
        let mask = mask & self.tag_mask;
        let Some(o) = self.outputs.get_mut(output) else {
            return;
        };
        if !o.set_active_tags(mask) {
            trace!(?mask, "tag mask empty or already active");
            return;
        }
        self.refocus();
        self.arrange(output);
    }

    pub fn view_previous(&mut self, output: OutputKey) {
        let Some(o) = self.outputs.get_mut(output) else {
            return;
        };
        o.view_previous();
        self.refocus();
        self.arrange(output);
    }

    /// Flips tag `bit` in the active set of `output` unless that would
    /// leave it empty.
    pub fn toggle_view(&mut self, output: OutputKey, bit: u32) {
        let Some(o) = self.outputs.get_mut(output) else {
            return;
        };
        let mask = o.active_tags() ^ (TagSet::single(bit) & self.tag_mask);
        if !o.replace_active_tags(mask) {
            trace!(bit, "toggling would leave no tag visible");
            return;
        }
        self.refocus();
        self.arrange(output);
    }

    /// Replaces the tags of the selected client.
    pub fn tag(&mut self, mask: TagSet) {
        let mask = mask & self.tag_mask;
        let Some(key) = self.selected_client() else {
            return;
        };
        if mask.is_empty() {
            trace!("ignoring empty tag mask");
            return;
        }
        if let Some(client) = self.clients.get_mut(key) {
            client.tags = mask;
        }
        self.refocus();
        if let Some(output) = self.selected_output {
            self.arrange(output);
        }
    }

    /// Flips tag `bit` on `client` (the selected client if `None`) unless
    /// that would leave it without tags.
    pub fn toggle_tag(&mut self, client: Option<ClientKey>, bit: u32) {
        let Some(key) = client.or_else(|| self.selected_client()) else {
            return;
        };
        let tag_mask = self.tag_mask;
        let Some(client) = self.clients.get_mut(key) else {
            return;
        };
        let tags = client.tags ^ (TagSet::single(bit) & tag_mask);
        if tags.is_empty() {
            trace!(bit, "toggling would leave the client without tags");
            return;
        }
        client.tags = tags;
        let output = client.output;
        self.refocus();
        if let Some(output) = output {
            self.arrange(output);
        }
    }

    pub fn set_layout(&mut self, output: OutputKey, index: Option<usize>) {
        if let Some(index) = index.filter(|&i| i >= self.layout_engine.len()) {
            warn!(index, "no such layout");
            return;
        }
        let Some(o) = self.outputs.get_mut(output) else {
            return;
        };
        o.set_layout(index);
        self.arrange(output);
    }

    /// Has no effect under a floating layout.
    pub fn set_master_factor(&mut self, output: OutputKey, value: f64) {
        let Some(o) = self.outputs.get_mut(output) else {
            return;
        };
        if self.layout_engine.is_floating(o.active_layout()) {
            trace!("floating layout has no master area");
            return;
        }
        if !o.adjust_master_factor(value) {
            trace!(value, "master factor out of range");
            return;
        }
        self.arrange(output);
    }

    pub fn inc_master(&mut self, output: OutputKey, delta: i32) {
        let Some(o) = self.outputs.get_mut(output) else {
            return;
        };
        o.inc_master(delta);
        self.arrange(output);
    }

    /// Sends the selected client to the adjacent output, where it takes the
    /// active tags.
    pub fn tag_output(&mut self, direction: Direction) {
        let Some(key) = self.selected_client() else {
            return;
        };
        let target = self.output_in_direction(direction);
        self.set_client_output(key, target, TagSet::EMPTY);
    }

    pub fn toggle_floating(&mut self) {
        let Some(key) = self.selected_client() else {
            return;
        };
        let Some(client) = self.clients.get(key) else {
            return;
        };
        if client.fullscreen {
            return;
        }
        let floating = !client.floating;
        self.set_floating(key, floating);
    }

    pub fn toggle_fullscreen(&mut self) {
        let Some(key) = self.selected_client() else {
            return;
        };
        let fullscreen = self.clients.get(key).is_some_and(|c| !c.fullscreen);
        self.set_fullscreen(key, fullscreen);
    }
}
