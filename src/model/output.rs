use serde::{Deserialize, Serialize};

use super::{Layer, LayerKey, TagSet};
use crate::sys::geometry::Rect;

/// Longest layout symbol kept for status reporting.
pub const MAX_SYMBOL_LEN: usize = 15;

/// Identifier the backend uses for a physical display.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputId(pub u32);

#[derive(Debug, Clone)]
pub struct Output {
    pub id: OutputId,
    pub name: String,
    pub enabled: bool,
    /// Full monitor box, layout relative.
    pub monitor: Rect,
    /// Monitor box minus reserved exclusive zones.
    pub usable: Rect,
    layers: [Vec<LayerKey>; Layer::COUNT],
    tagset: [TagSet; 2],
    seltags: usize,
    layouts: [usize; 2],
    sellt: usize,
    symbol: String,
    pub master_factor: f64,
    pub master_count: u32,
}

impl Output {
    pub fn new(
        id: OutputId,
        name: String,
        monitor: Rect,
        enabled: bool,
        layouts: [usize; 2],
        master_factor: f64,
        master_count: u32,
    ) -> Output {
        Output {
            id,
            name,
            enabled,
            monitor,
            usable: monitor,
            layers: Default::default(),
            tagset: [TagSet::single(0); 2],
            seltags: 0,
            layouts,
            sellt: 0,
            symbol: String::new(),
            master_factor,
            master_count,
        }
    }

    pub fn active_tags(&self) -> TagSet { self.tagset[self.seltags] }

    pub fn previous_tags(&self) -> TagSet { self.tagset[self.seltags ^ 1] }

    /// Switches to `mask` (already limited to the configured tags) through
    /// the spare slot so the old set stays reachable. Empty masks and the
    /// set already shown are ignored.
    pub fn set_active_tags(&mut self, mask: TagSet) -> bool {
        if mask.is_empty() || mask == self.active_tags() {
            return false;
        }
        self.seltags ^= 1;
        self.tagset[self.seltags] = mask;
        true
    }

    pub fn view_previous(&mut self) { self.seltags ^= 1; }

    /// Replaces the active set in place. Empty masks are ignored.
    pub fn replace_active_tags(&mut self, mask: TagSet) -> bool {
        if mask.is_empty() {
            return false;
        }
        self.tagset[self.seltags] = mask;
        true
    }

    pub fn active_layout(&self) -> usize { self.layouts[self.sellt] }

    /// Selecting a layout other than the active one swaps slots first, so
    /// the previous layout stays one toggle away. `None` only swaps.
    pub fn set_layout(&mut self, index: Option<usize>) {
        if index != Some(self.active_layout()) {
            self.sellt ^= 1;
        }
        if let Some(index) = index {
            self.layouts[self.sellt] = index;
        }
    }

    pub fn symbol(&self) -> &str { &self.symbol }

    pub fn set_symbol(&mut self, symbol: &str) {
        self.symbol.clear();
        self.symbol.extend(symbol.chars().take(MAX_SYMBOL_LEN));
    }

    pub fn layer_surfaces(&self, layer: Layer) -> &[LayerKey] { &self.layers[layer.index()] }

    pub fn insert_layer_surface(&mut self, layer: Layer, key: LayerKey) {
        self.layers[layer.index()].push(key);
    }

    pub fn remove_layer_surface(&mut self, layer: Layer, key: LayerKey) -> bool {
        let list = &mut self.layers[layer.index()];
        let before = list.len();
        list.retain(|&k| k != key);
        list.len() != before
    }

    /// Empties every layer list, handing back the former members.
    pub fn take_layer_surfaces(&mut self) -> Vec<LayerKey> {
        self.layers.iter_mut().flat_map(std::mem::take).collect()
    }

    /// Applies a master factor change: values below 1.0 are deltas, values
    /// of 1.0 and above set `value - 1.0` directly. Results outside
    /// `[0.1, 0.9]` are rejected.
    pub fn adjust_master_factor(&mut self, value: f64) -> bool {
        let factor = if value < 1.0 { value + self.master_factor } else { value - 1.0 };
        if !(0.1..=0.9).contains(&factor) {
            return false;
        }
        self.master_factor = factor;
        true
    }

    pub fn inc_master(&mut self, delta: i32) {
        self.master_count = self.master_count.saturating_add_signed(delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output() -> Output {
        Output::new(
            OutputId(1),
            "DP-1".into(),
            Rect::new(0, 0, 1920, 1080),
            true,
            [0, 1],
            0.55,
            1,
        )
    }

    #[test]
    fn tag_switch_is_double_buffered() {
        let mut output = output();
        assert_eq!(output.active_tags(), TagSet::single(0));

        assert!(output.set_active_tags(TagSet::single(2)));
        assert_eq!(output.active_tags(), TagSet::single(2));
        assert_eq!(output.previous_tags(), TagSet::single(0));

        output.view_previous();
        assert_eq!(output.active_tags(), TagSet::single(0));
    }

    #[test]
    fn empty_or_identical_mask_is_ignored() {
        let mut output = output();
        assert!(!output.set_active_tags(TagSet::EMPTY));
        assert!(!output.set_active_tags(TagSet::single(0)));
        assert_eq!(output.active_tags(), TagSet::single(0));
        assert!(!output.replace_active_tags(TagSet::EMPTY));
    }

    #[test]
    fn layout_slots_toggle() {
        let mut output = output();
        assert_eq!(output.active_layout(), 0);
        output.set_layout(Some(2));
        assert_eq!(output.active_layout(), 2);
        output.set_layout(None);
        assert_eq!(output.active_layout(), 0);
        output.set_layout(Some(0));
        assert_eq!(output.active_layout(), 0);
    }

    #[test]
    fn symbol_is_truncated() {
        let mut output = output();
        output.set_symbol("a-very-long-layout-symbol");
        assert_eq!(output.symbol(), "a-very-long-lay");
        assert_eq!(output.symbol().chars().count(), MAX_SYMBOL_LEN);
    }

    #[test]
    fn master_factor_bounds() {
        let mut output = output();
        assert!(output.adjust_master_factor(0.05));
        assert!((output.master_factor - 0.60).abs() < 1e-9);
        assert!(!output.adjust_master_factor(0.5));
        assert!(output.adjust_master_factor(1.3));
        assert!((output.master_factor - 0.3).abs() < 1e-9);
        output.inc_master(-5);
        assert_eq!(output.master_count, 0);
    }
}
