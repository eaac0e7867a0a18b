use super::LayoutSystem;
use crate::layout_engine::{LayoutInput, LayoutParams};
use crate::model::ClientKey;
use crate::sys::geometry::Rect;

/// Leaves every client where it is, only pulling overflowing ones back into
/// the usable area.
#[derive(Debug, Default, Clone, Copy)]
pub struct FloatingLayoutSystem;

impl LayoutSystem for FloatingLayoutSystem {
    fn symbol(&self, _visible: usize) -> String { "><>".to_string() }

    fn arrange(&self, params: &LayoutParams, clients: &[LayoutInput]) -> Vec<(ClientKey, Rect)> {
        clients.iter().map(|c| (c.key, c.geometry.clamp_within(&params.usable))).collect()
    }
}
