use super::LayoutSystem;
use crate::layout_engine::{LayoutInput, LayoutParams};
use crate::model::ClientKey;
use crate::sys::geometry::Rect;

#[derive(Debug, Default, Clone, Copy)]
pub struct MonocleLayoutSystem;

impl LayoutSystem for MonocleLayoutSystem {
    fn symbol(&self, visible: usize) -> String {
        if visible > 0 { format!("[{visible}]") } else { "[M]".to_string() }
    }

    fn arrange(&self, params: &LayoutParams, clients: &[LayoutInput]) -> Vec<(ClientKey, Rect)> {
        clients.iter().map(|c| (c.key, params.usable)).collect()
    }
}
