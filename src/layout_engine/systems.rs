use enum_dispatch::enum_dispatch;

use super::{LayoutInput, LayoutParams};
use crate::common::config::LayoutMode;
use crate::model::ClientKey;
use crate::sys::geometry::Rect;

#[enum_dispatch]
pub trait LayoutSystem {
    /// Short name shown in status output; `visible` is the number of
    /// clients the policy arranges.
    fn symbol(&self, visible: usize) -> String;

    /// Places tiled clients inside `params.usable`. Never changes client
    /// state; the caller applies the returned geometry.
    fn arrange(&self, params: &LayoutParams, clients: &[LayoutInput]) -> Vec<(ClientKey, Rect)>;
}

mod floating;
pub use floating::FloatingLayoutSystem;
mod monocle;
pub use monocle::MonocleLayoutSystem;
mod tile;
pub use tile::TileLayoutSystem;

#[derive(Debug, Clone)]
#[enum_dispatch(LayoutSystem)]
pub enum LayoutSystemKind {
    Tile(TileLayoutSystem),
    Floating(FloatingLayoutSystem),
    Monocle(MonocleLayoutSystem),
}

impl From<LayoutMode> for LayoutSystemKind {
    fn from(mode: LayoutMode) -> Self {
        match mode {
            LayoutMode::Tile => TileLayoutSystem.into(),
            LayoutMode::Floating => FloatingLayoutSystem.into(),
            LayoutMode::Monocle => MonocleLayoutSystem.into(),
        }
    }
}
