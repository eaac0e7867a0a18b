pub mod client;
pub mod layer;
pub mod order;
pub mod output;
pub mod tags;

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

pub use client::{Client, ClientId, ClientInfo, ClientKind};
pub use layer::{Anchor, KeyboardInteractivity, Layer, LayerId, LayerSurface, LayerSurfaceState};
pub use order::ClientOrder;
pub use output::{Output, OutputId};
pub use tags::TagSet;

new_key_type! {
    pub struct OutputKey;
    pub struct ClientKey;
    pub struct LayerKey;
}

/// Anything that can hold keyboard focus.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    Toplevel(ClientKey),
    Layer(LayerKey),
    Unmanaged(ClientKey),
}

impl Surface {
    pub fn client(&self) -> Option<ClientKey> {
        match *self {
            Surface::Toplevel(key) | Surface::Unmanaged(key) => Some(key),
            Surface::Layer(_) => None,
        }
    }
}
