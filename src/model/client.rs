use serde::{Deserialize, Serialize};

use super::{ClientKey, OutputKey, Surface, TagSet};
use crate::sys::geometry::Rect;

/// Identifier the protocol side uses for a toplevel surface.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub u64);

#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ClientKind {
    #[default]
    Toplevel,
    /// Override-redirect style surfaces: positioned where they ask, never
    /// tiled and never part of the focus order.
    Unmanaged,
}

/// What the protocol side knows about a client when it maps.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct ClientInfo {
    #[serde(default)]
    pub kind: ClientKind,
    /// Requested content box, borders excluded.
    pub geometry: Rect,
    #[serde(default)]
    pub app_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Dialogs and fixed-size windows start floating.
    #[serde(default)]
    pub floating: bool,
    #[serde(default)]
    pub fullscreen: bool,
    #[serde(default)]
    pub wants_focus: bool,
}

#[derive(Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    pub kind: ClientKind,
    /// Layout-relative, border inclusive.
    pub geometry: Rect,
    /// Geometry before the last fullscreen or output change.
    pub prev_geometry: Rect,
    pub border_width: u32,
    pub tags: TagSet,
    /// Weak back-reference; whenever set it names a live output.
    pub output: Option<OutputKey>,
    pub floating: bool,
    pub urgent: bool,
    pub fullscreen: bool,
    pub mapped: bool,
    pub app_id: Option<String>,
    pub title: Option<String>,
}

impl Client {
    pub fn new(id: ClientId, info: &ClientInfo, border_width: u32) -> Client {
        let border_width = match info.kind {
            ClientKind::Toplevel => border_width,
            ClientKind::Unmanaged => 0,
        };
        let bw = border_width as i32;
        let geometry = Rect {
            width: info.geometry.width + 2 * bw,
            height: info.geometry.height + 2 * bw,
            ..info.geometry
        };
        Client {
            id,
            kind: info.kind,
            geometry,
            prev_geometry: geometry,
            border_width,
            tags: TagSet::EMPTY,
            output: None,
            floating: info.floating,
            urgent: false,
            fullscreen: false,
            mapped: false,
            app_id: info.app_id.clone(),
            title: info.title.clone(),
        }
    }

    pub fn is_unmanaged(&self) -> bool { self.kind == ClientKind::Unmanaged }

    pub fn is_tiled(&self) -> bool { !self.floating && !self.fullscreen }

    pub fn surface(&self, key: ClientKey) -> Surface {
        match self.kind {
            ClientKind::Toplevel => Surface::Toplevel(key),
            ClientKind::Unmanaged => Surface::Unmanaged(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borders_are_added_to_requested_size() {
        let info = ClientInfo {
            geometry: Rect::new(10, 20, 300, 200),
            ..Default::default()
        };
        let client = Client::new(ClientId(1), &info, 2);
        assert_eq!(client.geometry, Rect::new(10, 20, 304, 204));
        assert!(client.is_tiled());
    }

    #[test]
    fn unmanaged_clients_have_no_border() {
        let info = ClientInfo {
            kind: ClientKind::Unmanaged,
            geometry: Rect::new(0, 0, 50, 50),
            ..Default::default()
        };
        let client = Client::new(ClientId(7), &info, 2);
        assert_eq!(client.border_width, 0);
        assert_eq!(client.geometry, Rect::new(0, 0, 50, 50));
        assert!(client.is_unmanaged());
    }
}
