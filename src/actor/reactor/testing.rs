use super::{Command, Event, Reactor, Record};
use crate::common::config::Config;
use crate::model::{
    Anchor, ClientId, ClientInfo, KeyboardInteractivity, Layer, LayerId, LayerSurfaceState,
    OutputId, TagSet,
};
use crate::sys::geometry::Rect;
use crate::sys::scene::RecordingScene;

pub const SCREEN: Rect = Rect::new(0, 0, 1920, 1080);

impl Reactor {
    pub fn new_for_test(config: Config) -> (Reactor, RecordingScene) {
        let scene = RecordingScene::new();
        let reactor = Reactor::new(config, Box::new(scene.clone()), Record::none());
        (reactor, scene)
    }

    pub fn handle_events(&mut self, events: impl IntoIterator<Item = Event>) {
        for event in events {
            self.handle_event(event).unwrap();
        }
    }
}

/// The default configuration without borders, so client geometry equals
/// what the layout hands out.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.settings.border_width = 0;
    config
}

pub fn reactor() -> (Reactor, RecordingScene) { Reactor::new_for_test(test_config()) }

pub fn add_output(id: u32, geometry: Rect) -> Event {
    Event::OutputAdded {
        id: OutputId(id),
        name: format!("OUT-{id}"),
        geometry,
        enabled: true,
    }
}

pub fn map_client(id: u64) -> Event {
    Event::ClientMapped {
        id: ClientId(id),
        info: ClientInfo {
            geometry: Rect::new(0, 0, 640, 480),
            app_id: Some(format!("app{id}")),
            ..Default::default()
        },
    }
}

pub fn map_floating(id: u64, geometry: Rect) -> Event {
    Event::ClientMapped {
        id: ClientId(id),
        info: ClientInfo {
            geometry,
            floating: true,
            ..Default::default()
        },
    }
}

pub fn command(command: Command) -> Event { Event::Command(command) }

pub fn view(tag: u32) -> Event { command(Command::View(TagSet::single(tag))) }

pub fn top_bar(height: u32) -> LayerSurfaceState {
    LayerSurfaceState {
        layer: Layer::Top,
        anchor: Anchor::TOP | Anchor::LEFT | Anchor::RIGHT,
        desired_height: height,
        exclusive_zone: height as i32,
        ..Default::default()
    }
}

pub fn bottom_bar(height: u32) -> LayerSurfaceState {
    LayerSurfaceState {
        anchor: Anchor::BOTTOM | Anchor::LEFT | Anchor::RIGHT,
        ..top_bar(height)
    }
}

/// A centered, keyboard-grabbing launcher on the overlay layer.
pub fn launcher() -> LayerSurfaceState {
    LayerSurfaceState {
        layer: Layer::Overlay,
        desired_width: 600,
        desired_height: 400,
        keyboard_interactivity: KeyboardInteractivity::Exclusive,
        ..Default::default()
    }
}

pub fn wallpaper() -> LayerSurfaceState {
    LayerSurfaceState {
        layer: Layer::Background,
        anchor: Anchor::all(),
        exclusive_zone: -1,
        ..Default::default()
    }
}

/// Creates a layer surface on `output` and maps it in one go.
pub fn map_layer(id: u64, output: u32, state: LayerSurfaceState) -> Vec<Event> {
    vec![
        Event::LayerSurfaceCreated {
            id: LayerId(id),
            output: Some(OutputId(output)),
            state,
        },
        Event::LayerSurfaceCommitted { id: LayerId(id), state, mapped: true },
    ]
}

pub fn unmap_layer(id: u64, state: LayerSurfaceState) -> Event {
    Event::LayerSurfaceCommitted { id: LayerId(id), state, mapped: false }
}
