use tracing::{info, trace};

use crate::actor::reactor::{Command, Reactor};
use crate::common::config::Modifiers;
use crate::model::{OutputId, OutputKey};

pub struct CommandEventHandler;

impl CommandEventHandler {
    pub fn handle_key(reactor: &mut Reactor, modifiers: Modifiers, keysym: u32) {
        if reactor.locked {
            trace!("session locked, ignoring key bindings");
            return;
        }
        let Some(command) = reactor.config.binding(modifiers, keysym).cloned() else {
            trace!(?modifiers, keysym, "no binding");
            return;
        };
        Self::handle_command(reactor, command);
    }

    pub fn handle_command(reactor: &mut Reactor, command: Command) {
        info!(?command);
        let selected = reactor.selected_output;
        match command {
            Command::View(mask) => {
                if let Some(output) = selected {
                    reactor.set_active_tags(output, mask);
                }
            }
            Command::ViewPrevious => {
                if let Some(output) = selected {
                    reactor.view_previous(output);
                }
            }
            Command::ToggleView(bit) => {
                if let Some(output) = selected {
                    reactor.toggle_view(output, bit);
                }
            }
            Command::SetTags { output, mask } => {
                if let Some(output) = Self::target_output(reactor, output) {
                    reactor.set_active_tags(output, mask);
                }
            }
            Command::Tag(mask) => reactor.tag(mask),
            Command::ToggleTag { client, bit } => match client {
                Some(id) => {
                    if let Some(key) = reactor.client_key(id) {
                        reactor.toggle_tag(Some(key), bit);
                    }
                }
                None => reactor.toggle_tag(None, bit),
            },
            Command::SetLayout { output, index } => {
                if let Some(output) = Self::target_output(reactor, output) {
                    reactor.set_layout(output, index);
                }
            }
            Command::SetMasterFactor(value) => {
                if let Some(output) = selected {
                    reactor.set_master_factor(output, value);
                }
            }
            Command::IncMaster(delta) => {
                if let Some(output) = selected {
                    reactor.inc_master(output, delta);
                }
            }
            Command::FocusStack(direction) => reactor.focus_stack(direction),
            Command::FocusOutput(direction) => reactor.focus_output(direction),
            Command::TagOutput(direction) => reactor.tag_output(direction),
            Command::ToggleFloating => reactor.toggle_floating(),
            Command::ToggleFullscreen => reactor.toggle_fullscreen(),
            Command::Quit => reactor.quit_requested = true,
        }
    }

    /// An explicit output, or the selected one.
    fn target_output(reactor: &Reactor, output: Option<OutputId>) -> Option<OutputKey> {
        match output {
            Some(id) => reactor.output_key(id),
            None => reactor.selected_output,
        }
    }
}
