use tracing::{debug, info};

use crate::actor::reactor::Reactor;

pub struct SystemEventHandler;

impl SystemEventHandler {
    pub fn handle_session_locked(reactor: &mut Reactor, locked: bool) {
        if reactor.locked == locked {
            return;
        }
        info!(locked, "session lock changed");
        if locked {
            reactor.exclusive_focus = None;
            reactor.focus(None, false);
            if reactor.keyboard_focus.take().is_some() {
                reactor.scene.keyboard_clear();
            }
            reactor.locked = true;
        } else {
            reactor.locked = false;
            reactor.arrange_all_layers();
            if reactor.exclusive_focus.is_none() {
                reactor.refocus();
            }
        }
    }

    pub fn handle_drag_started(reactor: &mut Reactor) { reactor.in_drag = true; }

    /// Runs the exclusivity scan a drag held back.
    pub fn handle_drag_ended(reactor: &mut Reactor) {
        reactor.in_drag = false;
        if reactor.exclusive_rescan_pending {
            debug!("drag ended, running deferred exclusivity scan");
            reactor.exclusive_rescan_pending = false;
            reactor.arrange_all_layers();
        }
    }
}
