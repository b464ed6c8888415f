//! Router module - mode state machine and event routing
//!
//! Every control-surface event passes through here exactly once, on the
//! single-threaded event pipeline. The router decides, per active mode,
//! whether an event passes through to the other surface, is intercepted
//! into a state store, or is handed to the sequencer bridge, and it drives
//! mode transitions with their device side effects (layout selection,
//! button colors, state replay).

mod controller_input;
mod hardware_input;
mod mode;
mod modes;

pub use mode::{Mode, MixerView};


use crate::launchpad::PadCommand;
use crate::midi::{ControlEvent, EventKind, MidiMessage, PortId};
use crate::ports::{Outbound, OutboundSender, SurfaceEvent};
use crate::sequencer::SequencerBridge;
use crate::state::ControlStore;
use mode::{MIXER_CC_COUNT, MIXER_CC_FIRST, STORED_BUTTON_CCS};

use std::sync::Arc;

/// Mode state machine and routing rules
pub struct Router {
    /// Active mode; exactly one at any time
    mode: Mode,
    /// Last controller-driven values of the right-column buttons
    button_state: ControlStore,
    /// Last observed values of the mixer parameter range
    mixer_state: ControlStore,
    /// Bridge receiving Session grid presses
    bridge: Arc<SequencerBridge>,
    /// Single device-output path, shared with the bridge's listener tasks
    out: OutboundSender,
}

impl Router {
    /// Create a router in Session mode with empty stores
    pub fn new(bridge: Arc<SequencerBridge>, out: OutboundSender) -> Self {
        Self {
            mode: Mode::Session,
            button_state: ControlStore::new(STORED_BUTTON_CCS),
            mixer_state: ControlStore::new(MIXER_CC_FIRST..MIXER_CC_FIRST + MIXER_CC_COUNT),
            bridge,
            out,
        }
    }

    /// The active mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Put the device into the initial Session state
    pub fn initialize(&self) {
        self.send_command(PadCommand::SessionColor {
            active: 0,
            inactive: 0,
        });
        self.enter_session();
    }

    /// Process one inbound surface event to completion
    pub async fn on_surface_event(&mut self, event: &SurfaceEvent) {
        match event.port {
            PortId::Hardware => self.on_hardware_event(&event.raw).await,
            PortId::Controller => self.on_controller_event(&event.raw),
        }
    }

    /// Record fader-range CCs from either surface, active in every mode
    pub(crate) fn record_mixer(&mut self, event: &ControlEvent) {
        if event.kind == EventKind::ControlChange
            && event.channel == crate::launchpad::FADER_CHANNEL
        {
            self.mixer_state.record(event.id, event.value);
        }
    }

    pub(crate) fn send_command(&self, command: PadCommand) {
        self.send_hardware(command.to_bytes());
    }

    pub(crate) fn send_hardware(&self, bytes: Vec<u8>) {
        let _ = self.out.send(Outbound::hardware(bytes));
    }

    pub(crate) fn send_controller(&self, bytes: Vec<u8>) {
        let _ = self.out.send(Outbound::controller(bytes));
    }

    /// Emit a CC toward the hardware, used for state replay
    pub(crate) fn send_hardware_cc(&self, channel: u8, cc: u8, value: u8) {
        self.send_hardware(MidiMessage::ControlChange { channel, cc, value }.encode());
    }
}
