//! MIDI port plumbing for both surfaces
//!
//! The hardware side connects to the Launchpad's existing ALSA ports by
//! case-insensitive substring match. The controller side creates virtual
//! ports the downstream controller connects to, mirroring the ALSA layout
//! the gateway replaces. All inbound traffic funnels into one channel (the
//! event pipeline); all outbound traffic is written by whoever owns
//! [`Ports`] — a single writer, so device output is never interleaved.

use crate::config::MidiConfig;
use crate::midi::{format_hex, PortId};

use anyhow::{anyhow, Context, Result};
use midir::os::unix::{VirtualInput, VirtualOutput};
use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// One raw MIDI message received from either surface
#[derive(Debug, Clone)]
pub struct SurfaceEvent {
    pub port: PortId,
    pub raw: Vec<u8>,
}

/// One raw MIDI message bound for either surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub port: PortId,
    pub bytes: Vec<u8>,
}

impl Outbound {
    pub fn hardware(bytes: Vec<u8>) -> Self {
        Self {
            port: PortId::Hardware,
            bytes,
        }
    }

    pub fn controller(bytes: Vec<u8>) -> Self {
        Self {
            port: PortId::Controller,
            bytes,
        }
    }
}

/// Sender half of the single device-output path
pub type OutboundSender = mpsc::UnboundedSender<Outbound>;

/// Receiver half, drained by the main loop
pub type OutboundReceiver = mpsc::UnboundedReceiver<Outbound>;

/// Open MIDI connections for both surfaces
pub struct Ports {
    // input connections are kept alive for their callbacks only
    _hardware_in: MidiInputConnection<()>,
    _controller_in: MidiInputConnection<()>,
    hardware_out: MidiOutputConnection,
    controller_out: MidiOutputConnection,
}

impl Ports {
    /// Connect to the hardware and create the controller's virtual ports
    ///
    /// Every received message is pushed into `event_tx`; a full channel
    /// drops the message rather than blocking the ALSA callback.
    pub fn connect(config: &MidiConfig, event_tx: mpsc::Sender<SurfaceEvent>) -> Result<Self> {
        let hardware_in = Self::connect_hardware_in(&config.hardware_port, event_tx.clone())?;
        let hardware_out = Self::connect_hardware_out(&config.hardware_port)?;

        let midi_in = MidiInput::new("LPX-GW").context("Failed to create MIDI input")?;
        let controller_in = midi_in
            .create_virtual(
                &config.controller_in,
                move |_timestamp, data, _| {
                    trace!("controller -> {}", format_hex(data));
                    let _ = event_tx.try_send(SurfaceEvent {
                        port: PortId::Controller,
                        raw: data.to_vec(),
                    });
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to create virtual port '{}': {}", config.controller_in, e))?;

        let midi_out = MidiOutput::new("LPX-GW").context("Failed to create MIDI output")?;
        let controller_out = midi_out
            .create_virtual(&config.controller_out)
            .map_err(|e| anyhow!("Failed to create virtual port '{}': {}", config.controller_out, e))?;

        Ok(Self {
            _hardware_in: hardware_in,
            _controller_in: controller_in,
            hardware_out,
            controller_out,
        })
    }

    fn connect_hardware_in(
        pattern: &str,
        event_tx: mpsc::Sender<SurfaceEvent>,
    ) -> Result<MidiInputConnection<()>> {
        let midi_in = MidiInput::new("LPX-GW-Input").context("Failed to create MIDI input")?;

        let (port, name) = find_port(
            midi_in.ports(),
            |p| midi_in.port_name(p).ok(),
            pattern,
        )
        .ok_or_else(|| anyhow!("Hardware input port '{}' not found", pattern))?;
        debug!("Connecting hardware input: {}", name);

        midi_in
            .connect(
                &port,
                "LPX-GW",
                move |_timestamp, data, _| {
                    trace!("hardware -> {}", format_hex(data));
                    let _ = event_tx.try_send(SurfaceEvent {
                        port: PortId::Hardware,
                        raw: data.to_vec(),
                    });
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect hardware input: {}", e))
    }

    fn connect_hardware_out(pattern: &str) -> Result<MidiOutputConnection> {
        let midi_out = MidiOutput::new("LPX-GW-Output").context("Failed to create MIDI output")?;

        let (port, name) = find_port(
            midi_out.ports(),
            |p| midi_out.port_name(p).ok(),
            pattern,
        )
        .ok_or_else(|| anyhow!("Hardware output port '{}' not found", pattern))?;
        debug!("Connecting hardware output: {}", name);

        midi_out
            .connect(&port, "LPX-GW")
            .map_err(|e| anyhow!("Failed to connect hardware output: {}", e))
    }

    /// Write one outbound message to its surface
    pub fn send(&mut self, outbound: &Outbound) -> Result<()> {
        let conn = match outbound.port {
            PortId::Hardware => &mut self.hardware_out,
            PortId::Controller => &mut self.controller_out,
        };
        conn.send(&outbound.bytes)
            .map_err(|e| anyhow!("MIDI send failed: {}", e))?;
        trace!("{:?} <- {}", outbound.port, format_hex(&outbound.bytes));
        Ok(())
    }
}

/// Case-insensitive substring match over available ports
fn find_port<P>(
    ports: Vec<P>,
    name_of: impl Fn(&P) -> Option<String>,
    pattern: &str,
) -> Option<(P, String)> {
    let pattern = pattern.to_lowercase();
    for port in ports {
        if let Some(name) = name_of(&port) {
            if name.to_lowercase().contains(&pattern) {
                return Some((port, name));
            }
        }
    }
    None
}

/// Print available MIDI ports, for `--list-ports`
pub fn list_ports() -> Result<()> {
    let midi_in = MidiInput::new("LPX-GW-Scanner")?;
    println!("Input ports:");
    for port in midi_in.ports() {
        if let Ok(name) = midi_in.port_name(&port) {
            println!("  {}", name);
        }
    }

    let midi_out = MidiOutput::new("LPX-GW-Scanner")?;
    println!("Output ports:");
    for port in midi_out.ports() {
        if let Ok(name) = midi_out.port_name(&port) {
            println!("  {}", name);
        }
    }

    Ok(())
}
