//! Bridge between the pad grid and the Carla-hosted step sequencer
//!
//! The bridge owns the last-known grid intensities, the playhead column and
//! the bound plugin id, registers with Carla over TCP and UDP, and keeps
//! hardware LEDs and plugin parameters in sync in both directions. Grid
//! presses update the local cache and LEDs immediately; the host write runs
//! asynchronously and is never waited on.
//!
//! Carla delivers the same logical notifications over either transport;
//! handlers drop updates whose value already matches the cache, so
//! redundant delivery (and the host's echo of a local press) has no second
//! grid effect.
//!
//! Known limitation: a host restart is not detected. The bridge stays bound
//! to the stale plugin id until an explicit removal callback arrives.

pub mod color;
pub mod grid;
pub mod osc;

#[cfg(test)]
mod tests;

use crate::config::OscConfig;
use crate::launchpad::PadCommand;
use crate::ports::{Outbound, OutboundSender};
use grid::{GridPos, GRID_SIZE};
use osc::HostMessage;

use parking_lot::Mutex;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Parameter id Carla uses for the step position of the sequencer plugin
pub const PLAYHEAD_PARAM: i32 = 7;

/// URI of the plugin the bridge attaches to
const TARGET_PLUGIN_URI: &str = "http://gareus.org/oss/lv2/stepseq#s8n8";

/// Receive buffer for OSC datagrams
const OSC_BUF_SIZE: usize = 1536;

/// Upper bound for a framed TCP packet; anything larger is a broken stream
const MAX_TCP_PACKET: i32 = 65536;

/// Fatal bridge start-up failures
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("failed to bind OSC {proto} listener on port {port}")]
    Bind {
        proto: &'static str,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to connect to Carla at {addr}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Mutable bridge state, shared between the event pipeline and the
/// listener tasks
struct BridgeState {
    plugin_id: Option<i32>,
    current_step: u8,
    grid: [[u8; GRID_SIZE as usize]; GRID_SIZE as usize],
}

impl BridgeState {
    fn new() -> Self {
        Self {
            plugin_id: None,
            current_step: 0,
            grid: [[0; GRID_SIZE as usize]; GRID_SIZE as usize],
        }
    }
}

/// Live network resources, present between `start()` and `stop()`
struct BridgeNet {
    udp: Arc<UdpSocket>,
    tcp_tx: Arc<tokio::sync::Mutex<OwnedWriteHalf>>,
    carla_addr: SocketAddr,
    listen_ip: IpAddr,
    tasks: Vec<JoinHandle<()>>,
}

/// Stateful bridge to the step-sequencer plugin
pub struct SequencerBridge {
    config: OscConfig,
    out: OutboundSender,
    state: Mutex<BridgeState>,
    net: tokio::sync::Mutex<Option<BridgeNet>>,
}

impl SequencerBridge {
    /// Create an unstarted bridge; handlers work immediately, network
    /// traffic begins with [`start`](Self::start)
    pub fn new(config: OscConfig, out: OutboundSender) -> Self {
        Self {
            config,
            out,
            state: Mutex::new(BridgeState::new()),
            net: tokio::sync::Mutex::new(None),
        }
    }

    /// Open both listeners, register with Carla and spawn the receive tasks
    ///
    /// Either transport failing to come up is fatal: the bridge cannot
    /// guarantee notification delivery with only one of them.
    pub async fn start(self: Arc<Self>) -> Result<(), BridgeError> {
        let listen_port = self.config.listen_port;

        let tcp_listener = TcpListener::bind(("0.0.0.0", listen_port))
            .await
            .map_err(|source| BridgeError::Bind {
                proto: "TCP",
                port: listen_port,
                source,
            })?;

        let udp = Arc::new(
            UdpSocket::bind(("0.0.0.0", listen_port))
                .await
                .map_err(|source| BridgeError::Bind {
                    proto: "UDP",
                    port: listen_port,
                    source,
                })?,
        );

        let carla = format!("{}:{}", self.config.host, self.config.port);
        let stream = TcpStream::connect(&carla)
            .await
            .map_err(|source| BridgeError::Connect {
                addr: carla.clone(),
                source,
            })?;
        let carla_addr = stream.peer_addr().map_err(|source| BridgeError::Connect {
            addr: carla.clone(),
            source,
        })?;
        // the address Carla reaches us on, used for register/unregister
        let listen_ip = stream
            .local_addr()
            .map_err(|source| BridgeError::Connect {
                addr: carla.clone(),
                source,
            })?
            .ip();

        let (tcp_rx, tcp_tx) = stream.into_split();
        let tcp_tx = Arc::new(tokio::sync::Mutex::new(tcp_tx));

        // register over both transports
        let tcp_url = format!("osc.tcp://{}:{}/Carla", listen_ip, listen_port);
        let udp_url = format!("osc.udp://{}:{}/Carla", listen_ip, listen_port);
        {
            let mut tx = tcp_tx.lock().await;
            if let Err(e) = tx.write_all(&osc::frame_tcp(&osc::register(&tcp_url))).await {
                warn!("TCP register failed: {}", e);
            }
        }
        if let Err(e) = udp.send_to(&osc::register(&udp_url), carla_addr).await {
            warn!("UDP register failed: {}", e);
        }

        let mut tasks = Vec::new();
        tasks.push(tokio::spawn(self.clone().run_tcp_accept(tcp_listener)));
        tasks.push(tokio::spawn(self.clone().run_tcp_stream(tcp_rx)));
        tasks.push(tokio::spawn(self.clone().run_udp(udp.clone())));

        *self.net.lock().await = Some(BridgeNet {
            udp,
            tcp_tx,
            carla_addr,
            listen_ip,
            tasks,
        });

        info!(
            "Sequencer bridge listening on port {} (TCP+UDP), Carla at {}",
            listen_port, carla
        );
        Ok(())
    }

    /// Unregister from Carla and tear the listeners down
    ///
    /// Safe to call when `start()` failed or never ran.
    pub async fn stop(&self) {
        let Some(net) = self.net.lock().await.take() else {
            return;
        };

        let farewell = osc::unregister(&net.listen_ip.to_string());
        {
            let mut tx = net.tcp_tx.lock().await;
            if let Err(e) = tx.write_all(&osc::frame_tcp(&farewell)).await {
                debug!("TCP unregister failed: {}", e);
            }
        }
        if let Err(e) = net.udp.send_to(&farewell, net.carla_addr).await {
            debug!("UDP unregister failed: {}", e);
        }

        for task in net.tasks {
            task.abort();
        }
        info!("Sequencer bridge stopped");
    }

    /// Dispatch one decoded host notification
    pub fn handle_message(&self, message: HostMessage) {
        match message {
            HostMessage::Info {
                plugin_id,
                descriptor,
            } => self.on_info(plugin_id, &descriptor),
            HostMessage::PluginRemoved { plugin_id } => self.on_plugin_removed(plugin_id),
            HostMessage::ParameterChanged {
                plugin_id,
                param,
                value,
            } => self.on_parameter_changed(plugin_id, param, value),
        }
    }

    /// Bind to the first plugin matching the sequencer URI
    pub fn on_info(&self, plugin_id: i32, descriptor: &str) {
        if descriptor != TARGET_PLUGIN_URI {
            return;
        }

        let mut state = self.state.lock();
        match state.plugin_id {
            None => {
                state.plugin_id = Some(plugin_id);
                info!("Found sequencer plugin at index {}", plugin_id);
            }
            Some(bound) if bound != plugin_id => {
                warn!(
                    "Ignoring second sequencer plugin at index {} (already bound to {})",
                    plugin_id, bound
                );
            }
            Some(_) => {}
        }
    }

    /// Unbind and reset cached state when the bound plugin disappears
    pub fn on_plugin_removed(&self, plugin_id: i32) {
        let mut state = self.state.lock();
        if state.plugin_id != Some(plugin_id) {
            return;
        }

        *state = BridgeState::new();
        info!("Sequencer plugin {} removed", plugin_id);
    }

    /// Apply a host-side parameter change to the cache and LEDs
    pub fn on_parameter_changed(&self, plugin_id: i32, param: i32, value: f32) {
        let mut state = self.state.lock();
        if state.plugin_id != Some(plugin_id) {
            return;
        }

        if param == PLAYHEAD_PARAM {
            // 1-based step number; out-of-range payloads are dropped
            let new_step = value as i32 - 1;
            if !(0..GRID_SIZE as i32).contains(&new_step) {
                trace!("Playhead payload {} outside the grid, ignored", value);
                return;
            }
            let new_step = new_step as u8;
            if new_step == state.current_step {
                return;
            }

            let previous = state.current_step;
            state.current_step = new_step;

            // both columns changed highlight status, not value
            for row in 0..GRID_SIZE {
                for col in [previous, new_step] {
                    let pos = GridPos { row, col };
                    let intensity = state.grid[row as usize][col as usize];
                    self.push_led(led_update(pos, intensity, col == new_step));
                }
            }
            return;
        }

        let Some(pos) = GridPos::from_param(param) else {
            return;
        };

        let value = value.clamp(0.0, 127.0) as u8;
        if state.grid[pos.row as usize][pos.col as usize] == value {
            // same value over the other transport, or the echo of a local
            // press: one grid effect only
            return;
        }

        state.grid[pos.row as usize][pos.col as usize] = value;
        self.push_led(led_update(pos, value, pos.col == state.current_step));
    }

    /// Toggle a grid cell from a hardware press
    ///
    /// Updates the cache and sends the host write without waiting for the
    /// host round trip; returns the LED echo for the caller to relay to the
    /// device synchronously. `None` for notes outside the pad matrix.
    pub async fn on_hardware_press(&self, note: u8, velocity: u8) -> Option<PadCommand> {
        let pos = GridPos::from_note(note)?;

        let (effective, bound, highlighted) = {
            let mut state = self.state.lock();
            let cell = &mut state.grid[pos.row as usize][pos.col as usize];
            // a set cell clears on the next press, like the plugin GUI
            let effective = if *cell > 0 { 0 } else { velocity };
            *cell = effective;
            (effective, state.plugin_id, state.current_step == pos.col)
        };

        if let Some(plugin_id) = bound {
            self.send_parameter(plugin_id, pos.to_param(), effective as f32)
                .await;
        } else {
            debug!("No sequencer plugin bound, press not forwarded");
        }

        Some(led_update(pos, effective, highlighted))
    }

    /// Write one parameter to Carla over the TCP control connection
    async fn send_parameter(&self, plugin_id: i32, param: i32, value: f32) {
        let net = self.net.lock().await;
        let Some(net) = net.as_ref() else {
            debug!("Bridge not started, dropping parameter write");
            return;
        };

        let packet = osc::frame_tcp(&osc::set_parameter_value(plugin_id, param, value));
        let mut tx = net.tcp_tx.lock().await;
        if let Err(e) = tx.write_all(&packet).await {
            warn!("Parameter write to Carla failed: {}", e);
        }
    }

    fn push_led(&self, command: PadCommand) {
        let _ = self.out.send(Outbound::hardware(command.to_bytes()));
    }

    async fn run_udp(self: Arc<Self>, socket: Arc<UdpSocket>) {
        let mut buf = [0u8; OSC_BUF_SIZE];
        loop {
            match socket.recv_from(&mut buf).await {
                Ok((len, _peer)) => {
                    for message in HostMessage::decode(&buf[..len]) {
                        self.handle_message(message);
                    }
                }
                Err(e) => {
                    warn!("UDP receive failed: {}", e);
                    break;
                }
            }
        }
    }

    async fn run_tcp_accept(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    debug!("Host connected over TCP from {}", peer);
                    tokio::spawn(self.clone().run_tcp_stream(stream));
                }
                Err(e) => {
                    warn!("TCP accept failed: {}", e);
                    break;
                }
            }
        }
    }

    /// Drain length-prefixed OSC packets from a TCP stream until EOF
    async fn run_tcp_stream<R>(self: Arc<Self>, mut stream: R)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        loop {
            let mut len_buf = [0u8; 4];
            if stream.read_exact(&mut len_buf).await.is_err() {
                break;
            }
            let len = i32::from_be_bytes(len_buf);
            if !(0..=MAX_TCP_PACKET).contains(&len) {
                warn!("Broken TCP framing (length {}), dropping stream", len);
                break;
            }

            let mut packet = vec![0u8; len as usize];
            if stream.read_exact(&mut packet).await.is_err() {
                break;
            }
            for message in HostMessage::decode(&packet) {
                self.handle_message(message);
            }
        }
    }
}

/// LED command for one cell: activate with the bucketed color, or
/// deactivate when the color does not rise above the scale's background
pub fn led_update(pos: GridPos, value: u8, highlighted: bool) -> PadCommand {
    let code = color::encode(value, highlighted);
    if code > color::background(highlighted) {
        PadCommand::SetPad {
            note: pos.to_note(),
            color: code,
        }
    } else {
        PadCommand::ClearPad {
            note: pos.to_note(),
        }
    }
}
