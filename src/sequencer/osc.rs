//! Carla OSC control protocol: message vocabulary and codecs
//!
//! Carla notifies registered peers over both TCP and UDP with the same
//! logical messages. Inbound traffic is decoded into the closed
//! [`HostMessage`] set; everything else (runtime stats, peer lists) is
//! dropped at this layer. Outbound packets are `/register`, `/unregister`
//! and per-plugin `/set_parameter_value`.
//!
//! TCP uses OSC 1.0 stream framing: each packet is prefixed with its length
//! as a big-endian i32.

use rosc::{decoder, encoder, OscMessage, OscPacket, OscType};
use tracing::trace;

// Carla engine callback opcodes (CarlaBackend.h)
const CB_PLUGIN_REMOVED: i32 = 2;
const CB_PARAMETER_VALUE_CHANGED: i32 = 5;

/// A host notification the bridge reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    /// Plugin description; `descriptor` carries the plugin URI
    Info { plugin_id: i32, descriptor: String },
    /// The plugin was removed from the rack
    PluginRemoved { plugin_id: i32 },
    /// A parameter changed on the host side
    ParameterChanged {
        plugin_id: i32,
        param: i32,
        value: f32,
    },
}

impl HostMessage {
    /// Decode one OSC message; `None` for anything outside the closed set
    pub fn from_osc(msg: &OscMessage) -> Option<Self> {
        match msg.addr.as_str() {
            "/Carla/info" => {
                // iiiihiisssssss: id first, plugin URI at index 11
                let plugin_id = int_arg(msg, 0)?;
                let descriptor = str_arg(msg, 11)?;
                Some(HostMessage::Info {
                    plugin_id,
                    descriptor,
                })
            }
            "/Carla/cb" => {
                // action, pluginId, value1, value2, value3, valuef, valueStr
                let action = int_arg(msg, 0)?;
                let plugin_id = int_arg(msg, 1)?;
                match action {
                    CB_PLUGIN_REMOVED => Some(HostMessage::PluginRemoved { plugin_id }),
                    CB_PARAMETER_VALUE_CHANGED => Some(HostMessage::ParameterChanged {
                        plugin_id,
                        param: int_arg(msg, 2)?,
                        value: float_arg(msg, 5)?,
                    }),
                    _ => None,
                }
            }
            "/Carla/param" => Some(HostMessage::ParameterChanged {
                plugin_id: int_arg(msg, 0)?,
                param: int_arg(msg, 1)?,
                value: float_arg(msg, 2)?,
            }),
            other => {
                trace!("Ignoring OSC message: {}", other);
                None
            }
        }
    }

    /// Decode a raw packet (datagram or one framed TCP packet) into host
    /// messages, flattening bundles
    pub fn decode(buf: &[u8]) -> Vec<Self> {
        match decoder::decode_udp(buf) {
            Ok((_, packet)) => {
                let mut messages = Vec::new();
                collect(&packet, &mut messages);
                messages
            }
            Err(e) => {
                trace!("Undecodable OSC packet ({} bytes): {:?}", buf.len(), e);
                Vec::new()
            }
        }
    }
}

fn collect(packet: &OscPacket, out: &mut Vec<HostMessage>) {
    match packet {
        OscPacket::Message(msg) => {
            if let Some(parsed) = HostMessage::from_osc(msg) {
                out.push(parsed);
            }
        }
        OscPacket::Bundle(bundle) => {
            for inner in &bundle.content {
                collect(inner, out);
            }
        }
    }
}

fn int_arg(msg: &OscMessage, index: usize) -> Option<i32> {
    match msg.args.get(index)? {
        OscType::Int(v) => Some(*v),
        _ => None,
    }
}

fn float_arg(msg: &OscMessage, index: usize) -> Option<f32> {
    match msg.args.get(index)? {
        OscType::Float(v) => Some(*v),
        _ => None,
    }
}

fn str_arg(msg: &OscMessage, index: usize) -> Option<String> {
    match msg.args.get(index)? {
        OscType::String(v) => Some(v.clone()),
        _ => None,
    }
}

/// Encode `/register` with the full callback URL for one transport
pub fn register(url: &str) -> Vec<u8> {
    encode_message("/register", vec![OscType::String(url.to_string())])
}

/// Encode `/unregister`. Carla expects the bare listen IP here, not the
/// URL that was registered.
pub fn unregister(listen_ip: &str) -> Vec<u8> {
    encode_message("/unregister", vec![OscType::String(listen_ip.to_string())])
}

/// Encode a parameter write for the bound plugin
pub fn set_parameter_value(plugin_id: i32, param: i32, value: f32) -> Vec<u8> {
    encode_message(
        &format!("/Carla/{}/set_parameter_value", plugin_id),
        vec![OscType::Int(param), OscType::Float(value)],
    )
}

fn encode_message(addr: &str, args: Vec<OscType>) -> Vec<u8> {
    let packet = OscPacket::Message(OscMessage {
        addr: addr.to_string(),
        args,
    });
    // encoding a well-formed message cannot fail
    encoder::encode(&packet).unwrap_or_default()
}

/// Wrap an encoded packet in OSC 1.0 stream framing for TCP
pub fn frame_tcp(packet: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(packet.len() + 4);
    framed.extend_from_slice(&(packet.len() as i32).to_be_bytes());
    framed.extend_from_slice(packet);
    framed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(addr: &str, args: Vec<OscType>) -> Vec<u8> {
        encoder::encode(&OscPacket::Message(OscMessage {
            addr: addr.to_string(),
            args,
        }))
        .unwrap()
    }

    #[test]
    fn test_decode_info() {
        let args = vec![
            OscType::Int(3),
            OscType::Int(0),
            OscType::Int(0),
            OscType::Int(0),
            OscType::Long(0),
            OscType::Int(0),
            OscType::Int(0),
            OscType::String("".into()),
            OscType::String("".into()),
            OscType::String("".into()),
            OscType::String("".into()),
            OscType::String("http://gareus.org/oss/lv2/stepseq#s8n8".into()),
            OscType::String("".into()),
            OscType::String("".into()),
        ];
        let messages = HostMessage::decode(&encode("/Carla/info", args));

        assert_eq!(
            messages,
            vec![HostMessage::Info {
                plugin_id: 3,
                descriptor: "http://gareus.org/oss/lv2/stepseq#s8n8".into(),
            }]
        );
    }

    #[test]
    fn test_decode_callback_actions() {
        let removed = encode(
            "/Carla/cb",
            vec![
                OscType::Int(2),
                OscType::Int(1),
                OscType::Int(0),
                OscType::Int(0),
                OscType::Int(0),
                OscType::Float(0.0),
                OscType::String("".into()),
            ],
        );
        assert_eq!(
            HostMessage::decode(&removed),
            vec![HostMessage::PluginRemoved { plugin_id: 1 }]
        );

        let changed = encode(
            "/Carla/cb",
            vec![
                OscType::Int(5),
                OscType::Int(1),
                OscType::Int(25),
                OscType::Int(0),
                OscType::Int(0),
                OscType::Float(64.0),
                OscType::String("".into()),
            ],
        );
        assert_eq!(
            HostMessage::decode(&changed),
            vec![HostMessage::ParameterChanged {
                plugin_id: 1,
                param: 25,
                value: 64.0,
            }]
        );

        // unknown action codes are dropped
        let ignored = encode(
            "/Carla/cb",
            vec![
                OscType::Int(99),
                OscType::Int(1),
                OscType::Int(0),
                OscType::Int(0),
                OscType::Int(0),
                OscType::Float(0.0),
                OscType::String("".into()),
            ],
        );
        assert!(HostMessage::decode(&ignored).is_empty());
    }

    #[test]
    fn test_decode_param() {
        let bytes = encode(
            "/Carla/param",
            vec![OscType::Int(0), OscType::Int(7), OscType::Float(3.0)],
        );
        assert_eq!(
            HostMessage::decode(&bytes),
            vec![HostMessage::ParameterChanged {
                plugin_id: 0,
                param: 7,
                value: 3.0,
            }]
        );
    }

    #[test]
    fn test_foreign_addresses_ignored() {
        let bytes = encode("/Carla/runtime", vec![OscType::Int(0)]);
        assert!(HostMessage::decode(&bytes).is_empty());
        assert!(HostMessage::decode(b"not osc at all").is_empty());
    }

    #[test]
    fn test_set_parameter_value_round_trip() {
        let bytes = set_parameter_value(2, 25, 64.0);
        let (_, packet) = decoder::decode_udp(&bytes).unwrap();

        match packet {
            OscPacket::Message(msg) => {
                assert_eq!(msg.addr, "/Carla/2/set_parameter_value");
                assert_eq!(msg.args, vec![OscType::Int(25), OscType::Float(64.0)]);
            }
            OscPacket::Bundle(_) => panic!("expected a message"),
        }
    }

    #[test]
    fn test_tcp_framing() {
        let packet = register("osc.tcp://127.0.0.1:22755/Carla");
        let framed = frame_tcp(&packet);

        assert_eq!(&framed[..4], &(packet.len() as i32).to_be_bytes());
        assert_eq!(&framed[4..], &packet[..]);
    }
}
