//! Tests for the sequencer bridge

use super::*;
use crate::config::OscConfig;
use crate::midi::PortId;
use crate::ports::OutboundReceiver;
use tokio::sync::mpsc;

const SEQ_URI: &str = "http://gareus.org/oss/lv2/stepseq#s8n8";

fn make_bridge() -> (Arc<SequencerBridge>, OutboundReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let bridge = Arc::new(SequencerBridge::new(OscConfig::default(), tx));
    (bridge, rx)
}

/// Collect everything the bridge emitted; all of it must target the
/// hardware port
fn drain(rx: &mut OutboundReceiver) -> Vec<Vec<u8>> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        assert_eq!(msg.port, PortId::Hardware);
        out.push(msg.bytes);
    }
    out
}

#[test]
fn test_binding_first_found_wins() {
    let (bridge, _rx) = make_bridge();

    bridge.on_info(1, "http://example.org/other-plugin");
    assert_eq!(bridge.state.lock().plugin_id, None);

    bridge.on_info(2, SEQ_URI);
    assert_eq!(bridge.state.lock().plugin_id, Some(2));

    // a second matching plugin never rebinds
    bridge.on_info(5, SEQ_URI);
    assert_eq!(bridge.state.lock().plugin_id, Some(2));

    // the same id again is not an error either
    bridge.on_info(2, SEQ_URI);
    assert_eq!(bridge.state.lock().plugin_id, Some(2));
}

#[test]
fn test_plugin_removed_resets_state() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    bridge.on_parameter_changed(2, 17, 100.0);
    bridge.on_parameter_changed(2, PLAYHEAD_PARAM, 3.0);
    drain(&mut rx);

    // removal of some other plugin changes nothing
    bridge.on_plugin_removed(4);
    assert_eq!(bridge.state.lock().plugin_id, Some(2));

    bridge.on_plugin_removed(2);
    {
        let state = bridge.state.lock();
        assert_eq!(state.plugin_id, None);
        assert_eq!(state.current_step, 0);
        assert!(state.grid.iter().all(|row| row.iter().all(|&v| v == 0)));
    }
}

#[test]
fn test_unbound_ignores_notifications() {
    let (bridge, mut rx) = make_bridge();

    bridge.on_parameter_changed(0, 25, 64.0);
    bridge.on_parameter_changed(0, PLAYHEAD_PARAM, 4.0);
    bridge.on_plugin_removed(0);

    assert!(drain(&mut rx).is_empty());
    assert_eq!(bridge.state.lock().current_step, 0);
}

#[tokio::test]
async fn test_press_toggles_cell() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);
    drain(&mut rx);

    // note 12 is row 7, col 1; the playhead sits on col 0
    let echo = bridge.on_hardware_press(12, 100).await.unwrap();
    assert_eq!(echo, PadCommand::SetPad { note: 12, color: 14 });
    assert_eq!(bridge.state.lock().grid[7][1], 100);

    // second press clears, like the plugin GUI
    let echo = bridge.on_hardware_press(12, 100).await.unwrap();
    assert_eq!(echo, PadCommand::ClearPad { note: 12 });
    assert_eq!(bridge.state.lock().grid[7][1], 0);
}

#[tokio::test]
async fn test_press_off_grid_is_noop() {
    let (bridge, _rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    // launch-button column and top-row CC area have no grid mapping
    assert_eq!(bridge.on_hardware_press(19, 100).await, None);
    assert_eq!(bridge.on_hardware_press(91, 100).await, None);
}

#[tokio::test]
async fn test_press_works_unbound() {
    // without a plugin the press still toggles the cache and echoes the
    // LED; only the host write is skipped
    let (bridge, _rx) = make_bridge();

    let echo = bridge.on_hardware_press(12, 100).await.unwrap();
    assert_eq!(echo, PadCommand::SetPad { note: 12, color: 14 });
    assert_eq!(bridge.state.lock().grid[7][1], 100);
}

#[test]
fn test_parameter_change_on_playhead_column_uses_highlight_scale() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    // param 25 is (row 1, col 0); col 0 is the playhead column at start
    bridge.on_parameter_changed(2, 25, 64.0);

    assert_eq!(drain(&mut rx), vec![vec![0x90, 71, 5]]);
    assert_eq!(bridge.state.lock().grid[1][0], 64);
}

#[test]
fn test_parameter_change_off_playhead_uses_normal_scale() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    // param 26 is (row 1, col 1), outside the playhead column
    bridge.on_parameter_changed(2, 26, 64.0);

    assert_eq!(drain(&mut rx), vec![vec![0x90, 72, 61]]);
}

#[test]
fn test_parameter_change_foreign_plugin_ignored() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    bridge.on_parameter_changed(3, 25, 64.0);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_parameter_change_outside_grid_ignored() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    bridge.on_parameter_changed(2, 16, 64.0);
    bridge.on_parameter_changed(2, 81, 64.0);
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_host_echo_of_local_press_is_deduped() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    // press (row 7, col 0) = note 11 = param 73
    bridge.on_hardware_press(11, 100).await.unwrap();
    drain(&mut rx);

    // the host echoes the write back; the cache already holds the value,
    // so no second LED write happens
    bridge.on_parameter_changed(2, 73, 100.0);
    assert!(drain(&mut rx).is_empty());

    // redundant delivery over the second transport is absorbed the same way
    bridge.on_parameter_changed(2, 73, 100.0);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_playhead_rerenders_old_and_new_column() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    // one active cell in the column the playhead moves to
    bridge.on_parameter_changed(2, 20, 64.0); // (row 0, col 3)
    drain(&mut rx);

    bridge.on_parameter_changed(2, PLAYHEAD_PARAM, 4.0); // step 3, 1-based
    let updates = drain(&mut rx);

    // 8 rows of the old column plus 8 rows of the new one
    assert_eq!(updates.len(), 16);
    assert_eq!(bridge.state.lock().current_step, 3);

    // the active cell re-renders highlighted, empty cells go dark
    assert!(updates.contains(&vec![0x90, 84, 5]));
    assert!(updates.contains(&vec![0x80, 81, 0]));

    // repeating the same step is not a change
    bridge.on_parameter_changed(2, PLAYHEAD_PARAM, 4.0);
    assert!(drain(&mut rx).is_empty());
}

#[test]
fn test_playhead_out_of_range_ignored() {
    let (bridge, mut rx) = make_bridge();
    bridge.on_info(2, SEQ_URI);

    bridge.on_parameter_changed(2, PLAYHEAD_PARAM, 0.0);
    bridge.on_parameter_changed(2, PLAYHEAD_PARAM, 9.0);

    assert!(drain(&mut rx).is_empty());
    assert_eq!(bridge.state.lock().current_step, 0);
}
