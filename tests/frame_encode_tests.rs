//! Encoder tests: emitted frame shape, parity generation for every byte
//! value, and ack handling.

mod common;

use common::{run_write_cycle, SimLines};
use ps2_host::{BusRole, Ps2Host};

fn new_host() -> (Ps2Host<SimLines>, SimLines) {
    let lines = SimLines::new();
    let mut host = Ps2Host::new(lines.clone());
    host.init();
    (host, lines)
}

#[test]
fn test_all_byte_values_emit_odd_parity() {
    for byte in 0u16..=255 {
        let byte = byte as u8;
        let (mut host, lines) = new_host();

        host.send(byte);
        let capture = run_write_cycle(&mut host, &lines, true);

        assert_eq!(capture.byte(), byte, "byte {:#04x} garbled", byte);
        assert_eq!(capture.ones() % 2, 1, "byte {:#04x} parity not odd", byte);
        assert!(capture.stop, "byte {:#04x} stop bit not released", byte);
    }
}

#[test]
fn test_frame_shape() {
    let (mut host, lines) = new_host();

    host.send(0x41);
    let capture = run_write_cycle(&mut host, &lines, true);

    // Start bit was put on the line by the sequencer, data LSB-first.
    assert!(capture.start_low);
    assert_eq!(
        capture.data_bits,
        [true, false, false, false, false, false, true, false]
    );
    // 0x41 has two one-bits, so the parity bit must be set.
    assert!(capture.parity);
}

#[test]
fn test_acked_write_is_clean() {
    let (mut host, lines) = new_host();

    host.send(0xF4);
    run_write_cycle(&mut host, &lines, true);

    let stats = host.stats();
    assert_eq!(stats.bytes_sent, 1);
    assert_eq!(stats.write_nacks, 0);
    assert_eq!(host.role(), BusRole::Receiving);
}

#[test]
fn test_missing_ack_recorded_not_escalated() {
    let (mut host, lines) = new_host();

    host.send(0xF4);
    run_write_cycle(&mut host, &lines, false);

    // The bus still settles and returns to receive mode.
    let stats = host.stats();
    assert_eq!(stats.bytes_sent, 1);
    assert_eq!(stats.write_nacks, 1);
    assert_eq!(host.role(), BusRole::Receiving);
}

#[test]
fn test_back_to_back_writes() {
    let (mut host, lines) = new_host();

    for byte in [0xED, 0x02, 0xF4] {
        host.send(byte);
        let capture = run_write_cycle(&mut host, &lines, true);
        assert_eq!(capture.byte(), byte);
    }
    assert_eq!(host.stats().bytes_sent, 3);
}

#[test]
fn test_send_while_in_flight_overwrites() {
    let (mut host, lines) = new_host();

    host.send(0xAA);
    host.on_tick();
    host.on_tick();

    // A second request before the first reaches the wire wins outright.
    host.send(0x55);
    let capture = run_write_cycle(&mut host, &lines, true);

    assert_eq!(capture.byte(), 0x55);
    assert_eq!(host.stats().bytes_sent, 1);
}
