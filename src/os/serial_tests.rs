// src/os/serial_tests.rs

use super::serial::{speed_for, SerialPort};
use crate::config::{Parity, PortConfig, StopBits};
use crate::decoder::{ByteOrder, ByteSource, Decoder, StreamBuffer, SyncPolicy};
use nix::fcntl::OFlag;
use nix::pty::{grantpt, posix_openpt, ptsname_r, unlockpt, PtyMaster};
use std::io::Write;
use std::path::PathBuf;

// Opens a pseudo-terminal pair; the slave path stands in for a serial device.
fn open_pty() -> (PtyMaster, PathBuf) {
    let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).expect("posix_openpt failed");
    grantpt(&master).expect("grantpt failed");
    unlockpt(&master).expect("unlockpt failed");
    let slave = ptsname_r(&master).expect("ptsname_r failed");
    log::debug!("Opened pty pair, slave at {}", slave);
    (master, PathBuf::from(slave))
}

fn port_config(path: PathBuf) -> PortConfig {
    PortConfig {
        path: Some(path),
        timeout_secs: 1,
        ..PortConfig::default()
    }
}

#[test_log::test]
fn test_speed_table() {
    assert_eq!(speed_for(9600), Some(libc::B9600));
    assert_eq!(speed_for(115200), Some(libc::B115200));
    assert_eq!(speed_for(9601), None);
}

#[test_log::test]
fn test_open_without_path_fails() {
    assert!(SerialPort::open(&PortConfig::default()).is_err());
}

#[test_log::test]
fn test_open_missing_device_fails() {
    let config = port_config(PathBuf::from("/dev/does-not-exist-serialmon"));
    assert!(SerialPort::open(&config).is_err());
}

#[test_log::test]
fn test_reads_bytes_written_to_pty() {
    let (mut master, slave) = open_pty();
    let mut port = SerialPort::open(&port_config(slave.clone())).expect("open pty slave");
    assert_eq!(port.path(), slave.as_path());

    master.write_all(&[0x01, 0xff, b'\n']).unwrap();
    master.flush().unwrap();

    assert_eq!(port.read_byte().unwrap(), Some(0x01));
    assert_eq!(port.read_byte().unwrap(), Some(0xff));
    // Raw mode: no newline translation.
    assert_eq!(port.read_byte().unwrap(), Some(b'\n'));
}

#[test_log::test]
fn test_idle_line_times_out() {
    let (_master, slave) = open_pty();
    let mut port = SerialPort::open(&port_config(slave)).expect("open pty slave");
    assert_eq!(port.read_byte().unwrap(), None);
}

#[test_log::test]
fn test_line_settings_are_accepted() {
    let (_master, slave) = open_pty();
    let config = PortConfig {
        baudrate: 115200,
        bytesize: 7,
        parity: Parity::Even,
        stopbits: StopBits::Two,
        swflowctl: true,
        ..port_config(slave)
    };
    let mut port = SerialPort::open(&config).expect("open pty slave");
    assert!(port.close());
    assert!(!port.close());
    assert!(port.read_byte().is_err());
}

#[test_log::test]
fn test_decoder_over_serial_port() {
    let (mut master, slave) = open_pty();
    let port = SerialPort::open(&port_config(slave)).expect("open pty slave");
    let mut decoder = Decoder::new(
        StreamBuffer::new(port),
        &["%h-%d\n".to_string()],
        '%',
        ByteOrder::Little,
        SyncPolicy::Synchronized,
    );
    master.write_all(&[0xab, 0x01, 0x02]).unwrap();
    assert_eq!(decoder.next_chunk().unwrap(), "ab-258\n");
    assert!(decoder.close());
}
