//! End-to-end session against a simulated SyncBox behind the public traits.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use syncbox_protocol::{
    discover, Connection, PortOpener, ProtocolState, Result, Sleeper, SyncBox, SyncBoxConfig,
    SyncBoxError, Transport, TriggerEvent, TriggerRead,
};

#[derive(Default)]
struct DeviceState {
    received: Vec<u8>,
    outbox: VecDeque<u8>,
    pending_config: Option<usize>,
    open: bool,
}

/// Answers every command the way the hardware does
struct SimulatedDevice {
    name: String,
    state: Arc<Mutex<DeviceState>>,
}

impl Transport for SimulatedDevice {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for &byte in data {
            state.received.push(byte);
            match state.pending_config {
                Some(remaining) => {
                    state.outbox.push_back(byte);
                    state.pending_config = (remaining > 1).then(|| remaining - 1);
                }
                None => {
                    if b"CRSAD".contains(&byte) {
                        state.outbox.push_back(byte);
                    }
                    if byte == b'R' {
                        state.pending_config = Some(48);
                    }
                }
            }
        }
        Ok(())
    }

    fn read_bytes(&mut self, count: usize, _timeout: Duration) -> Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        let n = count.min(state.outbox.len());
        Ok(state.outbox.drain(..n).collect())
    }

    fn bytes_to_read(&mut self) -> Result<usize> {
        Ok(self.state.lock().unwrap().outbox.len())
    }
}

impl Drop for SimulatedDevice {
    fn drop(&mut self) {
        self.state.lock().unwrap().open = false;
    }
}

/// Only `device_port` has a SyncBox attached; every other name fails to open
struct Bench {
    device_port: &'static str,
    device: Arc<Mutex<DeviceState>>,
    opened: Vec<String>,
}

impl PortOpener for Bench {
    fn open(&mut self, name: &str, _baud_rate: u32, _timeout: Duration) -> Result<Connection> {
        self.opened.push(name.to_string());
        if name != self.device_port {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such port").into());
        }
        self.device.lock().unwrap().open = true;
        Ok(Box::new(SimulatedDevice {
            name: name.to_string(),
            state: Arc::clone(&self.device),
        }))
    }
}

struct NoDelay;

impl Sleeper for NoDelay {
    fn sleep(&self, _duration: Duration) {}
}

fn bench(device_port: &'static str) -> Bench {
    Bench {
        device_port,
        device: Arc::default(),
        opened: Vec::new(),
    }
}

#[test]
fn full_session() {
    let mut bench = bench("COM2");
    let port = discover(["COM1", "COM2", "COM3"], &mut bench, &NoDelay).unwrap();
    assert_eq!(bench.opened, vec!["COM1", "COM2"]);

    let mut syncbox = SyncBox::new(port, Box::new(NoDelay));
    assert_eq!(syncbox.port_name(), Some("COM2"));

    let config = SyncBoxConfig {
        num_volumes: 120,
        num_slices: 30,
        simulation: false,
        ..Default::default()
    };
    syncbox.configure(&config).unwrap();
    assert_eq!(syncbox.state(), ProtocolState::Configured);

    syncbox.start().unwrap();
    assert_eq!(syncbox.state(), ProtocolState::Running);

    bench.device.lock().unwrap().outbox.extend(b"sbs");
    assert_eq!(
        syncbox.poll_buffered().unwrap(),
        vec![TriggerEvent::Sync, TriggerEvent::LeftIndex, TriggerEvent::Sync]
    );
    assert_eq!(
        syncbox.read_next(Some(Duration::ZERO)).unwrap(),
        TriggerRead::TimedOut
    );

    syncbox.stop().unwrap();
    assert_eq!(syncbox.state(), ProtocolState::Configured);
    syncbox.close().unwrap();
    assert_eq!(syncbox.state(), ProtocolState::Disconnected);

    let device = bench.device.lock().unwrap();
    assert!(!device.open);
    assert_eq!(
        device.received,
        b"CR000001200030010030000001000100000000000000000001SAD".to_vec()
    );
}

#[test]
fn discovery_fails_without_device() {
    let mut bench = bench("COM9");
    let result = discover(["COM1", "COM2"], &mut bench, &NoDelay);
    assert!(matches!(
        result,
        Err(SyncBoxError::PortNotFound { candidates: 2 })
    ));
}

#[test]
fn invalid_config_never_reaches_device() {
    let mut bench = bench("COM1");
    let port = discover(["COM1"], &mut bench, &NoDelay).unwrap();
    let mut syncbox = SyncBox::new(port, Box::new(NoDelay));

    let config = SyncBoxConfig {
        pulse_length: 20_000,
        ..Default::default()
    };
    assert!(matches!(
        syncbox.configure(&config),
        Err(SyncBoxError::ParameterOutOfRange { field: "pulse_length", .. })
    ));
    assert_eq!(bench.device.lock().unwrap().received, b"C".to_vec());

    syncbox.configure(&SyncBoxConfig::default()).unwrap();
    syncbox.close().unwrap();
}
