use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use crossbeam_channel::Sender;
use smallvec::SmallVec;
use tracing::debug;

/// Unique identifier for a MIDI input device connection.
pub type MidiDeviceId = u64;

/// Raw frame as delivered by the transport. Pad frames fit inline.
pub type RawFrame = SmallVec<[u8; 3]>;

/// Where a backend delivers inbound frames.
pub type FrameSender = Sender<InboundFrame>;

/// Frame tagged with the connection it arrived on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundFrame {
    pub device: MidiDeviceId,
    pub bytes: RawFrame,
}

impl AsRef<[u8]> for InboundFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// Backend abstraction for platform specific MIDI implementations.
pub trait MidiBackend: Send {
    /// Enumerate available input port names.
    fn enumerate(&self) -> anyhow::Result<Vec<String>>;

    /// Open an input port and start forwarding its frames.
    fn open_input(
        &mut self,
        port_index: usize,
        frames: FrameSender,
    ) -> anyhow::Result<MidiDeviceId>;

    /// Close a previously opened input.
    fn close_input(&mut self, id: MidiDeviceId);
}

#[derive(Debug)]
pub struct ManagedDevice {
    pub id: MidiDeviceId,
    pub name: Arc<str>,
    pub port_index: usize,
}

/// Tracks open input connections on top of a backend.
pub struct MidiDeviceManager<B: MidiBackend> {
    backend: B,
    open: HashMap<MidiDeviceId, ManagedDevice>,
}

impl<B: MidiBackend> MidiDeviceManager<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            open: HashMap::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Enumerate available input port names.
    pub fn list_ports(&self) -> anyhow::Result<Vec<String>> {
        self.backend.enumerate()
    }

    /// Open `port_index` unless it is already connected.
    pub fn ensure_connection(
        &mut self,
        port_index: usize,
        frames: FrameSender,
    ) -> anyhow::Result<MidiDeviceId> {
        if let Some(existing) = self
            .open
            .values()
            .find(|entry| entry.port_index == port_index)
        {
            return Ok(existing.id);
        }

        let name = self
            .list_ports()?
            .into_iter()
            .nth(port_index)
            .unwrap_or_else(|| format!("Port {port_index}"));
        let id = self
            .backend
            .open_input(port_index, frames)
            .context("failed to open midi input")?;
        debug!(id, port_index, %name, "midi input connected");
        self.open.insert(
            id,
            ManagedDevice {
                id,
                name: Arc::from(name),
                port_index,
            },
        );
        Ok(id)
    }

    /// Close a connection by id.
    pub fn close(&mut self, id: MidiDeviceId) {
        self.backend.close_input(id);
        self.open.remove(&id);
    }

    /// Close all connections.
    pub fn close_all(&mut self) {
        let ids: Vec<_> = self.open.keys().copied().collect();
        for id in ids {
            self.close(id);
        }
    }

    pub fn open_devices(&self) -> impl Iterator<Item = &ManagedDevice> {
        self.open.values()
    }
}

impl<B: MidiBackend> Drop for MidiDeviceManager<B> {
    fn drop(&mut self) {
        self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct DummyBackend {
        opened: Vec<usize>,
        senders: Vec<FrameSender>,
    }

    impl MidiBackend for DummyBackend {
        fn enumerate(&self) -> anyhow::Result<Vec<String>> {
            Ok(vec!["PortA".into(), "PortB".into()])
        }

        fn open_input(
            &mut self,
            port_index: usize,
            frames: FrameSender,
        ) -> anyhow::Result<MidiDeviceId> {
            if port_index >= 2 {
                anyhow::bail!("midi port index out of range");
            }
            self.opened.push(port_index);
            self.senders.push(frames);
            Ok(self.opened.len() as MidiDeviceId)
        }

        fn close_input(&mut self, id: MidiDeviceId) {
            if let Some(pos) = (id as usize).checked_sub(1) {
                if pos < self.opened.len() {
                    self.opened.remove(pos);
                }
            }
        }
    }

    #[test]
    fn ensure_connection_reuses_open_ports() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut manager = MidiDeviceManager::new(DummyBackend::default());
        let first = manager.ensure_connection(1, tx.clone()).unwrap();
        let second = manager.ensure_connection(1, tx).unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.backend().opened, vec![1]);
        let device = manager.open_devices().next().unwrap();
        assert_eq!(&*device.name, "PortB");
    }

    #[test]
    fn failed_open_is_reported() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut manager = MidiDeviceManager::new(DummyBackend::default());
        assert!(manager.ensure_connection(5, tx).is_err());
        assert_eq!(manager.open_devices().count(), 0);
    }

    #[test]
    fn backend_frames_reach_the_channel() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut manager = MidiDeviceManager::new(DummyBackend::default());
        let id = manager.ensure_connection(0, tx).unwrap();
        manager.backend().senders[0]
            .send(InboundFrame {
                device: id,
                bytes: RawFrame::from_slice(&[0x80, 36, 0]),
            })
            .unwrap();
        let frame = rx.try_recv().unwrap();
        assert_eq!(frame.as_ref(), &[0x80, 36, 0]);
    }
}
