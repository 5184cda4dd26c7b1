use std::sync::Arc;

use anyhow::Context;
use midir::{MidiOutput, MidiOutputConnection, MidiOutputPort};

use crate::frame::PadMessage;
use crate::MidiError;

const CLIENT_NAME: &str = "boucle-midi";

/// Handle to an open MIDI output connection.
pub struct MidiOutputHandle {
    name: Arc<str>,
    connection: MidiOutputConnection,
}

impl MidiOutputHandle {
    pub fn new(name: impl Into<Arc<str>>, connection: MidiOutputConnection) -> Self {
        Self {
            name: name.into(),
            connection,
        }
    }

    /// Name of the connected port.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Send a raw MIDI message over the port.
    pub fn send(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.connection
            .send(bytes)
            .map_err(|err| anyhow::anyhow!("failed to send MIDI message: {err}"))
    }

    /// Send pad updates on `channel`, stopping at the first failure.
    pub fn send_pad_messages(
        &mut self,
        messages: &[PadMessage],
        channel: u8,
    ) -> anyhow::Result<()> {
        for message in messages {
            self.send(&message.to_bytes(channel))?;
        }
        Ok(())
    }
}

/// Platform MIDI output helper based on the `midir` crate.
pub struct MidiOutputManager {
    output: MidiOutput,
}

impl MidiOutputManager {
    pub fn new() -> anyhow::Result<Self> {
        let output = MidiOutput::new(CLIENT_NAME).context("initialise midir for output")?;
        Ok(Self { output })
    }

    /// Enumerate available output port names.
    pub fn enumerate(&self) -> Vec<String> {
        self.output
            .ports()
            .into_iter()
            .enumerate()
            .map(|(index, port)| {
                self.output
                    .port_name(&port)
                    .unwrap_or_else(|_| format!("Port {index}"))
            })
            .collect()
    }

    /// Open an output connection by index. Consumes the manager since midir
    /// hands its client over to the connection.
    pub fn open_port(self, port_index: usize) -> anyhow::Result<MidiOutputHandle> {
        let ports: Vec<MidiOutputPort> = self.output.ports();
        let Some(port) = ports.get(port_index) else {
            return Err(MidiError::UnknownPort(port_index).into());
        };
        let name = self
            .output
            .port_name(port)
            .unwrap_or_else(|_| format!("Port {port_index}"));
        let conn = self
            .output
            .connect(port, "boucle-pad-out")
            .map_err(|err| anyhow::anyhow!("failed to open MIDI output: {err}"))?;
        Ok(MidiOutputHandle::new(name, conn))
    }
}
