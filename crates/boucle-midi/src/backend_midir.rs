use std::collections::HashMap;

use anyhow::Context;
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use tracing::trace;

use crate::device::{FrameSender, InboundFrame, MidiBackend, MidiDeviceId, RawFrame};
use crate::MidiError;

const CLIENT_NAME: &str = "boucle-midi";

/// Backend implemented using the `midir` crate.
pub struct MidirBackend {
    next_id: MidiDeviceId,
    connections: HashMap<MidiDeviceId, MidiInputConnection<()>>,
}

impl Default for MidirBackend {
    fn default() -> Self {
        Self {
            next_id: 1,
            connections: HashMap::new(),
        }
    }
}

impl MidirBackend {
    fn allocate_id(&mut self) -> MidiDeviceId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl MidiBackend for MidirBackend {
    fn enumerate(&self) -> anyhow::Result<Vec<String>> {
        let input = MidiInput::new(CLIENT_NAME).context("initialise midir for enumeration")?;
        let mut names = Vec::new();
        for (index, port) in input.ports().into_iter().enumerate() {
            let name = input
                .port_name(&port)
                .unwrap_or_else(|_| format!("Port {index}"));
            names.push(name);
        }
        Ok(names)
    }

    fn open_input(
        &mut self,
        port_index: usize,
        frames: FrameSender,
    ) -> anyhow::Result<MidiDeviceId> {
        let mut input = MidiInput::new(CLIENT_NAME).context("initialise midir for input")?;
        input.ignore(Ignore::All);
        let ports: Vec<MidiInputPort> = input.ports();
        let Some(port) = ports.get(port_index) else {
            return Err(MidiError::UnknownPort(port_index).into());
        };
        let id = self.allocate_id();
        let connection = input
            .connect(
                port,
                "boucle-pad-in",
                move |_timestamp, message, _| {
                    if message.is_empty() {
                        return;
                    }
                    let frame = InboundFrame {
                        device: id,
                        bytes: RawFrame::from_slice(message),
                    };
                    if frames.send(frame).is_err() {
                        trace!(id, "midi frame dropped, receiver gone");
                    }
                },
                (),
            )
            .map_err(|err| anyhow::anyhow!("failed to connect midi input: {err}"))?;
        self.connections.insert(id, connection);
        Ok(id)
    }

    fn close_input(&mut self, id: MidiDeviceId) {
        if let Some(connection) = self.connections.remove(&id) {
            connection.close();
        }
    }
}
