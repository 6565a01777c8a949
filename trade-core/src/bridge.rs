//! HostBridge: connects a host command channel to the command dispatcher.

use heapless::String;
use rand_core::RngCore;

use crate::command::{CommandError, CommandSource};
use crate::dispatcher::{CommandDispatcher, Response};
use crate::report::write_response;
use crate::status::{StatusError, StatusSink};
use crate::transport::LinkTransport;

/// Largest host packet read per command.
pub const MAX_PACKET_SIZE: usize = 64;

/// Capacity of the rendered response text.
pub const MAX_RESPONSE_LEN: usize = 512;

/// Reads host packets, dispatches them and writes the rendered response back.
///
/// # Error Handling
///
/// Read and write errors are returned to the caller. [`run`](Self::run) logs
/// them and keeps serving.
pub struct HostBridge<C, S, T, R> {
    source: C,
    sink: S,
    dispatcher: CommandDispatcher<T, R>,
}

impl<C, S, T, R> HostBridge<C, S, T, R>
where
    C: CommandSource,
    S: StatusSink,
    T: LinkTransport,
    R: RngCore,
{
    /// Create a new bridge with the given host channel halves and dispatcher.
    pub fn new(source: C, sink: S, dispatcher: CommandDispatcher<T, R>) -> Self {
        Self {
            source,
            sink,
            dispatcher,
        }
    }

    /// Serve host commands indefinitely.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.process_one().await {
                error!("host bridge error: {:?}", e);
            }
        }
    }

    /// Handle one host packet.
    ///
    /// Returns the response for testing purposes.
    pub async fn process_one(&mut self) -> Result<Response, BridgeError> {
        let mut packet = [0u8; MAX_PACKET_SIZE];
        let len = self
            .source
            .receive(&mut packet)
            .await
            .map_err(BridgeError::Command)?;
        let packet = &packet[..len.min(MAX_PACKET_SIZE)];

        if self.dispatcher.starts_trade(packet) {
            self.sink.trade_started().await;
        }

        let response = self.dispatcher.handle_input(packet);
        trace!("host command response: {:?}", response);

        if response == Response::Ignored {
            return Ok(response);
        }

        let mut text: String<MAX_RESPONSE_LEN> = String::new();
        write_response(&response, &mut text).map_err(|_| BridgeError::ResponseTooLong)?;
        self.sink
            .send(&text)
            .await
            .map_err(BridgeError::Status)?;

        Ok(response)
    }

    /// Get a reference to the command source.
    pub fn source(&self) -> &C {
        &self.source
    }

    /// Get a mutable reference to the command source.
    pub fn source_mut(&mut self) -> &mut C {
        &mut self.source
    }

    /// Get a reference to the status sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get a mutable reference to the status sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Get a reference to the command dispatcher.
    pub fn dispatcher(&self) -> &CommandDispatcher<T, R> {
        &self.dispatcher
    }

    /// Get a mutable reference to the command dispatcher.
    pub fn dispatcher_mut(&mut self) -> &mut CommandDispatcher<T, R> {
        &mut self.dispatcher
    }

    /// Decompose the bridge into its parts.
    pub fn into_parts(self) -> (C, S, CommandDispatcher<T, R>) {
        (self.source, self.sink, self.dispatcher)
    }
}

/// Error type for bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Error from the command source.
    Command(CommandError),
    /// Error from the status sink.
    Status(StatusError),
    /// Rendered response did not fit the text buffer.
    ResponseTooLong,
}
