//! Host command source trait and error types.

use core::future::Future;

/// Error type for reading host commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// USB/communication I/O error.
    Io,
    /// Host went away.
    Disconnected,
    /// Packet larger than the receive buffer.
    BufferOverflow,
}

/// Async trait for host command channels.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait CommandSource {
    /// Wait for the next host packet and copy it into `buf`.
    ///
    /// Returns the number of bytes written. A zero-length packet is valid.
    fn receive(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, CommandError>>;

    /// Check if the host is connected.
    fn is_connected(&self) -> bool;
}
