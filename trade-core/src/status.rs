//! Host status sink trait and error types.

use core::future::Future;

/// Error type for writing host responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusError {
    /// USB/communication I/O error.
    Io,
    /// Host not connected (e.g., USB not enumerated or port closed).
    NotReady,
}

/// Async trait for host response channels.
pub trait StatusSink {
    /// Write a rendered response to the host.
    fn send(&mut self, text: &str) -> impl Future<Output = Result<(), StatusError>>;

    /// Check if the sink can accept data.
    fn is_ready(&self) -> bool;

    /// Called right before a trade command runs. The trade blocks the
    /// calling task until it completes, so implementations that drive an
    /// indicator from another task should yield here.
    fn trade_started(&mut self) -> impl Future<Output = ()> {
        core::future::ready(())
    }
}
