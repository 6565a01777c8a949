//! Trade failure reasons.

use crate::protocol::HandshakeStage;
use crate::transport::TransportError;
use gen1_proto::RecordError;

/// Why a trade attempt ended in the `Failed` state.
///
/// None of these are recoverable mid-attempt. The host re-issues the trade
/// command to try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TradeError {
    /// A handshake step kept disagreeing after the retry budget.
    HandshakeMismatch { stage: HandshakeStage },
    /// The transport did not complete an exchange in time.
    LinkTimeout,
    /// The peer selected an index outside its party.
    MalformedSelection(u8),
    /// The peer announced a party size or species list this side cannot use.
    MalformedMetadata,
    /// The peer sent a byte that does not belong at this point.
    Desync,
    /// The peer cancelled or declined.
    Declined,
    /// This side declined a received record that failed validation.
    RejectedRecord(RecordError),
    /// The transport failed for a reason other than a timeout.
    Transport(TransportError),
    /// A trade is already in progress.
    Busy,
}

impl From<TransportError> for TradeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => TradeError::LinkTimeout,
            other => TradeError::Transport(other),
        }
    }
}

impl core::fmt::Display for TradeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::HandshakeMismatch { stage } => write!(f, "handshake {} mismatch", stage),
            Self::LinkTimeout => write!(f, "link timeout"),
            Self::MalformedSelection(byte) => write!(f, "invalid selection 0x{:02X}", byte),
            Self::MalformedMetadata => write!(f, "invalid party metadata"),
            Self::Desync => write!(f, "link out of sync"),
            Self::Declined => write!(f, "trade declined by peer"),
            Self::RejectedRecord(err) => write!(f, "received record rejected: {}", err),
            Self::Transport(err) => write!(f, "{}", err),
            Self::Busy => write!(f, "trade already in progress"),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn test_timeout_maps_to_link_timeout() {
        assert_eq!(TradeError::from(TransportError::Timeout), TradeError::LinkTimeout);
        assert_eq!(
            TradeError::from(TransportError::Disconnected),
            TradeError::Transport(TransportError::Disconnected)
        );
    }

    #[test]
    fn test_display() {
        let err = TradeError::HandshakeMismatch {
            stage: HandshakeStage::Version,
        };
        assert_eq!(err.to_string(), "handshake version mismatch");
        assert_eq!(
            TradeError::MalformedSelection(0x65).to_string(),
            "invalid selection 0x65"
        );
    }
}
