//! Host command dispatch.

use gen1_proto::{build_level1_record, PartyRecord, SpeciesTemplate, MAGIKARP};
use rand_core::RngCore;

use crate::engine::{TradeEngine, TradeOutcome};
use crate::error::TradeError;
use crate::slot::ReceivedSlot;
use crate::transport::LinkTransport;

/// Start a trade.
pub const CMD_TRADE: u8 = b't';

/// List the available commands.
pub const CMD_HELP: u8 = b'h';

/// Inputs for the record offered in every trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainerProfile {
    /// OT name (ASCII, truncated to 6 characters on the wire).
    pub name: &'static str,
    pub id: u16,
    pub species: &'static SpeciesTemplate,
}

impl Default for TrainerProfile {
    fn default() -> Self {
        Self {
            name: "RP2040",
            id: 0x1234,
            species: &MAGIKARP,
        }
    }
}

/// Outcome of a single host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    /// The trade completed.
    Trade(TradeOutcome),
    /// The trade was attempted and failed.
    TradeFailed(TradeError),
    /// Command listing requested.
    Help,
    /// A trade was already running.
    Busy,
    /// Unknown command byte or empty input.
    Ignored,
}

/// Maps host command bytes to engine runs.
///
/// Owns the outgoing record and the received slot for the engine.
pub struct CommandDispatcher<T, R> {
    engine: TradeEngine<T, R>,
    profile: TrainerProfile,
    outgoing: PartyRecord,
    received: ReceivedSlot,
}

impl<T: LinkTransport, R: RngCore> CommandDispatcher<T, R> {
    /// Create a dispatcher offering records built from `profile`.
    pub fn new(engine: TradeEngine<T, R>, profile: TrainerProfile) -> Self {
        Self {
            engine,
            profile,
            outgoing: PartyRecord::zeroed(),
            received: ReceivedSlot::new(),
        }
    }

    /// Handle one command byte.
    pub fn dispatch(&mut self, command: u8) -> Response {
        match command {
            CMD_TRADE => self.trade(),
            CMD_HELP => Response::Help,
            _ => {
                trace!("ignoring command byte {}", command);
                Response::Ignored
            }
        }
    }

    /// Handle a host packet. Only the first byte is a command.
    pub fn handle_input(&mut self, input: &[u8]) -> Response {
        match input.first() {
            Some(&command) => self.dispatch(command),
            None => Response::Ignored,
        }
    }

    /// True while the engine is in the middle of an attempt.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.engine.state().is_active()
    }

    /// True if `input` would start a trade right now.
    #[must_use]
    pub fn starts_trade(&self, input: &[u8]) -> bool {
        input.first() == Some(&CMD_TRADE) && !self.is_busy()
    }

    fn trade(&mut self) -> Response {
        // The outgoing record only changes between attempts
        if self.is_busy() {
            return Response::Busy;
        }

        let profile = self.profile;
        self.outgoing = build_level1_record(profile.species, profile.name, profile.id);

        match self.engine.run(&self.outgoing, &mut self.received) {
            Ok(outcome) => Response::Trade(outcome),
            Err(e) => Response::TradeFailed(e),
        }
    }

    /// Get the trainer profile used for the next trade.
    #[must_use]
    pub fn profile(&self) -> &TrainerProfile {
        &self.profile
    }

    /// Replace the trainer profile. Takes effect at the next trade.
    pub fn set_profile(&mut self, profile: TrainerProfile) {
        self.profile = profile;
    }

    /// Record offered in the last trade attempt.
    #[must_use]
    pub fn outgoing(&self) -> &PartyRecord {
        &self.outgoing
    }

    /// Get the slot filled by the last trade attempt.
    #[must_use]
    pub fn received(&self) -> &ReceivedSlot {
        &self.received
    }

    /// Get a reference to the trade engine.
    pub fn engine(&self) -> &TradeEngine<T, R> {
        &self.engine
    }

    /// Get a mutable reference to the trade engine.
    pub fn engine_mut(&mut self) -> &mut TradeEngine<T, R> {
        &mut self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineConfig, TradeState};
    use crate::transport::{LinkConfig, TransportError};
    use core::time::Duration;
    use rand::rngs::mock::StepRng;

    /// Link with nobody on the other end.
    struct DeadLink;

    impl LinkTransport for DeadLink {
        fn configure(&mut self, _config: &LinkConfig) -> Result<(), TransportError> {
            Ok(())
        }

        fn exchange_byte(&mut self, _tx: u8, _timeout: Duration) -> Result<u8, TransportError> {
            Err(TransportError::Timeout)
        }
    }

    fn dispatcher() -> CommandDispatcher<DeadLink, StepRng> {
        CommandDispatcher::new(
            TradeEngine::new(DeadLink, StepRng::new(0, 1), EngineConfig::default()),
            TrainerProfile::default(),
        )
    }

    #[test]
    fn test_help_and_unknown() {
        let mut d = dispatcher();
        assert_eq!(d.dispatch(CMD_HELP), Response::Help);
        assert_eq!(d.dispatch(b'x'), Response::Ignored);
        assert_eq!(d.handle_input(&[]), Response::Ignored);
        assert_eq!(d.handle_input(b"hello"), Response::Help);
        assert_eq!(d.engine().state(), TradeState::Idle);
    }

    #[test]
    fn test_trade_builds_outgoing_and_reports_failure() {
        let mut d = dispatcher();
        assert_eq!(
            d.dispatch(CMD_TRADE),
            Response::TradeFailed(TradeError::LinkTimeout)
        );
        assert_eq!(d.outgoing().species, MAGIKARP.species);
        assert_eq!(d.outgoing().ot_id, 0x1234);
        assert_eq!(d.received().received_len(), 0);
    }

    #[test]
    fn test_trade_while_engine_active_is_busy() {
        let mut d = dispatcher();
        let mut slot = ReceivedSlot::new();
        d.engine_mut().begin(&mut slot).unwrap();
        assert!(d.is_busy());
        assert!(!d.starts_trade(&[CMD_TRADE]));
        assert_eq!(d.dispatch(CMD_TRADE), Response::Busy);
        // A rejected start leaves the outgoing record alone
        assert_eq!(d.outgoing(), &PartyRecord::zeroed());
        assert_eq!(d.engine().state(), TradeState::Handshake);
    }

    #[test]
    fn test_starts_trade() {
        let d = dispatcher();
        assert!(d.starts_trade(b"t"));
        assert!(d.starts_trade(b"trade"));
        assert!(!d.starts_trade(b"h"));
        assert!(!d.starts_trade(&[]));
    }

    #[test]
    fn test_profile_selects_species() {
        let mut d = dispatcher();
        d.set_profile(TrainerProfile {
            name: "ASH",
            id: 7,
            species: &gen1_proto::PIKACHU,
        });
        d.dispatch(CMD_TRADE);
        assert_eq!(d.outgoing().species, gen1_proto::PIKACHU.species);
        assert_eq!(d.outgoing().ot_id, 7);
    }
}
