//! Trade protocol state machine.
//!
//! ```text
//! Idle -> Handshake -> EntropyExchange -> MetadataExchange
//!      -> SelectionExchange -> RecordExchange -> Confirm -> Complete
//! ```
//!
//! Any active state can drop into `Failed`. Both peers run the same sequence
//! and every exchange swaps exactly one byte in each direction, so the two
//! sides stay in lock step without any framing.

use core::time::Duration;

use gen1_proto::text::{content_len, pad_into};
use gen1_proto::{
    check_record, encode_core_block, PartyRecord, Trailer, NICKNAME_LENGTH, OT_NAME_LENGTH,
    TRAILER_SIZE,
};
use rand_core::RngCore;

use crate::error::TradeError;
use crate::protocol::*;
use crate::slot::ReceivedSlot;
use crate::transport::{LinkConfig, LinkTransport};

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub link: LinkConfig,
    /// Upper bound for a single byte exchange.
    pub byte_timeout: Duration,
    /// Retries per handshake step after the first attempt.
    pub handshake_retries: u8,
    /// Random bytes sent after the preamble, capped at [`MAX_ENTROPY_LEN`].
    pub entropy_len: u8,
    /// Version byte for the last handshake step.
    pub version: u8,
    /// Decline records that fail [`check_record`].
    pub validate_received: bool,
    /// Copy the peer's nickname and OT name into the received slot trailer.
    pub merge_peer_names: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            byte_timeout: Duration::from_secs(1),
            handshake_retries: 8,
            entropy_len: DEFAULT_ENTROPY_LEN,
            version: DEFAULT_VERSION,
            validate_received: true,
            merge_peer_names: false,
        }
    }
}

/// Current engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TradeState {
    Idle,
    Handshake,
    EntropyExchange,
    MetadataExchange,
    SelectionExchange,
    RecordExchange,
    Confirm,
    Complete,
    Failed(TradeError),
}

impl TradeState {
    /// True between `begin` and a terminal state.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle | Self::Complete | Self::Failed(_))
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed(_))
    }
}

/// What the peer announced during the trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerInfo {
    pub trainer_name: [u8; TRAINER_NAME_LENGTH],
    pub party_size: u8,
    /// First entry of the peer's species list.
    pub species: u8,
    pub ot_name: [u8; OT_NAME_LENGTH],
    pub nickname: [u8; NICKNAME_LENGTH],
    /// Party index the peer offered.
    pub offered_index: u8,
    entropy: [u8; MAX_ENTROPY_LEN],
    entropy_len: u8,
}

impl PeerInfo {
    pub const EMPTY: Self = Self {
        trainer_name: [0; TRAINER_NAME_LENGTH],
        party_size: 0,
        species: 0,
        ot_name: [0; OT_NAME_LENGTH],
        nickname: [0; NICKNAME_LENGTH],
        offered_index: 0,
        entropy: [0; MAX_ENTROPY_LEN],
        entropy_len: 0,
    };

    /// Random bytes the peer sent after its preamble.
    #[must_use]
    pub fn entropy(&self) -> &[u8] {
        &self.entropy[..usize::from(self.entropy_len)]
    }

    /// Nickname followed by OT name, in trailer layout.
    #[must_use]
    pub fn trailer(&self) -> Trailer {
        let mut trailer = [0; TRAILER_SIZE];
        trailer[..NICKNAME_LENGTH].copy_from_slice(&self.nickname);
        trailer[NICKNAME_LENGTH..].copy_from_slice(&self.ot_name);
        trailer
    }
}

impl Default for PeerInfo {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Result of a completed trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TradeOutcome {
    /// Decoded contents of the received slot.
    pub record: PartyRecord,
    pub peer: PeerInfo,
}

/// Drives one side of a link cable trade over a [`LinkTransport`].
pub struct TradeEngine<T, R> {
    transport: T,
    rng: R,
    config: EngineConfig,
    state: TradeState,
    peer: PeerInfo,
}

impl<T: LinkTransport, R: RngCore> TradeEngine<T, R> {
    /// Create an idle engine over `transport`, drawing entropy from `rng`.
    pub fn new(transport: T, rng: R, config: EngineConfig) -> Self {
        Self {
            transport,
            rng,
            config,
            state: TradeState::Idle,
            peer: PeerInfo::EMPTY,
        }
    }

    /// Get the current protocol state.
    #[must_use]
    pub fn state(&self) -> TradeState {
        self.state
    }

    /// Get the active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect at the next [`begin`](Self::begin).
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// What the peer announced in the current or last attempt.
    #[must_use]
    pub fn peer(&self) -> &PeerInfo {
        &self.peer
    }

    /// Get a reference to the link transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the link transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Drop back to `Idle` without touching the link.
    pub fn reset(&mut self) {
        self.state = TradeState::Idle;
        self.peer = PeerInfo::EMPTY;
    }

    /// Start a new attempt.
    ///
    /// Zeroes `received`, configures the transport and enters `Handshake`.
    ///
    /// # Errors
    ///
    /// [`TradeError::Busy`] while an attempt is running, or the transport's
    /// configuration error.
    pub fn begin(&mut self, received: &mut ReceivedSlot) -> Result<(), TradeError> {
        if self.state.is_active() {
            warn!("trade start rejected, engine busy in {:?}", self.state);
            return Err(TradeError::Busy);
        }

        self.reset();
        received.clear();

        if let Err(e) = self.transport.configure(&self.config.link) {
            return Err(self.fail(e.into()));
        }

        info!("trade started as {:?}", self.config.link.role);
        self.state = TradeState::Handshake;
        Ok(())
    }

    /// Run the current phase to completion and advance one state.
    ///
    /// Returns the new state. `Idle` and `Complete` are returned unchanged.
    ///
    /// # Errors
    ///
    /// The failure that moved the engine into `Failed`, or the stored one if
    /// it was already there.
    pub fn step(
        &mut self,
        outgoing: &PartyRecord,
        received: &mut ReceivedSlot,
    ) -> Result<TradeState, TradeError> {
        let result = match self.state {
            TradeState::Idle | TradeState::Complete => return Ok(self.state),
            TradeState::Failed(e) => return Err(e),
            TradeState::Handshake => self.handshake().map(|()| TradeState::EntropyExchange),
            TradeState::EntropyExchange => self.entropy().map(|()| TradeState::MetadataExchange),
            TradeState::MetadataExchange => self
                .metadata(outgoing)
                .map(|()| TradeState::SelectionExchange),
            TradeState::SelectionExchange => {
                self.selection().map(|()| TradeState::RecordExchange)
            }
            TradeState::RecordExchange => self
                .record_exchange(outgoing, received)
                .map(|()| TradeState::Confirm),
            TradeState::Confirm => self.confirm(received).map(|()| TradeState::Complete),
        };

        match result {
            Ok(next) => {
                debug!("{:?} -> {:?}", self.state, next);
                self.state = next;
                Ok(next)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Run a whole trade: [`begin`](Self::begin), then [`step`](Self::step)
    /// until a terminal state.
    ///
    /// # Errors
    ///
    /// Whatever failure ended the attempt.
    pub fn run(
        &mut self,
        outgoing: &PartyRecord,
        received: &mut ReceivedSlot,
    ) -> Result<TradeOutcome, TradeError> {
        self.begin(received)?;

        while !self.step(outgoing, received)?.is_terminal() {}

        Ok(TradeOutcome {
            record: received.record(),
            peer: self.peer,
        })
    }

    fn fail(&mut self, err: TradeError) -> TradeError {
        warn!("trade failed in {:?}: {:?}", self.state, err);
        self.state = TradeState::Failed(err);
        err
    }

    fn swap(&mut self, tx: u8) -> Result<u8, TradeError> {
        Ok(self
            .transport
            .exchange_byte(tx, self.config.byte_timeout)?)
    }

    fn swap_block<const N: usize>(&mut self, tx: &[u8; N]) -> Result<[u8; N], TradeError> {
        let mut rx = [0; N];
        for (out, &byte) in rx.iter_mut().zip(tx) {
            *out = self.swap(byte)?;
        }
        Ok(rx)
    }

    fn handshake(&mut self) -> Result<(), TradeError> {
        for stage in HandshakeStage::ALL {
            let (send, expect) = stage.codes(self.config.link.role, self.config.version);
            self.handshake_step(stage, send, expect)?;
        }
        Ok(())
    }

    /// Exchange a code, then the verdict on it [`VERDICT_COPIES`] times.
    ///
    /// A verdict copy that is neither ACK nor NAK was damaged on the wire and
    /// is ignored. The peer accepted only when an ACK arrived and no NAK did,
    /// so a single damaged byte per attempt cannot leave the two sides in
    /// different stages.
    fn handshake_step(
        &mut self,
        stage: HandshakeStage,
        send: u8,
        expect: u8,
    ) -> Result<(), TradeError> {
        let attempts = u16::from(self.config.handshake_retries) + 1;

        for attempt in 1..=attempts {
            let got = self.swap(send)?;
            let local_ok = got == expect;
            let verdicts = self.swap_block(&[if local_ok { ACK } else { NAK }; VERDICT_COPIES])?;
            let peer_ok = peer_accepted(&verdicts);

            if local_ok && peer_ok {
                trace!("handshake {:?} ok on attempt {}", stage, attempt);
                return Ok(());
            }

            debug!(
                "handshake {:?} attempt {}: got {}, expected {}, peer verdicts {:?}",
                stage, attempt, got, expect, verdicts
            );
        }

        Err(TradeError::HandshakeMismatch { stage })
    }

    fn entropy(&mut self) -> Result<(), TradeError> {
        for _ in 0..PREAMBLE_LEN {
            if self.swap(PREAMBLE_BYTE)? != PREAMBLE_BYTE {
                return Err(TradeError::Desync);
            }
        }

        let len = usize::from(self.config.entropy_len).min(MAX_ENTROPY_LEN);
        for i in 0..len {
            let byte = (self.rng.next_u32() % (u32::from(ENTROPY_MAX) + 1)) as u8;
            self.peer.entropy[i] = self.swap(byte)?;
        }
        self.peer.entropy_len = len as u8;

        Ok(())
    }

    fn metadata(&mut self, outgoing: &PartyRecord) -> Result<(), TradeError> {
        let mut trainer_name = [0; TRAINER_NAME_LENGTH];
        pad_into(
            &mut trainer_name,
            &outgoing.ot_name[..content_len(&outgoing.ot_name)],
        );

        self.peer.trainer_name = self.swap_block(&trainer_name)?;

        self.peer.party_size = self.swap(LOCAL_PARTY_SIZE)?;
        if self.peer.party_size != LOCAL_PARTY_SIZE {
            return Err(TradeError::MalformedMetadata);
        }

        let list = self.swap_block(&species_list(outgoing.species))?;
        if list[1..].iter().any(|&b| b != SPECIES_LIST_END) {
            return Err(TradeError::MalformedMetadata);
        }
        self.peer.species = list[0];

        self.peer.ot_name = self.swap_block(&outgoing.ot_name)?;
        self.peer.nickname = self.swap_block(&outgoing.nickname)?;

        Ok(())
    }

    fn selection(&mut self) -> Result<(), TradeError> {
        let byte = self.swap(SELECT_BASE)?;

        if byte == SELECT_CANCEL {
            return Err(TradeError::Declined);
        }

        match byte.checked_sub(SELECT_BASE) {
            Some(index) if index < self.peer.party_size => {
                self.peer.offered_index = index;
                Ok(())
            }
            _ => Err(TradeError::MalformedSelection(byte)),
        }
    }

    fn record_exchange(
        &mut self,
        outgoing: &PartyRecord,
        received: &mut ReceivedSlot,
    ) -> Result<(), TradeError> {
        let block = encode_core_block(outgoing);
        for (i, &byte) in block.iter().enumerate() {
            let rx = self.swap(byte)?;
            received.write(i, rx);
        }
        Ok(())
    }

    fn confirm(&mut self, received: &mut ReceivedSlot) -> Result<(), TradeError> {
        let verdict = if self.config.validate_received {
            check_record(&received.record())
        } else {
            Ok(())
        };

        let reply = self.swap(if verdict.is_ok() { ACCEPT } else { DECLINE })?;
        verdict.map_err(TradeError::RejectedRecord)?;

        match reply {
            ACCEPT => {}
            DECLINE => return Err(TradeError::Declined),
            _ => return Err(TradeError::Desync),
        }

        if self.config.merge_peer_names {
            received.write_trailer(&self.peer.trailer());
        }

        info!("trade complete, received species {}", received.record().species);
        Ok(())
    }
}

fn peer_accepted(verdicts: &[u8]) -> bool {
    verdicts.contains(&ACK) && !verdicts.contains(&NAK)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::transport::TransportError;
    use gen1_proto::{build_level1_record, MAGIKARP};
    use rand::rngs::mock::StepRng;
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// Replays a scripted peer and records what the engine sent.
    struct ScriptedLink {
        replies: VecDeque<u8>,
        sent: Vec<u8>,
        configured: usize,
    }

    impl ScriptedLink {
        fn new(replies: &[u8]) -> Self {
            Self {
                replies: replies.iter().copied().collect(),
                sent: Vec::new(),
                configured: 0,
            }
        }
    }

    impl LinkTransport for ScriptedLink {
        fn configure(&mut self, _config: &LinkConfig) -> Result<(), TransportError> {
            self.configured += 1;
            Ok(())
        }

        fn exchange_byte(&mut self, tx: u8, _timeout: Duration) -> Result<u8, TransportError> {
            self.sent.push(tx);
            self.replies.pop_front().ok_or(TransportError::Timeout)
        }
    }

    /// Bytes a slave sends for the whole handshake.
    const HANDSHAKE_LEN: usize = 9;

    fn slave_handshake() -> Vec<u8> {
        std::vec![
            MODE_TRADE_CENTRE,
            ACK,
            ACK,
            ROLE_SLAVE,
            ACK,
            ACK,
            DEFAULT_VERSION,
            ACK,
            ACK
        ]
    }

    fn engine(replies: &[u8]) -> TradeEngine<ScriptedLink, StepRng> {
        TradeEngine::new(
            ScriptedLink::new(replies),
            StepRng::new(0, 1),
            EngineConfig::default(),
        )
    }

    /// Everything a well-behaved peer sends up to and including selection.
    fn peer_prefix(peer: &PartyRecord) -> Vec<u8> {
        let mut bytes = slave_handshake();
        bytes.extend([PREAMBLE_BYTE; PREAMBLE_LEN]);
        bytes.extend(0..DEFAULT_ENTROPY_LEN);
        let mut name = [0; TRAINER_NAME_LENGTH];
        pad_into(&mut name, &peer.ot_name[..content_len(&peer.ot_name)]);
        bytes.extend(name);
        bytes.push(LOCAL_PARTY_SIZE);
        bytes.extend(species_list(peer.species));
        bytes.extend(peer.ot_name);
        bytes.extend(peer.nickname);
        bytes.push(SELECT_BASE);
        bytes
    }

    #[test]
    fn test_full_trade_against_script() {
        let ours = build_level1_record(&MAGIKARP, "RP2040", 0x1234);
        let theirs = build_level1_record(&gen1_proto::PIKACHU, "ASH", 0x0042);

        let mut script = peer_prefix(&theirs);
        script.extend(encode_core_block(&theirs));
        script.push(ACCEPT);

        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        let outcome = engine.run(&ours, &mut slot).unwrap();

        assert_eq!(engine.state(), TradeState::Complete);
        assert!(slot.is_populated());
        assert_eq!(outcome.record.species, theirs.species);
        assert_eq!(outcome.record.ot_id, 0x0042);
        // Trailer stays zeroed unless merging is enabled
        assert_eq!(outcome.record.nickname, [0; NICKNAME_LENGTH]);
        assert_eq!(outcome.peer.nickname, theirs.nickname);
        assert_eq!(outcome.peer.species, theirs.species);
        assert_eq!(outcome.peer.entropy(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);

        // The block we sent sits right before the final confirmation byte
        let sent = &engine.transport().sent;
        let block_start = sent.len() - 1 - gen1_proto::CORE_BLOCK_SIZE;
        assert_eq!(&sent[block_start..sent.len() - 1], &encode_core_block(&ours));
        assert_eq!(sent.last(), Some(&ACCEPT));
    }

    #[test]
    fn test_sent_entropy_stays_in_range() {
        let ours = build_level1_record(&MAGIKARP, "RP2040", 1);
        let mut engine = TradeEngine::new(
            ScriptedLink::new(&peer_prefix(&ours)),
            StepRng::new(0xFFFF_FFFF, 0x1357_9BDF),
            EngineConfig::default(),
        );
        let mut slot = ReceivedSlot::new();
        engine.begin(&mut slot).unwrap();
        engine.step(&ours, &mut slot).unwrap();
        engine.step(&ours, &mut slot).unwrap();

        let sent = &engine.transport().sent;
        let random = &sent[HANDSHAKE_LEN + PREAMBLE_LEN..HANDSHAKE_LEN + PREAMBLE_LEN + 10];
        assert!(random.iter().all(|&b| b <= ENTROPY_MAX));
    }

    #[test]
    fn test_merge_peer_names() {
        let ours = build_level1_record(&MAGIKARP, "RP2040", 1);
        let theirs = build_level1_record(&gen1_proto::PIKACHU, "ASH", 2);

        let mut script = peer_prefix(&theirs);
        script.extend(encode_core_block(&theirs));
        script.push(ACCEPT);

        let mut engine = engine(&script);
        engine.set_config(EngineConfig {
            merge_peer_names: true,
            ..EngineConfig::default()
        });
        let mut slot = ReceivedSlot::new();
        let outcome = engine.run(&ours, &mut slot).unwrap();

        assert_eq!(outcome.record, theirs);
        assert_eq!(&slot.as_bytes()[44..], &gen1_proto::encode_trailer(&theirs));
    }

    #[test]
    fn test_handshake_retry_budget() {
        // Peer keeps answering with the wrong mode code and NAKs
        let script: Vec<u8> = [0x00, NAK, NAK].repeat(9);
        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        let err = engine
            .run(&build_level1_record(&MAGIKARP, "RP2040", 1), &mut slot)
            .unwrap_err();

        assert_eq!(
            err,
            TradeError::HandshakeMismatch {
                stage: HandshakeStage::Mode
            }
        );
        assert_eq!(engine.state(), TradeState::Failed(err));
        // One attempt plus eight retries, a code and two verdicts each
        assert_eq!(engine.transport().sent.len(), 27);
        assert!(engine
            .transport()
            .sent
            .chunks(3)
            .all(|attempt| attempt == [MODE_TRADE_CENTRE, NAK, NAK]));
    }

    #[test]
    fn test_handshake_recovers_after_nak() {
        let mut script = std::vec![MODE_TRADE_CENTRE, NAK, NAK];
        script.extend(slave_handshake());
        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        engine.begin(&mut slot).unwrap();

        let state = engine
            .step(&build_level1_record(&MAGIKARP, "RP2040", 1), &mut slot)
            .unwrap();
        assert_eq!(state, TradeState::EntropyExchange);
    }

    #[test]
    fn test_damaged_verdict_copy_is_ignored() {
        // One copy of each ACK arrives bit-inverted
        let script = [
            MODE_TRADE_CENTRE,
            !ACK,
            ACK,
            ROLE_SLAVE,
            ACK,
            !ACK,
            DEFAULT_VERSION,
            !ACK,
            ACK,
        ];
        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        engine.begin(&mut slot).unwrap();

        let state = engine
            .step(&build_level1_record(&MAGIKARP, "RP2040", 1), &mut slot)
            .unwrap();
        assert_eq!(state, TradeState::EntropyExchange);
        assert_eq!(engine.transport().sent.len(), HANDSHAKE_LEN);
    }

    #[test]
    fn test_conflicting_verdicts_retry_stage() {
        let mut script = std::vec![MODE_TRADE_CENTRE, ACK, NAK];
        script.extend(slave_handshake());
        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        engine.begin(&mut slot).unwrap();

        let state = engine
            .step(&build_level1_record(&MAGIKARP, "RP2040", 1), &mut slot)
            .unwrap();
        assert_eq!(state, TradeState::EntropyExchange);
        // Our own code check passed, so the failed attempt still sent ACKs
        assert_eq!(&engine.transport().sent[..3], &[MODE_TRADE_CENTRE, ACK, ACK]);
        assert_eq!(engine.transport().sent.len(), 3 + HANDSHAKE_LEN);
    }

    #[test]
    fn test_peer_accepted() {
        assert!(peer_accepted(&[ACK, ACK]));
        assert!(peer_accepted(&[ACK, 0x9F]));
        assert!(!peer_accepted(&[ACK, NAK]));
        assert!(!peer_accepted(&[0x9F, 0x01]));
        assert!(!peer_accepted(&[NAK, NAK]));
    }

    #[test]
    fn test_timeout_fails_trade() {
        let mut engine = engine(&[MODE_TRADE_CENTRE]);
        let mut slot = ReceivedSlot::new();
        let err = engine
            .run(&build_level1_record(&MAGIKARP, "RP2040", 1), &mut slot)
            .unwrap_err();
        assert_eq!(err, TradeError::LinkTimeout);
    }

    #[test]
    fn test_bad_preamble_is_desync() {
        let mut script = slave_handshake();
        script.extend([PREAMBLE_BYTE, 0x00]);
        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        let err = engine
            .run(&build_level1_record(&MAGIKARP, "RP2040", 1), &mut slot)
            .unwrap_err();
        assert_eq!(err, TradeError::Desync);
    }

    #[test]
    fn test_peer_party_size_rejected() {
        let theirs = build_level1_record(&MAGIKARP, "ASH", 1);
        let mut script = peer_prefix(&theirs);
        script[HANDSHAKE_LEN + PREAMBLE_LEN + 10 + TRAINER_NAME_LENGTH] = 2;

        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        let err = engine.run(&theirs, &mut slot).unwrap_err();
        assert_eq!(err, TradeError::MalformedMetadata);
    }

    #[test]
    fn test_species_list_without_terminator_rejected() {
        let theirs = build_level1_record(&MAGIKARP, "ASH", 1);
        let mut script = peer_prefix(&theirs);
        script[HANDSHAKE_LEN + PREAMBLE_LEN + 10 + TRAINER_NAME_LENGTH + 2] = 0x54;

        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        let err = engine.run(&theirs, &mut slot).unwrap_err();
        assert_eq!(err, TradeError::MalformedMetadata);
    }

    #[test]
    fn test_selection_out_of_range() {
        let theirs = build_level1_record(&MAGIKARP, "ASH", 1);
        let mut script = peer_prefix(&theirs);
        *script.last_mut().unwrap() = SELECT_BASE + 1;

        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        let err = engine.run(&theirs, &mut slot).unwrap_err();
        assert_eq!(err, TradeError::MalformedSelection(0x61));
        assert!(!slot.is_populated());
    }

    #[test]
    fn test_selection_cancel() {
        let theirs = build_level1_record(&MAGIKARP, "ASH", 1);
        let mut script = peer_prefix(&theirs);
        *script.last_mut().unwrap() = SELECT_CANCEL;

        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        assert_eq!(
            engine.run(&theirs, &mut slot).unwrap_err(),
            TradeError::Declined
        );
    }

    #[test]
    fn test_invalid_record_declined_locally() {
        let ours = build_level1_record(&MAGIKARP, "RP2040", 1);
        let mut bad = build_level1_record(&MAGIKARP, "ASH", 1);
        bad.level_in_box = 50;

        let mut script = peer_prefix(&bad);
        script.extend(encode_core_block(&bad));
        script.push(ACCEPT);

        let mut engine = engine(&script);
        let mut slot = ReceivedSlot::new();
        let err = engine.run(&ours, &mut slot).unwrap_err();

        assert!(matches!(err, TradeError::RejectedRecord(_)));
        assert_eq!(engine.transport().sent.last(), Some(&DECLINE));
    }

    #[test]
    fn test_peer_decline_and_garbage_confirm() {
        let ours = build_level1_record(&MAGIKARP, "RP2040", 1);

        for (reply, expected) in [(DECLINE, TradeError::Declined), (0x00, TradeError::Desync)] {
            let mut script = peer_prefix(&ours);
            script.extend(encode_core_block(&ours));
            script.push(reply);

            let mut engine = engine(&script);
            let mut slot = ReceivedSlot::new();
            assert_eq!(engine.run(&ours, &mut slot).unwrap_err(), expected);
            // The record bytes still arrived
            assert!(slot.is_populated());
        }
    }

    #[test]
    fn test_begin_while_active_is_busy() {
        let mut engine = engine(&[]);
        let mut slot = ReceivedSlot::new();
        engine.begin(&mut slot).unwrap();
        assert_eq!(engine.begin(&mut slot), Err(TradeError::Busy));
        assert_eq!(engine.state(), TradeState::Handshake);

        engine.reset();
        assert_eq!(engine.begin(&mut slot), Ok(()));
        assert_eq!(engine.transport().configured, 2);
    }

    #[test]
    fn test_begin_after_failure_clears_slot() {
        let mut engine = engine(&[]);
        let mut slot = ReceivedSlot::new();
        slot.write(0, 0x81);

        let err = engine
            .run(&build_level1_record(&MAGIKARP, "RP2040", 1), &mut slot)
            .unwrap_err();
        assert_eq!(err, TradeError::LinkTimeout);
        assert_eq!(slot, ReceivedSlot::new());

        // Failed is terminal but a new start is allowed
        slot.write(0, 0x81);
        assert_eq!(engine.begin(&mut slot), Ok(()));
        assert_eq!(slot.received_len(), 0);
    }

    #[test]
    fn test_step_in_idle_and_failed() {
        let ours = build_level1_record(&MAGIKARP, "RP2040", 1);
        let mut engine = engine(&[]);
        let mut slot = ReceivedSlot::new();
        assert_eq!(engine.step(&ours, &mut slot), Ok(TradeState::Idle));

        engine.begin(&mut slot).unwrap();
        assert_eq!(engine.step(&ours, &mut slot), Err(TradeError::LinkTimeout));
        assert_eq!(engine.step(&ours, &mut slot), Err(TradeError::LinkTimeout));
    }
}
