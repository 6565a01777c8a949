//! Human readable host responses.
//!
//! Every line ends in CRLF for serial terminals.

use core::fmt::{self, Write};

use gen1_proto::{decode_name, PartyRecord, PokemonType, NICKNAME_LENGTH, OT_NAME_LENGTH};

use crate::dispatcher::Response;
use crate::engine::TradeOutcome;
use crate::protocol::TRAINER_NAME_LENGTH;

/// Render `response` into `w`. [`Response::Ignored`] renders nothing.
///
/// # Errors
///
/// Propagates errors from `w`, typically a full buffer.
pub fn write_response<W: Write>(response: &Response, w: &mut W) -> fmt::Result {
    match response {
        Response::Trade(outcome) => write_outcome(outcome, w),
        Response::TradeFailed(err) => write!(w, "Trade failed: {}\r\n", err),
        Response::Help => write_help(w),
        Response::Busy => write!(w, "Trade already in progress\r\n"),
        Response::Ignored => Ok(()),
    }
}

fn write_help<W: Write>(w: &mut W) -> fmt::Result {
    w.write_str("Commands:\r\n")?;
    w.write_str("  t - start a trade\r\n")?;
    w.write_str("  h - show this help\r\n")
}

fn write_outcome<W: Write>(outcome: &TradeOutcome, w: &mut W) -> fmt::Result {
    let peer = &outcome.peer;
    write!(
        w,
        "Trade complete with {}\r\n",
        decode_name::<TRAINER_NAME_LENGTH>(&peer.trainer_name)
    )?;
    write!(
        w,
        "Offered: {} (OT {})\r\n",
        decode_name::<NICKNAME_LENGTH>(&peer.nickname),
        decode_name::<OT_NAME_LENGTH>(&peer.ot_name)
    )?;
    write_record(&outcome.record, w)
}

/// Render the fields of a received record.
///
/// # Errors
///
/// Propagates errors from `w`.
pub fn write_record<W: Write>(pkm: &PartyRecord, w: &mut W) -> fmt::Result {
    write!(
        w,
        "Species 0x{:02X} Lv{} OT ID {}\r\n",
        pkm.species, pkm.level, pkm.ot_id
    )?;

    w.write_str("Type: ")?;
    write_type(pkm.type1, w)?;
    if !pkm.is_single_type() {
        w.write_char('/')?;
        write_type(pkm.type2, w)?;
    }
    w.write_str("\r\n")?;

    let s = &pkm.stats;
    write!(
        w,
        "HP {}/{} ATK {} DEF {} SPD {} SPC {}\r\n",
        pkm.current_hp, s.hp, s.attack, s.defense, s.speed, s.special
    )?;

    w.write_str("Moves:")?;
    for (id, pp) in pkm.moves.iter().zip(&pkm.pp).take(pkm.move_count()) {
        write!(w, " 0x{:02X} ({} PP)", id, pp.current())?;
    }
    w.write_str("\r\n")?;

    let nickname = decode_name::<NICKNAME_LENGTH>(&pkm.nickname);
    if !nickname.is_empty() {
        write!(
            w,
            "Name: {} OT: {}\r\n",
            nickname,
            decode_name::<OT_NAME_LENGTH>(&pkm.ot_name)
        )?;
    }

    Ok(())
}

fn write_type<W: Write>(ty: PokemonType, w: &mut W) -> fmt::Result {
    match ty.name() {
        Some(name) => w.write_str(name),
        None => write!(w, "0x{:02X}", ty.raw()),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::engine::PeerInfo;
    use crate::error::TradeError;
    use gen1_proto::{build_level1_record, MAGIKARP, PIKACHU};
    use std::string::String;

    fn render(response: &Response) -> String {
        let mut out = String::new();
        write_response(response, &mut out).unwrap();
        out
    }

    #[test]
    fn test_help_lists_commands() {
        let text = render(&Response::Help);
        assert!(text.contains("t - start a trade"));
        assert!(text.contains("h - show this help"));
        assert!(text.ends_with("\r\n"));
    }

    #[test]
    fn test_ignored_renders_nothing() {
        assert!(render(&Response::Ignored).is_empty());
    }

    #[test]
    fn test_failure_reason() {
        assert_eq!(
            render(&Response::TradeFailed(TradeError::LinkTimeout)),
            "Trade failed: link timeout\r\n"
        );
    }

    #[test]
    fn test_trade_report() {
        let theirs = build_level1_record(&MAGIKARP, "ASH", 42);
        let mut peer = PeerInfo::EMPTY;
        peer.trainer_name = gen1_proto::encode_name("ASH");
        peer.nickname = theirs.nickname;
        peer.ot_name = theirs.ot_name;

        let mut record = theirs;
        record.nickname = [0; NICKNAME_LENGTH];
        record.ot_name = [0; OT_NAME_LENGTH];

        let text = render(&Response::Trade(TradeOutcome { record, peer }));
        assert!(text.starts_with("Trade complete with ASH\r\n"));
        assert!(text.contains("Offered: MAGIKARP (OT ASH)\r\n"));
        assert!(text.contains("Species 0x81 Lv1 OT ID 42\r\n"));
        assert!(text.contains("Type: WATER\r\n"));
        assert!(text.contains("HP 11/11 ATK 5 DEF 6 SPD 6 SPC 5\r\n"));
        assert!(text.contains("Moves: 0x96 (40 PP)\r\n"));
        // Zeroed trailer means no name line
        assert!(!text.contains("Name:"));
    }

    #[test]
    fn test_record_with_names() {
        let mut text = String::new();
        write_record(&build_level1_record(&PIKACHU, "RED", 1), &mut text).unwrap();
        assert!(text.contains("Type: ELECTRIC\r\n"));
        assert!(text.contains("Moves: 0x54 (30 PP) 0x2D (40 PP)\r\n"));
        assert!(text.contains("Name: PIKACHU OT: RED\r\n"));
    }
}
