//! Invariants checked over generated boards and move sequences.

use std::collections::{HashSet, VecDeque};

use proptest::prelude::*;
use tapsweeper_core::*;

fn board() -> impl Strategy<Value = (GameConfig, Coord2, u64)> {
    (MIN_SIDE..=MAX_SIDE, MIN_SIDE..=MAX_SIDE)
        .prop_flat_map(|(width, height)| {
            let cells = mult(width, height);
            (
                Just((width, height)),
                0..cells,
                0..width,
                0..height,
                any::<u64>(),
            )
        })
        .prop_map(|(size, mines, x, y, seed)| {
            (GameConfig::new(size, mines).unwrap(), (x, y), seed)
        })
}

#[derive(Copy, Clone, Debug)]
enum Move {
    Reveal(Coord2),
    Flag(Coord2),
    Chord(Coord2),
}

fn moves() -> impl Strategy<Value = Vec<Move>> {
    // coordinates may fall outside smaller boards on purpose
    let coords = (0..MAX_SIDE, 0..MAX_SIDE);
    let single = prop_oneof![
        coords.clone().prop_map(Move::Reveal),
        coords.clone().prop_map(Move::Flag),
        coords.prop_map(Move::Chord),
    ];
    prop::collection::vec(single, 0..80)
}

/// Zero region connected to `origin` plus its numbered border, computed independently.
fn expected_opening(layout: &MineLayout, origin: Coord2) -> HashSet<Coord2> {
    let mut opened = HashSet::from([origin]);
    let mut frontier = VecDeque::from([origin]);
    while let Some(pos) = frontier.pop_front() {
        if layout.adjacent_mine_count(pos) != 0 {
            continue;
        }
        for next in NeighborIter::new(pos, layout.size()) {
            if opened.insert(next) {
                frontier.push_back(next);
            }
        }
    }
    opened
}

fn check_invariants(session: &GameSession) -> core::result::Result<(), TestCaseError> {
    let flagged = iter_coords(session.size())
        .filter(|&pos| session.mark_at(pos).is_flagged())
        .count() as CellCount;
    prop_assert_eq!(session.flagged_count(), flagged);
    prop_assert_eq!(session.flags_remaining(), session.mine_count() - flagged);
    prop_assert!(session.flags_remaining() <= session.mine_count());

    for pos in iter_coords(session.size()) {
        let cell = session.cell_at(pos);
        prop_assert!(!(cell.is_revealed && cell.is_flagged), "{:?} revealed and flagged", pos);
    }

    let won = session.status() == SessionStatus::Won;
    let all_safe_open = session.revealed_safe_count() == session.config().safe_cells();
    prop_assert_eq!(won, all_safe_open);
    Ok(())
}

proptest! {
    #[test]
    fn placement_honors_count_and_safe_zone((config, start, seed) in board()) {
        let layout = MineLayout::generate(config, start, seed);

        prop_assert_eq!(layout.mine_count(), config.mines);
        prop_assert!(!layout.contains_mine(start));
        if SafeZone::for_config(config, start) == SafeZone::Neighborhood {
            for mine in layout.iter_mines() {
                prop_assert!(chebyshev_distance(mine, start) > 1, "mine {:?} near {:?}", mine, start);
            }
        }
    }

    #[test]
    fn opening_cascade_matches_region((config, start, seed) in board()) {
        let mut session = GameSession::new(config, seed).unwrap();
        session.reveal(start, 0).unwrap();

        let layout = MineLayout::from_mine_coords(
            config.size,
            &iter_coords(config.size).filter(|&pos| session.has_mine_at(pos)).collect::<Vec<_>>(),
        ).unwrap();
        let expected = expected_opening(&layout, start);

        for pos in iter_coords(config.size) {
            let revealed = session.mark_at(pos).is_revealed();
            if session.status() == SessionStatus::Won {
                prop_assert_eq!(revealed, !layout.contains_mine(pos));
            } else {
                prop_assert_eq!(revealed, expected.contains(&pos), "{:?}", pos);
                prop_assert!(!(revealed && layout.contains_mine(pos)));
            }
        }
    }

    #[test]
    fn random_play_keeps_invariants((config, _start, seed) in board(), steps in moves()) {
        let mut session = GameSession::new(config, seed).unwrap();
        let mut status = session.status();

        for (now, step) in steps.into_iter().enumerate() {
            let now = now as u64 * 100;
            let was_finished = session.is_finished();
            let result = match step {
                Move::Reveal(pos) => session.reveal(pos, now).map(|_| ()),
                Move::Flag(pos) => session.toggle_flag(pos).map(|_| ()),
                Move::Chord(pos) => session.chord_reveal(pos, now).map(|_| ()),
            };
            if was_finished {
                prop_assert!(result.is_err());
            }

            // status only moves forward
            let rank = |status: SessionStatus| match status {
                SessionStatus::NotStarted => 0,
                SessionStatus::InProgress => 1,
                SessionStatus::Won | SessionStatus::Lost => 2,
            };
            prop_assert!(rank(session.status()) >= rank(status));
            if status.is_finished() {
                prop_assert_eq!(session.status(), status);
            }
            status = session.status();

            check_invariants(&session)?;
        }
    }
}
