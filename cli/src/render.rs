use std::fmt::Write;

use tapsweeper_core::{CellDisplay, GameSession, History, SessionStatus, iter_coords};

/// Three digit counter, clamped to `-99..=999`.
pub fn format_for_counter(num: i64) -> String {
    match num {
        ..-99 => "-99".to_string(),
        -99..0 => format!("-{:02}", -num),
        0..1000 => format!("{:03}", num),
        1000.. => "999".to_string(),
    }
}

fn glyph(display: CellDisplay) -> char {
    match display {
        CellDisplay::Hidden => '.',
        CellDisplay::Flagged => 'F',
        CellDisplay::Revealed(0) => ' ',
        CellDisplay::Revealed(count) => char::from_digit(u32::from(count), 10).unwrap_or('?'),
        CellDisplay::TriggeredMine => 'X',
        CellDisplay::Mine => '*',
        CellDisplay::FlaggedMine => 'M',
        CellDisplay::WrongFlag => '!',
    }
}

fn face(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::NotStarted | SessionStatus::InProgress => ":)",
        SessionStatus::Won => "B)",
        SessionStatus::Lost => "X(",
    }
}

/// Counter header plus the grid with column and row labels.
pub fn board(session: &GameSession, seconds: u64) -> String {
    let (width, _) = session.size();
    let mut out = String::new();

    let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
    let _ = writeln!(
        out,
        "[{}] {} [{}]",
        format_for_counter(i64::from(session.flags_remaining())),
        face(session.status()),
        format_for_counter(seconds),
    );

    out.push_str("   ");
    for x in 0..width {
        let _ = write!(out, "{:>2}", x);
    }
    for (x, y) in iter_coords(session.size()) {
        if x == 0 {
            let _ = write!(out, "\n{:>2} ", y);
        }
        let _ = write!(out, " {}", glyph(session.display_at((x, y))));
    }
    out.push('\n');
    out
}

pub fn history(history: &History) -> String {
    if history.is_empty() {
        return "No games played yet\n".to_string();
    }
    let mut out = String::new();
    for record in history.records() {
        let _ = writeln!(
            out,
            "{}  {:>5} {:>3} mines  {:?}",
            record.timestamp.date(),
            record.size,
            record.mines,
            record.result,
        );
    }
    out
}

pub fn duration(ms: u64) -> String {
    format!("{}.{:03}s", ms / 1000, ms % 1000)
}

#[cfg(test)]
mod tests {
    use tapsweeper_core::{GameResult, HistoryRecord, MineLayout, Difficulty};

    use super::*;

    #[test]
    fn counter_is_clamped() {
        assert_eq!(format_for_counter(-150), "-99");
        assert_eq!(format_for_counter(-7), "-07");
        assert_eq!(format_for_counter(0), "000");
        assert_eq!(format_for_counter(42), "042");
        assert_eq!(format_for_counter(5_000), "999");
    }

    #[test]
    fn lost_board_shows_every_mine() {
        let layout = MineLayout::from_mine_coords((5, 5), &[(0, 0), (4, 4)]).unwrap();
        let mut session = GameSession::from_layout(layout);
        session.toggle_flag((4, 4)).unwrap();
        session.reveal((1, 0), 0).unwrap();
        session.reveal((0, 0), 2_000).unwrap();

        let text = board(&session, 2);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "[001] X( [002]");
        assert_eq!(lines[1], "    0 1 2 3 4");
        assert_eq!(lines[2], " 0  X 1      ");
        assert_eq!(lines[6], " 4        1 M");
    }

    #[test]
    fn history_lists_newest_first() {
        let mut records = History::default();
        records.push(HistoryRecord::new(Difficulty::Easy.config(), GameResult::Win, 0));
        records.push(HistoryRecord::new(Difficulty::Hard.config(), GameResult::Loss, 86_400_000));

        let text = history(&records);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "1970-01-02  12x12  25 mines  Loss");
        assert_eq!(lines[1], "1970-01-01    8x8  10 mines  Win");
    }

    #[test]
    fn duration_keeps_millis() {
        assert_eq!(duration(42_075), "42.075s");
    }
}
