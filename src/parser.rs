//! Text layout parsing.
//!
//! A layout is two grid drawings separated by a divider row of `*`: the
//! starting board above, the winning position below. `#` is a wall, `.` an
//! open cell, and any alphanumeric glyph marks a cell of the piece with that
//! label. `//` starts a comment. Each section is normalized independently,
//! so the two drawings only have to agree in shape, not in indentation
//! within the file.

use std::collections::BTreeMap;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::board::{Board, WinningPosition};
use crate::error::Error;
use crate::geometry::Tile;
use crate::pieces::Omino;

/// One grid drawing: its open cells and its piece cells grouped by glyph.
/// The glyph map is ordered so piece indices are deterministic.
#[derive(Default)]
struct Section {
    open: Vec<Tile>,
    pieces: BTreeMap<char, Vec<Tile>>,
}

/// Strips the trailing comment and all whitespace; cell columns are counted
/// over the remaining characters.
fn clean(line: &str) -> String {
    let body = match line.find("//") {
        Some(at) => &line[..at],
        None => line,
    };
    body.chars().filter(|ch| !ch.is_whitespace()).collect()
}

/// Bottommost cell of the leftmost occupied column, the anchor every drawing
/// and shape is normalized against.
fn min_tile(cells: &[Tile]) -> Tile {
    cells.iter().min().copied().unwrap_or(Tile::ZERO)
}

fn normalize(cells: &[Tile]) -> FxHashSet<Tile> {
    let min = min_tile(cells);
    cells.iter().map(|&cell| cell - min).collect()
}

/// Parses a layout into the starting board and its winning position.
///
/// Pieces are indexed in glyph order. A piece named in the winning section
/// receives an identity token, so the goal tracks that specific piece while
/// unnamed same-shaped pieces stay interchangeable. All diagnostics carry
/// the offending line number where one exists.
pub fn parse_layout(text: &str) -> Result<(Board, WinningPosition), Error> {
    let mut board_section = Section::default();
    let mut win_section: Option<Section> = None;
    let mut y = 0i32;

    for (number, raw) in text.lines().enumerate() {
        let number = number + 1;
        let line = clean(raw);
        if line.is_empty() {
            continue;
        }
        if line.starts_with('*') {
            if line.chars().any(|ch| ch != '*') {
                return Err(Error::Parse(format!(
                    "line {number}: malformed section divider {line:?}"
                )));
            }
            if win_section.is_some() {
                return Err(Error::Parse(format!(
                    "line {number}: more than one section divider"
                )));
            }
            win_section = Some(Section::default());
            continue;
        }
        let section = match win_section.as_mut() {
            Some(section) => section,
            None => &mut board_section,
        };
        for (x, ch) in line.chars().enumerate() {
            let cell = Tile::new(x as i32, y);
            match ch {
                '#' => {}
                '.' => section.open.push(cell),
                glyph if glyph.is_ascii_alphanumeric() => {
                    section.open.push(cell);
                    section.pieces.entry(glyph).or_default().push(cell);
                }
                other => {
                    return Err(Error::Parse(format!(
                        "line {number}: unexpected character {other:?}"
                    )))
                }
            }
        }
        y -= 1;
    }

    let win = win_section
        .ok_or_else(|| Error::Parse("missing the winning-position section".to_owned()))?;
    if board_section.open.is_empty() {
        return Err(Error::Parse("the board has no open cells".to_owned()));
    }
    if win.pieces.is_empty() {
        return Err(Error::Parse(
            "the winning position names no piece".to_owned(),
        ));
    }
    let cells = normalize(&board_section.open);
    if cells != normalize(&win.open) {
        return Err(Error::Parse(
            "the winning section describes a different layout than the board".to_owned(),
        ));
    }
    let board_min = min_tile(&board_section.open);
    let win_min = min_tile(&win.open);

    let layout = Rc::new(cells);
    let mut board = Board::with_layout(layout.clone());
    let mut goal = WinningPosition::with_layout(layout);

    let mut by_glyph: BTreeMap<char, Rc<Omino>> = BTreeMap::new();
    let mut next_id = 0u32;
    for (&glyph, cells) in &board_section.pieces {
        let anchor = min_tile(cells);
        let mut piece = Omino::new(cells.iter().map(|&cell| cell - anchor))?;
        if win.pieces.contains_key(&glyph) {
            piece.set_unique_id(next_id);
            next_id += 1;
        }
        let piece = Rc::new(piece);
        if !board.place(piece.clone(), anchor - board_min) {
            return Err(Error::Parse(format!(
                "piece {glyph:?} cannot be placed on the board"
            )));
        }
        by_glyph.insert(glyph, piece);
    }

    for (glyph, cells) in &win.pieces {
        let Some(piece) = by_glyph.get(glyph) else {
            return Err(Error::Parse(format!(
                "winning piece {glyph:?} is not on the board"
            )));
        };
        let anchor = min_tile(cells);
        let same = cells.len() == piece.num_cells()
            && cells.iter().all(|&cell| piece.contains(cell - anchor));
        if !same {
            return Err(Error::Parse(format!(
                "winning piece {glyph:?} has a different shape than on the board"
            )));
        }
        if !goal.place(piece.clone(), anchor - win_min) {
            return Err(Error::Parse(format!(
                "winning piece {glyph:?} does not fit its required position"
            )));
        }
    }

    Ok((board, goal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Direction;

    const CORNER: &str = "\
// Two dominoes guard the lower-right corner; walk the runner C into it.
.BBC
.AA#
****
....
..C#
";

    #[test]
    fn test_parses_the_corner_layout() {
        let (board, goal) = parse_layout(CORNER).unwrap();
        assert_eq!(board.num_pieces(), 3);
        assert_eq!(board.layout().len(), 7);

        // glyph order: A, B, C
        assert_eq!(board.position(0), Some(Tile::new(1, 0)));
        assert_eq!(board.position(1), Some(Tile::new(1, 1)));
        assert_eq!(board.position(2), Some(Tile::new(3, 1)));
        assert_eq!(board.piece(0).unwrap().num_cells(), 2);
        assert_eq!(board.piece(2).unwrap().num_cells(), 1);

        // only the goal piece carries an identity token
        assert_eq!(board.piece(0).unwrap().unique_id(), None);
        assert_eq!(board.piece(1).unwrap().unique_id(), None);
        assert_eq!(board.piece(2).unwrap().unique_id(), Some(0));

        assert!(!goal.is_met_by(&board));
    }

    #[test]
    fn test_goal_matches_once_the_piece_arrives() {
        let text = "\
A.
**
.A
";
        let (mut board, goal) = parse_layout(text).unwrap();
        assert!(board.shift(0, Direction::Right).unwrap());
        assert!(goal.is_met_by(&board));
    }

    #[test]
    fn test_comments_whitespace_and_blank_lines_are_ignored() {
        let plain = "A.\n**\n.A\n";
        let noisy = "// header\n\nA . // start\n\n****\n . A // goal\n";
        let (a, _) = parse_layout(plain).unwrap();
        let (b, _) = parse_layout(noisy).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_divider_is_rejected() {
        let result = parse_layout("A.\n.A\n");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_second_divider_is_rejected() {
        let result = parse_layout("A.\n**\n.A\n**\nA.\n");
        let Err(Error::Parse(message)) = result else {
            panic!("expected a parse error");
        };
        assert!(message.contains("line 4"), "got {message:?}");
    }

    #[test]
    fn test_unexpected_character_reports_its_line() {
        let result = parse_layout("A.\n.?\n**\n.A\n..\n");
        let Err(Error::Parse(message)) = result else {
            panic!("expected a parse error");
        };
        assert!(message.contains("line 2"), "got {message:?}");
        assert!(message.contains("'?'"), "got {message:?}");
    }

    #[test]
    fn test_winning_piece_must_exist_on_the_board() {
        let result = parse_layout("A.\n**\n.B\n");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_winning_piece_shape_must_match() {
        // horizontal domino on the board, vertical in the goal
        let text = "\
AA
..
**
A.
A.
";
        let result = parse_layout(text);
        let Err(Error::Parse(message)) = result else {
            panic!("expected a parse error");
        };
        assert!(message.contains("different shape"), "got {message:?}");
    }

    #[test]
    fn test_winning_section_must_name_a_piece() {
        let result = parse_layout("A.\n**\n..\n");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_sections_must_describe_the_same_layout() {
        let result = parse_layout("A..\n**\n.A\n");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_sections_align_after_normalization() {
        // the goal drawing sits lower in the file; normalization lines the
        // two sections up anyway
        let text = "\
#A.
#..
***

#..
#.A
";
        let (mut board, goal) = parse_layout(text).unwrap();
        assert_eq!(board.layout().len(), 4);
        assert!(board.shift(0, Direction::Right).unwrap());
        assert!(board.shift(0, Direction::Down).unwrap());
        assert!(goal.is_met_by(&board));
    }
}
