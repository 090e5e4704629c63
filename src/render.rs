//! Plain-text board rendering.

use crate::board::Board;
use crate::geometry::Tile;

/// Piece glyphs by index; boards with more pieces than glyphs wrap around.
const GLYPHS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// The glyph a piece index renders as.
pub fn glyph(index: usize) -> char {
    GLYPHS[index % GLYPHS.len()] as char
}

/// Draws the board's bounding box, top row first: `#` for walls, `.` for
/// open cells, and each piece's cells under its index glyph. Rows are joined
/// with newlines without a trailing one.
pub fn render(board: &Board) -> String {
    if board.layout().is_empty() {
        return String::new();
    }
    let lo = board.lower_left_bound();
    let hi = board.upper_right_bound();
    let width = (hi.x - lo.x + 1) as usize;
    let height = (hi.y - lo.y + 1) as usize;

    let mut rows = vec![vec![b'#'; width]; height];
    let mut paint = |cell: Tile, glyph: u8| {
        let row = (hi.y - cell.y) as usize;
        let col = (cell.x - lo.x) as usize;
        rows[row][col] = glyph;
    };
    for &cell in board.layout() {
        paint(cell, b'.');
    }
    for index in 0..board.num_pieces() {
        let (Some(piece), Some(origin)) = (board.piece(index), board.position(index)) else {
            continue;
        };
        let label = glyph(index) as u8;
        for cell in piece.cells() {
            paint(cell + origin, label);
        }
    }

    let lines: Vec<String> = rows
        .into_iter()
        .map(|row| String::from_utf8_lossy(&row).into_owned())
        .collect();
    lines.join("\n")
}
