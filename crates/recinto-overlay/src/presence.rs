//! Presence and speaker marks, repainted unconditionally every tick.
//!
//! The three marks a seat can carry (absent, speaking, test highlight)
//! are independent of each other and of the vote mark.

use std::collections::HashMap;

use recinto_layout::SeatGrid;
use recinto_protocol::{Member, SessionSnapshot};

/// Index the current roster by declared seat; later entries win.
pub fn roster_by_seat(roster: &[Member]) -> HashMap<u32, &Member> {
    roster
        .iter()
        .filter_map(|m| m.banca.map(|seat| (seat, m)))
        .collect()
}

/// Paint absence and the single speaking seat onto every cell.
pub fn apply(grid: &mut SeatGrid, roster: &HashMap<u32, &Member>, speaking_seat: Option<u32>) {
    for cell in grid.cells_mut() {
        let occupant = roster.get(&cell.seat_number);
        cell.absent = occupant.is_some_and(|m| m.is_absent());
        cell.test_highlight = occupant.is_some_and(|m| m.mostrar_test == Some(true));
        cell.speaking = speaking_seat == Some(cell.seat_number);
    }
}

pub fn apply_session(grid: &mut SeatGrid, session: &SessionSnapshot) {
    let roster = roster_by_seat(&session.concejales);
    apply(grid, &roster, session.speaking_seat());
}
