use std::collections::BTreeMap;

use recinto_protocol::{BallotValue, Member, SEAT_IMAGE_PREFIX};

use crate::{ResolvedLayout, SeatAssignment};

/// Render-agnostic state of one seat.
///
/// Renderers read cells; only the overlays write the mark fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatCell {
    pub seat_number: u32,
    pub row_index: i64,
    pub column: u32,
    /// Visual asset, addressed by seat number.
    pub image_path: String,
    pub occupant: Option<Member>,
    /// Ballot shown on the seat; `None` renders blank.
    pub vote: Option<BallotValue>,
    pub absent: bool,
    pub speaking: bool,
    pub test_highlight: bool,
}

impl SeatCell {
    fn new(seat_number: u32, row_index: i64, column: u32, occupant: Option<Member>) -> Self {
        Self {
            seat_number,
            row_index,
            column,
            image_path: format!("{SEAT_IMAGE_PREFIX}/{seat_number}.png"),
            occupant,
            vote: None,
            absent: false,
            speaking: false,
            test_highlight: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.vote.is_none()
    }
}

/// Seat number → cell, the handle set the overlays paint on.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatGrid {
    layout: ResolvedLayout,
    cells: BTreeMap<u32, SeatCell>,
}

impl SeatGrid {
    pub fn build(layout: ResolvedLayout, assignment: &SeatAssignment) -> Self {
        let cells = layout
            .placements()
            .map(|p| {
                let occupant = assignment.occupant(p.seat_number).cloned();
                (
                    p.seat_number,
                    SeatCell::new(p.seat_number, p.row_index, p.column, occupant),
                )
            })
            .collect();
        Self { layout, cells }
    }

    pub fn layout(&self) -> &ResolvedLayout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, seat: u32) -> Option<&SeatCell> {
        self.cells.get(&seat)
    }

    pub fn cell_mut(&mut self, seat: u32) -> Option<&mut SeatCell> {
        self.cells.get_mut(&seat)
    }

    /// Cells in seat-number order.
    pub fn cells(&self) -> impl Iterator<Item = &SeatCell> {
        self.cells.values()
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut SeatCell> {
        self.cells.values_mut()
    }

    /// Blank every seat's vote mark.
    pub fn clear_vote_marks(&mut self) {
        for cell in self.cells.values_mut() {
            cell.vote = None;
        }
    }

    /// Drop every overlay mark, as if the cells had just been built.
    pub fn reset_marks(&mut self) {
        for cell in self.cells.values_mut() {
            cell.vote = None;
            cell.absent = false;
            cell.speaking = false;
            cell.test_highlight = false;
        }
    }

    /// Rows of cells back to front, each row left to right.
    pub fn draw_rows(&self) -> Vec<Vec<&SeatCell>> {
        self.layout
            .draw_rows()
            .map(|row| row.seats().filter_map(|n| self.cells.get(&n)).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{resolve, Row, SeatLayoutSpec};

    fn grid() -> SeatGrid {
        let layout = resolve(
            &SeatLayoutSpec::from_rows([
                Row { row_index: 2, seat_count: 2 },
                Row { row_index: 1, seat_count: 3 },
            ]),
            5,
        )
        .unwrap();
        let assignment = SeatAssignment::build(&layout, &[]);
        SeatGrid::build(layout, &assignment)
    }

    #[test]
    fn test_cells_cover_every_seat() {
        let grid = grid();
        let seats: Vec<u32> = grid.cells().map(|c| c.seat_number).collect();
        assert_eq!(seats, vec![1, 2, 3, 4, 5]);
        assert_eq!(grid.cell(4).unwrap().image_path, "/bancas/4.png");
        assert!(grid.cells().all(SeatCell::is_blank));
    }

    #[test]
    fn test_draw_rows_are_top_down() {
        let grid = grid();
        let rows: Vec<Vec<u32>> = grid
            .draw_rows()
            .iter()
            .map(|r| r.iter().map(|c| c.seat_number).collect())
            .collect();
        assert_eq!(rows, vec![vec![4, 5], vec![1, 2, 3]]);
    }

    #[test]
    fn test_reset_marks() {
        let mut grid = grid();
        for cell in grid.cells_mut() {
            cell.vote = Some(BallotValue::from_wire("Positivo"));
            cell.absent = true;
            cell.speaking = true;
        }
        grid.reset_marks();
        assert!(grid.cells().all(|c| c.is_blank() && !c.absent && !c.speaking));
    }
}
