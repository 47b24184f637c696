//! Seat layout resolution.
//!
//! Numbering rule: seat 1 is the leftmost seat of the front row (the row
//! with the smallest index). Seats are numbered left to right; when a row
//! is full numbering continues in the next row back.
//!
//! Numbering order and drawing order are separate. A top-down chart draws
//! the back row first, so [`ResolvedLayout::draw_rows`] walks the rows back
//! to front while each row keeps the seat numbers assigned front to back.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use recinto_protocol::lenient::as_integer;
use recinto_protocol::LAYOUT_ROWS_KEY;

use crate::LayoutError;

/// One row of the seating chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Physical row index; smaller is closer to the front.
    pub row_index: i64,
    /// Number of seats, always > 0.
    pub seat_count: u32,
}

/// The parsed row list, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeatLayoutSpec {
    pub rows: Vec<Row>,
}

impl SeatLayoutSpec {
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    /// Parse a raw description such as `{"filas":[{"fila":1,"columnas":3}]}`.
    ///
    /// Rows whose index is not an integer, or whose seat count is not a
    /// positive integer, are dropped here. An empty result is not an error
    /// yet; [`resolve`] reports it as [`LayoutError::Empty`].
    pub fn parse(raw: &str) -> Result<Self, LayoutError> {
        let parsed: Value = serde_json::from_str(raw.trim())
            .map_err(|e| LayoutError::Malformed(e.to_string()))?;

        let filas = parsed
            .get(LAYOUT_ROWS_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| LayoutError::Malformed(format!("missing `{LAYOUT_ROWS_KEY}` array")))?;

        let rows = filas
            .iter()
            .filter_map(|item| {
                let row_index = as_integer(item.get("fila")?)?;
                let seat_count = as_integer(item.get("columnas")?)?;
                let seat_count = u32::try_from(seat_count).ok().filter(|n| *n > 0)?;
                Some(Row {
                    row_index,
                    seat_count,
                })
            })
            .collect();

        Ok(Self { rows })
    }
}

/// Where a numbered seat sits in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatPlacement {
    pub seat_number: u32,
    pub row_index: i64,
    /// Position of the row counted from the front (0 = front row).
    pub row_position: usize,
    /// Column within the row, 0 = leftmost.
    pub column: u32,
}

/// A row in drawing order together with the seat numbers it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRow {
    pub row: Row,
    pub first_seat: u32,
}

impl DrawRow {
    pub fn seats(&self) -> RangeInclusive<u32> {
        self.first_seat..=self.first_seat + self.row.seat_count - 1
    }
}

/// A validated layout whose seat count matches the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    rows_ascending: Vec<Row>,
    /// `first_seat[i]` is the first seat number of `rows_ascending[i]`.
    first_seat: Vec<u32>,
    max_seats_in_any_row: u32,
    total_seats: u32,
}

impl ResolvedLayout {
    pub fn rows_ascending(&self) -> &[Row] {
        &self.rows_ascending
    }

    pub fn max_seats_in_any_row(&self) -> u32 {
        self.max_seats_in_any_row
    }

    pub fn total_seats(&self) -> u32 {
        self.total_seats
    }

    /// Every seat in numbering order (1..=total).
    pub fn placements(&self) -> impl Iterator<Item = SeatPlacement> + '_ {
        self.rows_ascending
            .iter()
            .zip(&self.first_seat)
            .enumerate()
            .flat_map(|(row_position, (row, first))| {
                (0..row.seat_count).map(move |column| SeatPlacement {
                    seat_number: first + column,
                    row_index: row.row_index,
                    row_position,
                    column,
                })
            })
    }

    /// Rows back to front, for top-down drawing.
    pub fn draw_rows(&self) -> impl Iterator<Item = DrawRow> + '_ {
        self.rows_ascending
            .iter()
            .zip(&self.first_seat)
            .rev()
            .map(|(row, first)| DrawRow {
                row: *row,
                first_seat: *first,
            })
    }
}

/// Validate a layout against the roster and number its seats.
pub fn resolve(spec: &SeatLayoutSpec, roster_size: usize) -> Result<ResolvedLayout, LayoutError> {
    let mut rows: Vec<Row> = spec.rows.iter().copied().filter(|r| r.seat_count > 0).collect();
    if rows.is_empty() {
        return Err(LayoutError::Empty);
    }

    // Stable: rows sharing an index keep their input order.
    rows.sort_by_key(|r| r.row_index);

    let seats: u64 = rows.iter().map(|r| u64::from(r.seat_count)).sum();
    if seats != roster_size as u64 {
        return Err(LayoutError::SeatCountMismatch {
            seats,
            members: roster_size,
        });
    }
    let total_seats = u32::try_from(seats).map_err(|_| LayoutError::SeatCountMismatch {
        seats,
        members: roster_size,
    })?;

    let mut first_seat = Vec::with_capacity(rows.len());
    let mut next = 1u32;
    for row in &rows {
        first_seat.push(next);
        next += row.seat_count;
    }

    let max_seats_in_any_row = rows.iter().map(|r| r.seat_count).max().unwrap_or(0);

    Ok(ResolvedLayout {
        rows_ascending: rows,
        first_seat,
        max_seats_in_any_row,
        total_seats,
    })
}

/// Parse and resolve in one step.
pub fn resolve_description(raw: &str, roster_size: usize) -> Result<ResolvedLayout, LayoutError> {
    let spec = SeatLayoutSpec::parse(raw)?;
    resolve(&spec, roster_size)
}

/// Uniform inner width of a seat cell, sized from the widest row.
///
/// Returns `None` when the canvas has no width yet or there are no columns.
pub fn cell_inner_width(canvas_width: u32, max_cols: u32, gap: u32, min_width: u32) -> Option<u32> {
    if canvas_width == 0 || max_cols == 0 {
        return None;
    }
    let total_gaps = f64::from((max_cols - 1) * gap);
    let cell = (f64::from(canvas_width) - total_gaps) / f64::from(max_cols);
    let inner = (cell * 0.92).floor();
    Some((inner.max(0.0) as u32).max(min_width))
}
