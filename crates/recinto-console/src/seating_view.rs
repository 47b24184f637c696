//! Drawing of the seating panel with ratatui.
//!
//! The grid is drawn back row first, so the front row ends up at the
//! bottom of the panel, closest to the presidency.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use recinto_layout::{cell_inner_width, SeatCell, SeatGrid};
use recinto_overlay::{OverlayPhase, PanelView, QuorumTone, SeatingPanel};
use recinto_poll::{Connectivity, PollStatus};
use recinto_protocol::{BallotClass, BallotValue};

/// Narrowest seat cell, in columns.
pub const MIN_CELL_WIDTH: u32 = 5;
/// Seat cells never grow past this, however wide the terminal.
pub const MAX_CELL_WIDTH: u32 = 14;

/// Short marker drawn under the seat number for a ballot.
pub fn vote_marker(value: &BallotValue) -> String {
    match value.class {
        Some(BallotClass::Positive) => "SI".to_string(),
        Some(BallotClass::Negative) => "NO".to_string(),
        Some(BallotClass::Abstention) => "ABS".to_string(),
        None => value.text.clone(),
    }
}

/// Background for a classified ballot; other values get none.
fn vote_color(class: BallotClass) -> Color {
    match class {
        BallotClass::Positive => Color::Green,
        BallotClass::Negative => Color::Red,
        BallotClass::Abstention => Color::Yellow,
    }
}

pub fn seat_style(cell: &SeatCell) -> Style {
    let mut style = match cell.vote.as_ref().and_then(|v| v.class) {
        Some(class) => Style::default().fg(Color::Black).bg(vote_color(class)),
        None => Style::default().fg(Color::White),
    };
    if cell.absent {
        style = style.add_modifier(Modifier::DIM | Modifier::CROSSED_OUT);
    }
    if cell.speaking {
        style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    if cell.test_highlight {
        style = style.add_modifier(Modifier::UNDERLINED | Modifier::ITALIC);
    }
    style
}

fn fit(text: &str, width: usize) -> String {
    let clipped: String = text.chars().take(width).collect();
    format!("{clipped:^width$}")
}

/// Width of one seat cell for a canvas `canvas_width` columns wide.
pub fn cell_width(grid: &SeatGrid, canvas_width: u16, gap: u16) -> usize {
    let max_cols = grid.layout().max_seats_in_any_row();
    cell_inner_width(u32::from(canvas_width), max_cols, u32::from(gap), MIN_CELL_WIDTH)
        .unwrap_or(MIN_CELL_WIDTH)
        .min(MAX_CELL_WIDTH) as usize
}

/// Three lines per row: seat number, occupant surname, vote marker.
pub fn grid_lines(grid: &SeatGrid, canvas_width: u16, gap: u16) -> Vec<Line<'static>> {
    let width = cell_width(grid, canvas_width, gap);
    let spacer = " ".repeat(usize::from(gap));
    let mut lines = Vec::new();

    for row in grid.draw_rows() {
        let mut numbers = Vec::new();
        let mut names = Vec::new();
        let mut marks = Vec::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                numbers.push(Span::raw(spacer.clone()));
                names.push(Span::raw(spacer.clone()));
                marks.push(Span::raw(spacer.clone()));
            }
            let style = seat_style(cell);
            let surname = cell
                .occupant
                .as_ref()
                .map(|m| m.apellido.as_str())
                .unwrap_or("");
            let mark = cell.vote.as_ref().map(vote_marker).unwrap_or_default();
            numbers.push(Span::styled(fit(&cell.seat_number.to_string(), width), style));
            names.push(Span::styled(fit(surname, width), style));
            marks.push(Span::styled(fit(&mark, width), style));
        }
        lines.push(Line::from(numbers));
        lines.push(Line::from(names));
        lines.push(Line::from(marks));
        lines.push(Line::default());
    }
    lines.pop();
    lines
}

/// Render the whole panel.
pub fn render_panel(
    frame: &mut Frame,
    area: Rect,
    panel: &SeatingPanel,
    status: &PollStatus,
    gap: u16,
) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, outer[0], panel);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
        .split(outer[1]);
    render_seats(frame, columns[0], panel, gap);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(columns[1]);
    render_vote(frame, side[0], panel);
    render_floor_queue(frame, side[1], panel);

    render_status(frame, outer[2], status);
}

fn render_header(frame: &mut Frame, area: Rect, panel: &SeatingPanel) {
    let block = Block::default()
        .title(" Recinto ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let line = match panel.header() {
        Some(header) => {
            let tone = match header.tone() {
                QuorumTone::Good => Color::Green,
                QuorumTone::Bad => Color::Red,
                QuorumTone::Neutral => Color::Gray,
            };
            Line::from(vec![
                Span::styled(
                    format!(
                        "  Sesión Nº {}  |  Concejales {} de {} totales  |  Quorum: ",
                        header.number.as_deref().unwrap_or("–"),
                        header.present,
                        header.total
                    ),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    header.delta_text(),
                    Style::default().fg(tone).add_modifier(Modifier::BOLD),
                ),
            ])
        }
        None => Line::from(Span::styled(
            "  Sin sesión abierta",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_seats(frame: &mut Frame, area: Rect, panel: &SeatingPanel, gap: u16) {
    let block = Block::default()
        .title(" Bancas ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));
    let inner_width = block.inner(area).width;

    let paragraph = match panel.view() {
        PanelView::NoSession => Paragraph::new(""),
        PanelView::Error(e) => Paragraph::new(Line::from(Span::styled(
            e.to_string(),
            Style::default().fg(Color::Red),
        )))
        .wrap(Wrap { trim: true }),
        PanelView::Seats(grid) => {
            Paragraph::new(grid_lines(grid, inner_width, gap)).alignment(Alignment::Center)
        }
    };
    frame.render_widget(paragraph.block(block), area);
}

fn render_vote(frame: &mut Frame, area: Rect, panel: &SeatingPanel) {
    let block = Block::default()
        .title(" Votación ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightBlue));

    let votes = panel.votes();
    let mut lines = vec![match votes.phase() {
        OverlayPhase::Idle => Line::from(Span::styled(
            " Sin votación",
            Style::default().fg(Color::DarkGray),
        )),
        OverlayPhase::Live { vote } => Line::from(Span::styled(
            format!(" En curso · Nº {}", vote.key),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        OverlayPhase::Cooldown { vote, deadline } => Line::from(Span::styled(
            format!(
                " {} · Nº {} hasta {}",
                votes
                    .vote_state()
                    .map(|s| s.label())
                    .filter(|l| !l.is_empty())
                    .unwrap_or("Cerrada"),
                vote.key,
                deadline.with_timezone(&Local).format("%H:%M:%S")
            ),
            Style::default().fg(Color::Magenta),
        )),
    }];

    if let Some(tally) = votes.tally() {
        let count = |label: &str, n: usize, color: Color| {
            Line::from(vec![
                Span::styled(format!(" {label:<13}"), Style::default().fg(Color::Gray)),
                Span::styled(n.to_string(), Style::default().fg(color)),
            ])
        };
        lines.push(count("Afirmativos", tally.positive, Color::Green));
        lines.push(count("Negativos", tally.negative, Color::Red));
        lines.push(count("Abstenciones", tally.abstention, Color::Yellow));
        if tally.other > 0 {
            lines.push(count("Otros", tally.other, Color::Gray));
        }
        lines.push(count("Total", tally.total, Color::White));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_floor_queue(frame: &mut Frame, area: Rect, panel: &SeatingPanel) {
    let block = Block::default()
        .title(" Pedidos de palabra ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightCyan));

    let lines: Vec<Line> = panel
        .floor_queue()
        .iter()
        .enumerate()
        .map(|(i, label)| Line::from(format!(" {}. {label}", i + 1)))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_status(frame: &mut Frame, area: Rect, status: &PollStatus) {
    let color = match status.connectivity {
        Connectivity::Connecting => Color::Yellow,
        Connectivity::Connected => Color::Green,
        Connectivity::Disconnected => Color::Red,
    };
    let mut spans = vec![
        Span::styled(format!(" {} ", status.connectivity), Style::default().fg(color)),
        Span::styled(" q: salir ", Style::default().fg(Color::DarkGray)),
    ];
    if let Some(error) = &status.last_error {
        spans.push(Span::styled(
            format!(" {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use recinto_layout::{resolve, Row, SeatAssignment, SeatLayoutSpec};

    fn grid() -> SeatGrid {
        let layout = resolve(
            &SeatLayoutSpec::from_rows([
                Row { row_index: 1, seat_count: 3 },
                Row { row_index: 2, seat_count: 2 },
            ]),
            5,
        )
        .unwrap();
        SeatGrid::build(layout.clone(), &SeatAssignment::build(&layout, &[]))
    }

    #[test]
    fn test_markers() {
        assert_eq!(vote_marker(&BallotValue::from_wire("Positivo")), "SI");
        assert_eq!(vote_marker(&BallotValue::from_wire("negativo")), "NO");
        assert_eq!(vote_marker(&BallotValue::from_wire("Abstención")), "ABS");
        assert_eq!(vote_marker(&BallotValue::from_wire("Ausente")), "Ausente");
    }

    #[test]
    fn test_unclassified_ballot_has_plain_style() {
        let mut grid = grid();
        grid.cell_mut(1).unwrap().vote = Some(BallotValue::from_wire("Ausente"));
        grid.cell_mut(2).unwrap().vote = Some(BallotValue::from_wire("Negativo"));

        let plain = seat_style(grid.cell(1).unwrap());
        assert_eq!(plain, seat_style(grid.cell(3).unwrap()));
        assert_eq!(plain.bg, None);
        assert_eq!(seat_style(grid.cell(2).unwrap()).bg, Some(Color::Red));
    }

    #[test]
    fn test_cell_width_is_clamped() {
        let grid = grid();
        assert_eq!(cell_width(&grid, 0, 1), MIN_CELL_WIDTH as usize);
        assert_eq!(cell_width(&grid, 20, 1), 5);
        assert_eq!(cell_width(&grid, 300, 1), MAX_CELL_WIDTH as usize);
    }

    #[test]
    fn test_back_row_is_drawn_first() {
        let lines = grid_lines(&grid(), 40, 1);
        // Two rows of three lines, separated by one blank line.
        assert_eq!(lines.len(), 7);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(first.contains('4') && first.contains('5'));
        assert!(!first.contains('1'));
    }

    #[test]
    fn test_speaking_and_absent_styles() {
        let mut grid = grid();
        let cell = grid.cell_mut(2).unwrap();
        cell.speaking = true;
        cell.absent = true;
        let style = seat_style(grid.cell(2).unwrap());
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(style.add_modifier.contains(Modifier::DIM));
    }
}
