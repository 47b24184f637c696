use std::collections::BTreeSet;

use recinto_layout::*;
use recinto_protocol::{Member, SessionIdentity};

fn row(row_index: i64, seat_count: u32) -> Row {
    Row { row_index, seat_count }
}

fn roster(n: u32) -> Vec<Member> {
    (1..=n)
        .map(|banca| Member {
            apellido: format!("M{banca}"),
            banca: Some(banca),
            presente: Some(true),
            ..Default::default()
        })
        .collect()
}

const FIVE_SEATS: &str = r#"{"filas":[{"fila":1,"columnas":3},{"fila":2,"columnas":2}]}"#;

#[test]
fn test_numbering_is_contiguous_for_valid_layouts() {
    let layouts = [
        vec![row(1, 1)],
        vec![row(1, 3), row(2, 2)],
        vec![row(5, 4), row(2, 7), row(9, 1), row(3, 3)],
        vec![row(-1, 2), row(0, 2), row(10, 6)],
    ];

    for rows in layouts {
        let total: u32 = rows.iter().map(|r| r.seat_count).sum();
        let layout = resolve(&SeatLayoutSpec::from_rows(rows), total as usize).unwrap();

        let seats: Vec<u32> = layout.placements().map(|p| p.seat_number).collect();
        let unique: BTreeSet<u32> = seats.iter().copied().collect();
        assert_eq!(seats.len(), unique.len(), "no duplicate seat numbers");
        assert_eq!(unique, (1..=total).collect::<BTreeSet<_>>(), "seats cover 1..=total");
    }
}

#[test]
fn test_numbering_ignores_input_order() {
    let ordered = resolve(&SeatLayoutSpec::from_rows([row(1, 3), row(2, 2), row(3, 4)]), 9).unwrap();
    let shuffled = resolve(&SeatLayoutSpec::from_rows([row(3, 4), row(1, 3), row(2, 2)]), 9).unwrap();

    assert_eq!(ordered, shuffled);
    let a: Vec<_> = ordered.placements().collect();
    let b: Vec<_> = shuffled.placements().collect();
    assert_eq!(a, b);
}

#[test]
fn test_three_plus_two_layout() {
    let layout = resolve_description(FIVE_SEATS, 5).unwrap();
    for p in layout.placements() {
        let expected_row = if p.seat_number <= 3 { 1 } else { 2 };
        assert_eq!(p.row_index, expected_row, "seat {} row", p.seat_number);
    }
}

#[test]
fn test_three_plus_two_layout_with_four_members() {
    assert!(matches!(
        resolve_description(FIVE_SEATS, 4),
        Err(LayoutError::SeatCountMismatch { seats: 5, members: 4 })
    ));
}

#[test]
fn test_cache_reuses_identical_input() {
    let mut cache = SeatGridCache::new();
    let session = SessionIdentity::new("1", "2024-05-02T10:00:00");
    let members = roster(5);

    let first = cache.maybe_rebuild(&session, FIVE_SEATS, &members).unwrap();
    let layout_after_first = cache.layout().cloned().unwrap();
    let second = cache.maybe_rebuild(&session, FIVE_SEATS, &members).unwrap();

    assert!(first.rebuilt);
    assert!(!second.rebuilt);
    assert_eq!(cache.layout().unwrap(), &layout_after_first);
}

#[test]
fn test_cache_keeps_marks_when_reused() {
    let mut cache = SeatGridCache::new();
    let session = SessionIdentity::new("1", "t0");
    let members = roster(5);

    cache.maybe_rebuild(&session, FIVE_SEATS, &members).unwrap();
    cache.grid_mut().unwrap().cell_mut(2).unwrap().speaking = true;
    cache.maybe_rebuild(&session, FIVE_SEATS, &members).unwrap();

    assert!(cache.grid().unwrap().cell(2).unwrap().speaking);
}

#[test]
fn test_description_change_rebuilds() {
    let mut cache = SeatGridCache::new();
    let session = SessionIdentity::new("1", "t0");
    let members = roster(5);

    cache.maybe_rebuild(&session, FIVE_SEATS, &members).unwrap();
    cache.grid_mut().unwrap().cell_mut(2).unwrap().speaking = true;

    let single_row = r#"{"filas":[{"fila":1,"columnas":5}]}"#;
    let outcome = cache.maybe_rebuild(&session, single_row, &members).unwrap();

    assert!(outcome.rebuilt);
    assert_eq!(cache.layout().unwrap().rows_ascending().len(), 1);
    assert!(!cache.grid().unwrap().cell(2).unwrap().speaking);
}

#[test]
fn test_session_change_resets_even_with_same_description() {
    let mut cache = SeatGridCache::new();
    let members = roster(5);

    cache
        .maybe_rebuild(&SessionIdentity::new("1", "t0"), FIVE_SEATS, &members)
        .unwrap();
    let next = SessionIdentity::new("1", "t1");
    let outcome = cache.maybe_rebuild(&next, FIVE_SEATS, &members).unwrap();

    assert!(outcome.rebuilt);
    assert_eq!(cache.session(), Some(&next));
}

#[test]
fn test_failure_is_explicit_and_retried() {
    let mut cache = SeatGridCache::new();
    let session = SessionIdentity::new("1", "t0");

    let err = cache.maybe_rebuild(&session, FIVE_SEATS, &roster(4)).unwrap_err();
    assert!(matches!(err, LayoutError::SeatCountMismatch { .. }));
    assert!(matches!(cache.state(), GridState::Failed(_)));
    assert!(cache.grid().is_none());

    // Same description, same session: still retried, still failing.
    assert!(cache.maybe_rebuild(&session, FIVE_SEATS, &roster(4)).is_err());

    // Roster catches up: the same description now resolves.
    let outcome = cache.maybe_rebuild(&session, FIVE_SEATS, &roster(5)).unwrap();
    assert!(outcome.rebuilt);
    assert!(cache.error().is_none());
    assert_eq!(cache.grid().unwrap().len(), 5);
}

#[test]
fn test_reset_returns_to_empty() {
    let mut cache = SeatGridCache::new();
    cache
        .maybe_rebuild(&SessionIdentity::new("1", "t0"), FIVE_SEATS, &roster(5))
        .unwrap();
    cache.reset();
    assert_eq!(cache.state(), &GridState::Empty);
    assert!(cache.session().is_none());
}
