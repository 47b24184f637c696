use std::collections::BTreeMap;

use recinto_protocol::Member;

use crate::ResolvedLayout;

/// Seat number → occupant, built once per resolved layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeatAssignment {
    seats: BTreeMap<u32, Option<Member>>,
}

impl SeatAssignment {
    /// Place each member on the seat they declare.
    ///
    /// Every seat of the layout gets an entry. Members declaring no seat,
    /// or a seat outside the layout, are left out; when two members claim
    /// the same seat the later roster entry wins.
    pub fn build(layout: &ResolvedLayout, roster: &[Member]) -> Self {
        let mut seats: BTreeMap<u32, Option<Member>> =
            (1..=layout.total_seats()).map(|n| (n, None)).collect();

        for member in roster {
            let Some(seat) = member.banca else {
                tracing::debug!(apellido = %member.apellido, "Member declares no seat");
                continue;
            };
            match seats.get_mut(&seat) {
                Some(slot) => *slot = Some(member.clone()),
                None => tracing::debug!(
                    seat,
                    total = layout.total_seats(),
                    "Member seat outside the layout"
                ),
            }
        }

        Self { seats }
    }

    pub fn occupant(&self, seat: u32) -> Option<&Member> {
        self.seats.get(&seat).and_then(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}
