/// Reduces a record stream to the latest observation per aircraft.
use crate::domain::AircraftState;
use chrono::Duration;
use std::collections::HashMap;

/// Latest observation per icao24 among those no older than `window` before the
/// newest observation in `states`.
///
/// Identical timestamps for one aircraft resolve to the entry appearing later
/// in the input. Survivors keep their relative input order.
pub fn select_window(states: &[AircraftState], window: Duration) -> Vec<AircraftState> {
    let Some(latest) = states.iter().map(|s| s.observed_at).max() else {
        return Vec::new();
    };
    let cutoff = latest - window;

    let mut winners: HashMap<&str, usize> = HashMap::new();
    for (idx, state) in states.iter().enumerate() {
        if state.observed_at < cutoff {
            continue;
        }
        winners
            .entry(state.icao24.as_str())
            .and_modify(|current| {
                if state.observed_at >= states[*current].observed_at {
                    *current = idx;
                }
            })
            .or_insert(idx);
    }

    let mut indices: Vec<usize> = winners.into_values().collect();
    indices.sort_unstable();
    indices.into_iter().map(|idx| states[idx].clone()).collect()
}
