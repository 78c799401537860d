//! Nearest-color matching with one-time tile consumption.

use super::color::Color;
use super::index::WorkingIndex;

/// Find the tile closest to `target`, remove it from `working` and return
/// its identifier.
///
/// Entries are scanned in identifier order and only a strictly smaller
/// distance replaces the current best, so on a tie the lexicographically
/// smallest identifier wins. Returns `None` once the index is exhausted.
pub fn find_nearest(target: &Color, working: &mut WorkingIndex) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;

    for (id, color) in working.iter() {
        let dist = target.distance(&color);
        if best.map_or(true, |(_, smallest)| dist < smallest) {
            best = Some((id, dist));
        }
    }

    let id = best?.0.to_string();
    working.remove(&id);
    Some(id)
}
