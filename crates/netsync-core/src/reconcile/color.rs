// ── Role color allocation ──

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Pastel palette roles are colored from. Two entries repeat; the
/// allocator works on the distinct set.
pub const PALETTE: [&str; 16] = [
    "FF6F61", "FFB07C", "FFD700", "FFEF96", "BEEB9F", "A7D8AD", "77D8D8", "AEC6CF", "B39EB5",
    "D7B9D5", "FFC3A0", "FFABAB", "FFC3A0", "FF677D", "FFD3B5", "FFD3B5",
];

/// Hands out palette colors without repeats until the palette is
/// exhausted, then starts over from the full palette.
pub struct ColorAllocator {
    available: Vec<&'static str>,
    rng: StdRng,
}

impl Default for ColorAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorAllocator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic order, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            available: distinct_palette(),
            rng,
        }
    }

    /// Colors left before the next reset.
    pub fn remaining(&self) -> usize {
        self.available.len()
    }

    /// A lowercase six-digit hex color.
    pub fn allocate(&mut self) -> String {
        if self.available.is_empty() {
            tracing::debug!("color palette exhausted, starting over");
            self.available = distinct_palette();
        }
        let index = self.rng.random_range(0..self.available.len());
        self.available.swap_remove(index).to_ascii_lowercase()
    }
}

fn distinct_palette() -> Vec<&'static str> {
    let mut colors = Vec::with_capacity(PALETTE.len());
    for color in PALETTE {
        if !colors.contains(&color) {
            colors.push(color);
        }
    }
    colors
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn palette_has_fourteen_distinct_colors() {
        assert_eq!(distinct_palette().len(), 14);
        assert_eq!(ColorAllocator::seeded(1).remaining(), 14);
    }

    #[test]
    fn no_repeats_until_exhausted() {
        let mut colors = ColorAllocator::seeded(7);
        let first_round: HashSet<String> = (0..14).map(|_| colors.allocate()).collect();
        assert_eq!(first_round.len(), 14);
        assert_eq!(colors.remaining(), 0);

        let after_reset = colors.allocate();
        assert!(first_round.contains(&after_reset));
        assert_eq!(colors.remaining(), 13);
    }

    #[test]
    fn colors_are_lowercase_palette_entries() {
        let mut colors = ColorAllocator::seeded(3);
        for _ in 0..30 {
            let color = colors.allocate();
            assert_eq!(color.len(), 6);
            assert_eq!(color, color.to_ascii_lowercase());
            assert!(PALETTE.iter().any(|p| p.eq_ignore_ascii_case(&color)));
        }
    }

    #[test]
    fn seeded_allocators_agree() {
        let mut a = ColorAllocator::seeded(42);
        let mut b = ColorAllocator::seeded(42);
        for _ in 0..20 {
            assert_eq!(a.allocate(), b.allocate());
        }
    }
}
