//! Level table for the progression system.
//!
//! XP is the only stored truth; level and title are always recomputed from
//! it through this table. Thresholds are a static ordered lookup, never
//! incremented alongside XP.

/// One row of the level table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelEntry {
    /// Minimum XP to hold this level.
    pub threshold: u64,
    pub level: u32,
    pub title: &'static str,
}

/// Ordered by threshold, ascending. First entry must be threshold 0.
pub const LEVELS: &[LevelEntry] = &[
    LevelEntry { threshold: 0, level: 1, title: "Fresh Candidate" },
    LevelEntry { threshold: 100, level: 2, title: "Page Turner" },
    LevelEntry { threshold: 250, level: 3, title: "Note Taker" },
    LevelEntry { threshold: 500, level: 4, title: "Steady Scholar" },
    LevelEntry { threshold: 1_000, level: 5, title: "Syllabus Strider" },
    LevelEntry { threshold: 2_000, level: 6, title: "Mock Slayer" },
    LevelEntry { threshold: 3_500, level: 7, title: "Focus Adept" },
    LevelEntry { threshold: 5_500, level: 8, title: "Exam Tactician" },
    LevelEntry { threshold: 8_000, level: 9, title: "Master Candidate" },
    LevelEntry { threshold: 12_000, level: 10, title: "Hall of Fame Scholar" },
];

/// Highest table entry whose threshold is at or below `xp`.
pub fn level_for_xp(xp: u64) -> &'static LevelEntry {
    LEVELS
        .iter()
        .rev()
        .find(|entry| entry.threshold <= xp)
        .unwrap_or(&LEVELS[0])
}

/// What the next level looks like from `xp`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NextLevel {
    pub level: u32,
    pub title: &'static str,
    /// XP still missing to reach it.
    pub xp_needed: u64,
    /// Progress through the current band, 0-100.
    pub progress_pct: f64,
}

/// Next entry above the current level, or `None` at the table's top.
pub fn next_level(xp: u64) -> Option<NextLevel> {
    let current = level_for_xp(xp);
    let next = LEVELS.iter().find(|e| e.threshold > current.threshold)?;

    let band = (next.threshold - current.threshold) as f64;
    let into = (xp - current.threshold) as f64;
    let pct = (100.0 * into / band).clamp(0.0, 100.0);

    Some(NextLevel {
        level: next.level,
        title: next.title,
        xp_needed: next.threshold - xp,
        progress_pct: pct,
    })
}

/// Progress toward the next level; pinned to 100 at or above the max threshold.
pub fn progress_pct(xp: u64) -> f64 {
    next_level(xp).map(|n| n.progress_pct).unwrap_or(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_starts_at_zero() {
        assert_eq!(LEVELS[0].threshold, 0);
        assert!(LEVELS.windows(2).all(|w| w[0].threshold < w[1].threshold));
        assert!(LEVELS.windows(2).all(|w| w[0].level < w[1].level));
    }

    #[test]
    fn test_level_for_xp_tight_lower_bound() {
        // The returned threshold qualifies and no higher one does.
        for xp in [0u64, 1, 99, 100, 101, 999, 1_000, 11_999, 12_000, 1_000_000] {
            let entry = level_for_xp(xp);
            assert!(entry.threshold <= xp);
            for higher in LEVELS.iter().filter(|e| e.threshold > entry.threshold) {
                assert!(higher.threshold > xp, "xp={} skipped level {}", xp, higher.level);
            }
        }
    }

    #[test]
    fn test_next_level_boundaries() {
        let next = next_level(0).unwrap();
        assert_eq!(next.level, 2);
        assert_eq!(next.xp_needed, 100);
        assert_eq!(next.progress_pct, 0.0);

        let next = next_level(99).unwrap();
        assert_eq!(next.xp_needed, 1);
        assert!(next.progress_pct > 98.0 && next.progress_pct < 100.0);

        let next = next_level(100).unwrap();
        assert_eq!(next.level, 3);
        assert_eq!(next.progress_pct, 0.0);
    }

    #[test]
    fn test_progress_pct_in_range() {
        for xp in 0..13_000u64 {
            let pct = progress_pct(xp);
            assert!((0.0..=100.0).contains(&pct), "xp={} pct={}", xp, pct);
        }
    }

    #[test]
    fn test_max_level_has_no_next_and_full_progress() {
        assert!(next_level(12_000).is_none());
        assert!(next_level(99_999).is_none());
        assert_eq!(progress_pct(12_000), 100.0);
        assert_eq!(progress_pct(99_999), 100.0);
    }
}
