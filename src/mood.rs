//! Mood Synthesizer - divergence count → Formagotchi state
//!
//! The mood is a pure function of the divergence count under a
//! [`MoodPolicy`]. The flavor line is drawn from a fixed table per mood with
//! an injectable random source.

use crate::error::{Error, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative consistency summary, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Calm,
    Confused,
    Annoyed,
    Overstimulated,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Confused => "confused",
            Self::Annoyed => "annoyed",
            Self::Overstimulated => "overstimulated",
        }
    }

    /// Flavor lines for this mood
    pub fn lines(&self) -> &'static [&'static str] {
        match self {
            Self::Calm => &[
                "All quiet on the pattern front!",
                "Looking tidy in here.",
                "Zen mode activated.",
            ],
            Self::Confused => &[
                "Hmm, things are getting interesting...",
                "I see some creative differences!",
                "A few patterns are doing their own thing.",
            ],
            Self::Annoyed => &[
                "Okay, this is getting on my nerves.",
                "Would it kill you to be consistent?",
                "I am not angry, just disappointed.",
            ],
            Self::Overstimulated => &[
                "Whoa, pattern party over here!",
                "So many flavors of the same thing!",
                "My eyes are spinning!",
            ],
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive upper bounds on the divergence count for each mood
///
/// With `annoyed_max = None` the policy has three states and counts above
/// `confused_max` go straight to overstimulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodPolicy {
    pub calm_max: usize,
    pub confused_max: usize,
    #[serde(default)]
    pub annoyed_max: Option<usize>,
}

impl Default for MoodPolicy {
    fn default() -> Self {
        Self::four_state()
    }
}

impl MoodPolicy {
    /// calm ≤ 2 < confused ≤ 4 < annoyed ≤ 6 < overstimulated
    pub fn four_state() -> Self {
        Self {
            calm_max: 2,
            confused_max: 4,
            annoyed_max: Some(6),
        }
    }

    /// calm ≤ 2 < confused ≤ 5 < overstimulated
    pub fn three_state() -> Self {
        Self {
            calm_max: 2,
            confused_max: 5,
            annoyed_max: None,
        }
    }

    /// Thresholds must be strictly increasing
    pub fn validate(&self) -> Result<()> {
        if self.confused_max <= self.calm_max {
            return Err(Error::InvalidConfig(format!(
                "confused_max ({}) must exceed calm_max ({})",
                self.confused_max, self.calm_max
            )));
        }
        if let Some(annoyed_max) = self.annoyed_max {
            if annoyed_max <= self.confused_max {
                return Err(Error::InvalidConfig(format!(
                    "annoyed_max ({}) must exceed confused_max ({})",
                    annoyed_max, self.confused_max
                )));
            }
        }
        Ok(())
    }

    /// Mood for a divergence count
    pub fn mood_for(&self, divergence_count: usize) -> Mood {
        if divergence_count <= self.calm_max {
            Mood::Calm
        } else if divergence_count <= self.confused_max {
            Mood::Confused
        } else if self.annoyed_max.is_some_and(|max| divergence_count <= max) {
            Mood::Annoyed
        } else {
            Mood::Overstimulated
        }
    }
}

/// User-facing summary of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormagotchiState {
    pub mood: Mood,
    pub line: String,
}

/// Formagotchi state under the default policy with a thread-local RNG
///
/// `memory_size` is accepted for future use and does not affect the result.
pub fn formagotchi_state(divergence_count: usize, memory_size: usize) -> FormagotchiState {
    formagotchi_state_with(
        &MoodPolicy::default(),
        divergence_count,
        memory_size,
        &mut rand::thread_rng(),
    )
}

/// Formagotchi state under an explicit policy and random source
pub fn formagotchi_state_with<R: Rng + ?Sized>(
    policy: &MoodPolicy,
    divergence_count: usize,
    _memory_size: usize,
    rng: &mut R,
) -> FormagotchiState {
    let mood = policy.mood_for(divergence_count);
    let line = mood.lines().choose(rng).copied().unwrap_or_default();

    FormagotchiState {
        mood,
        line: line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_mood_ordering() {
        assert!(Mood::Calm < Mood::Confused);
        assert!(Mood::Confused < Mood::Annoyed);
        assert!(Mood::Annoyed < Mood::Overstimulated);
    }

    #[test]
    fn test_four_state_boundaries() {
        let policy = MoodPolicy::four_state();

        assert_eq!(policy.mood_for(0), Mood::Calm);
        assert_eq!(policy.mood_for(2), Mood::Calm);
        assert_eq!(policy.mood_for(3), Mood::Confused);
        assert_eq!(policy.mood_for(4), Mood::Confused);
        assert_eq!(policy.mood_for(5), Mood::Annoyed);
        assert_eq!(policy.mood_for(6), Mood::Annoyed);
        assert_eq!(policy.mood_for(7), Mood::Overstimulated);
        assert_eq!(policy.mood_for(100), Mood::Overstimulated);
    }

    #[test]
    fn test_three_state_boundaries() {
        let policy = MoodPolicy::three_state();

        assert_eq!(policy.mood_for(2), Mood::Calm);
        assert_eq!(policy.mood_for(5), Mood::Confused);
        assert_eq!(policy.mood_for(6), Mood::Overstimulated);
    }

    #[test]
    fn test_line_from_mood_table() {
        for count in [0, 3, 5, 7] {
            let state = formagotchi_state(count, 0);
            assert!(state.mood.lines().contains(&state.line.as_str()));
        }
    }

    #[test]
    fn test_memory_size_ignored() {
        assert_eq!(formagotchi_state(3, 0).mood, formagotchi_state(3, 10_000).mood);
    }

    #[test]
    fn test_seeded_line_is_deterministic() {
        let policy = MoodPolicy::default();
        let a = formagotchi_state_with(&policy, 7, 0, &mut StdRng::seed_from_u64(9));
        let b = formagotchi_state_with(&policy, 7, 0, &mut StdRng::seed_from_u64(9));

        assert_eq!(a, b);
        assert_eq!(a.mood, Mood::Overstimulated);
    }

    #[test]
    fn test_validate() {
        assert!(MoodPolicy::four_state().validate().is_ok());
        assert!(MoodPolicy::three_state().validate().is_ok());

        let flat = MoodPolicy {
            calm_max: 3,
            confused_max: 3,
            annoyed_max: None,
        };
        assert!(flat.validate().is_err());

        let inverted = MoodPolicy {
            calm_max: 1,
            confused_max: 4,
            annoyed_max: Some(2),
        };
        assert!(inverted.validate().is_err());
    }
}
