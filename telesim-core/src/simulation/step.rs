use serde::Serialize;
use std::fmt;

/// The logical clock of the simulation: how many ticks were executed.
///
/// A step is a counter, not a duration. Nothing in the engine relates it
/// to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Step(u64);

impl Step {
    pub const ZERO: Self = Step(0);

    /// get the next step.
    ///
    /// ```
    /// # use telesim_core::simulation::Step;
    /// let next = Step::ZERO.next();
    /// assert!(Step::ZERO < next);
    /// assert_eq!(next.into_u64(), 1);
    /// ```
    #[inline(always)]
    #[must_use = "function does not modify the current value"]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    #[inline(always)]
    pub fn into_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
