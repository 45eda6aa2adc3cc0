use std::sync::atomic::{AtomicBool, Ordering};

/// Signal raised by [`SimContext::shutdown`] for the driver thread.
///
/// The flag is only ever raised: once stopped the driver cannot be
/// restarted.
///
/// [`SimContext::shutdown`]: crate::SimContext::shutdown
#[derive(Debug, Default)]
pub(crate) struct Stop(AtomicBool);

impl Stop {
    pub(crate) fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    #[inline]
    pub(crate) fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn raise(&self) {
        self.0.store(true, Ordering::Release)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_lowered() {
        assert!(!Stop::new().is_raised());
        assert!(!Stop::default().is_raised());
    }

    #[test]
    fn stays_raised() {
        let stop = Stop::new();

        stop.raise();
        assert!(stop.is_raised());
        stop.raise();
        assert!(stop.is_raised());
    }
}
