/// Resend cooldown for the OTP screen. The owner drives `tick` once per
/// second (the app crate uses `tokio::time::interval`); resend is gated
/// on `ready`.
#[derive(Debug, Clone)]
pub struct ResendCountdown {
    remaining: u32,
    initial: u32,
}

impl ResendCountdown {
    pub fn new(seconds: u32) -> Self {
        Self {
            remaining: seconds,
            initial: seconds,
        }
    }

    /// One second elapsed. Returns true exactly once, on the tick that
    /// reaches zero and enables resend.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    pub fn ready(&self) -> bool {
        self.remaining == 0
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Rearms the cooldown after a resend.
    pub fn reset(&mut self) {
        self.remaining = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaches_zero_after_sixty_ticks() {
        let mut countdown = ResendCountdown::new(60);
        let mut enabled = 0;
        for _ in 0..60 {
            assert!(!countdown.ready());
            if countdown.tick() {
                enabled += 1;
            }
        }
        assert!(countdown.ready());
        assert_eq!(countdown.remaining(), 0);
        assert_eq!(enabled, 1, "resend must be enabled exactly once");
    }

    #[test]
    fn test_extra_ticks_do_not_reenable() {
        let mut countdown = ResendCountdown::new(2);
        assert!(!countdown.tick());
        assert!(countdown.tick());
        assert!(!countdown.tick());
        assert!(countdown.ready());
    }

    #[test]
    fn test_reset_rearms() {
        let mut countdown = ResendCountdown::new(2);
        countdown.tick();
        countdown.tick();
        assert!(countdown.ready());
        countdown.reset();
        assert!(!countdown.ready());
        assert_eq!(countdown.remaining(), 2);
    }
}
