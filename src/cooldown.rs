/// Rate limiter for repeatable actions such as firing. Timestamps are seconds of elapsed game
/// time, so pausing the game also pauses every cooldown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cooldown {
    period: f32,
    last_fired: Option<f64>,
}

impl Cooldown {
    pub const fn new(period: f32) -> Self {
        Self {
            period,
            last_fired: None,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn ready(&self, now: f64) -> bool {
        match self.last_fired {
            None => true,
            Some(last) => now - last >= f64::from(self.period),
        }
    }

    /// Records a use at `now` and returns true if the cooldown had elapsed.
    pub fn try_fire(&mut self, now: f64) -> bool {
        if !self.ready(now) {
            return false;
        }
        self.last_fired = Some(now);
        true
    }

    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}
