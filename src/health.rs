use bevy::prelude::*;

/// Hit points, always within `0..=Health::MAX`.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    current: f32,
}

impl Health {
    pub const MAX: f32 = 100.0;

    pub fn new(value: f32) -> Self {
        Self {
            current: value.clamp(0.0, Self::MAX),
        }
    }

    pub fn full() -> Self {
        Self::new(Self::MAX)
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    /// Subtracts `amount`, never dropping below zero. Returns the new value.
    pub fn reduce(&mut self, amount: f32) -> f32 {
        self.current = (self.current - amount).clamp(0.0, Self::MAX);
        self.current
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        self.current = (self.current + amount).clamp(0.0, Self::MAX);
        self.current
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        self.current / Self::MAX
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_never_goes_negative() {
        for start in [0.0, 1.0, 49.5, 50.0, 100.0] {
            for amount in [0.0, 0.5, 50.0, 100.0, 250.0] {
                let mut health = Health::new(start);
                let expected = (start - amount).max(0.0);
                assert_eq!(health.reduce(amount), expected);
                assert!(health.current() >= 0.0);
            }
        }
    }

    #[test]
    fn construction_and_healing_clamp_to_maximum() {
        assert_eq!(Health::new(140.0).current(), Health::MAX);
        assert_eq!(Health::new(-3.0).current(), 0.0);

        let mut health = Health::new(90.0);
        health.heal(25.0);
        assert_eq!(health.current(), Health::MAX);
    }

    #[test]
    fn two_standard_hits_deplete_a_full_bar() {
        let mut health = Health::full();
        health.reduce(50.0);
        assert!(!health.is_depleted());
        assert_eq!(health.fraction(), 0.5);
        health.reduce(50.0);
        assert!(health.is_depleted());
    }
}
