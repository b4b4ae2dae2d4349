#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    /// Simulation time at the start of this tick. Action work durations are measured against it.
    pub time_seconds: f64,
}

impl TickContext {
    pub fn new(dt_seconds: f32) -> Self {
        Self {
            tick: 0,
            dt_seconds,
            time_seconds: 0.0,
        }
    }

    /// The context for the following tick.
    pub fn advance(self) -> Self {
        Self {
            tick: self.tick + 1,
            dt_seconds: self.dt_seconds,
            time_seconds: self.time_seconds + self.dt_seconds as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_time() {
        let ctx = TickContext::new(0.5).advance().advance();
        assert_eq!(ctx.tick, 2);
        assert_eq!(ctx.time_seconds, 1.0);
    }
}
