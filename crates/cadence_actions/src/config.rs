//! Clock configuration

/// Frame rate assumed when nothing else is configured
pub const DEFAULT_TARGET_FPS: u32 = 120;

/// How a [`Clock`](crate::Clock) turns frames into time
#[derive(Clone, Debug, PartialEq)]
pub struct ClockConfig {
    /// Frame rate used for the fixed step
    pub target_fps: u32,
    /// Advance by exactly `1 / target_fps` per tick instead of wall time
    pub fixed_step: bool,
    /// Initial scheduler time scale
    pub time_scale: f32,
}

impl ClockConfig {
    pub fn new() -> Self {
        Self {
            target_fps: DEFAULT_TARGET_FPS,
            fixed_step: false,
            time_scale: 1.0,
        }
    }

    /// Wall-clock driven, at normal speed
    pub fn realtime() -> Self {
        Self::new()
    }

    /// Deterministic stepping at `fps`, e.g. for recording frames
    pub fn fixed(fps: u32) -> Self {
        Self::new().with_target_fps(fps).with_fixed_step(true)
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn with_fixed_step(mut self, fixed_step: bool) -> Self {
        self.fixed_step = fixed_step;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Seconds per frame at the target rate, zero for a zero rate
    pub fn frame_interval(&self) -> f32 {
        if self.target_fps == 0 {
            0.0
        } else {
            1.0 / self.target_fps as f32
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::new()
    }
}
