/// Read-only settings view consumed by the interpreter. Carries no
/// file-parsing concern of its own — this is a view handed in by whatever
/// owns the actual store.
pub trait Settings {
    fn default_feed_rate_mm_per_min(&self) -> f64;
    fn default_seek_rate_mm_per_min(&self) -> f64;
    fn mm_per_arc_segment(&self) -> f64;
    fn steps_per_mm(&self, axis: usize) -> f64;
}

/// Mutable counterpart of [`Settings`]: the `$N=V` line is the only inbound
/// mutation path into the settings store.
pub trait SettingsStore: Settings {
    fn store(&mut self, n: u32, v: f64);
}

/// Concrete settings record, defaulted from the original firmware's
/// `mm_constants.h`. `$N=V` addresses fields by the same numbering the
/// original `$` dump used (0=x steps/mm, 1=y, 2=z, 3=feed rate, 4=seek
/// rate, 5=mm per arc segment); any other `n` is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MillSettings {
    pub steps_per_mm: [f64; 3],
    pub default_feed_rate_mm_per_min: f64,
    pub default_seek_rate_mm_per_min: f64,
    pub mm_per_arc_segment: f64,
}

impl Default for MillSettings {
    fn default() -> Self {
        Self {
            steps_per_mm: [188.97637795275, 188.97637795275, 188.97637795275],
            default_feed_rate_mm_per_min: 381.0,
            default_seek_rate_mm_per_min: 381.0,
            mm_per_arc_segment: 0.1,
        }
    }
}

impl Settings for MillSettings {
    fn default_feed_rate_mm_per_min(&self) -> f64 {
        self.default_feed_rate_mm_per_min
    }
    fn default_seek_rate_mm_per_min(&self) -> f64 {
        self.default_seek_rate_mm_per_min
    }
    fn mm_per_arc_segment(&self) -> f64 {
        self.mm_per_arc_segment
    }
    fn steps_per_mm(&self, axis: usize) -> f64 {
        self.steps_per_mm[axis]
    }
}

impl SettingsStore for MillSettings {
    fn store(&mut self, n: u32, v: f64) {
        match n {
            0 => self.steps_per_mm[0] = v,
            1 => self.steps_per_mm[1] = v,
            2 => self.steps_per_mm[2] = v,
            3 => self.default_feed_rate_mm_per_min = v,
            4 => self.default_seek_rate_mm_per_min = v,
            5 => self.mm_per_arc_segment = v,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_firmware_constants() {
        let s = MillSettings::default();
        assert_eq!(s.default_feed_rate_mm_per_min, 381.0);
        assert_eq!(s.default_seek_rate_mm_per_min, 381.0);
        assert!((s.steps_per_mm[0] - 188.97637795275).abs() < 1e-9);
    }

    #[test]
    fn store_updates_named_field_and_ignores_unknown_n() {
        let mut s = MillSettings::default();
        s.store(3, 600.0);
        assert_eq!(s.default_feed_rate_mm_per_min(), 600.0);
        s.store(99, 1.0);
        assert_eq!(s, MillSettings { default_feed_rate_mm_per_min: 600.0, ..MillSettings::default() });
    }
}
