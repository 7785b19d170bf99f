use capsense::CapError;

/// Bridges `motion-ctl`'s homing loop to a capacitive sensor without a hard
/// dependency on `capsense`'s concrete `CapSense` type — mirrors the way
/// this crate already depends on `capsense` only for [`CapError`], keeping
/// the actual sensing behind a trait so a homing unit test can supply a
/// scripted reading sequence instead of real RC timing.
pub trait CapProbe {
    /// Averaged reading for axis `axis` (0=X, 1=Y, 2=Z).
    fn axis_average(&mut self, axis: usize, num_samples: u8) -> Result<f64, CapError>;

    /// Averaged reading for the end-mill conductivity channel.
    fn end_mill_average(&mut self, num_samples: u8) -> Result<f64, CapError>;
}

impl<A: capsense::CapPort, M: capsense::CapPort> CapProbe for capsense::CapSense<A, M> {
    fn axis_average(&mut self, axis: usize, num_samples: u8) -> Result<f64, CapError> {
        capsense::CapSense::axis_average(self, axis, num_samples)
    }
    fn end_mill_average(&mut self, num_samples: u8) -> Result<f64, CapError> {
        capsense::CapSense::end_mill_average(self, num_samples)
    }
}
