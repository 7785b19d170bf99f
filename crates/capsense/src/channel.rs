//! Hardware capability surface for one capacitive RC channel pair.
//!
//! A real implementation maps `channel` to a pair of GPIO pins on a shared
//! port (as the AVR original does with `senseSendPins`/`senseRecvPins`);
//! `CapPort` lets a single type answer for several channels sharing a port,
//! which is how the three axis plates and the end-mill plate are wired in
//! practice (axis plates share one port, the end mill has its own).

/// Outcome of a single RC half-cycle or averaged read: the only failure
/// mode is a channel that never crosses its logic threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapError {
    TimedOut,
}

impl core::fmt::Display for CapError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("timed out")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CapError {}

/// A port exposing one or more independent send/receive channel pairs.
///
/// `channel` indexes which pair on the port to drive; single-channel ports
/// (like the end-mill plate) simply ignore it and always act on channel 0.
pub trait CapPort {
    /// Drives the send pin of `channel` high or low.
    fn drive_send(&mut self, channel: usize, high: bool);

    /// Configures the receive pin of `channel` as an output driven low,
    /// then immediately switches it to a floating input — this discharges
    /// any stray charge before a measurement starts.
    fn prime_recv_low(&mut self, channel: usize);

    /// Configures the receive pin of `channel` as a floating input with no
    /// pull-up active.
    fn release_recv(&mut self, channel: usize);

    /// Briefly drives the receive pin of `channel` through its internal
    /// pull-up to finish charging it past the logic threshold, then leaves
    /// it released (floating input, pull-up disabled) again.
    fn pulse_recv_pull_up(&mut self, channel: usize);

    /// Reads the current logic level of the receive pin of `channel`.
    fn recv_is_high(&mut self, channel: usize) -> bool;
}
