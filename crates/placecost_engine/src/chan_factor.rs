//! Channel capacity factor table.
//!
//! For every span of channels `low..=high` the table stores the inverse of the
//! average track count over that span, raised to the placement cost exponent.
//! Multiplying a bounding-box span by this factor makes nets that cross
//! narrow channels more expensive.

use crate::device::DeviceGrid;
use placecost_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};

/// Lower-triangular `size x size` matrix addressed as `[high][low]`, `low <= high`.
#[derive(Debug, Clone)]
struct Triangle {
    size: usize,
    values: Vec<f64>,
}

impl Triangle {
    fn offset(high: usize, low: usize) -> usize {
        high * (high + 1) / 2 + low
    }

    fn get(&self, high: usize, low: usize) -> f64 {
        debug_assert!(low <= high && high < self.size, "span [{low}, {high}] out of table");
        self.values[Self::offset(high, low)]
    }

    /// Builds the factor triangle from per-channel track counts.
    fn build(
        tracks: &[u32],
        exponent: f64,
        axis: &str,
        sink: &DiagnosticSink,
    ) -> Self {
        let size = tracks.len();
        let mut values = vec![0.0; size * (size + 1) / 2];

        // Prefix sums over the row: values[high][low] = tracks[low..=high].
        for high in 0..size {
            values[Self::offset(high, high)] = f64::from(tracks[high]);
            for low in 0..high {
                values[Self::offset(high, low)] =
                    values[Self::offset(high - 1, low)] + f64::from(tracks[high]);
            }
        }

        for high in 0..size {
            for low in 0..=high {
                let slot = &mut values[Self::offset(high, low)];
                if *slot == 0.0 {
                    sink.emit(
                        Diagnostic::warning(
                            DiagnosticCode::ZERO_CHANNEL_CAPACITY,
                            format!("{axis} channels {low}..={high} have no tracks"),
                        )
                        .with_subject(format!("{axis}[{high}][{low}]"))
                        .with_note("treating the span as a single track"),
                    );
                    *slot = 1.0;
                }
                let ratio = (high - low + 1) as f64 / *slot;
                *slot = ratio.powf(exponent);
            }
        }

        Self { size, values }
    }
}

/// Precomputed per-axis channel capacity factors for one device.
///
/// Read-only after [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct ChanFactorTable {
    x: Triangle,
    y: Triangle,
}

impl ChanFactorTable {
    /// Builds the table for `device` with the given cost exponent.
    ///
    /// Spans whose channels have no tracks at all are treated as having one
    /// track, with a warning emitted into `sink` for each.
    pub fn build(device: &dyn DeviceGrid, exponent: f64, sink: &DiagnosticSink) -> Self {
        let x_tracks: Vec<u32> = (0..device.height()).map(|y| device.chan_width_x(y)).collect();
        let y_tracks: Vec<u32> = (0..device.width()).map(|x| device.chan_width_y(x)).collect();
        Self {
            x: Triangle::build(&x_tracks, exponent, "chanx", sink),
            y: Triangle::build(&y_tracks, exponent, "chany", sink),
        }
    }

    /// Factor for the horizontal channels `low..=high` (indexed by row).
    pub fn x_factor(&self, high: usize, low: usize) -> f64 {
        self.x.get(high, low)
    }

    /// Factor for the vertical channels `low..=high` (indexed by column).
    pub fn y_factor(&self, high: usize, low: usize) -> f64 {
        self.y.get(high, low)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::UniformDevice;

    #[test]
    fn uniform_tracks_give_inverse_width() {
        let sink = DiagnosticSink::new();
        let table = ChanFactorTable::build(&UniformDevice::new(6, 6, 1, 4), 1.0, &sink);
        for high in 0..6 {
            for low in 0..=high {
                assert!((table.x_factor(high, low) - 0.25).abs() < 1e-12);
                assert!((table.y_factor(high, low) - 0.25).abs() < 1e-12);
            }
        }
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn mixed_tracks_average_over_span() {
        let sink = DiagnosticSink::new();
        let mut dev = UniformDevice::new(4, 4, 1, 2);
        dev.set_chan_x(1, 6);
        let table = ChanFactorTable::build(&dev, 1.0, &sink);
        // Rows 0..=1 carry 2 + 6 tracks over two channels.
        assert!((table.x_factor(1, 0) - 2.0 / 8.0).abs() < 1e-12);
        assert!((table.x_factor(1, 1) - 1.0 / 6.0).abs() < 1e-12);
        assert!((table.x_factor(3, 0) - 4.0 / 12.0).abs() < 1e-12);
    }

    #[test]
    fn exponent_is_applied() {
        let sink = DiagnosticSink::new();
        let table = ChanFactorTable::build(&UniformDevice::new(4, 4, 1, 2), 2.0, &sink);
        assert!((table.y_factor(2, 1) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn zero_capacity_span_warns_and_uses_one_track() {
        let sink = DiagnosticSink::new();
        let mut dev = UniformDevice::new(4, 4, 1, 3);
        dev.set_chan_y(2, 0);
        let table = ChanFactorTable::build(&dev, 1.0, &sink);
        assert_eq!(table.y_factor(2, 2), 1.0);
        let diags = sink.diagnostics();
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, DiagnosticCode::ZERO_CHANNEL_CAPACITY);
        assert!(!sink.has_errors());
    }
}
