//! Device grid interface and a uniform-channel reference device.
//!
//! The engine needs very little from the device: its dimensions, its layer
//! count, and the number of routing tracks in each horizontal channel (indexed
//! by row) and each vertical channel (indexed by column).

use crate::error::CostError;
use crate::netlist::PinLoc;
use serde::{Deserialize, Serialize};

/// The device geometry consumed by the cost engine.
pub trait DeviceGrid {
    /// Number of grid columns, including the I/O perimeter.
    fn width(&self) -> usize;
    /// Number of grid rows, including the I/O perimeter.
    fn height(&self) -> usize;
    /// Number of stacked die layers.
    fn num_layers(&self) -> usize;
    /// Tracks in the horizontal channel above row `y`.
    fn chan_width_x(&self, y: usize) -> u32;
    /// Tracks in the vertical channel right of column `x`.
    fn chan_width_y(&self, x: usize) -> u32;
}

/// A rectangular device with explicit per-channel track counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniformDevice {
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
    /// Die layers.
    pub layers: usize,
    /// Horizontal channel widths, one per row.
    pub chan_x: Vec<u32>,
    /// Vertical channel widths, one per column.
    pub chan_y: Vec<u32>,
}

impl UniformDevice {
    /// Creates a device where every channel has `tracks` tracks.
    pub fn new(width: usize, height: usize, layers: usize, tracks: u32) -> Self {
        Self {
            width,
            height,
            layers,
            chan_x: vec![tracks; height],
            chan_y: vec![tracks; width],
        }
    }

    /// Overrides the track count of the horizontal channel at row `y`.
    pub fn set_chan_x(&mut self, y: usize, tracks: u32) {
        self.chan_x[y] = tracks;
    }

    /// Overrides the track count of the vertical channel at column `x`.
    pub fn set_chan_y(&mut self, x: usize, tracks: u32) {
        self.chan_y[x] = tracks;
    }
}

impl DeviceGrid for UniformDevice {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn num_layers(&self) -> usize {
        self.layers
    }

    fn chan_width_x(&self, y: usize) -> u32 {
        self.chan_x.get(y).copied().unwrap_or(0)
    }

    fn chan_width_y(&self, x: usize) -> u32 {
        self.chan_y.get(x).copied().unwrap_or(0)
    }
}

/// The routable interior of a device, used to clip pin locations.
///
/// Pins on the I/O perimeter are treated as if they sat on the nearest
/// interior row or column, since routing to them uses the adjacent channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    /// Largest interior column, `width - 2`.
    pub xmax: i32,
    /// Largest interior row, `height - 2`.
    pub ymax: i32,
    /// Number of layers.
    pub num_layers: usize,
}

impl GridBounds {
    /// Derives the interior of `device`.
    ///
    /// Fails if the device is too small to have an interior or has no layers.
    pub fn from_device(device: &dyn DeviceGrid) -> Result<Self, CostError> {
        let (width, height, layers) = (device.width(), device.height(), device.num_layers());
        if width < 3 || height < 3 {
            return Err(CostError::UnsupportedDevice(format!(
                "{width}x{height} grid has no routable interior"
            )));
        }
        if layers == 0 {
            return Err(CostError::UnsupportedDevice(
                "device has no layers".to_string(),
            ));
        }
        Ok(Self {
            xmax: width as i32 - 2,
            ymax: height as i32 - 2,
            num_layers: layers,
        })
    }

    /// Clamps `loc` into `[1, xmax] x [1, ymax]`. The layer is kept.
    pub fn clip(&self, loc: PinLoc) -> PinLoc {
        debug_assert!(
            loc.layer >= 0 && (loc.layer as usize) < self.num_layers,
            "pin layer {} outside device",
            loc.layer
        );
        PinLoc {
            x: loc.x.clamp(1, self.xmax),
            y: loc.y.clamp(1, self.ymax),
            layer: loc.layer,
        }
    }

    /// Returns `true` if the extents lie inside the interior.
    pub fn contains_extents(&self, xmin: i32, xmax: i32, ymin: i32, ymax: i32) -> bool {
        1 <= xmin && xmin <= xmax && xmax <= self.xmax && 1 <= ymin && ymin <= ymax && ymax <= self.ymax
    }
}
