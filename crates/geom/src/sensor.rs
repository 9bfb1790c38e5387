use super::{Error, Expanse, Point, Result};

/// The fixed coordinate range reported by the touch hardware.
///
/// Touch coordinates never depend on the terminal: a panel reports the same
/// `800×480` range whether the console is 80×24 or 100×30. Every consumer
/// rescales into cells with the terminal size current at the time of the
/// touch, so nothing here caches a terminal size.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct SensorSpace {
    /// Sensor width in device units.
    pub width: u32,
    /// Sensor height in device units.
    pub height: u32,
}

impl Default for SensorSpace {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

impl SensorSpace {
    /// Construct a sensor space. Both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Geometry(format!(
                "sensor space must be non-empty, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Map a sensor column onto a terminal column: `x * cols / width`.
    pub fn column(&self, x: i32, cols: u32) -> u32 {
        scale(x, cols, self.width)
    }

    /// Map a sensor row onto a terminal row: `y * rows / height`.
    pub fn row(&self, y: i32, rows: u32) -> u32 {
        scale(y, rows, self.height)
    }

    /// Map a touch position onto the terminal cell under it. Negative
    /// positions land on the first row or column.
    pub fn to_cell(&self, x: i32, y: i32, term: Expanse) -> Point {
        Point {
            x: self.column(x, term.w),
            y: self.row(y, term.h),
        }
    }

    /// The fraction of the sensor width covered by a horizontal delta.
    pub fn fraction_x(&self, dx: i32) -> f64 {
        f64::from(dx) / f64::from(self.width.max(1))
    }
}

/// Floor-scale a sensor coordinate into `dim` cells over a sensor extent.
fn scale(v: i32, dim: u32, extent: u32) -> u32 {
    if v <= 0 || extent == 0 || dim == 0 {
        return 0;
    }
    let cell = i64::from(v) * i64::from(dim) / i64::from(extent);
    cell.min(i64::from(dim) - 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_maps_to_center_cell() -> Result<()> {
        let s = SensorSpace::new(800, 480)?;
        assert_eq!(s.to_cell(400, 240, Expanse::new(80, 24)), Point { x: 40, y: 12 });
        Ok(())
    }

    #[test]
    fn mapping_follows_terminal_size() -> Result<()> {
        let s = SensorSpace::new(800, 480)?;
        assert_eq!(s.to_cell(400, 240, Expanse::new(100, 30)), Point { x: 50, y: 15 });
        assert_eq!(s.to_cell(799, 479, Expanse::new(80, 24)), Point { x: 79, y: 23 });
        assert_eq!(s.to_cell(-3, -1, Expanse::new(80, 24)), Point::default());
        Ok(())
    }

    #[test]
    fn horizontal_fraction() -> Result<()> {
        let s = SensorSpace::new(800, 480)?;
        assert_eq!(s.fraction_x(200), 0.25);
        assert_eq!(s.fraction_x(-800), -1.0);
        Ok(())
    }

    #[test]
    fn rejects_empty() {
        assert!(SensorSpace::new(0, 480).is_err());
    }

    proptest::proptest! {
        #[test]
        fn cell_always_on_screen(
            x in 0i32..800,
            y in 0i32..480,
            cols in 1u32..400,
            rows in 1u32..200,
        ) {
            let s = SensorSpace::default();
            let p = s.to_cell(x, y, Expanse::new(cols, rows));
            proptest::prop_assert!(Expanse::new(cols, rows).rect().contains_point(p));
        }
    }
}
