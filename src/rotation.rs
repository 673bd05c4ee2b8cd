/// Software rotation angles, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Get the next rotation in the cycle
    pub fn next(self) -> Self {
        match self {
            Rotation::Deg0 => Rotation::Deg90,
            Rotation::Deg90 => Rotation::Deg180,
            Rotation::Deg180 => Rotation::Deg270,
            Rotation::Deg270 => Rotation::Deg0,
        }
    }

    /// Get rotation angle in degrees
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// Whether logical width and height are swapped relative to the panel
    pub fn is_transposed(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Logical `(width, height)` of a `width`×`height` panel in this orientation
    pub fn logical_dimensions(self, width: u16, height: u16) -> (u16, u16) {
        if self.is_transposed() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Transform logical coordinates to physical coordinates.
    ///
    /// `width` and `height` are the physical panel dimensions. Returns `None`
    /// when the point lies outside the logical surface.
    pub fn transform(self, x: i32, y: i32, width: u16, height: u16) -> Option<(u16, u16)> {
        let (logical_width, logical_height) = self.logical_dimensions(width, height);
        if x < 0 || y < 0 || x >= logical_width as i32 || y >= logical_height as i32 {
            return None;
        }
        let (x, y) = (x as u16, y as u16);

        Some(match self {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (width - 1 - y, x),
            Rotation::Deg180 => (width - 1 - x, height - 1 - y),
            Rotation::Deg270 => (y, height - 1 - x),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Rotation; 4] = [
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    #[test]
    fn next_cycles_through_all_angles() {
        let mut rotation = Rotation::Deg0;
        for expected in [90, 180, 270, 0] {
            rotation = rotation.next();
            assert_eq!(rotation.degrees(), expected);
        }
    }

    #[test]
    fn quarter_turns_swap_dimensions() {
        assert_eq!(Rotation::Deg0.logical_dimensions(128, 64), (128, 64));
        assert_eq!(Rotation::Deg90.logical_dimensions(128, 64), (64, 128));
        assert_eq!(Rotation::Deg180.logical_dimensions(128, 64), (128, 64));
        assert_eq!(Rotation::Deg270.logical_dimensions(128, 64), (64, 128));
    }

    #[test]
    fn origin_lands_on_expected_corner() {
        assert_eq!(Rotation::Deg0.transform(0, 0, 128, 64), Some((0, 0)));
        assert_eq!(Rotation::Deg90.transform(0, 0, 128, 64), Some((127, 0)));
        assert_eq!(Rotation::Deg180.transform(0, 0, 128, 64), Some((127, 63)));
        assert_eq!(Rotation::Deg270.transform(0, 0, 128, 64), Some((0, 63)));
    }

    #[test]
    fn out_of_range_points_are_rejected() {
        for rotation in ALL {
            let (w, h) = rotation.logical_dimensions(128, 64);
            assert_eq!(rotation.transform(-1, 0, 128, 64), None);
            assert_eq!(rotation.transform(0, -1, 128, 64), None);
            assert_eq!(rotation.transform(w as i32, 0, 128, 64), None);
            assert_eq!(rotation.transform(0, h as i32, 128, 64), None);
        }
    }

    #[test]
    fn every_orientation_is_a_bijection() {
        let (width, height) = (16u16, 8u16);
        for rotation in ALL {
            let mut seen = [false; 16 * 8];
            let (w, h) = rotation.logical_dimensions(width, height);
            for y in 0..h as i32 {
                for x in 0..w as i32 {
                    let (px, py) = rotation.transform(x, y, width, height).unwrap();
                    let index = py as usize * width as usize + px as usize;
                    assert!(!seen[index], "{rotation:?} maps two points to ({px}, {py})");
                    seen[index] = true;
                }
            }
            assert!(seen.iter().all(|&hit| hit));
        }
    }
}
