//! In-memory copy of the controller RAM.
//!
//! One byte holds 8 vertically stacked pixels of one column within one page,
//! bit 0 being the topmost row. Pages are stored one after another, `width`
//! bytes each.

/// Largest width or height any SH110X part drives.
pub const MAX_DIMENSION: u16 = 128;

/// Pixel write mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Off,
    On,
    /// Flip whatever the pixel currently shows
    Invert,
}

impl From<bool> for Color {
    fn from(on: bool) -> Self {
        if on { Color::On } else { Color::Off }
    }
}

/// Physical panel size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    width: u16,
    height: u16,
}

impl Geometry {
    /// `None` when either side is zero or larger than [`MAX_DIMENSION`].
    pub const fn new(width: u16, height: u16) -> Option<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return None;
        }
        Some(Self { width, height })
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Number of 8-row pages, the last one possibly partial
    pub const fn pages(&self) -> u8 {
        self.height.div_ceil(8) as u8
    }

    /// Bytes needed to hold the whole surface
    pub const fn buffer_len(&self) -> usize {
        self.pages() as usize * self.width as usize
    }
}

/// Bounding window of bytes modified since the last successful flush.
///
/// Both ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DirtyRegion {
    pub min_page: u8,
    pub max_page: u8,
    pub min_column: u8,
    pub max_column: u8,
}

impl DirtyRegion {
    fn single(page: u8, column: u8) -> Self {
        Self {
            min_page: page,
            max_page: page,
            min_column: column,
            max_column: column,
        }
    }

    fn include(&mut self, page: u8, column: u8) {
        self.min_page = self.min_page.min(page);
        self.max_page = self.max_page.max(page);
        self.min_column = self.min_column.min(column);
        self.max_column = self.max_column.max(column);
    }

    /// Bytes per page inside the window
    pub fn columns(&self) -> usize {
        (self.max_column - self.min_column) as usize + 1
    }

    /// Pages inside the window
    pub fn pages(&self) -> usize {
        (self.max_page - self.min_page) as usize + 1
    }
}

/// Page-layout framebuffer over caller supplied storage.
pub struct Framebuffer<'b> {
    geometry: Geometry,
    buffer: &'b mut [u8],
    dirty: Option<DirtyRegion>,
}

impl<'b> Framebuffer<'b> {
    /// Bind `storage` as the framebuffer for `geometry`.
    ///
    /// Returns `None` if `storage` is shorter than [`Geometry::buffer_len`];
    /// extra bytes are left untouched. The buffer starts blank and fully
    /// dirty, since the controller RAM content is unknown.
    pub fn new(geometry: Geometry, storage: &'b mut [u8]) -> Option<Self> {
        let buffer = storage.get_mut(..geometry.buffer_len())?;
        let mut framebuffer = Self {
            geometry,
            buffer,
            dirty: None,
        };
        framebuffer.clear();
        Some(framebuffer)
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Set, clear or flip the pixel at physical `(x, y)`.
    ///
    /// Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: u16, y: u16, color: Color) {
        let Some(index) = self.index(x, y) else {
            return;
        };
        let mask = 1u8 << (y % 8);
        match color {
            Color::On => self.buffer[index] |= mask,
            Color::Off => self.buffer[index] &= !mask,
            Color::Invert => self.buffer[index] ^= mask,
        }

        let (page, column) = ((y / 8) as u8, x as u8);
        match self.dirty.as_mut() {
            Some(region) => region.include(page, column),
            None => self.dirty = Some(DirtyRegion::single(page, column)),
        }
    }

    /// Pixel state at physical `(x, y)`; `false` when out of range.
    pub fn pixel(&self, x: u16, y: u16) -> bool {
        self.index(x, y)
            .is_some_and(|index| self.buffer[index] & (1 << (y % 8)) != 0)
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        self.fill(false);
    }

    /// Set every pixel to `on` and mark the whole surface dirty.
    pub fn fill(&mut self, on: bool) {
        self.buffer.fill(if on { 0xFF } else { 0x00 });
        self.mark_all_dirty();
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty = Some(DirtyRegion {
            min_page: 0,
            max_page: self.geometry.pages() - 1,
            min_column: 0,
            max_column: (self.geometry.width - 1) as u8,
        });
    }

    /// Forget the dirty window after it has reached the controller.
    pub fn mark_clean(&mut self) {
        self.dirty = None;
    }

    pub fn dirty_region(&self) -> Option<DirtyRegion> {
        self.dirty
    }

    /// Bytes of `page` for columns `first..=last`.
    pub fn page_run(&self, page: u8, first: u8, last: u8) -> &[u8] {
        let start = page as usize * self.geometry.width as usize;
        &self.buffer[start + first as usize..=start + last as usize]
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.buffer
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        Some((y / 8) as usize * self.geometry.width as usize + x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(width: u16, height: u16) -> Geometry {
        Geometry::new(width, height).unwrap()
    }

    #[test]
    fn geometry_sizes_follow_page_layout() {
        let g = geometry(128, 64);
        assert_eq!(g.pages(), 8);
        assert_eq!(g.buffer_len(), 1024);

        let partial = geometry(64, 20);
        assert_eq!(partial.pages(), 3);
        assert_eq!(partial.buffer_len(), 192);
    }

    #[test]
    fn geometry_rejects_zero_and_oversized() {
        assert!(Geometry::new(0, 64).is_none());
        assert!(Geometry::new(128, 0).is_none());
        assert!(Geometry::new(129, 64).is_none());
        assert!(Geometry::new(128, 136).is_none());
    }

    #[test]
    fn short_storage_is_refused() {
        let mut storage = [0u8; 1023];
        assert!(Framebuffer::new(geometry(128, 64), &mut storage).is_none());
    }

    #[test]
    fn new_buffer_is_blank_and_fully_dirty() {
        let mut storage = [0xAAu8; 1100];
        let fb = Framebuffer::new(geometry(128, 64), &mut storage).unwrap();
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(
            fb.dirty_region(),
            Some(DirtyRegion {
                min_page: 0,
                max_page: 7,
                min_column: 0,
                max_column: 127,
            })
        );
        drop(fb);
        assert_eq!(storage[1024], 0xAA);
    }

    #[test]
    fn pixel_bits_land_in_page_column_byte() {
        let mut storage = [0u8; 1024];
        let mut fb = Framebuffer::new(geometry(128, 64), &mut storage).unwrap();
        fb.mark_clean();

        fb.set_pixel(5, 19, Color::On);
        assert!(fb.pixel(5, 19));
        assert_eq!(fb.as_bytes()[2 * 128 + 5], 1 << 3);

        fb.set_pixel(5, 19, Color::Invert);
        assert!(!fb.pixel(5, 19));
        fb.set_pixel(5, 19, Color::Invert);
        assert!(fb.pixel(5, 19));
        fb.set_pixel(5, 19, Color::Off);
        assert!(!fb.pixel(5, 19));
    }

    #[test]
    fn out_of_range_writes_change_nothing() {
        let mut storage = [0u8; 1024];
        let mut fb = Framebuffer::new(geometry(128, 64), &mut storage).unwrap();
        fb.mark_clean();

        fb.set_pixel(128, 0, Color::On);
        fb.set_pixel(0, 64, Color::On);
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(fb.dirty_region(), None);
        assert!(!fb.pixel(200, 200));
    }

    #[test]
    fn dirty_region_is_exact_bounding_box() {
        let mut storage = [0u8; 1024];
        let mut fb = Framebuffer::new(geometry(128, 64), &mut storage).unwrap();
        fb.mark_clean();

        fb.set_pixel(10, 9, Color::On);
        assert_eq!(
            fb.dirty_region(),
            Some(DirtyRegion {
                min_page: 1,
                max_page: 1,
                min_column: 10,
                max_column: 10,
            })
        );

        fb.set_pixel(40, 30, Color::Off);
        fb.set_pixel(3, 12, Color::On);
        let region = fb.dirty_region().unwrap();
        assert_eq!(
            region,
            DirtyRegion {
                min_page: 1,
                max_page: 3,
                min_column: 3,
                max_column: 40,
            }
        );
        assert_eq!(region.pages(), 3);
        assert_eq!(region.columns(), 38);
    }

    #[test]
    fn clear_marks_everything_dirty() {
        let mut storage = [0u8; 64 * 16];
        let mut fb = Framebuffer::new(geometry(64, 128), &mut storage).unwrap();
        fb.set_pixel(1, 1, Color::On);
        fb.mark_clean();

        fb.clear();
        let region = fb.dirty_region().unwrap();
        assert_eq!((region.min_page, region.max_page), (0, 15));
        assert_eq!((region.min_column, region.max_column), (0, 63));
        assert!(!fb.pixel(1, 1));
    }

    #[test]
    fn page_run_slices_one_page() {
        let mut storage = [0u8; 1024];
        let mut fb = Framebuffer::new(geometry(128, 64), &mut storage).unwrap();
        fb.set_pixel(4, 8, Color::On);
        fb.set_pixel(6, 15, Color::On);
        assert_eq!(fb.page_run(1, 4, 6), &[0x01, 0x00, 0x80]);
    }
}
