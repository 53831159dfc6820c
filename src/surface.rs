use crate::{
    core::{SurfaceSize, unpremul_channel},
    error::{VaporError, VaporResult},
};

/// Host render target: premultiplied RGBA8 at device resolution.
///
/// `dpr` is the device-pixel ratio the source was rasterized at; the painter
/// uses it to size one logical pixel. The buffer is row-major, 4 bytes per
/// pixel, and always `width * height * 4` long.
#[derive(Clone, Debug)]
pub struct Surface {
    size: SurfaceSize,
    dpr: f64,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32, dpr: f64) -> VaporResult<Self> {
        if !dpr.is_finite() || dpr <= 0.0 {
            return Err(VaporError::validation("surface dpr must be finite and > 0"));
        }
        let size = SurfaceSize::new(width, height);
        Ok(Self {
            size,
            dpr,
            data: vec![0u8; size.area().saturating_mul(4)],
        })
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Reallocate for new dimensions. The content is cleared, not scaled.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.data.clear();
        self.data.resize(size.area().saturating_mul(4), 0);
    }

    /// Read one pixel, or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let i = ((y as usize) * (self.size.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Sum of all alpha bytes. Zero means nothing is painted.
    pub fn coverage(&self) -> u64 {
        self.data
            .chunks_exact(4)
            .map(|px| u64::from(px[3]))
            .sum()
    }

    /// Copy of the buffer with straight (non-premultiplied) alpha, for image
    /// formats that expect it. Opaque pixels pass through unchanged.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3];
            px[0] = unpremul_channel(px[0], a);
            px[1] = unpremul_channel(px[1], a);
            px[2] = unpremul_channel(px[2], a);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_dpr() {
        assert!(Surface::new(8, 8, 0.0).is_err());
        assert!(Surface::new(8, 8, f64::NAN).is_err());
        assert!(Surface::new(8, 8, -1.0).is_err());
    }

    #[test]
    fn zero_area_surface_is_valid_and_empty() {
        let s = Surface::new(0, 16, 1.0).unwrap();
        assert!(s.size().is_empty());
        assert!(s.data().is_empty());
        assert_eq!(s.pixel(0, 0), None);
    }

    #[test]
    fn resize_reallocates_and_clears() {
        let mut s = Surface::new(4, 4, 1.0).unwrap();
        s.data_mut()[0] = 200;
        s.resize(SurfaceSize::new(8, 2));
        assert_eq!(s.data().len(), 8 * 2 * 4);
        assert_eq!(s.coverage(), 0);
    }

    #[test]
    fn pixel_indexing_is_row_major() {
        let mut s = Surface::new(3, 2, 1.0).unwrap();
        let i = (1 * 3 + 2) * 4;
        s.data_mut()[i + 3] = 9;
        assert_eq!(s.pixel(2, 1), Some([0, 0, 0, 9]));
        assert_eq!(s.pixel(3, 0), None);
        assert_eq!(s.pixel(0, 2), None);
    }

    #[test]
    fn straight_export_undoes_premultiplication() {
        let mut s = Surface::new(2, 1, 1.0).unwrap();
        // 200 premultiplied by alpha 128, and one opaque pixel.
        s.data_mut()[..4].copy_from_slice(&[100, 100, 100, 128]);
        s.data_mut()[4..].copy_from_slice(&[10, 20, 30, 255]);
        let straight = s.to_straight_rgba();
        assert!((i16::from(straight[0]) - 199).abs() <= 1);
        assert_eq!(straight[3], 128);
        assert_eq!(&straight[4..], &[10, 20, 30, 255]);
    }
}
