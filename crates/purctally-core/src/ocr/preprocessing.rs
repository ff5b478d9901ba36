//! Image preprocessing for OCR.

use image::{DynamicImage, GenericImageView, GrayImage, Luma};
use tracing::debug;

/// Converts scanned bills to grayscale, optionally thresholded.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    /// Apply adaptive thresholding after grayscale conversion.
    threshold: bool,
    /// Side of the square window used for the local mean.
    block_size: u32,
    /// Constant subtracted from the local mean.
    offset: i32,
}

impl ImagePreprocessor {
    /// Grayscale only.
    pub fn new() -> Self {
        Self {
            threshold: false,
            block_size: 15,
            offset: 5,
        }
    }

    /// Enable or disable adaptive thresholding.
    pub fn with_threshold(mut self, enabled: bool) -> Self {
        self.threshold = enabled;
        self
    }

    /// Prepare an image for the OCR engine.
    pub fn prepare(&self, image: &DynamicImage) -> DynamicImage {
        let (width, height) = image.dimensions();
        debug!("Preprocessing {}x{} image (threshold: {})", width, height, self.threshold);

        let gray = image.to_luma8();
        if self.threshold {
            DynamicImage::ImageLuma8(self.adaptive_threshold(&gray))
        } else {
            DynamicImage::ImageLuma8(gray)
        }
    }

    /// Binarize against the mean of a `block_size` window around each pixel,
    /// read from a summed-area table in constant time per pixel.
    fn adaptive_threshold(&self, image: &GrayImage) -> GrayImage {
        let (width, height) = image.dimensions();
        let sums = IntegralImage::new(image);
        let radius = self.block_size / 2;

        GrayImage::from_fn(width, height, |x, y| {
            let x0 = x.saturating_sub(radius);
            let y0 = y.saturating_sub(radius);
            let x1 = (x + radius + 1).min(width);
            let y1 = (y + radius + 1).min(height);

            let area = u64::from((x1 - x0) * (y1 - y0));
            let mean = (sums.sum(x0, y0, x1, y1) / area) as i32;

            let ink = i32::from(image.get_pixel(x, y)[0]) <= mean - self.offset;
            Luma([if ink { 0 } else { 255 }])
        })
    }
}

/// Summed-area table with a zero row and column in front.
struct IntegralImage {
    stride: usize,
    table: Vec<u64>,
}

impl IntegralImage {
    fn new(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let stride = width as usize + 1;
        let mut table = vec![0u64; stride * (height as usize + 1)];

        for (y, row) in image.rows().enumerate() {
            let mut row_sum = 0u64;
            for (x, pixel) in row.enumerate() {
                row_sum += u64::from(pixel[0]);
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
            }
        }

        Self { stride, table }
    }

    /// Sum over the half-open rectangle `[x0, x1) x [y0, y1)`.
    fn sum(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> u64 {
        let at = |x: u32, y: u32| self.table[y as usize * self.stride + x as usize];
        at(x1, y1) + at(x0, y0) - at(x0, y1) - at(x1, y0)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}
