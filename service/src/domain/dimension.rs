use crate::domain::dimension::Dimension::{Height, Width};

/// Largest width or height a stored photo may have.
pub const BOUNDING_BOX: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    /// `None` when either side is zero.
    pub fn new(width: u32, height: u32) -> Option<Dimensions> {
        (width > 0 && height > 0).then_some(Dimensions { width, height })
    }

    pub fn fits_within(&self, bound: u32) -> bool {
        self.width <= bound && self.height <= bound
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// The side of an image that gets pinned to a fixed length when scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Height(u32),
    Width(u32),
}

impl Dimension {
    /// Wider-than-tall sources pin the width, everything else (square included) pins the height.
    pub fn bounding(source: Dimensions, bound: u32) -> Dimension {
        if source.aspect_ratio() > 1.0 {
            Width(bound)
        } else {
            Height(bound)
        }
    }

    /// Dimensions of `source` scaled so the pinned side matches, keeping the aspect ratio.
    pub fn scale(&self, source: Dimensions) -> Dimensions {
        let aspect_ratio = source.aspect_ratio();
        match *self {
            Width(new_width) => Dimensions {
                width: new_width,
                height: round_side(new_width as f64 / aspect_ratio),
            },
            Height(new_height) => Dimensions {
                width: round_side(new_height as f64 * aspect_ratio),
                height: new_height,
            },
        }
    }
}

fn round_side(length: f64) -> u32 {
    length.round().max(1.0) as u32
}
