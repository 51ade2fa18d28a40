//! Offscreen RGBA drawing surface.
//!
//! Behaves like a browser `OffscreenCanvas` with a 2D context: a fixed-size
//! transparent backing store, reads outside the surface yield transparent
//! black, and the context can be lost.

/// Options passed when acquiring a 2D context
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ContextSettings {
    pub will_read_frequently: bool,
}

/// RGBA pixels read back from a surface.
///
/// Invariant: `data.len() == width * height * 4`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageData {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ImageData {
    /// Transparent image
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wrap an existing buffer. None if its length does not match.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Move the pixel buffer out without copying.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

#[derive(Debug)]
pub struct OffscreenSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    context_lost: bool,
}

impl OffscreenSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
            context_lost: false,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// None while the context is lost.
    pub fn get_context_2d(&mut self, settings: ContextSettings) -> Option<Context2d<'_>> {
        if self.context_lost {
            return None;
        }
        Some(Context2d {
            surface: self,
            settings,
        })
    }

    /// Simulate the browser dropping the drawing context.
    pub fn lose_context(&mut self) {
        self.context_lost = true;
    }

    pub fn restore_context(&mut self) {
        self.context_lost = false;
    }
}

/// Borrowed drawing context of an [`OffscreenSurface`].
pub struct Context2d<'a> {
    surface: &'a mut OffscreenSurface,
    settings: ContextSettings,
}

impl Context2d<'_> {
    pub fn settings(&self) -> ContextSettings {
        self.settings
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.surface.width, self.surface.height)
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.surface.pixels.fill(0);
    }

    /// Copy `image` onto the surface at (dx, dy), clipping at the edges.
    pub fn put_image_data(&mut self, image: &ImageData, dx: i64, dy: i64) {
        let surface_w = self.surface.width as i64;
        let surface_h = self.surface.height as i64;

        for row in 0..image.height as i64 {
            let y = dy + row;
            if y < 0 || y >= surface_h {
                continue;
            }
            let x_start = dx.max(0);
            let x_end = (dx + image.width as i64).min(surface_w);
            if x_start >= x_end {
                continue;
            }

            let src = ((row * image.width as i64 + (x_start - dx)) * 4) as usize;
            let dst = ((y * surface_w + x_start) * 4) as usize;
            let len = ((x_end - x_start) * 4) as usize;
            self.surface.pixels[dst..dst + len].copy_from_slice(&image.data[src..src + len]);
        }
    }

    /// Read a `sw` x `sh` block starting at (sx, sy).
    ///
    /// Pixels outside the surface come back as transparent black, so the
    /// result always has exactly `sw * sh * 4` bytes.
    pub fn get_image_data(&self, sx: i64, sy: i64, sw: u32, sh: u32) -> ImageData {
        let mut image = ImageData::new(sw, sh);
        let surface_w = self.surface.width as i64;
        let surface_h = self.surface.height as i64;

        for row in 0..sh as i64 {
            let y = sy + row;
            if y < 0 || y >= surface_h {
                continue;
            }
            let x_start = sx.max(0);
            let x_end = (sx + sw as i64).min(surface_w);
            if x_start >= x_end {
                continue;
            }

            let src = ((y * surface_w + x_start) * 4) as usize;
            let dst = ((row * sw as i64 + (x_start - sx)) * 4) as usize;
            let len = ((x_end - x_start) * 4) as usize;
            image.data[dst..dst + len].copy_from_slice(&self.surface.pixels[src..src + len]);
        }
        image
    }
}
