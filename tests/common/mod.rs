//! Writes small stripped TIFF files for the integration tests

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Sample type of a test file
#[derive(Clone, Copy, PartialEq)]
pub enum Samples {
    U16,
    F32,
}

/// Description of a test raster
#[derive(Clone)]
pub struct TestRaster {
    pub pages: usize,
    pub height: u32,
    pub width: u32,
    pub samples: u16,
    pub sample_type: Samples,
    pub big_endian: bool,
    pub compression: u16,
    pub description: Option<String>,
}

impl TestRaster {
    pub fn new(pages: usize, height: u32, width: u32, samples: u16) -> Self {
        TestRaster {
            pages,
            height,
            width,
            samples,
            sample_type: Samples::U16,
            big_endian: false,
            compression: 1,
            description: None,
        }
    }

    pub fn len(&self) -> usize {
        self.pages * (self.height * self.width) as usize * self.samples as usize
    }

    /// Write the raster with `values` (C order) to `dir/name`
    pub fn write(&self, dir: &Path, name: &str, values: &[f64]) -> PathBuf {
        assert_eq!(values.len(), self.len());
        let bytes = if self.big_endian {
            self.encode::<BigEndian>(values)
        } else {
            self.encode::<LittleEndian>(values)
        };

        let path = dir.join(name);
        File::create(&path).unwrap().write_all(&bytes).unwrap();
        path
    }

    fn encode<B: ByteOrder>(&self, values: &[f64]) -> Vec<u8> {
        let (bits, format, itemsize) = match self.sample_type {
            Samples::U16 => (16u32, 1u32, 2u32),
            Samples::F32 => (32, 3, 4),
        };
        let page_bytes = self.height * self.width * self.samples as u32 * itemsize;

        let mut buffer = Vec::new();
        buffer.extend_from_slice(if self.big_endian { b"MM" } else { b"II" });
        buffer.write_u16::<B>(42).unwrap();
        buffer.write_u32::<B>(0).unwrap();

        for &v in values {
            match self.sample_type {
                Samples::U16 => buffer.write_u16::<B>(v as u16).unwrap(),
                Samples::F32 => buffer.write_f32::<B>(v as f32).unwrap(),
            }
        }

        let description = self.description.as_ref().map(|d| {
            let offset = buffer.len() as u32;
            buffer.extend_from_slice(d.as_bytes());
            buffer.push(0);
            (offset, d.len() as u32 + 1)
        });
        if buffer.len() % 2 == 1 {
            buffer.push(0);
        }

        let first_ifd = buffer.len() as u32;
        B::write_u32(&mut buffer[4..8], first_ifd);

        for page in 0..self.pages {
            // (tag, type, count, value)
            let mut entries: Vec<(u16, u16, u32, u32)> = vec![
                (256, 4, 1, self.width),
                (257, 4, 1, self.height),
                (258, 3, 1, bits),
                (259, 3, 1, self.compression as u32),
                (262, 3, 1, 1),
            ];
            if let (0, Some((offset, count))) = (page, description) {
                entries.push((270, 2, count, offset));
            }
            entries.extend([
                (273, 4, 1, 8 + page as u32 * page_bytes),
                (277, 3, 1, self.samples as u32),
                (278, 4, 1, self.height),
                (279, 4, 1, page_bytes),
                (339, 3, 1, format),
            ]);

            let next = buffer.len() as u32 + 2 + entries.len() as u32 * 12 + 4;
            buffer.write_u16::<B>(entries.len() as u16).unwrap();
            for (tag, field_type, count, value) in entries {
                buffer.write_u16::<B>(tag).unwrap();
                buffer.write_u16::<B>(field_type).unwrap();
                buffer.write_u32::<B>(count).unwrap();
                if field_type == 3 {
                    buffer.write_u16::<B>(value as u16).unwrap();
                    buffer.write_u16::<B>(0).unwrap();
                } else {
                    buffer.write_u32::<B>(value).unwrap();
                }
            }
            buffer.write_u32::<B>(if page + 1 < self.pages { next } else { 0 }).unwrap();
        }

        buffer
    }
}

/// `0, 1, 2, ...` for `n` elements
pub fn ramp(n: usize) -> Vec<f64> {
    (0..n).map(|v| v as f64).collect()
}
