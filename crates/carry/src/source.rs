use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};

use image::RgbaImage;
use crate::error::{CarryError, Result};

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Where frames come from (a camera, a recording, a test fixture)
pub trait FrameSource {
    /// Next frame, or `None` once the source is exhausted
    fn next_frame(&mut self) -> Result<Option<RgbaImage>>;

    /// Get a human-readable description of this source
    fn description(&self) -> String;
}

/// Where rendered frames go
pub trait FrameSink {
    fn write_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()>;

    /// Get a human-readable description of this sink
    fn description(&self) -> String;
}

/// Image files in a directory, played back in file-name order
#[derive(Debug, Clone)]
pub struct ImageSequenceSource {
    dir: PathBuf,
    pending: VecDeque<PathBuf>,
}

impl ImageSequenceSource {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(CarryError::FrameSource(format!(
                "Frame directory not found: {}",
                dir.display()
            )));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_frame_file(path))
            .collect();
        paths.sort();

        Ok(Self {
            dir,
            pending: paths.into(),
        })
    }

    /// Frames not yet read
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

fn is_frame_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

impl FrameSource for ImageSequenceSource {
    fn next_frame(&mut self) -> Result<Option<RgbaImage>> {
        let Some(path) = self.pending.pop_front() else {
            return Ok(None);
        };
        let frame = image::open(&path)?.to_rgba8();
        Ok(Some(frame))
    }

    fn description(&self) -> String {
        format!("Image sequence: {}", self.dir.display())
    }
}

/// Writes numbered PNG files into a directory
#[derive(Debug, Clone)]
pub struct ImageSequenceSink {
    dir: PathBuf,
}

impl ImageSequenceSink {
    /// Create the sink, creating the output directory if needed
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{index:06}.png"))
    }
}

impl FrameSink for ImageSequenceSink {
    fn write_frame(&mut self, index: u64, frame: &RgbaImage) -> Result<()> {
        frame.save(self.frame_path(index))?;
        Ok(())
    }

    fn description(&self) -> String {
        format!("Image sequence: {}", self.dir.display())
    }
}
