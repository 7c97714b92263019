use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use carry::RenderSettings;
use hand::gesture::DEFAULT_PINCH_RATIO;
use image::ImageFormat;
use pieces::{Piece, SegmentationSettings};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ImageError(#[from] image::ImageError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct GestureSettings {
    /// Pinch when thumb-to-index distance is below this multiple of the
    /// index finger's base segment length
    pub pinch_ratio: f32,
    /// Hands reported with a lower confidence are ignored
    #[schemars(range(min = 0.0, max = 1.0))]
    pub min_hand_score: f32,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            pinch_ratio: DEFAULT_PINCH_RATIO,
            min_hand_score: 0.0,
        }
    }
}

/// Replay session configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CarryConfig {
    /// Directory of camera frames (png / jpg), played in file-name order
    pub input_dir: PathBuf,
    /// Rendered frames are written here as numbered PNG files
    pub output_dir: PathBuf,
    /// JSON-lines hand recording, one line per frame
    pub hands: PathBuf,
    #[serde(default)]
    pub segmentation: SegmentationSettings,
    #[serde(default)]
    pub gesture: GestureSettings,
    #[serde(default)]
    pub render: RenderSettings,
}

impl CarryConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(ConfigError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }
}

/// Pretty-printed JSON schema of [`CarryConfig`]
pub fn config_schema() -> Result<String, ConfigError> {
    let schema = schemars::schema_for!(CarryConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// One detected piece as reported by `piece-carry detect`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieceRecord {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub contour_points: usize,
    /// Masked crop, PNG encoded, base64
    pub image_png: String,
}

impl PieceRecord {
    pub fn from_piece(index: usize, piece: &Piece) -> Result<Self, ConfigError> {
        let mut png = Vec::new();
        piece.image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        let bbox = piece.bounding_box;
        Ok(Self {
            index,
            x: bbox.x,
            y: bbox.y,
            width: bbox.width,
            height: bbox.height,
            contour_points: piece.contour_points,
            image_png: STANDARD.encode(png),
        })
    }

    pub fn decode_png(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.image_png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use pieces::{BoundingBox, algorithms::ChainApproximation};

    const MINIMAL_TOML: &str = r#"
input_dir = "frames"
output_dir = "out"
hands = "hands.jsonl"
"#;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config = CarryConfig::from_toml(MINIMAL_TOML).unwrap();
        assert_eq!(config.input_dir, PathBuf::from("frames"));
        assert_eq!(config.segmentation, SegmentationSettings::default());
        assert_eq!(config.gesture.pinch_ratio, 2.0);
        assert!(config.render.desaturate_while_holding);
        assert!(!config.render.mirror);
    }

    #[test]
    fn test_sections_override_defaults() {
        let content = format!(
            "{MINIMAL_TOML}
[segmentation]
process_ratio = 0.2
chain_approximation = \"full\"

[gesture]
min_hand_score = 0.5

[render]
show_boxes = true
"
        );
        let config = CarryConfig::from_toml(&content).unwrap();
        assert_eq!(config.segmentation.process_ratio, 0.2);
        assert_eq!(config.segmentation.chain_approximation, ChainApproximation::Full);
        assert_eq!(config.segmentation.min_box_size, 50.0);
        assert_eq!(config.gesture.min_hand_score, 0.5);
        assert_eq!(config.gesture.pinch_ratio, 2.0);
        assert!(config.render.show_boxes);
    }

    #[test]
    fn test_toml_and_json_agree() {
        let config = CarryConfig::from_toml(MINIMAL_TOML).unwrap();
        let from_json = CarryConfig::from_json(&config.to_json().unwrap()).unwrap();
        let from_toml = CarryConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(from_json, config);
        assert_eq!(from_toml, config);
    }

    #[test]
    fn test_missing_paths_rejected() {
        let result = CarryConfig::from_toml("input_dir = \"frames\"");
        assert!(matches!(result, Err(ConfigError::TomlDeError(_))));
    }

    #[test]
    fn test_unknown_extension() {
        let result = CarryConfig::from_file("config.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFileFormat)));
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = config_schema().unwrap();
        assert!(schema.contains("segmentation"));
        assert!(schema.contains("pinch_ratio"));
    }

    #[test]
    fn test_piece_record_embeds_png() {
        let piece = Piece {
            bounding_box: BoundingBox::new(12.0, 8.0, 3.0, 2.0),
            image: RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 255])),
            contour_points: 24,
        };
        let record = PieceRecord::from_piece(0, &piece).unwrap();
        assert_eq!((record.x, record.width), (12.0, 3.0));

        let png = record.decode_png().unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, piece.image);
    }
}
