use crate::card::canvas::blend_at;
use crate::error::AppError;
use font_kit::family_name::FamilyName;
use font_kit::handle::Handle;
use font_kit::properties::{Properties, Weight};
use font_kit::source::SystemSource;
use fontdue::{Font, FontSettings};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Regular and bold faces used for every line on the card.
pub struct Typesetter {
    regular: Font,
    bold: Font,
}

fn parse_font(bytes: &[u8], collection_index: u32) -> Result<Font, AppError> {
    Font::from_bytes(
        bytes,
        FontSettings {
            collection_index,
            ..FontSettings::default()
        },
    )
    .map_err(|e| AppError::Font(e.to_string()))
}

fn system_font(weight: Weight) -> Result<(Vec<u8>, u32), AppError> {
    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], Properties::new().weight(weight))
        .map_err(|e| AppError::Font(format!("no system sans-serif font: {e:?}")))?;
    match handle {
        Handle::Path { path, font_index } => Ok((fs::read(path)?, font_index)),
        Handle::Memory { bytes, font_index } => Ok((bytes.to_vec(), font_index)),
    }
}

fn load_face(path: Option<&Path>, weight: Weight) -> Result<Font, AppError> {
    let (bytes, index) = match path {
        Some(p) => (fs::read(p)?, 0),
        None => system_font(weight)?,
    };
    parse_font(&bytes, index)
}

impl Typesetter {
    pub fn from_fonts(regular: Font, bold: Font) -> Self {
        Self { regular, bold }
    }

    /// Configured font files first, then the system's sans-serif family.
    /// Without a separate bold face the regular one is reused.
    pub fn discover(regular: Option<&Path>, bold: Option<&Path>) -> Result<Self, AppError> {
        let regular_face = load_face(regular, Weight::NORMAL)?;
        let bold_face = match load_face(bold, Weight::BOLD) {
            Ok(face) => face,
            Err(e) => {
                tracing::debug!("bold face unavailable, reusing regular: {e}");
                load_face(regular, Weight::NORMAL)?
            }
        };
        Ok(Self::from_fonts(regular_face, bold_face))
    }

    fn face(&self, weight: FontWeight) -> &Font {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }

    /// Draws `text` with its baseline at `baseline`, starting at `x`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &self,
        img: &mut RgbaImage,
        text: &str,
        x: f32,
        baseline: f32,
        px: f32,
        weight: FontWeight,
        color: Rgba<u8>,
        alpha: f32,
    ) {
        let font = self.face(weight);
        let mut pen = x;
        for ch in text.chars() {
            if font.lookup_glyph_index(ch) == 0 {
                if ch == ' ' {
                    pen += px * 0.25;
                }
                continue;
            }
            let (metrics, coverage) = font.rasterize(ch, px);
            let left = (pen + metrics.xmin as f32).round() as i64;
            let top = (baseline - metrics.height as f32 - metrics.ymin as f32).round() as i64;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let c = coverage[row * metrics.width + col];
                    if c == 0 {
                        continue;
                    }
                    let a = alpha * f32::from(c) / 255.0;
                    blend_at(img, left + col as i64, top + row as i64, color, a);
                }
            }
            pen += metrics.advance_width;
        }
    }
}
