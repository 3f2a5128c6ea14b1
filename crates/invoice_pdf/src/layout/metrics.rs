//! Font metrics
//!
//! Text is set in DejaVu Sans. The same files are embedded in the PDF and
//! measured here with `ttf-parser`, so wrapped lines match what is printed.

use once_cell::sync::Lazy;
use tracing::warn;
use ttf_parser::Face;

static REGULAR_DATA: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");
static BOLD_DATA: &[u8] = include_bytes!("../../fonts/DejaVuSans-Bold.ttf");

static REGULAR: Lazy<Option<Face<'static>>> = Lazy::new(|| parse("DejaVuSans", REGULAR_DATA));
static BOLD: Lazy<Option<Face<'static>>> = Lazy::new(|| parse("DejaVuSans-Bold", BOLD_DATA));

/// Advance in em for characters the face cannot measure
const FALLBACK_ADVANCE: f64 = 0.6;

fn parse(name: &str, data: &'static [u8]) -> Option<Face<'static>> {
    match Face::parse(data, 0) {
        Ok(face) => Some(face),
        Err(e) => {
            warn!(font = name, error = %e, "Bundled font could not be parsed");
            None
        }
    }
}

/// The two weights used in documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    /// TrueType data to embed
    pub fn data(self) -> &'static [u8] {
        match self {
            Font::Regular => REGULAR_DATA,
            Font::Bold => BOLD_DATA,
        }
    }

    fn face(self) -> Option<&'static Face<'static>> {
        match self {
            Font::Regular => REGULAR.as_ref(),
            Font::Bold => BOLD.as_ref(),
        }
    }

    /// Width of `text` in points at `size`
    pub fn text_width(self, text: &str, size: f64) -> f64 {
        let Some(face) = self.face() else {
            return text.chars().count() as f64 * FALLBACK_ADVANCE * size;
        };
        let units_per_em = f64::from(face.units_per_em());
        let em: f64 = text
            .chars()
            .map(|c| {
                face.glyph_index(c)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| f64::from(advance) / units_per_em)
                    .unwrap_or(FALLBACK_ADVANCE)
            })
            .sum();
        em * size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_faces_parse() {
        assert!(Font::Regular.face().is_some());
        assert!(Font::Bold.face().is_some());
    }

    #[test]
    fn test_text_width() {
        assert!((Font::Regular.text_width("one two three", 10.0) - 69.858).abs() < 0.01);
        assert!(Font::Bold.text_width("Totals", 10.0) > Font::Regular.text_width("Totals", 10.0));
        assert_eq!(Font::Regular.text_width("", 10.0), 0.0);
    }

    #[test]
    fn test_pound_sign_has_a_glyph() {
        assert!((Font::Regular.text_width("£", 10.0) - 6.362).abs() < 0.01);
    }

    proptest::proptest! {
        #[test]
        fn prop_width_adds_up(a in "[ -~£]{0,20}", b in "[ -~£]{0,20}") {
            let joined = Font::Regular.text_width(&format!("{}{}", a, b), 10.0);
            let parts = Font::Regular.text_width(&a, 10.0) + Font::Regular.text_width(&b, 10.0);
            proptest::prop_assert!((joined - parts).abs() < 1e-9);
        }
    }
}
