use std::path::PathBuf;

use chrono::NaiveDate;

pub const FONT_ENV: &str = "WORKSHEET_PDF_FONT";
pub const BOLD_FONT_ENV: &str = "WORKSHEET_PDF_BOLD_FONT";

/// Page size and the margins reserved for the masthead and footer bands.
/// All values are PDF points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl PageGeometry {
    pub const LETTER: PageGeometry = PageGeometry {
        page_width: 612.0,
        page_height: 792.0,
        margin_top: 96.0,
        margin_bottom: 64.0,
        margin_left: 48.0,
        margin_right: 48.0,
    };

    /// Vertical space a fresh page offers to flowing content.
    pub fn content_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::LETTER
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PageNumberStyle {
    /// "Page 3"
    #[default]
    Plain,
    /// "Page 3 of 7"
    OfTotal,
}

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub geometry: PageGeometry,
    pub brand_name: String,
    /// PNG or JPEG bytes for the masthead mark. Skipped when absent or
    /// undecodable.
    pub brand_mark: Option<Vec<u8>>,
    pub printed_on: NaiveDate,
    pub page_numbers: PageNumberStyle,
    /// Flate-compress page content streams.
    pub compress: bool,
    /// TrueType/OpenType faces to embed instead of builtin Helvetica.
    pub regular_font: Option<PathBuf>,
    pub bold_font: Option<PathBuf>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::LETTER,
            brand_name: "CPT Worksheets".to_string(),
            brand_mark: None,
            printed_on: chrono::Local::now().date_naive(),
            page_numbers: PageNumberStyle::Plain,
            compress: true,
            regular_font: None,
            bold_font: None,
        }
    }
}

impl ExportOptions {
    /// Font paths from the options, falling back to the environment.
    pub(crate) fn font_paths(&self) -> (Option<PathBuf>, Option<PathBuf>) {
        let from_env = |var: &str| {
            std::env::var(var)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        (
            self.regular_font.clone().or_else(|| from_env(FONT_ENV)),
            self.bold_font.clone().or_else(|| from_env(BOLD_FONT_ENV)),
        )
    }
}
