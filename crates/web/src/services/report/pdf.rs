//! PDF assembly.
//!
//! A4 pages, Helvetica built-in fonts (WinAnsi), greedy line wrapping and page
//! breaks. Line widths are estimated from an average Helvetica glyph width,
//! which keeps lines inside the margins for prose.

use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

use super::ReportError;
use super::chart::RadarChart;
use super::text::{encode_latin1, wrap};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const AVG_GLYPH_WIDTH: f32 = 0.5;
const CHART_WIDTH: f32 = 300.0;

/// Font faces available in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
    Italic,
}

impl Face {
    const fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
            Self::Italic => "F3",
        }
    }

    const fn base_font(self) -> &'static str {
        match self {
            Self::Regular => "Helvetica",
            Self::Bold => "Helvetica-Bold",
            Self::Italic => "Helvetica-Oblique",
        }
    }
}

/// One unit of document content.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Large centred line.
    Title(String),
    /// Small centred line.
    Byline(String),
    /// Section heading.
    Heading(String),
    /// Bold line inside a section.
    Subheading(String),
    /// Wrapped body text.
    Text(String),
    /// Wrapped italic text.
    Quote(String),
    /// Vertical space in points.
    Gap(f32),
    /// The radar chart, centred.
    Chart,
}

/// Page-by-page content stream builder.
struct Layout {
    pages: Vec<Vec<Operation>>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn ensure(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn current(&mut self) -> &mut Vec<Operation> {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn line(&mut self, face: Face, size: f32, text: &str, centred: bool) {
        let leading = size * 1.4;
        self.ensure(leading);
        self.y -= leading;

        let x = if centred {
            #[allow(clippy::cast_precision_loss)] // short lines
            let width = text.chars().count() as f32 * size * AVG_GLYPH_WIDTH;
            ((PAGE_WIDTH - width) / 2.0).max(MARGIN)
        } else {
            MARGIN
        };
        let y = self.y;

        self.current().extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![face.resource().into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_latin1(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn wrapped(&mut self, face: Face, size: f32, text: &str) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // positive, small
        let max_chars = ((PAGE_WIDTH - 2.0 * MARGIN) / (size * AVG_GLYPH_WIDTH)) as usize;
        for line in wrap(text, max_chars) {
            self.line(face, size, &line, false);
        }
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn image(&mut self, name: &str, width: f32, height: f32) {
        self.ensure(height + 10.0);
        self.y -= height + 10.0;
        let x = (PAGE_WIDTH - width) / 2.0;
        let y = self.y;

        self.current().extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![name.into()]),
            Operation::new("Q", vec![]),
        ]);
    }
}

/// Lay out `blocks` and write the document to `path`.
///
/// `Block::Chart` is skipped when `chart` is `None`.
///
/// # Errors
///
/// Returns `ReportError::Pdf` if encoding fails and `ReportError::Io` if the
/// file cannot be written.
pub fn write(
    blocks: &[Block],
    chart: Option<&RadarChart>,
    path: &Path,
) -> Result<usize, ReportError> {
    let mut layout = Layout::new();
    for block in blocks {
        match block {
            Block::Title(text) => layout.line(Face::Bold, 18.0, text, true),
            Block::Byline(text) => layout.line(Face::Regular, 10.0, text, true),
            Block::Heading(text) => {
                layout.gap(6.0);
                layout.line(Face::Bold, 13.0, text, false);
            }
            Block::Subheading(text) => layout.line(Face::Bold, 11.0, text, false),
            Block::Text(text) => layout.wrapped(Face::Regular, 10.0, text),
            Block::Quote(text) => layout.wrapped(Face::Italic, 11.0, text),
            Block::Gap(height) => layout.gap(*height),
            Block::Chart => {
                if let Some(chart) = chart {
                    #[allow(clippy::cast_precision_loss)] // 600 px
                    let height = CHART_WIDTH * chart.height as f32 / chart.width as f32;
                    layout.image("Im1", CHART_WIDTH, height);
                }
            }
        }
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let resources_id = add_resources(&mut doc, chart);

    let mut kids: Vec<Object> = Vec::with_capacity(layout.pages.len());
    for operations in layout.pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len();
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => i64::try_from(page_count).unwrap_or(i64::MAX),
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    doc.save(path)?;

    Ok(page_count)
}

fn add_resources(doc: &mut Document, chart: Option<&RadarChart>) -> ObjectId {
    let mut fonts = lopdf::Dictionary::new();
    for face in [Face::Regular, Face::Bold, Face::Italic] {
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => face.base_font(),
            "Encoding" => "WinAnsiEncoding",
        });
        fonts.set(face.resource(), font_id);
    }

    let mut resources = dictionary! { "Font" => fonts };
    if let Some(chart) = chart {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(chart.width),
                "Height" => i64::from(chart.height),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            chart.rgb.clone(),
        ));
        resources.set("XObject", dictionary! { "Im1" => image_id });
    }

    doc.add_object(resources)
}
