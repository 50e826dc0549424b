// ABOUTME: Presentation document model for the slide-report application
// ABOUTME: Slides, placeholders, text boxes and pictures, with open/save of .pptx packages

mod parts;
mod reader;
mod writer;

use crate::errors::{ReportError, Result};
use crate::utils;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

pub const EMU_PER_INCH: i64 = 914_400;
/// 10in x 7.5in
pub const SLIDE_WIDTH: i64 = 9_144_000;
pub const SLIDE_HEIGHT: i64 = 6_858_000;
/// OOXML supports bullet levels 0 through 8
pub const MAX_PARAGRAPH_LEVEL: u32 = 8;

/// Convert inches to English Metric Units
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// Position and size of a shape, in EMU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Rect {
    pub fn from_inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: inches(x),
            y: inches(y),
            cx: inches(width),
            cy: inches(height),
        }
    }
}

/// Predefined slide templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Centered title with a subtitle placeholder
    Title,
    /// Title with a bulleted body placeholder
    TitleAndContent,
    /// Title placeholder only
    TitleOnly,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Title, Layout::TitleAndContent, Layout::TitleOnly];

    pub fn name(&self) -> &'static str {
        match self {
            Layout::Title => "Title Slide",
            Layout::TitleAndContent => "Title and Content",
            Layout::TitleOnly => "Title Only",
        }
    }

    /// Number of the `slideLayoutN.xml` part
    pub fn part_number(&self) -> usize {
        match self {
            Layout::Title => 1,
            Layout::TitleAndContent => 2,
            Layout::TitleOnly => 3,
        }
    }

    pub fn from_part_number(number: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.part_number() == number)
    }

    pub(crate) fn ooxml_type(&self) -> &'static str {
        match self {
            Layout::Title => "title",
            Layout::TitleAndContent => "obj",
            Layout::TitleOnly => "titleOnly",
        }
    }

    /// Whether the layout carries a body placeholder (subtitle or content)
    pub fn has_body(&self) -> bool {
        !matches!(self, Layout::TitleOnly)
    }
}

/// One paragraph of a text frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub level: u32,
}

/// The paragraphs of a placeholder or text box
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFrame {
    paragraphs: Vec<Paragraph>,
}

impl TextFrame {
    /// Replace the frame content with a single top-level paragraph
    pub fn set_text(&mut self, text: &str) {
        self.paragraphs = vec![Paragraph {
            text: text.to_string(),
            level: 0,
        }];
    }

    /// Append a paragraph at the given indentation level
    pub fn add_paragraph(&mut self, text: &str, level: u32) -> Result<()> {
        if level > MAX_PARAGRAPH_LEVEL {
            return Err(ReportError::ValidationError(format!(
                "paragraph level {} exceeds maximum of {}",
                level, MAX_PARAGRAPH_LEVEL
            )));
        }
        self.paragraphs.push(Paragraph {
            text: text.to_string(),
            level,
        });
        Ok(())
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }
}

/// Encoded image formats a picture shape can embed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl PictureFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            PictureFormat::Png => "png",
            PictureFormat::Jpeg => "jpeg",
            PictureFormat::Gif => "gif",
            PictureFormat::Bmp => "bmp",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(PictureFormat::Png),
            "jpeg" | "jpg" => Some(PictureFormat::Jpeg),
            "gif" => Some(PictureFormat::Gif),
            "bmp" => Some(PictureFormat::Bmp),
            _ => None,
        }
    }

    /// Sniff the format from the encoded bytes
    pub fn detect(data: &[u8]) -> Result<Self> {
        match image::guess_format(data)? {
            image::ImageFormat::Png => Ok(PictureFormat::Png),
            image::ImageFormat::Jpeg => Ok(PictureFormat::Jpeg),
            image::ImageFormat::Gif => Ok(PictureFormat::Gif),
            image::ImageFormat::Bmp => Ok(PictureFormat::Bmp),
            other => Err(ReportError::ValidationError(format!(
                "unsupported picture format: {:?}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    pub name: String,
    pub frame: Rect,
    pub format: PictureFormat,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    TextBox { frame: Rect, text: TextFrame },
    Picture(Picture),
}

/// A single slide: layout, title placeholder, body placeholder and free shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    layout: Layout,
    title: Option<String>,
    body: TextFrame,
    shapes: Vec<Shape>,
}

impl Slide {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            title: None,
            body: TextFrame::default(),
            shapes: Vec::new(),
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The body placeholder (subtitle on the title layout)
    pub fn body_placeholder(&mut self) -> Result<&mut TextFrame> {
        if !self.layout.has_body() {
            return Err(ReportError::PptxError(format!(
                "layout '{}' has no body placeholder",
                self.layout.name()
            )));
        }
        Ok(&mut self.body)
    }

    pub fn body(&self) -> &TextFrame {
        &self.body
    }

    /// Add a text box holding a single plain paragraph
    pub fn add_text_box(&mut self, frame: Rect, text: &str) {
        let mut content = TextFrame::default();
        content.set_text(text);
        self.shapes.push(Shape::TextBox {
            frame,
            text: content,
        });
    }

    /// Add a picture from encoded image bytes
    pub fn add_picture(&mut self, data: Vec<u8>, frame: Rect) -> Result<()> {
        let format = PictureFormat::detect(&data)?;
        let name = format!("Picture {}", self.shapes.len() + 1);
        self.shapes.push(Shape::Picture(Picture {
            name,
            frame,
            format,
            data,
        }));
        Ok(())
    }

    /// Add a picture read from an image file on disk
    pub fn add_picture_file(&mut self, path: &Path, frame: Rect) -> Result<()> {
        utils::validate_file_exists(path)?;
        let data = fs::read(path).map_err(ReportError::FileReadError)?;
        self.add_picture(data, frame)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn pictures(&self) -> impl Iterator<Item = &Picture> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::Picture(picture) => Some(picture),
            _ => None,
        })
    }

    pub fn text_boxes(&self) -> impl Iterator<Item = (&Rect, &TextFrame)> {
        self.shapes.iter().filter_map(|shape| match shape {
            Shape::TextBox { frame, text } => Some((frame, text)),
            _ => None,
        })
    }

    pub(crate) fn push_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub(crate) fn set_body(&mut self, body: TextFrame) {
        self.body = body;
    }
}

/// An in-memory presentation that can be saved to and opened from a .pptx file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presentation {
    title: String,
    slides: Vec<Slide>,
}

impl Presentation {
    /// Create an empty presentation
    pub fn new() -> Self {
        Self {
            title: "Presentation".to_string(),
            slides: Vec::new(),
        }
    }

    /// Open a presentation previously written by [`Presentation::save`]
    pub fn open(path: &Path) -> Result<Self> {
        utils::validate_file_exists(path)?;
        let file = fs::File::open(path).map_err(ReportError::FileReadError)?;
        reader::read_package(file)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// Append a new slide with the given layout and return it for editing
    pub fn add_slide(&mut self, layout: Layout) -> &mut Slide {
        self.slides.push(Slide::new(layout));
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    /// Append an already assembled slide
    pub fn push_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Save the presentation to `path`.
    ///
    /// The package is written next to the target and renamed over it, so the
    /// previous file stays intact if writing fails part way.
    pub fn save(&self, path: &Path) -> Result<()> {
        utils::ensure_parent_directory_exists(path)?;
        let partial = partial_path(path);
        let file = fs::File::create(&partial).map_err(ReportError::FileReadError)?;
        if let Err(e) = writer::write_package(self, file) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }
        fs::rename(&partial, path).map_err(ReportError::FileReadError)?;
        debug!("Saved {} slides to {:?}", self.slides.len(), path);
        Ok(())
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
