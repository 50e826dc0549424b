// ABOUTME: Text slide renderer for the slide-report application
// ABOUTME: Builds a title-only slide with the record's content in a fixed text box

use super::{titled_slide, Renderer};
use crate::errors::Result;
use crate::pptx::{Layout, Rect, Slide, EMU_PER_INCH};
use crate::record::Record;
use crate::session::DocumentSession;

/// 1.28in, 1.18in, 5.81in x 0.4in
pub const TEXT_BOX_FRAME: Rect = Rect {
    x: 128 * EMU_PER_INCH / 100,
    y: 118 * EMU_PER_INCH / 100,
    cx: 581 * EMU_PER_INCH / 100,
    cy: 40 * EMU_PER_INCH / 100,
};

/// Plain text slide: title plus one text box holding `content`
#[derive(Debug, Default)]
pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn layout(&self) -> Layout {
        Layout::TitleOnly
    }

    fn build(&self, record: &Record, _session: &mut DocumentSession) -> Result<Slide> {
        let mut slide = titled_slide(self.layout(), record)?;
        slide.add_text_box(TEXT_BOX_FRAME, record.content_str()?);
        Ok(slide)
    }
}
