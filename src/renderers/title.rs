// ABOUTME: Title slide renderer for the slide-report application
// ABOUTME: Builds a title slide with the record's content as subtitle

use super::{titled_slide, Renderer};
use crate::errors::Result;
use crate::pptx::{Layout, Slide};
use crate::record::Record;
use crate::session::DocumentSession;

/// Title slide: title plus a subtitle taken from `content`
#[derive(Debug, Default)]
pub struct TitleRenderer;

impl Renderer for TitleRenderer {
    fn name(&self) -> &'static str {
        "title"
    }

    fn layout(&self) -> Layout {
        Layout::Title
    }

    fn build(&self, record: &Record, _session: &mut DocumentSession) -> Result<Slide> {
        let mut slide = titled_slide(self.layout(), record)?;
        slide.body_placeholder()?.set_text(record.content_str()?);
        Ok(slide)
    }
}
