// ABOUTME: Slide renderers for the slide-report application
// ABOUTME: One renderer per record type, each turning a record into a single slide

mod list;
mod picture;
mod plot;
mod text;
mod title;

pub use list::ListRenderer;
pub use picture::{PictureRenderer, PICTURE_FRAME};
pub use plot::{load_plot_data, parse_plot_data, PlotRenderer, PLOT_FRAME};
pub use text::{TextRenderer, TEXT_BOX_FRAME};
pub use title::TitleRenderer;

use crate::errors::Result;
use crate::pptx::{Layout, Slide};
use crate::record::Record;
use crate::session::DocumentSession;

/// Turns one record of a given type into one slide
pub trait Renderer {
    /// The record type this renderer handles
    fn name(&self) -> &'static str;

    /// The layout every slide from this renderer uses
    fn layout(&self) -> Layout;

    /// Assemble the slide for `record`.
    ///
    /// Recoverable problems are reported to `session`; an `Err` means the
    /// record cannot produce a slide.
    fn build(&self, record: &Record, session: &mut DocumentSession) -> Result<Slide>;

    /// Build the slide and append it to the session's document
    fn render(&self, record: &Record, session: &mut DocumentSession) -> Result<()> {
        let slide = self.build(record, session)?;
        session.append(slide)
    }
}

/// A fresh slide with this renderer's layout and the record's title
fn titled_slide(layout: Layout, record: &Record) -> Result<Slide> {
    let mut slide = Slide::new(layout);
    slide.set_title(record.title()?);
    Ok(slide)
}
