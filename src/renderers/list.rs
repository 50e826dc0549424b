// ABOUTME: List slide renderer for the slide-report application
// ABOUTME: Builds a title and content slide with one bullet paragraph per list item

use super::{titled_slide, Renderer};
use crate::errors::{ReportError, Result};
use crate::pptx::{Layout, Slide};
use crate::record::Record;
use crate::session::DocumentSession;

/// Bulleted list slide. Each `{text, level}` entry becomes one body paragraph.
#[derive(Debug, Default)]
pub struct ListRenderer;

impl Renderer for ListRenderer {
    fn name(&self) -> &'static str {
        "list"
    }

    fn layout(&self) -> Layout {
        Layout::TitleAndContent
    }

    fn build(&self, record: &Record, _session: &mut DocumentSession) -> Result<Slide> {
        let mut slide = titled_slide(self.layout(), record)?;
        let items = record.list_items()?;
        let body = slide.body_placeholder()?;
        for item in &items {
            body.add_paragraph(&item.text, item.level)
                .map_err(|e| ReportError::invalid_record(record.index(), e.to_string()))?;
        }
        Ok(slide)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::Presentation;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_render_appends_levelled_paragraphs() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("out.pptx");
        let mut session = DocumentSession::create(&path).unwrap();
        let record = Record::from_value(
            0,
            json!({"type": "list", "title": "Agenda", "content": [
                {"text": "Intro", "level": 0},
                {"text": "Details", "level": 1},
                {"text": "Wrap up"}
            ]}),
        );

        ListRenderer.render(&record, &mut session).expect("Failed to render");

        let deck = Presentation::open(&path).unwrap();
        let slide = &deck.slides()[0];
        assert_eq!(slide.layout(), Layout::TitleAndContent);
        let levels: Vec<_> = slide
            .body()
            .paragraphs()
            .iter()
            .map(|p| (p.text.as_str(), p.level))
            .collect();
        assert_eq!(levels, vec![("Intro", 0), ("Details", 1), ("Wrap up", 0)]);
    }

    #[test]
    fn test_level_out_of_range_fails_the_record() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let record = Record::from_value(
            7,
            json!({"type": "list", "title": "Deep", "content": [{"text": "x", "level": 9}]}),
        );
        assert!(matches!(
            ListRenderer.render(&record, &mut session),
            Err(ReportError::InvalidRecord { index: 7, .. })
        ));
        assert_eq!(session.slide_count(), 0);
    }

    #[test]
    fn test_empty_list_keeps_title() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let mut session = DocumentSession::create(&dir.path().join("out.pptx")).unwrap();
        let record = Record::from_value(0, json!({"type": "list", "title": "Nothing", "content": []}));
        let slide = ListRenderer.build(&record, &mut session).unwrap();
        assert_eq!(slide.title(), Some("Nothing"));
        assert!(slide.body().is_empty());
    }
}
