// ABOUTME: Type resolver for the slide-report application
// ABOUTME: Maps a record's type tag to the renderer that handles it

use crate::fetch::ImageFetcher;
use crate::renderers::{
    ListRenderer, PictureRenderer, PlotRenderer, Renderer, TextRenderer, TitleRenderer,
};
use std::fmt;
use std::path::Path;

/// The record types that have a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideType {
    Title,
    Text,
    List,
    Picture,
    Plot,
}

impl SlideType {
    pub const ALL: [SlideType; 5] = [
        SlideType::Title,
        SlideType::Text,
        SlideType::List,
        SlideType::Picture,
        SlideType::Plot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlideType::Title => "title",
            SlideType::Text => "text",
            SlideType::List => "list",
            SlideType::Picture => "picture",
            SlideType::Plot => "plot",
        }
    }

    /// Match a tag exactly; anything else is `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for SlideType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One renderer per [`SlideType`], fixed for the lifetime of a run
pub struct RendererTable {
    title: TitleRenderer,
    text: TextRenderer,
    list: ListRenderer,
    picture: PictureRenderer,
    plot: PlotRenderer,
}

impl RendererTable {
    /// Build the table.
    ///
    /// `base_dir` anchors relative paths named in records; `picture_url` is
    /// the image every picture slide downloads through `fetcher`.
    pub fn new(fetcher: Box<dyn ImageFetcher>, picture_url: &str, base_dir: Option<&Path>) -> Self {
        Self {
            title: TitleRenderer,
            text: TextRenderer,
            list: ListRenderer,
            picture: PictureRenderer::new(fetcher, picture_url, base_dir),
            plot: PlotRenderer::new(base_dir),
        }
    }

    pub fn get(&self, slide_type: SlideType) -> &dyn Renderer {
        match slide_type {
            SlideType::Title => &self.title,
            SlideType::Text => &self.text,
            SlideType::List => &self.list,
            SlideType::Picture => &self.picture,
            SlideType::Plot => &self.plot,
        }
    }

    /// Look up the renderer for a type tag. Unknown or missing tags give `None`.
    pub fn resolve(&self, tag: Option<&str>) -> Option<&dyn Renderer> {
        tag.and_then(SlideType::from_tag).map(|t| self.get(t))
    }
}
