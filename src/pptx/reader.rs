// ABOUTME: Package reader for presentations
// ABOUTME: Parses .pptx archives written by this crate back into the in-memory model

use super::{Layout, Paragraph, Picture, PictureFormat, Presentation, Rect, Shape, Slide, TextFrame};
use crate::errors::{ReportError, Result};
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Read, Seek};
use zip::result::ZipError;
use zip::ZipArchive;

/// Read a whole package into a [`Presentation`]
pub fn read_package<R: Read + Seek>(source: R) -> Result<Presentation> {
    let mut archive = ZipArchive::new(source)?;
    let mut pres = Presentation::new();

    if let Some(core) = read_part(&mut archive, "docProps/core.xml")? {
        if let Some(title) = parse_core_title(&core)? {
            pres.set_title(&title);
        }
    }

    // Slide parts are numbered consecutively from 1
    for n in 1.. {
        let Some(xml) = read_part(&mut archive, &format!("ppt/slides/slide{}.xml", n))? else {
            break;
        };
        let rels = match read_part(&mut archive, &format!("ppt/slides/_rels/slide{}.xml.rels", n))? {
            Some(text) => parse_relationships(&text)?,
            None => HashMap::new(),
        };
        let slide = parse_slide(&xml, &rels, &mut archive)?;
        debug!("Read slide {} ({})", n, slide.layout().name());
        pres.push_slide(slide);
    }

    Ok(pres)
}

fn read_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<String>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut text = String::new();
            file.read_to_string(&mut text)?;
            Ok(Some(text))
        }
        Err(ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn read_binary_part<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .map_err(|e| ReportError::PptxReadError(format!("missing part {}: {}", name, e)))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

fn attr(e: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    match e.try_get_attribute(name).map_err(quick_xml::Error::from)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn attr_i64(e: &BytesStart<'_>, name: &str) -> Result<i64> {
    match attr(e, name)? {
        Some(value) => value.parse::<i64>().map_err(|err| {
            ReportError::PptxReadError(format!("bad integer '{}' for {}: {}", value, name, err))
        }),
        None => Ok(0),
    }
}

fn parse_core_title(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut in_title = false;
    let mut title: Option<String> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"dc:title" => {
                in_title = true;
                title = Some(String::new());
            }
            Event::Empty(e) if e.name().as_ref() == b"dc:title" => title = Some(String::new()),
            Event::End(e) if e.name().as_ref() == b"dc:title" => in_title = false,
            Event::Text(t) if in_title => {
                if let Some(title) = title.as_mut() {
                    title.push_str(&t.unescape()?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(title)
}

/// Map of relationship id to target
fn parse_relationships(xml: &str) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut rels = HashMap::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, "Id")?, attr(&e, "Target")?) {
                    rels.insert(id, target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rels)
}

#[derive(Default)]
struct ShapeState {
    is_picture: bool,
    is_text_box: bool,
    ph_type: Option<String>,
    ph_idx: Option<String>,
    name: String,
    frame: Option<Rect>,
    paragraphs: Vec<Paragraph>,
    embed: Option<String>,
}

impl ShapeState {
    fn frame_mut(&mut self) -> &mut Rect {
        self.frame.get_or_insert(Rect {
            x: 0,
            y: 0,
            cx: 0,
            cy: 0,
        })
    }

    fn text_frame(&self) -> Result<TextFrame> {
        let mut frame = TextFrame::default();
        for p in &self.paragraphs {
            frame.add_paragraph(&p.text, p.level)?;
        }
        Ok(frame)
    }
}

fn parse_slide<R: Read + Seek>(
    xml: &str,
    rels: &HashMap<String, String>,
    archive: &mut ZipArchive<R>,
) -> Result<Slide> {
    let layout = rels
        .values()
        .find_map(|target| layout_from_target(target))
        .unwrap_or(Layout::TitleOnly);
    let mut slide = Slide::new(layout);

    let mut reader = Reader::from_str(xml);
    let mut current: Option<ShapeState> = None;
    let mut in_text = false;

    loop {
        let event = reader.read_event()?;
        let (e, is_empty) = match &event {
            Event::Start(e) => (Some(e), false),
            Event::Empty(e) => (Some(e), true),
            _ => (None, false),
        };

        if let Some(e) = e {
            match e.name().as_ref() {
                b"p:sp" if !is_empty => current = Some(ShapeState::default()),
                b"p:pic" if !is_empty => {
                    current = Some(ShapeState {
                        is_picture: true,
                        ..ShapeState::default()
                    })
                }
                name => {
                    if let Some(shape) = current.as_mut() {
                        match name {
                            b"p:cNvPr" => shape.name = attr(e, "name")?.unwrap_or_default(),
                            b"p:cNvSpPr" => {
                                shape.is_text_box = attr(e, "txBox")?.as_deref() == Some("1")
                            }
                            b"p:ph" => {
                                shape.ph_type = attr(e, "type")?;
                                shape.ph_idx = attr(e, "idx")?;
                            }
                            b"a:off" => {
                                let (x, y) = (attr_i64(e, "x")?, attr_i64(e, "y")?);
                                let frame = shape.frame_mut();
                                frame.x = x;
                                frame.y = y;
                            }
                            b"a:ext" => {
                                let (cx, cy) = (attr_i64(e, "cx")?, attr_i64(e, "cy")?);
                                let frame = shape.frame_mut();
                                frame.cx = cx;
                                frame.cy = cy;
                            }
                            b"a:p" => shape.paragraphs.push(Paragraph {
                                text: String::new(),
                                level: 0,
                            }),
                            b"a:pPr" => {
                                let level = attr_i64(e, "lvl")?;
                                if let Some(p) = shape.paragraphs.last_mut() {
                                    p.level = u32::try_from(level).map_err(|_| {
                                        ReportError::PptxReadError(format!("bad level {}", level))
                                    })?;
                                }
                            }
                            b"a:t" if !is_empty => in_text = true,
                            b"a:blip" => shape.embed = attr(e, "r:embed")?,
                            _ => {}
                        }
                    }
                }
            }
            continue;
        }

        match event {
            Event::Text(t) if in_text => {
                if let Some(p) = current.as_mut().and_then(|s| s.paragraphs.last_mut()) {
                    p.text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"a:t" => in_text = false,
                b"p:sp" | b"p:pic" => {
                    if let Some(shape) = current.take() {
                        finish_shape(&mut slide, shape, rels, archive)?;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(slide)
}

fn finish_shape<R: Read + Seek>(
    slide: &mut Slide,
    shape: ShapeState,
    rels: &HashMap<String, String>,
    archive: &mut ZipArchive<R>,
) -> Result<()> {
    let frame = shape.frame.unwrap_or(Rect {
        x: 0,
        y: 0,
        cx: 0,
        cy: 0,
    });

    if shape.is_picture {
        let rid = shape
            .embed
            .as_deref()
            .ok_or_else(|| ReportError::PptxReadError("picture without image reference".into()))?;
        let target = rels
            .get(rid)
            .ok_or_else(|| ReportError::PptxReadError(format!("unknown relationship {}", rid)))?;
        let part = format!("ppt/slides/{}", target)
            .replace("ppt/slides/../", "ppt/");
        let format = part
            .rsplit('.')
            .next()
            .and_then(PictureFormat::from_extension)
            .ok_or_else(|| ReportError::PptxReadError(format!("unknown media type: {}", part)))?;
        let data = read_binary_part(archive, &part)?;
        slide.push_shape(Shape::Picture(Picture {
            name: shape.name,
            frame,
            format,
            data,
        }));
        return Ok(());
    }

    match shape.ph_type.as_deref() {
        Some("title") | Some("ctrTitle") => {
            let text = shape
                .paragraphs
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            slide.set_title(&text);
        }
        Some("subTitle") | Some("body") => slide.set_body(shape.text_frame()?),
        None if shape.ph_idx.is_some() => slide.set_body(shape.text_frame()?),
        _ if shape.is_text_box => slide.push_shape(Shape::TextBox {
            frame,
            text: shape.text_frame()?,
        }),
        _ => debug!("Ignoring shape '{}'", shape.name),
    }
    Ok(())
}

fn layout_from_target(target: &str) -> Option<Layout> {
    let file = target.rsplit('/').next()?;
    let number = file
        .strip_prefix("slideLayout")?
        .strip_suffix(".xml")?
        .parse::<usize>()
        .ok()?;
    Layout::from_part_number(number)
}
