// ABOUTME: Package writer for presentations
// ABOUTME: Serializes the in-memory model into a .pptx ZIP archive

use super::parts::{self, Relationship};
use super::{Layout, Picture, Presentation, Rect, Shape, Slide, TextFrame};
use crate::errors::Result;
use log::debug;
use quick_xml::escape::escape;
use std::io::{Seek, Write};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

/// Write the full package for `pres` into `writer`
pub fn write_package<W: Write + Seek>(pres: &Presentation, writer: W) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let slide_count = pres.slides().len();

    let put = |zip: &mut ZipWriter<W>, name: &str, data: &[u8]| -> Result<()> {
        debug!("Writing part: {}", name);
        zip.start_file(name, options)?;
        zip.write_all(data)?;
        Ok(())
    };

    put(&mut zip, "[Content_Types].xml", parts::content_types_xml(slide_count).as_bytes())?;
    put(&mut zip, "_rels/.rels", parts::package_rels_xml().as_bytes())?;
    put(&mut zip, "docProps/app.xml", parts::app_xml(slide_count).as_bytes())?;
    let created = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    put(&mut zip, "docProps/core.xml", parts::core_xml(pres.title(), &created).as_bytes())?;
    put(&mut zip, "ppt/presentation.xml", parts::presentation_xml(slide_count).as_bytes())?;
    put(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        parts::presentation_rels_xml(slide_count).as_bytes(),
    )?;
    put(&mut zip, "ppt/theme/theme1.xml", parts::theme_xml().as_bytes())?;
    put(&mut zip, "ppt/slideMasters/slideMaster1.xml", parts::slide_master_xml().as_bytes())?;
    put(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        parts::slide_master_rels_xml().as_bytes(),
    )?;
    for layout in Layout::ALL {
        let n = layout.part_number();
        put(
            &mut zip,
            &format!("ppt/slideLayouts/slideLayout{}.xml", n),
            parts::slide_layout_xml(layout).as_bytes(),
        )?;
        put(
            &mut zip,
            &format!("ppt/slideLayouts/_rels/slideLayout{}.xml.rels", n),
            parts::slide_layout_rels_xml().as_bytes(),
        )?;
    }

    // Media names are unique across the whole package
    let mut media_count = 0usize;
    for (i, slide) in pres.slides().iter().enumerate() {
        let slide_num = i + 1;
        let mut rels = vec![Relationship {
            id: "rId1".to_string(),
            rel_type: parts::REL_SLIDE_LAYOUT,
            target: format!("../slideLayouts/slideLayout{}.xml", slide.layout().part_number()),
        }];
        let mut picture_rids = Vec::new();
        for picture in slide.pictures() {
            media_count += 1;
            let media_name = format!("image{}.{}", media_count, picture.format.extension());
            put(&mut zip, &format!("ppt/media/{}", media_name), &picture.data)?;
            let rid = format!("rId{}", rels.len() + 1);
            rels.push(Relationship {
                id: rid.clone(),
                rel_type: parts::REL_IMAGE,
                target: format!("../media/{}", media_name),
            });
            picture_rids.push(rid);
        }

        put(
            &mut zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
            parts::relationships_xml(&rels).as_bytes(),
        )?;
        put(
            &mut zip,
            &format!("ppt/slides/slide{}.xml", slide_num),
            slide_xml(slide, &picture_rids).as_bytes(),
        )?;
    }

    zip.finish()?;
    Ok(())
}

/// Render one slide part. `picture_rids` holds the relationship id of each
/// picture shape, in shape order.
fn slide_xml(slide: &Slide, picture_rids: &[String]) -> String {
    let mut shapes = String::new();
    let mut next_id = 2u32;

    if let Some(title) = slide.title() {
        let ph = match slide.layout() {
            Layout::Title => r#"type="ctrTitle""#,
            _ => r#"type="title""#,
        };
        let mut frame = TextFrame::default();
        frame.set_text(title);
        shapes.push_str(&placeholder_xml(next_id, "Title", ph, &frame));
        next_id += 1;
    }

    if slide.layout().has_body() && !slide.body().is_empty() {
        let ph = match slide.layout() {
            Layout::Title => r#"type="subTitle" idx="1""#,
            _ => r#"idx="1""#,
        };
        shapes.push_str(&placeholder_xml(next_id, "Body", ph, slide.body()));
        next_id += 1;
    }

    let mut rids = picture_rids.iter();
    for shape in slide.shapes() {
        match shape {
            Shape::TextBox { frame, text } => {
                shapes.push_str(&text_box_xml(next_id, frame, text));
            }
            Shape::Picture(picture) => {
                let rid = rids.next().map(String::as_str).unwrap_or("rId0");
                shapes.push_str(&picture_xml(next_id, picture, rid));
            }
        }
        next_id += 1;
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr>
                <a:xfrm>
                    <a:off x="0" y="0"/>
                    <a:ext cx="0" cy="0"/>
                    <a:chOff x="0" y="0"/>
                    <a:chExt cx="0" cy="0"/>
                </a:xfrm>
            </p:grpSpPr>
{shapes}        </p:spTree>
    </p:cSld>
    <p:clrMapOvr>
        <a:masterClrMapping/>
    </p:clrMapOvr>
</p:sld>"#,
        a = parts::NS_A,
        r = parts::NS_R,
        p = parts::NS_P,
        shapes = shapes
    )
}

fn paragraphs_xml(frame: &TextFrame) -> String {
    frame
        .paragraphs()
        .iter()
        .map(|p| {
            let ppr = if p.level > 0 {
                format!(r#"<a:pPr lvl="{}"/>"#, p.level)
            } else {
                String::new()
            };
            if p.text.is_empty() {
                format!(r#"<a:p>{}<a:endParaRPr lang="en-US"/></a:p>"#, ppr)
            } else {
                format!(
                    r#"<a:p>{}<a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>"#,
                    ppr,
                    escape(&p.text)
                )
            }
        })
        .collect()
}

fn placeholder_xml(id: u32, name: &str, ph: &str, frame: &TextFrame) -> String {
    format!(
        r#"            <p:sp>
                <p:nvSpPr>
                    <p:cNvPr id="{id}" name="{name} {id}"/>
                    <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
                    <p:nvPr><p:ph {ph}/></p:nvPr>
                </p:nvSpPr>
                <p:spPr/>
                <p:txBody><a:bodyPr/><a:lstStyle/>{paragraphs}</p:txBody>
            </p:sp>
"#,
        id = id,
        name = name,
        ph = ph,
        paragraphs = paragraphs_xml(frame)
    )
}

fn xfrm_xml(frame: &Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        frame.x, frame.y, frame.cx, frame.cy
    )
}

fn text_box_xml(id: u32, frame: &Rect, text: &TextFrame) -> String {
    format!(
        r#"            <p:sp>
                <p:nvSpPr>
                    <p:cNvPr id="{id}" name="TextBox {id}"/>
                    <p:cNvSpPr txBox="1"/>
                    <p:nvPr/>
                </p:nvSpPr>
                <p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr>
                <p:txBody><a:bodyPr wrap="none"><a:spAutoFit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody>
            </p:sp>
"#,
        id = id,
        xfrm = xfrm_xml(frame),
        paragraphs = paragraphs_xml(text)
    )
}

fn picture_xml(id: u32, picture: &Picture, rid: &str) -> String {
    format!(
        r#"            <p:pic>
                <p:nvPicPr>
                    <p:cNvPr id="{id}" name="{name}"/>
                    <p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>
                    <p:nvPr/>
                </p:nvPicPr>
                <p:blipFill>
                    <a:blip r:embed="{rid}"/>
                    <a:stretch><a:fillRect/></a:stretch>
                </p:blipFill>
                <p:spPr>{xfrm}<a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>
            </p:pic>
"#,
        id = id,
        name = escape(&picture.name),
        rid = rid,
        xfrm = xfrm_xml(&picture.frame)
    )
}
