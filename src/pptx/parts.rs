// ABOUTME: Fixed OOXML parts shared by every generated presentation
// ABOUTME: Slide master, theme, slide layouts and the package-level XML documents

use super::{Layout, SLIDE_HEIGHT, SLIDE_WIDTH};
use quick_xml::escape::escape;

pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const REL_CORE_PROPS: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const REL_EXTENDED_PROPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
pub const REL_SLIDE_MASTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";
pub const REL_SLIDE_LAYOUT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const REL_SLIDE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const REL_THEME: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";
pub const REL_IMAGE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A single entry of a `.rels` part
pub struct Relationship<'a> {
    pub id: String,
    pub rel_type: &'a str,
    pub target: String,
}

/// Render a relationships part from its entries
pub fn relationships_xml(rels: &[Relationship<'_>]) -> String {
    let mut xml = format!("{}\n<Relationships xmlns=\"{}\">\n", XML_DECL, NS_RELS);
    for rel in rels {
        xml.push_str(&format!(
            "    <Relationship Id=\"{}\" Type=\"{}\" Target=\"{}\"/>\n",
            rel.id, rel.rel_type, rel.target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// `[Content_Types].xml` for a deck with `slide_count` slides
pub fn content_types_xml(slide_count: usize) -> String {
    let layouts = Layout::ALL
        .iter()
        .map(|layout| {
            format!(
                r#"    <Override PartName="/ppt/slideLayouts/slideLayout{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/>"#,
                layout.part_number()
            )
        })
        .collect::<Vec<String>>()
        .join("\n");
    let slides = (1..=slide_count)
        .map(|n| {
            format!(
                r#"    <Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
                n
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        r#"{decl}
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="jpeg" ContentType="image/jpeg"/>
    <Default Extension="jpg" ContentType="image/jpeg"/>
    <Default Extension="png" ContentType="image/png"/>
    <Default Extension="gif" ContentType="image/gif"/>
    <Default Extension="bmp" ContentType="image/bmp"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
    <Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/>
    <Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
{layouts}
{slides}
</Types>"#,
        decl = XML_DECL,
        layouts = layouts,
        slides = slides
    )
}

/// `_rels/.rels`
pub fn package_rels_xml() -> String {
    relationships_xml(&[
        Relationship {
            id: "rId1".to_string(),
            rel_type: REL_OFFICE_DOCUMENT,
            target: "ppt/presentation.xml".to_string(),
        },
        Relationship {
            id: "rId2".to_string(),
            rel_type: REL_CORE_PROPS,
            target: "docProps/core.xml".to_string(),
        },
        Relationship {
            id: "rId3".to_string(),
            rel_type: REL_EXTENDED_PROPS,
            target: "docProps/app.xml".to_string(),
        },
    ])
}

pub fn app_xml(slide_count: usize) -> String {
    format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>slide-report</Application>
    <Slides>{}</Slides>
</Properties>"#,
        XML_DECL, slide_count
    )
}

pub fn core_xml(title: &str, created: &str) -> String {
    format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{}</dc:title>
    <dc:creator>slide-report</dc:creator>
    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
    <cp:revision>1</cp:revision>
</cp:coreProperties>"#,
        XML_DECL,
        escape(title),
        created
    )
}

/// `ppt/presentation.xml`. Relationship `rId1` is the master, `rId2` the
/// theme, and slides start at `rId3`.
pub fn presentation_xml(slide_count: usize) -> String {
    let slide_ids = (0..slide_count)
        .map(|i| format!(r#"        <p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 3))
        .collect::<Vec<String>>()
        .join("\n");
    let slide_list = if slide_count == 0 {
        String::new()
    } else {
        format!("    <p:sldIdLst>\n{}\n    </p:sldIdLst>\n", slide_ids)
    };

    format!(
        r#"{decl}
<p:presentation xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" saveSubsetFonts="1">
    <p:sldMasterIdLst>
        <p:sldMasterId id="2147483648" r:id="rId1"/>
    </p:sldMasterIdLst>
{slide_list}    <p:sldSz cx="{cx}" cy="{cy}" type="screen4x3"/>
    <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#,
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        slide_list = slide_list,
        cx = SLIDE_WIDTH,
        cy = SLIDE_HEIGHT
    )
}

pub fn presentation_rels_xml(slide_count: usize) -> String {
    let mut rels = vec![
        Relationship {
            id: "rId1".to_string(),
            rel_type: REL_SLIDE_MASTER,
            target: "slideMasters/slideMaster1.xml".to_string(),
        },
        Relationship {
            id: "rId2".to_string(),
            rel_type: REL_THEME,
            target: "theme/theme1.xml".to_string(),
        },
    ];
    for n in 1..=slide_count {
        rels.push(Relationship {
            id: format!("rId{}", n + 2),
            rel_type: REL_SLIDE,
            target: format!("slides/slide{}.xml", n),
        });
    }
    relationships_xml(&rels)
}

/// Slide master with title and body placeholders the layouts inherit from
pub fn slide_master_xml() -> String {
    let layout_ids = Layout::ALL
        .iter()
        .enumerate()
        .map(|(i, layout)| {
            format!(
                r#"        <p:sldLayoutId id="{}" r:id="rId{}"/>"#,
                2147483649u32 + i as u32,
                layout.part_number()
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        r#"{decl}
<p:sldMaster xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}">
    <p:cSld>
        <p:bg>
            <p:bgRef idx="1001">
                <a:schemeClr val="bg1"/>
            </p:bgRef>
        </p:bg>
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr/>
{title}
{body}
        </p:spTree>
    </p:cSld>
    <p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>
    <p:sldLayoutIdLst>
{layout_ids}
    </p:sldLayoutIdLst>
    <p:txStyles>
        <p:titleStyle>
            <a:lvl1pPr algn="ctr">
                <a:defRPr sz="4400">
                    <a:solidFill><a:schemeClr val="tx1"/></a:solidFill>
                    <a:latin typeface="+mj-lt"/>
                </a:defRPr>
            </a:lvl1pPr>
        </p:titleStyle>
        <p:bodyStyle>
{body_levels}
        </p:bodyStyle>
        <p:otherStyle>
            <a:lvl1pPr>
                <a:defRPr sz="1800"/>
            </a:lvl1pPr>
        </p:otherStyle>
    </p:txStyles>
</p:sldMaster>"#,
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        title = placeholder_sp(2, "Title Placeholder 1", r#"type="title""#, Some((457200, 274638, 8229600, 1143000))),
        body = placeholder_sp(3, "Text Placeholder 2", r#"type="body" idx="1""#, Some((457200, 1600200, 8229600, 4525963))),
        layout_ids = layout_ids,
        body_levels = body_level_styles()
    )
}

// Nine bullet levels, each indented a further half inch
fn body_level_styles() -> String {
    const SIZES: [u32; 9] = [3200, 2800, 2400, 2000, 2000, 2000, 2000, 2000, 2000];
    SIZES
        .iter()
        .enumerate()
        .map(|(i, size)| {
            format!(
                r#"            <a:lvl{n}pPr marL="{mar}" indent="-342900">
                <a:buFont typeface="Arial"/>
                <a:buChar char="&#8226;"/>
                <a:defRPr sz="{size}">
                    <a:solidFill><a:schemeClr val="tx1"/></a:solidFill>
                    <a:latin typeface="+mn-lt"/>
                </a:defRPr>
            </a:lvl{n}pPr>"#,
                n = i + 1,
                mar = 342900 + 457200 * i,
                size = size
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

/// Slide layout part for the given layout
pub fn slide_layout_xml(layout: Layout) -> String {
    let shapes = match layout {
        Layout::Title => format!(
            "{}\n{}",
            placeholder_sp(2, "Title 1", r#"type="ctrTitle""#, Some((685800, 2130425, 7772400, 1470025))),
            placeholder_sp(3, "Subtitle 2", r#"type="subTitle" idx="1""#, Some((1371600, 3886200, 6400800, 1752600)))
        ),
        Layout::TitleAndContent => format!(
            "{}\n{}",
            placeholder_sp(2, "Title 1", r#"type="title""#, None),
            placeholder_sp(3, "Content Placeholder 2", r#"idx="1""#, None)
        ),
        Layout::TitleOnly => placeholder_sp(2, "Title 1", r#"type="title""#, None),
    };

    format!(
        r#"{decl}
<p:sldLayout xmlns:a="{a}" xmlns:r="{r}" xmlns:p="{p}" type="{kind}" preserve="1">
    <p:cSld name="{name}">
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr/>
{shapes}
        </p:spTree>
    </p:cSld>
    <p:clrMapOvr>
        <a:masterClrMapping/>
    </p:clrMapOvr>
</p:sldLayout>"#,
        decl = XML_DECL,
        a = NS_A,
        r = NS_R,
        p = NS_P,
        kind = layout.ooxml_type(),
        name = layout.name(),
        shapes = shapes
    )
}

pub fn slide_layout_rels_xml() -> String {
    relationships_xml(&[Relationship {
        id: "rId1".to_string(),
        rel_type: REL_SLIDE_MASTER,
        target: "../slideMasters/slideMaster1.xml".to_string(),
    }])
}

pub fn slide_master_rels_xml() -> String {
    let mut rels = Layout::ALL
        .iter()
        .map(|layout| Relationship {
            id: format!("rId{}", layout.part_number()),
            rel_type: REL_SLIDE_LAYOUT,
            target: format!("../slideLayouts/slideLayout{}.xml", layout.part_number()),
        })
        .collect::<Vec<_>>();
    rels.push(Relationship {
        id: format!("rId{}", Layout::ALL.len() + 1),
        rel_type: REL_THEME,
        target: "../theme/theme1.xml".to_string(),
    });
    relationships_xml(&rels)
}

fn placeholder_sp(id: u32, name: &str, ph: &str, frame: Option<(i64, i64, i64, i64)>) -> String {
    let sp_pr = match frame {
        Some((x, y, cx, cy)) => format!(
            r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr>"#,
            x, y, cx, cy
        ),
        None => "<p:spPr/>".to_string(),
    };
    format!(
        r#"            <p:sp>
                <p:nvSpPr>
                    <p:cNvPr id="{id}" name="{name}"/>
                    <p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr>
                    <p:nvPr><p:ph {ph}/></p:nvPr>
                </p:nvSpPr>
                {sp_pr}
                <p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody>
            </p:sp>"#,
        id = id,
        name = name,
        ph = ph,
        sp_pr = sp_pr
    )
}

/// Office theme: colour scheme, font scheme and the minimal format scheme
pub fn theme_xml() -> String {
    const COLORS: [(&str, &str); 10] = [
        ("dk2", "1F497D"),
        ("lt2", "EEECE1"),
        ("accent1", "4F81BD"),
        ("accent2", "C0504D"),
        ("accent3", "9BBB59"),
        ("accent4", "8064A2"),
        ("accent5", "4BACC6"),
        ("accent6", "F79646"),
        ("hlink", "0000FF"),
        ("folHlink", "800080"),
    ];
    let colors = COLORS
        .iter()
        .map(|(slot, rgb)| format!(r#"<a:{s}><a:srgbClr val="{v}"/></a:{s}>"#, s = slot, v = rgb))
        .collect::<String>();
    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let line = r#"<a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#;
    let effect = "<a:effectStyle><a:effectLst/></a:effectStyle>";

    format!(
        r#"{decl}
<a:theme xmlns:a="{a}" name="Office Theme">
    <a:themeElements>
        <a:clrScheme name="Office"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>{colors}</a:clrScheme>
        <a:fontScheme name="Office">
            <a:majorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>
            <a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>
        </a:fontScheme>
        <a:fmtScheme name="Office">
            <a:fillStyleLst>{fill}{fill}{fill}</a:fillStyleLst>
            <a:lnStyleLst>{line}{line}{line}</a:lnStyleLst>
            <a:effectStyleLst>{effect}{effect}{effect}</a:effectStyleLst>
            <a:bgFillStyleLst>{fill}{fill}{fill}</a:bgFillStyleLst>
        </a:fmtScheme>
    </a:themeElements>
    <a:objectDefaults/>
    <a:extraClrSchemeLst/>
</a:theme>"#,
        decl = XML_DECL,
        a = NS_A,
        colors = colors,
        fill = fill,
        line = line,
        effect = effect
    )
}
