//! EPUB 3 渲染
//!
//! 容器结构：
//! - mimetype（不压缩，必须是第一个条目）
//! - META-INF/container.xml
//! - OEBPS/content.opf, toc.ncx, nav.xhtml
//! - OEBPS/intro.xhtml 与每节一个 XHTML

use html_escape::encode_text;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{Book, Section};
use crate::application::ports::RenderError;

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// 一个 XHTML 页面
struct Page {
    id: String,
    title: String,
    body: String,
}

impl Page {
    fn file_name(&self) -> String {
        format!("{}.xhtml", self.id)
    }
}

fn xhtml(language: &str, title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops" xml:lang="{lang}" lang="{lang}">
<head><meta charset="UTF-8"/><title>{title}</title></head>
<body>
{body}
</body>
</html>
"#,
        lang = language,
        title = encode_text(title),
        body = body,
    )
}

fn paragraphs_html(paragraphs: &[String]) -> String {
    paragraphs
        .iter()
        .map(|p| {
            if p.trim().is_empty() {
                "<p><br/></p>".to_string()
            } else {
                format!("<p>{}</p>", encode_text(p))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn pages(book: &Book) -> Vec<Page> {
    let mut pages = vec![Page {
        id: "intro".to_string(),
        title: book.title.clone(),
        body: format!(
            "<h1>{}</h1>\n{}",
            encode_text(&book.title),
            paragraphs_html(&book.introduction)
        ),
    }];

    for (index, section) in book.sections.iter().enumerate() {
        let page = match section {
            Section::Volume(title) => Page {
                id: format!("volume{}", index),
                title: title.clone(),
                body: format!("<h1>{}</h1>", encode_text(title)),
            },
            Section::Chapter { title, paragraphs } => Page {
                id: format!("chapter{}", index),
                title: title.clone(),
                body: format!("<h2>{}</h2>\n{}", encode_text(title), paragraphs_html(paragraphs)),
            },
        };
        pages.push(page);
    }
    pages
}

fn content_opf(book: &Book, pages: &[Page]) -> String {
    let manifest: String = pages
        .iter()
        .map(|page| {
            format!(
                r#"    <item id="{}" href="{}" media-type="application/xhtml+xml"/>"#,
                page.id,
                page.file_name()
            ) + "\n"
        })
        .collect();
    let spine: String = pages
        .iter()
        .map(|page| format!(r#"    <itemref idref="{}"/>"#, page.id) + "\n")
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="book-id" xml:lang="{lang}">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:identifier id="book-id">{identifier}</dc:identifier>
    <dc:title>{title}</dc:title>
    <dc:language>{lang}</dc:language>
    <meta property="dcterms:modified">{modified}</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
{manifest}  </manifest>
  <spine toc="ncx">
{spine}  </spine>
</package>
"#,
        lang = book.language,
        identifier = encode_text(&book.identifier),
        title = encode_text(&book.title),
        modified = book.modified,
        manifest = manifest,
        spine = spine,
    )
}

fn toc_ncx(book: &Book, pages: &[Page]) -> String {
    let nav_points: String = pages
        .iter()
        .enumerate()
        .map(|(order, page)| {
            format!(
                r#"    <navPoint id="nav-{id}" playOrder="{order}"><navLabel><text>{title}</text></navLabel><content src="{src}"/></navPoint>"#,
                id = page.id,
                order = order + 1,
                title = encode_text(&page.title),
                src = page.file_name(),
            ) + "\n"
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="{identifier}"/></head>
  <docTitle><text>{title}</text></docTitle>
  <navMap>
{nav_points}  </navMap>
</ncx>
"#,
        identifier = encode_text(&book.identifier),
        title = encode_text(&book.title),
        nav_points = nav_points,
    )
}

fn nav_xhtml(book: &Book, pages: &[Page]) -> String {
    let items: String = pages
        .iter()
        .map(|page| {
            format!(
                r#"<li><a href="{}">{}</a></li>"#,
                page.file_name(),
                encode_text(&page.title)
            ) + "\n"
        })
        .collect();
    let body = format!(r#"<nav epub:type="toc" id="toc"><ol>
{}</ol></nav>"#, items);
    xhtml(book.language, &book.title, &body)
}

pub(crate) fn render(book: &Book) -> Result<Vec<u8>, RenderError> {
    let archive_error = |e: zip::result::ZipError| RenderError::Archive(e.to_string());
    let io_error = |e: std::io::Error| RenderError::Io(e.to_string());

    let pages = pages(book);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    zip.start_file("mimetype", stored).map_err(archive_error)?;
    zip.write_all(b"application/epub+zip").map_err(io_error)?;

    let mut entries = vec![
        ("META-INF/container.xml".to_string(), CONTAINER_XML.to_string()),
        ("OEBPS/content.opf".to_string(), content_opf(book, &pages)),
        ("OEBPS/toc.ncx".to_string(), toc_ncx(book, &pages)),
        ("OEBPS/nav.xhtml".to_string(), nav_xhtml(book, &pages)),
    ];
    for page in &pages {
        entries.push((
            format!("OEBPS/{}", page.file_name()),
            xhtml(book.language, &page.title, &page.body),
        ));
    }

    for (name, content) in entries {
        zip.start_file(name, deflated).map_err(archive_error)?;
        zip.write_all(content.as_bytes()).map_err(io_error)?;
    }

    let cursor = zip.finish().map_err(archive_error)?;
    Ok(cursor.into_inner())
}
