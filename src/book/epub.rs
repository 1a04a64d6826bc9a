//! EPUB 2 packaging

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{BOOK_STYLE, Book};
use crate::utils::escape_xml;

const MIMETYPE: &str = "application/epub+zip";

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

fn chapter(book: &Book) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.1//EN" "http://www.w3.org/TR/xhtml11/DTD/xhtml11.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="{lang}">
<head>
  <title>{title}</title>
  <style type="text/css">
{style}
  </style>
</head>
<body>
<h1>{title}</h1>
{body}</body>
</html>
"#,
        lang = escape_xml(&book.source_language),
        title = escape_xml(&book.title),
        style = BOOK_STYLE,
        body = book.render_body(),
    )
}

fn content_opf(book: &Book, identifier: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="bookid" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>{title}</dc:title>
    <dc:language>{lang}</dc:language>
    <dc:identifier id="bookid">urn:md5:{identifier}</dc:identifier>
    <dc:creator>{author}</dc:creator>
  </metadata>
  <manifest>
    <item id="ncx" href="toc.ncx" media-type="application/x-dtbncx+xml"/>
    <item id="chapter1" href="chapter1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine toc="ncx">
    <itemref idref="chapter1"/>
  </spine>
</package>
"#,
        title = escape_xml(&book.title),
        lang = escape_xml(&book.source_language),
        identifier = identifier,
        author = escape_xml(&book.author),
    )
}

fn toc_ncx(book: &Book, identifier: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head>
    <meta name="dtb:uid" content="urn:md5:{identifier}"/>
    <meta name="dtb:depth" content="1"/>
    <meta name="dtb:totalPageCount" content="0"/>
    <meta name="dtb:maxPageNumber" content="0"/>
  </head>
  <docTitle>
    <text>{title}</text>
  </docTitle>
  <navMap>
    <navPoint id="chapter1" playOrder="1">
      <navLabel>
        <text>{title}</text>
      </navLabel>
      <content src="chapter1.xhtml"/>
    </navPoint>
  </navMap>
</ncx>
"#,
        identifier = identifier,
        title = escape_xml(&book.title),
    )
}

/// Write `book` as an EPUB archive into `writer`.
///
/// `mimetype` goes first and uncompressed so readers can sniff the format.
pub fn build_epub<W: Write + Seek>(book: &Book, writer: W) -> Result<W> {
    let chapter = chapter(book);
    let identifier = format!("{:x}", md5::compute(chapter.as_bytes()));

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let entries = [
        ("META-INF/container.xml", CONTAINER_XML.to_string()),
        ("content.opf", content_opf(book, &identifier)),
        ("toc.ncx", toc_ncx(book, &identifier)),
        ("chapter1.xhtml", chapter),
    ];

    let mut zout = ZipWriter::new(writer);
    zout.start_file("mimetype", stored)
        .context("start zip file: mimetype")?;
    zout.write_all(MIMETYPE.as_bytes())
        .context("write zip file: mimetype")?;

    for (name, data) in &entries {
        zout.start_file(*name, deflated)
            .with_context(|| format!("start zip file: {}", name))?;
        zout.write_all(data.as_bytes())
            .with_context(|| format!("write zip file: {}", name))?;
    }

    zout.finish().context("finish zip")
}

pub fn write_epub(book: &Book, path: &Path) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create epub: {}", path.display()))?;
    build_epub(book, f)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{LanguageColumn, TranslatedBatch};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn sample_book() -> Book {
        let mut book = Book::new(
            "Tales & Songs",
            "PolyglotSync",
            vec!["fr".to_string()],
            "Translation Error",
        );
        book.set_source_language("en");
        book.push_batch(&TranslatedBatch {
            index: 0,
            sentences: vec!["Once <upon> a time.".to_string()],
            columns: vec![LanguageColumn {
                language: "fr".to_string(),
                lines: vec!["Il était une fois.".to_string()],
                failed: false,
                retried: false,
            }],
        });
        book
    }

    fn read_entry(archive: &mut ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut text = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        text
    }

    #[test]
    fn test_epub_layout() {
        let cursor = build_epub(&sample_book(), Cursor::new(Vec::new())).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap();

        {
            let first = archive.by_index(0).unwrap();
            assert_eq!(first.name(), "mimetype");
            assert_eq!(first.compression(), CompressionMethod::Stored);
        }
        assert_eq!(read_entry(&mut archive, "mimetype"), MIMETYPE);
        assert!(read_entry(&mut archive, "META-INF/container.xml").contains("content.opf"));

        let opf = read_entry(&mut archive, "content.opf");
        assert!(opf.contains("<dc:title>Tales &amp; Songs</dc:title>"));
        assert!(opf.contains("<dc:language>en</dc:language>"));
        assert!(!opf.contains("chapter2"));

        let ncx = read_entry(&mut archive, "toc.ncx");
        assert!(ncx.contains("<content src=\"chapter1.xhtml\"/>"));

        let chapter = read_entry(&mut archive, "chapter1.xhtml");
        assert!(chapter.contains("Once &lt;upon&gt; a time."));
        assert!(chapter.contains("Il était une fois."));
    }

    #[test]
    fn test_identifier_follows_content() {
        let a = build_epub(&sample_book(), Cursor::new(Vec::new())).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(a.into_inner())).unwrap();
        let opf = read_entry(&mut archive, "content.opf");

        let chapter = chapter(&sample_book());
        let expected = format!("urn:md5:{:x}", md5::compute(chapter.as_bytes()));
        assert!(opf.contains(&expected));
    }
}
