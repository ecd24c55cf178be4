//! Page content-stream access on top of lopdf.
//!
//! Every top-level operation loads the source itself; nothing read here is
//! cached between calls.

use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use unveil_core::error::{Result, UnveilError};
use unveil_core::lines::{join_lines, LineSequence, DELIMITER};

/// Bytes written to every content stream after the first when a page is
/// rewritten, so the page keeps its declared number of streams.
pub const BLANK_STREAM: &[u8] = b" ";

/// The content streams of one page, in the order the page declares them.
#[derive(Debug, Clone)]
pub struct PageContentStream {
    pub page: usize,
    pub refs: Vec<ObjectId>,
    pub streams: Vec<Vec<u8>>,
}

impl PageContentStream {
    /// All streams joined with the line delimiter.
    pub fn buffer(&self) -> Vec<u8> {
        join_lines(&self.streams, DELIMITER)
    }

    pub fn lines(&self) -> LineSequence {
        LineSequence::split(&self.buffer())
    }
}

/// Load a document, reporting a missing file distinctly from a parse failure.
pub fn open_document(path: &Path) -> Result<Document> {
    if !path.exists() {
        return Err(UnveilError::InputNotFound(path.to_path_buf()));
    }
    Document::load(path)
        .map_err(|e| UnveilError::Pdf(format!("Failed to load {}: {}", path.display(), e)))
}

/// Page object ids in document order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    // get_pages is keyed by 1-based page number
    doc.get_pages().into_values().collect()
}

/// Resolve the content streams of the 0-based `page`. A stream whose
/// filters cannot be decoded is an error.
pub fn page_content(doc: &Document, page: usize) -> Result<PageContentStream> {
    resolve_page(doc, page, read_stream)
}

/// Like [`page_content`], but undecodable streams come back as their stored
/// bytes. Only for read-only consumers: rewriting such bytes as plain
/// content would corrupt the stream.
pub fn page_content_or_raw(doc: &Document, page: usize) -> Result<PageContentStream> {
    resolve_page(doc, page, read_stream_or_raw)
}

fn resolve_page(
    doc: &Document,
    page: usize,
    read: fn(&Document, ObjectId) -> Result<Vec<u8>>,
) -> Result<PageContentStream> {
    let pages = page_ids(doc);
    let page_id = *pages.get(page).ok_or(UnveilError::PageIndexOutOfRange {
        page,
        page_count: pages.len(),
    })?;

    let refs = doc.get_page_contents(page_id);
    let streams = refs
        .iter()
        .map(|id| read(doc, *id))
        .collect::<Result<Vec<_>>>()?;

    Ok(PageContentStream {
        page,
        refs,
        streams,
    })
}

/// Read the bytes of a stream object, with its filters applied.
pub fn read_stream(doc: &Document, id: ObjectId) -> Result<Vec<u8>> {
    let stream = doc
        .get_object(id)
        .and_then(Object::as_stream)
        .map_err(|e| UnveilError::Pdf(format!("Object {} {} R is not a stream: {}", id.0, id.1, e)))?;

    if stream.dict.has(b"Filter") {
        stream
            .decompressed_content()
            .map_err(|e| UnveilError::Pdf(format!("Failed to decode {} {} R: {}", id.0, id.1, e)))
    } else {
        Ok(stream.content.clone())
    }
}

/// [`read_stream`], falling back to the stored bytes when decoding fails.
pub fn read_stream_or_raw(doc: &Document, id: ObjectId) -> Result<Vec<u8>> {
    match read_stream(doc, id) {
        Err(UnveilError::Pdf(reason)) => {
            let stream = doc
                .get_object(id)
                .and_then(Object::as_stream)
                .map_err(|_| UnveilError::Pdf(reason.clone()))?;
            log::warn!("{}; using stored bytes", reason);
            Ok(stream.content.clone())
        }
        other => other,
    }
}

/// Put `data` in the first reference and blank the rest.
pub fn rewrite_page_streams(doc: &mut Document, refs: &[ObjectId], data: Vec<u8>) -> Result<()> {
    let (first, rest) = refs
        .split_first()
        .ok_or_else(|| UnveilError::Pdf("Page has no content streams to rewrite".to_string()))?;

    for id in rest {
        write_stream(doc, *id, BLANK_STREAM.to_vec())?;
    }
    write_stream(doc, *first, data)
}

fn write_stream(doc: &mut Document, id: ObjectId, data: Vec<u8>) -> Result<()> {
    let stream = doc
        .get_object_mut(id)
        .and_then(Object::as_stream_mut)
        .map_err(|e| UnveilError::Pdf(format!("Object {} {} R is not a stream: {}", id.0, id.1, e)))?;
    stream.set_plain_content(data);
    Ok(())
}

/// Serialize `doc` to `path`, Flate-compressing streams first if asked.
pub fn save_document(doc: &mut Document, path: &Path, compress: bool) -> Result<()> {
    if compress {
        doc.compress();
    }
    doc.save(path)
        .map_err(|e| UnveilError::Pdf(format!("Failed to save {}: {}", path.display(), e)))?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}

/// Load and resolve in one call, checking the page has something to rewrite.
pub(crate) fn load_page(path: &Path, page: usize) -> Result<(Document, PageContentStream)> {
    let doc = open_document(path)?;
    let content = page_content(&doc, page)?;
    if content.refs.is_empty() {
        return Err(UnveilError::NoContentStreams { page });
    }
    Ok((doc, content))
}

/// `{stem}` of the input file, for derived output names.
pub(crate) fn input_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    #[test]
    fn test_page_content_joins_streams_in_order() {
        let doc = sample::build_document(&[vec![b"q\n/Im0 Do".to_vec(), b"Q".to_vec()]]);
        let content = page_content(&doc, 0).unwrap();
        assert_eq!(content.refs.len(), 2);
        assert_eq!(content.buffer(), b"q\n/Im0 Do\nQ");
        assert_eq!(content.lines().len(), 3);
    }

    #[test]
    fn test_page_index_out_of_range() {
        let doc = sample::build_document(&[vec![b"q Q".to_vec()], vec![b"q Q".to_vec()]]);
        match page_content(&doc, 2) {
            Err(UnveilError::PageIndexOutOfRange { page, page_count }) => {
                assert_eq!(page, 2);
                assert_eq!(page_count, 2);
            }
            other => panic!("expected PageIndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_reads_compressed_streams() {
        let original = b"BT (\xe9) Tj ET\n".repeat(64);
        let mut doc = sample::build_document(&[vec![original.clone()]]);
        doc.compress();

        let id = doc.get_page_contents(page_ids(&doc)[0])[0];
        let stored = doc.get_object(id).unwrap().as_stream().unwrap();
        assert!(stored.dict.has(b"Filter"));

        let content = page_content(&doc, 0).unwrap();
        assert_eq!(content.buffer(), original);
    }

    #[test]
    fn test_undecodable_stream() {
        let mut doc = sample::build_document(&[vec![b"71 20 51>".to_vec(), b"Q".to_vec()]]);
        sample::mark_filtered(&mut doc, 0, 0, "ASCIIHexDecode");

        assert!(matches!(page_content(&doc, 0), Err(UnveilError::Pdf(_))));

        let content = page_content_or_raw(&doc, 0).unwrap();
        assert_eq!(content.streams, vec![b"71 20 51>".to_vec(), b"Q".to_vec()]);
    }

    #[test]
    fn test_rewrite_blanks_trailing_streams() {
        let mut doc = sample::build_document(&[vec![
            b"a".to_vec(),
            b"b".to_vec(),
            b"c".to_vec(),
        ]]);
        let refs = page_content(&doc, 0).unwrap().refs;
        rewrite_page_streams(&mut doc, &refs, b"new".to_vec()).unwrap();

        let content = page_content(&doc, 0).unwrap();
        assert_eq!(content.refs, refs);
        assert_eq!(content.streams, vec![b"new".to_vec(), b" ".to_vec(), b" ".to_vec()]);
    }

    #[test]
    fn test_load_page_without_contents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.pdf");
        let mut doc = sample::build_document(&[vec![]]);
        doc.save(&path).unwrap();

        assert!(matches!(
            load_page(&path, 0),
            Err(UnveilError::NoContentStreams { page: 0 })
        ));
    }

    #[test]
    fn test_open_missing_input() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.pdf");
        assert!(matches!(
            open_document(&missing),
            Err(UnveilError::InputNotFound(p)) if p == missing
        ));
    }

    #[test]
    fn test_input_stem() {
        assert_eq!(input_stem(Path::new("dir/target.pdf")), "target");
        assert_eq!(input_stem(Path::new("archive.tar.pdf")), "archive.tar");
    }
}
