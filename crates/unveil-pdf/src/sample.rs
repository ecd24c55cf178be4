//! In-memory construction of small test documents.
//!
//! [`hidden_message`] reproduces the classic occlusion case: a red text run
//! painted first, then an opaque image XObject drawn over the same area.

use std::path::Path;

use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use unveil_core::error::{Result, UnveilError};

/// A4 in points.
const MEDIA_BOX: [i64; 4] = [0, 0, 595, 842];

/// Content of the text stream in [`hidden_message`].
pub const HIDDEN_TEXT_STREAM: &[u8] =
    b"q\nBT\n/F1 40 Tf\n1 0 0 rg\n100 692 Td\n(Hidden Message) Tj\nET\nQ";

/// Content of the overlay stream in [`hidden_message`]: a 400x100 image
/// covering (100,100)-(500,200) in top-left page coordinates.
pub const OVERLAY_STREAM: &[u8] = b"q\n400 0 0 100 100 642 cm\n/Im0 Do\nQ";

/// Build a document with one page per entry of `pages`, each page declaring
/// the given content streams in order. All pages share a Helvetica font
/// `/F1` and a 1x1 grey image `/Im0`.
pub fn build_document(pages: &[Vec<Vec<u8>>]) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 1,
            "Height" => 1,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0x80],
    ));

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
        "XObject" => dictionary! { "Im0" => Object::Reference(image_id) },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for streams in pages {
        let contents: Vec<Object> = streams
            .iter()
            .map(|data| Object::Reference(doc.add_object(Stream::new(dictionary! {}, data.clone()))))
            .collect();

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => MEDIA_BOX.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
            "Contents" => contents,
            "Resources" => Object::Reference(resources_id),
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages.len() as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// One page: hidden red text, then the image that covers it.
pub fn hidden_message() -> Document {
    build_document(&[vec![HIDDEN_TEXT_STREAM.to_vec(), OVERLAY_STREAM.to_vec()]])
}

/// Write [`hidden_message`] to `path`, creating parent directories.
pub fn write_hidden_message(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut doc = hidden_message();
    doc.save(path)
        .map_err(|e| UnveilError::Pdf(format!("Failed to save {}: {}", path.display(), e)))?;
    log::info!("Sample written to {}", path.display());
    Ok(())
}

/// Declare `filter` on a content stream without re-encoding its bytes.
#[cfg(test)]
pub(crate) fn mark_filtered(doc: &mut Document, page: usize, stream: usize, filter: &str) {
    let page_id = crate::accessor::page_ids(doc)[page];
    let id = doc.get_page_contents(page_id)[stream];
    if let Ok(stream) = doc.get_object_mut(id).and_then(Object::as_stream_mut) {
        stream.dict.set("Filter", Object::Name(filter.as_bytes().to_vec()));
    }
}
