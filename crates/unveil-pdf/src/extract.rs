//! Dump page content streams to text files for offline inspection.

use std::path::{Path, PathBuf};

use unveil_core::error::Result;
use unveil_core::latin1;

use crate::accessor::{self, input_stem};

/// Files written by [`extract`].
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub output_dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// `{parent}/{stem}_streams`
pub fn default_output_dir(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    parent.join(format!("{}_streams", input_stem(input)))
}

/// Name for a single stream. `page_number` is 1-based.
pub fn stream_file_name(page_number: usize, stream_index: usize, object_number: u32) -> String {
    format!(
        "page{:03}_s{:02}_xref{}.txt",
        page_number, stream_index, object_number
    )
}

/// Name for a whole page in join mode. `page_number` is 1-based.
pub fn joined_file_name(page_number: usize) -> String {
    format!("page{:03}_full.txt", page_number)
}

/// Write every content stream of every page of `input` as latin-1 text.
///
/// With `join`, each page is written once with its streams joined by the
/// line delimiter, so line numbers match those the stepper and remover use.
/// Streams whose filters cannot be decoded are written as stored, with a
/// warning. The input is opened and read before the output directory is
/// created.
pub fn extract(input: &Path, output_dir: Option<&Path>, join: bool) -> Result<ExtractReport> {
    let doc = accessor::open_document(input)?;
    let page_count = accessor::page_ids(&doc).len();
    let pages = (0..page_count)
        .map(|page| accessor::page_content_or_raw(&doc, page))
        .collect::<Result<Vec<_>>>()?;

    let output_dir = output_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(input));
    std::fs::create_dir_all(&output_dir)?;

    let mut files = Vec::new();
    for content in &pages {
        let page_number = content.page + 1;
        if join {
            let path = output_dir.join(joined_file_name(page_number));
            write_text(&path, &content.buffer())?;
            files.push(path);
        } else {
            for (index, (id, data)) in content.refs.iter().zip(&content.streams).enumerate() {
                let path = output_dir.join(stream_file_name(page_number, index, id.0));
                write_text(&path, data)?;
                files.push(path);
            }
        }
    }

    log::info!(
        "Extracted {} file(s) from {} page(s) to {}",
        files.len(),
        page_count,
        output_dir.display()
    );

    Ok(ExtractReport { output_dir, files })
}

fn write_text(path: &Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, latin1::decode(data))?;
    log::debug!("Wrote {} ({} bytes)", path.display(), data.len());
    Ok(())
}
