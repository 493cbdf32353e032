use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, TempPath};

/// Matroska target type for a whole album/season/movie
const TARGET_TYPE_VALUE: u32 = 50;

/// Build a Matroska tags XML document with TITLE and ALBUM simple tags
pub fn mkv_tags_xml(title: &str, album: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<Tags>
  <Tag>
    <Targets>
      <TargetTypeValue>{}</TargetTypeValue>
    </Targets>
    <Simple>
      <Name>TITLE</Name>
      <String>{}</String>
    </Simple>
    <Simple>
      <Name>ALBUM</Name>
      <String>{}</String>
    </Simple>
  </Tag>
</Tags>
"#,
        TARGET_TYPE_VALUE,
        escape_xml(title),
        escape_xml(album)
    )
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Write a tag descriptor to a uniquely named temporary file.
///
/// The returned [`TempPath`] deletes the file when dropped, so the
/// descriptor never outlives the invocation that reads it. The file handle
/// is closed before returning so external tools can open it on any platform.
pub fn write_descriptor(
    title: &str,
    album: &str,
    scratch_dir: Option<&Path>,
) -> io::Result<TempPath> {
    let mut builder = Builder::new();
    builder.prefix("mkv-tags-").suffix(".xml");

    let mut file = match scratch_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };

    file.write_all(mkv_tags_xml(title, album).as_bytes())?;
    file.flush()?;

    Ok(file.into_temp_path())
}
