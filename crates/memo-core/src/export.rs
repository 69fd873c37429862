//! Note export to JSON and Markdown.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::models::{Block, BlockKind, NoteDocument, ThemeColor};

/// Export output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    Json,
    Markdown,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

/// Serializable note representation used in exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNote {
    pub id: String,
    pub title: String,
    pub theme: ThemeColor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub created_at: i64,
    pub modified_at: i64,
    pub tags: Vec<String>,
    pub blocks: Vec<Block>,
}

/// Convert a note into an export record.
#[must_use]
pub fn note_to_export_item(note: &NoteDocument) -> ExportNote {
    ExportNote {
        id: note.id.to_string(),
        title: note.title.clone(),
        theme: note.theme,
        folder_id: note.folder_id.map(|id| id.to_string()),
        created_at: note.created_at,
        modified_at: note.modified_at,
        // Already sorted: tags are a BTreeSet.
        tags: note.tags.iter().cloned().collect(),
        blocks: note.blocks.clone(),
    }
}

/// Render notes as pretty-printed JSON.
pub fn render_json_export(notes: &[NoteDocument]) -> serde_json::Result<String> {
    let items = notes
        .iter()
        .map(note_to_export_item)
        .collect::<Vec<ExportNote>>();
    serde_json::to_string_pretty(&items)
}

/// One block as a Markdown line.
#[must_use]
pub fn block_to_markdown(block: &Block) -> String {
    match block.kind {
        BlockKind::Text => block.text.clone(),
        BlockKind::Checklist => {
            let mark = if block.checked { 'x' } else { ' ' };
            format!("- [{mark}] {}", block.text)
        }
        BlockKind::BulletList => format!("- {}", block.text),
        BlockKind::Image => {
            let target = block.image_ref.as_ref().map_or("", |r| r.as_str());
            format!("![image]({target})")
        }
    }
}

/// Render notes in Markdown with frontmatter blocks.
#[must_use]
pub fn render_markdown_export(notes: &[NoteDocument]) -> String {
    let mut output = String::new();

    for (index, note) in notes.iter().enumerate() {
        if index > 0 {
            output.push('\n');
        }

        let _ = writeln!(output, "---");
        let _ = writeln!(output, "id: {}", note.id);
        let _ = writeln!(output, "title: {}", note.title);
        let _ = writeln!(output, "theme: {}", note.theme);
        let _ = writeln!(output, "created_at: {}", note.created_at);
        let _ = writeln!(output, "modified_at: {}", note.modified_at);
        let _ = writeln!(output, "tags:");
        for tag in &note.tags {
            let _ = writeln!(output, "  - {tag}");
        }
        let _ = writeln!(output, "---");
        let _ = writeln!(output);
        for block in &note.blocks {
            let _ = writeln!(output, "{}", block_to_markdown(block));
        }
    }

    output
}

/// Render notes based on selected export format.
pub fn render_notes_export(
    notes: &[NoteDocument],
    format: ExportFormat,
) -> serde_json::Result<String> {
    match format {
        ExportFormat::Json => render_json_export(notes),
        ExportFormat::Markdown => Ok(render_markdown_export(notes)),
    }
}

/// Build a deterministic default file name for export flows.
#[must_use]
pub fn suggested_export_file_name(format: ExportFormat, timestamp_ms: i64) -> String {
    format!("memo-export-{timestamp_ms}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageRef;
    use pretty_assertions::assert_eq;

    fn shopping() -> NoteDocument {
        let mut note = NoteDocument::new(ThemeColor::Orange)
            .with_title("Shopping")
            .with_blocks(vec![
                Block::text("For the weekend"),
                Block::checklist("milk", true),
                Block::checklist("eggs", false),
                Block::bullet("ask about bread"),
                Block::image(ImageRef::new("images/list.png")),
            ]);
        note.id = "cccccccc-cccc-7ccc-8ccc-111111111111".parse().unwrap();
        note.created_at = 123;
        note.modified_at = 456;
        note.add_tag("zeta").unwrap();
        note.add_tag("alpha").unwrap();
        note
    }

    #[test]
    fn note_to_export_item_sorts_tags() {
        let export = note_to_export_item(&shopping());
        assert_eq!(export.tags, vec!["alpha", "zeta"]);
        assert_eq!(export.blocks.len(), 5);
        assert_eq!(export.folder_id, None);
    }

    #[test]
    fn render_markdown_export_includes_frontmatter_and_blocks() {
        let rendered = render_markdown_export(&[shopping()]);
        assert!(rendered.contains("id: cccccccc-cccc-7ccc-8ccc-111111111111"));
        assert!(rendered.contains("title: Shopping"));
        assert!(rendered.contains("theme: ORANGE"));
        assert!(rendered.contains("created_at: 123"));
        assert!(rendered.contains("modified_at: 456"));
        assert!(rendered.contains("tags:\n  - alpha\n  - zeta"));

        let body = rendered.split("---\n\n").nth(1).unwrap();
        assert_eq!(
            body,
            "For the weekend\n- [x] milk\n- [ ] eggs\n- ask about bread\n![image](images/list.png)\n"
        );
    }

    #[test]
    fn render_json_export_keeps_blocks() {
        let rendered = render_notes_export(&[shopping()], ExportFormat::Json).unwrap();
        let parsed: Vec<ExportNote> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0].title, "Shopping");
        assert_eq!(parsed[0].blocks[1].kind, BlockKind::Checklist);
        assert!(parsed[0].blocks[1].checked);
        assert!(rendered.contains("\"theme\": \"ORANGE\""));
    }

    #[test]
    fn suggested_export_file_name_uses_format_extension() {
        assert_eq!(
            suggested_export_file_name(ExportFormat::Json, 123),
            "memo-export-123.json"
        );
        assert_eq!(
            suggested_export_file_name(ExportFormat::Markdown, 456),
            "memo-export-456.md"
        );
    }
}
