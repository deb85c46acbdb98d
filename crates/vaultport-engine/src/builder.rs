use regex::Regex;
use std::sync::LazyLock;

use crate::inline::Segmenter;
use crate::models::{Block, NoteIr};
use crate::store::AttachmentOutcome;

static NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\. ").unwrap());

const FENCE: &str = "```";
const DEFAULT_LANGUAGE: &str = "plain text";

struct FenceState {
    language: String,
    lines: Vec<String>,
}

/// Walks a note body line by line and emits the ordered block sequence.
///
/// The only cross-line state is the open code fence. Resolved reference
/// tokens split their line into paragraph / attachment / paragraph;
/// unresolved tokens flow through as literal text.
pub struct BlockBuilder<'a> {
    segmenter: Segmenter<'a>,
}

impl<'a> BlockBuilder<'a> {
    pub fn new(segmenter: Segmenter<'a>) -> Self {
        Self { segmenter }
    }

    pub fn build(
        &mut self,
        note: &NoteIr,
        attachments: &[(String, AttachmentOutcome)],
    ) -> Vec<Block> {
        let mut blocks = vec![];
        let mut fence: Option<FenceState> = None;

        for line in note.body.split('\n') {
            if line.starts_with(FENCE) {
                match fence.take() {
                    None => {
                        let language = line[FENCE.len()..].trim();
                        fence = Some(FenceState {
                            language: if language.is_empty() {
                                DEFAULT_LANGUAGE.to_string()
                            } else {
                                language.to_string()
                            },
                            lines: vec![],
                        });
                    }
                    Some(open) => blocks.push(Block::Code {
                        language: open.language,
                        content: open.lines.join("\n"),
                    }),
                }
                continue;
            }

            if let Some(open) = fence.as_mut() {
                open.lines.push(line.to_string());
                continue;
            }

            if let Some((token, outcome)) = attachments
                .iter()
                .find(|(token, _)| line.contains(token.as_str()))
            {
                self.emit_attachment_line(&mut blocks, line, token, outcome);
                continue;
            }

            self.emit_text_line(&mut blocks, line);
        }

        // unterminated fence at EOF still flushes
        if let Some(open) = fence
            && !open.lines.is_empty()
        {
            blocks.push(Block::Code {
                language: open.language,
                content: open.lines.join("\n"),
            });
        }

        blocks
    }

    /// Splits a line at the first matching reference token: text before and
    /// after becomes paragraphs, the token becomes one attachment block.
    /// Further occurrences of the token on the same line stay literal.
    fn emit_attachment_line(
        &mut self,
        blocks: &mut Vec<Block>,
        line: &str,
        token: &str,
        outcome: &AttachmentOutcome,
    ) {
        let parts: Vec<&str> = line.split(token).collect();

        let before = parts[0].trim();
        if !before.is_empty() {
            blocks.push(self.paragraph(before));
        }

        blocks.push(Block::Attachment {
            kind: outcome.kind,
            name: outcome.name.clone(),
            upload: outcome.upload.clone(),
        });

        let after = parts[1..].join(token);
        let after = after.trim();
        if !after.is_empty() {
            blocks.push(self.paragraph(after));
        }
    }

    fn emit_text_line(&mut self, blocks: &mut Vec<Block>, line: &str) {
        if let Some(text) = line.strip_prefix("# ") {
            blocks.push(self.heading(1, text));
        } else if let Some(text) = line.strip_prefix("## ") {
            blocks.push(self.heading(2, text));
        } else if let Some(text) = line.strip_prefix("### ") {
            blocks.push(self.heading(3, text));
        } else if let Some(text) = line.strip_prefix("- [ ] ") {
            blocks.push(Block::Todo {
                checked: false,
                runs: self.segmenter.segment(text),
            });
        } else if let Some(text) = line
            .strip_prefix("- [x] ")
            .or_else(|| line.strip_prefix("- [X] "))
        {
            blocks.push(Block::Todo {
                checked: true,
                runs: self.segmenter.segment(text),
            });
        } else if let Some(text) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            blocks.push(Block::Bullet {
                runs: self.segmenter.segment(text),
            });
        } else if NUMBERED.is_match(line) {
            let text = NUMBERED.replace(line, "");
            blocks.push(Block::Numbered {
                runs: self.segmenter.segment(&text),
            });
        } else if let Some(text) = line.strip_prefix("> ") {
            blocks.push(Block::Quote {
                runs: self.segmenter.segment(text),
            });
        } else if matches!(line.trim(), "---" | "***" | "___") {
            blocks.push(Block::Divider);
        } else if !line.trim().is_empty() {
            blocks.push(self.paragraph(line));
        }
    }

    fn paragraph(&mut self, text: &str) -> Block {
        Block::Paragraph {
            runs: self.segmenter.segment(text),
        }
    }

    fn heading(&mut self, level: u8, text: &str) -> Block {
        Block::Heading {
            level,
            runs: self.segmenter.segment(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttachmentKind, FileRef, TextRun, Upload};
    use crate::store::{NoTitles, TitleCache};
    use pretty_assertions::assert_eq;

    fn note(body: &str) -> NoteIr {
        NoteIr {
            title: "test".into(),
            date: None,
            frontmatter: vec![],
            body: body.into(),
            references: vec![],
            internal_links: vec![],
        }
    }

    fn build(body: &str) -> Vec<Block> {
        build_with(body, &[])
    }

    fn build_with(body: &str, attachments: &[(String, AttachmentOutcome)]) -> Vec<Block> {
        let mut titles = TitleCache::new();
        let segmenter = Segmenter::new(&NoTitles, &mut titles);
        BlockBuilder::new(segmenter).build(&note(body), attachments)
    }

    fn text_of(block: &Block) -> String {
        match block {
            Block::Heading { runs, .. }
            | Block::Paragraph { runs }
            | Block::Bullet { runs }
            | Block::Numbered { runs }
            | Block::Todo { runs, .. }
            | Block::Quote { runs } => runs.iter().map(|r| r.content.as_str()).collect(),
            _ => panic!("block has no runs: {block:?}"),
        }
    }

    #[test]
    fn headings_by_level() {
        let blocks = build("# One\n## Two\n### Three");
        assert!(matches!(blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(blocks[1], Block::Heading { level: 2, .. }));
        assert!(matches!(blocks[2], Block::Heading { level: 3, .. }));
        assert_eq!(text_of(&blocks[2]), "Three");
    }

    #[test]
    fn code_fence_round_trip() {
        let blocks = build("```rust\nlet x = 1;\nlet y = 2;\n```");
        assert_eq!(
            blocks,
            vec![Block::Code {
                language: "rust".into(),
                content: "let x = 1;\nlet y = 2;".into()
            }]
        );
    }

    #[test]
    fn fence_without_language_defaults_to_plain_text() {
        let blocks = build("```\nx\n```");
        assert!(
            matches!(&blocks[0], Block::Code { language, .. } if language == "plain text")
        );
    }

    #[test]
    fn unterminated_fence_flushes_at_eof() {
        let blocks = build("```sh\necho hi");
        assert_eq!(
            blocks,
            vec![Block::Code {
                language: "sh".into(),
                content: "echo hi".into()
            }]
        );
    }

    #[test]
    fn prefixes_inside_fence_are_verbatim() {
        let blocks = build("```\n# not a heading\n- not a bullet\n```");
        assert_eq!(blocks.len(), 1);
        assert!(matches!(
            &blocks[0],
            Block::Code { content, .. } if content == "# not a heading\n- not a bullet"
        ));
    }

    #[test]
    fn todos_are_matched_before_bullets() {
        let blocks = build("- [ ] open\n- [x] done\n- [X] also done\n- plain");
        assert!(matches!(blocks[0], Block::Todo { checked: false, .. }));
        assert!(matches!(blocks[1], Block::Todo { checked: true, .. }));
        assert!(matches!(blocks[2], Block::Todo { checked: true, .. }));
        assert!(matches!(blocks[3], Block::Bullet { .. }));
        assert_eq!(text_of(&blocks[0]), "open");
    }

    #[test]
    fn bullets_numbered_quotes_dividers() {
        let blocks = build("- a\n* b\n3. c\n> d\n---\n***\n___");
        assert!(matches!(blocks[0], Block::Bullet { .. }));
        assert!(matches!(blocks[1], Block::Bullet { .. }));
        assert!(matches!(blocks[2], Block::Numbered { .. }));
        assert_eq!(text_of(&blocks[2]), "c");
        assert!(matches!(blocks[3], Block::Quote { .. }));
        assert!(matches!(blocks[4], Block::Divider));
        assert!(matches!(blocks[5], Block::Divider));
        assert!(matches!(blocks[6], Block::Divider));
    }

    #[test]
    fn blank_lines_produce_no_blocks() {
        let blocks = build("a\n\n\nb");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn resolved_reference_splits_line_into_attachment() {
        let outcome = AttachmentOutcome {
            kind: AttachmentKind::Image,
            name: "img.png".into(),
            upload: Upload::Uploaded(FileRef::new("id-1")),
        };
        let blocks = build_with(
            "before ![[img.png]] after",
            &[("![[img.png]]".to_string(), outcome)],
        );
        assert_eq!(blocks.len(), 3);
        assert_eq!(text_of(&blocks[0]), "before");
        assert!(matches!(
            &blocks[1],
            Block::Attachment {
                kind: AttachmentKind::Image,
                upload: Upload::Uploaded(_),
                ..
            }
        ));
        assert_eq!(text_of(&blocks[2]), "after");
    }

    #[test]
    fn failed_upload_still_emits_attachment_block() {
        let outcome = AttachmentOutcome {
            kind: AttachmentKind::Pdf,
            name: "doc.pdf".into(),
            upload: Upload::Failed("api error".into()),
        };
        let blocks = build_with("![[doc.pdf]]", &[("![[doc.pdf]]".to_string(), outcome)]);
        assert_eq!(blocks.len(), 1);
        assert!(matches!(
            &blocks[0],
            Block::Attachment {
                upload: Upload::Failed(reason),
                ..
            } if reason == "api error"
        ));
    }

    #[test]
    fn unresolved_token_stays_literal_paragraph() {
        // no attachment outcome for the token: the line is ordinary text
        let blocks = build("see ![[missing.pdf]] here");
        assert_eq!(blocks.len(), 1);
        assert_eq!(text_of(&blocks[0]), "see ![[missing.pdf]] here");
    }

    #[test]
    fn segmenter_styles_flow_into_blocks() {
        let blocks = build("# A **bold** title");
        let Block::Heading { runs, .. } = &blocks[0] else {
            panic!("expected heading");
        };
        assert_eq!(
            runs[1],
            TextRun {
                content: "bold".into(),
                bold: true,
                ..TextRun::default()
            }
        );
    }
}
