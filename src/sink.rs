use crate::block::{Block, Emphasis, ListStyle, Span, Table};
use crate::error::RenderError;

/// Target of the structural commands produced by the line classifier.
///
/// Commands arrive strictly in document order and are only ever appended.
/// Styling, pagination and persistence are the sink's business.
pub trait DocumentSink {
    fn heading(&mut self, level: u8, text: &str) -> Result<(), RenderError>;

    fn paragraph(
        &mut self,
        spans: &[Span],
        list: ListStyle,
        emphasis: Option<Emphasis>,
    ) -> Result<(), RenderError>;

    fn table(&mut self, table: &Table) -> Result<(), RenderError>;

    fn page_break(&mut self) -> Result<(), RenderError>;

    fn rule(&mut self) -> Result<(), RenderError>;

    /// Dispatch a ready-made command to the matching operation.
    fn emit(&mut self, block: &Block) -> Result<(), RenderError> {
        match block {
            Block::Heading { level, text } => self.heading(*level, text),
            Block::Paragraph {
                spans,
                list,
                emphasis,
            } => self.paragraph(spans, *list, *emphasis),
            Block::Table(table) => self.table(table),
            Block::PageBreak => self.page_break(),
            Block::Rule => self.rule(),
        }
    }
}

/// Collects the command stream as-is.
impl DocumentSink for Vec<Block> {
    fn heading(&mut self, level: u8, text: &str) -> Result<(), RenderError> {
        Vec::push(self, Block::heading(level, text));
        Ok(())
    }

    fn paragraph(
        &mut self,
        spans: &[Span],
        list: ListStyle,
        emphasis: Option<Emphasis>,
    ) -> Result<(), RenderError> {
        Vec::push(
            self,
            Block::Paragraph {
                spans: spans.to_vec(),
                list,
                emphasis,
            },
        );
        Ok(())
    }

    fn table(&mut self, table: &Table) -> Result<(), RenderError> {
        Vec::push(self, Block::Table(table.clone()));
        Ok(())
    }

    fn page_break(&mut self) -> Result<(), RenderError> {
        Vec::push(self, Block::PageBreak);
        Ok(())
    }

    fn rule(&mut self) -> Result<(), RenderError> {
        Vec::push(self, Block::Rule);
        Ok(())
    }
}

/// Replay a recorded command stream into another sink.
pub fn replay<S>(blocks: &[Block], sink: &mut S) -> Result<(), RenderError>
where
    S: DocumentSink + ?Sized,
{
    blocks.iter().try_for_each(|block| sink.emit(block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn vec_records_commands_in_order() {
        let mut blocks: Vec<Block> = Vec::new();
        blocks.heading(2, "Overview").unwrap();
        blocks
            .paragraph(&[Span::plain("item")], ListStyle::Bullet, None)
            .unwrap();
        blocks.page_break().unwrap();
        blocks.rule().unwrap();

        assert_eq!(
            blocks,
            vec![
                Block::heading(2, "Overview"),
                Block::paragraph(vec![Span::plain("item")], ListStyle::Bullet),
                Block::PageBreak,
                Block::Rule,
            ]
        );
    }

    #[test]
    fn replay_copies_stream() {
        let recorded = vec![
            Block::heading(1, "A"),
            Block::Table(Table {
                headers: vec!["H".into()],
                rows: vec![vec!["x".into()]],
            }),
            Block::Rule,
        ];
        let mut copy: Vec<Block> = Vec::new();
        replay(&recorded, &mut copy).unwrap();
        assert_eq!(copy, recorded);
    }
}
