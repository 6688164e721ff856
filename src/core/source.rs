use crate::utils::error::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// 逐行讀取輸入，單次、不可重來
pub struct RecordSource<R> {
    lines: Lines<R>,
    line_number: usize,
}

/// One raw input line with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub line_number: usize,
    pub line: String,
}

impl<R: AsyncBufRead + Unpin> RecordSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// `Ok(None)` signals end of input. Read errors are fatal for the run.
    pub async fn next_record(&mut self) -> Result<Option<RawRecord>> {
        match self.lines.next_line().await? {
            Some(line) => {
                self.line_number += 1;
                Ok(Some(RawRecord {
                    line_number: self.line_number,
                    line,
                }))
            }
            None => Ok(None),
        }
    }

    pub fn lines_read(&self) -> usize {
        self.line_number
    }
}
