use crate::RequestError;

/// Ordered, non-empty list of comments in upload order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBatch {
    comments: Vec<String>,
}

impl CommentBatch {
    /// Split raw upload text on line breaks, dropping blank lines.
    ///
    /// Each kept comment is trimmed. `\r\n` endings are handled by `lines()`.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let comments: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToOwned::to_owned)
            .collect();
        if comments.is_empty() {
            return Err(RequestError::EmptyBatch);
        }
        Ok(Self { comments })
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.comments.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.comments
    }
}
