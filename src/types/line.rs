/// A trimmed, non-empty line of the source document with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    index: usize,
    text: String,
}

impl TextLine {
    /// Trim every line, drop the blank ones and number the rest sequentially.
    pub fn collect<I, S>(lines: I) -> Vec<TextLine>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        lines
            .into_iter()
            .filter_map(|line| {
                let trimmed = line.as_ref().trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            })
            .enumerate()
            .map(|(index, text)| TextLine { index, text })
            .collect()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl AsRef<str> for TextLine {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
