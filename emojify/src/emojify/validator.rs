/// Boundary checker for one scan of one string or text node.
///
/// A candidate is accepted when it touches the start or the end of the input,
/// directly follows the previously accepted candidate, or is preceded by
/// whitespace. Everything else is an incidental substring such as the `;d` in
/// `I&#x27;d`.
#[derive(Debug, Default)]
pub struct Validator {
    last_accepted_end: Option<usize>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide on the candidate spanning `start..end` (byte offsets) of `input`.
    /// Candidates must be offered in increasing `start` order.
    pub fn accept(&mut self, input: &str, start: usize, end: usize) -> bool {
        let accepted = start == 0
            || end == input.len()
            || self.last_accepted_end == Some(start)
            || input[..start].chars().next_back().is_none_or(is_whitespace);

        if accepted {
            self.last_accepted_end = Some(end);
        }
        accepted
    }

    pub fn last_accepted_end(&self) -> Option<usize> {
        self.last_accepted_end
    }
}

pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{a0}')
}
