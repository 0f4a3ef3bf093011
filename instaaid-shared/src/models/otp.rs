pub const OTP_LENGTH: usize = 6;

/// The six single-digit cells of the code-entry screen. Created on mount,
/// mutated per keystroke or paste, discarded on navigation away.
#[derive(Debug, Clone, Default)]
pub struct OtpInput {
    cells: [Option<char>; OTP_LENGTH],
}

impl OtpInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes one keystroke into a cell. Non-digit input clears the cell,
    /// matching backspace behaviour on the entry screen.
    pub fn set_cell(&mut self, index: usize, value: &str) {
        if index >= OTP_LENGTH {
            return;
        }
        self.cells[index] = value.chars().last().filter(|c| c.is_ascii_digit());
    }

    pub fn clear_cell(&mut self, index: usize) {
        if index < OTP_LENGTH {
            self.cells[index] = None;
        }
    }

    /// Fills the cells from a pasted string, keeping digits only and
    /// truncating to six.
    pub fn paste(&mut self, text: &str) {
        let digits: Vec<char> = text.chars().filter(|c| c.is_ascii_digit()).take(OTP_LENGTH).collect();
        self.cells = [None; OTP_LENGTH];
        for (i, d) in digits.into_iter().enumerate() {
            self.cells[i] = Some(d);
        }
    }

    pub fn clear(&mut self) {
        self.cells = [None; OTP_LENGTH];
    }

    /// The full code, only once all six cells are filled.
    pub fn assembled(&self) -> Option<String> {
        if self.cells.iter().all(|c| c.is_some()) {
            Some(self.cells.iter().flatten().collect())
        } else {
            None
        }
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}
