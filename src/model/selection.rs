/// The ballot a voter is filling in: at most one candidate index is checked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    checked: Option<usize>,
}

impl Selection {
    pub fn new() -> Selection {
        Selection::default()
    }

    /// Check `index`, or clear the selection if `index` is already checked.
    pub fn toggle(&mut self, index: usize) -> Option<usize> {
        self.checked = if self.checked == Some(index) {
            None
        } else {
            Some(index)
        };
        self.checked
    }

    pub fn selected(&self) -> Option<usize> {
        self.checked
    }

    pub fn clear(&mut self) {
        self.checked = None;
    }
}
