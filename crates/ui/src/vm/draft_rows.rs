use kard_core::model::FlashcardDraft;

/// One editable row on the create page. `key` survives removals of other
/// rows, so the DOM keeps each input attached to its own draft.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftRow {
    pub key: u64,
    pub draft: FlashcardDraft,
}

/// The create page's draft list. Always holds at least one row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftRows {
    rows: Vec<DraftRow>,
    next_key: u64,
}

impl Default for DraftRows {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftRows {
    #[must_use]
    pub fn new() -> Self {
        let mut rows = Self {
            rows: Vec::new(),
            next_key: 0,
        };
        rows.push_blank();
        rows
    }

    #[must_use]
    pub fn rows(&self) -> &[DraftRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn drafts(&self) -> Vec<FlashcardDraft> {
        self.rows.iter().map(|row| row.draft.clone()).collect()
    }

    #[must_use]
    pub fn any_complete(&self) -> bool {
        self.rows.iter().any(|row| row.draft.is_complete())
    }

    pub fn push_blank(&mut self) {
        self.rows.push(DraftRow {
            key: self.next_key,
            draft: FlashcardDraft::default(),
        });
        self.next_key += 1;
    }

    /// Removes the row unless it is the last one left.
    pub fn remove(&mut self, key: u64) -> bool {
        if self.rows.len() <= 1 {
            return false;
        }
        let before = self.rows.len();
        self.rows.retain(|row| row.key != key);
        self.rows.len() != before
    }

    pub fn set_front(&mut self, key: u64, front: String) {
        if let Some(row) = self.row_mut(key) {
            row.draft.front = front;
        }
    }

    pub fn set_back(&mut self, key: u64, back: String) {
        if let Some(row) = self.row_mut(key) {
            row.draft.back = back;
        }
    }

    fn row_mut(&mut self, key: u64) -> Option<&mut DraftRow> {
        self.rows.iter_mut().find(|row| row.key == key)
    }
}
