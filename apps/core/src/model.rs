use std::sync::Arc;

/// Opaque handle the activation collaborator needs to focus a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceRef {
    Window { pid: u32, handle: u64 },
    Tab { app_id: String, pid: u32 },
}

/// Container window plus tab position; together they address a sub-item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubItem {
    pub parent_ref: u64,
    pub sub_index: usize,
}

/// Text with a per-character lowercase fold that stays index-aligned with the original.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FoldedText {
    original: Vec<char>,
    folded: Vec<char>,
}

impl FoldedText {
    pub fn new(input: &str) -> Self {
        let original: Vec<char> = input.chars().collect();
        let folded = original.iter().map(|c| fold_char(*c)).collect();
        Self { original, folded }
    }

    pub fn original(&self) -> &[char] {
        &self.original
    }

    pub fn folded(&self) -> &[char] {
        &self.folded
    }

    pub fn len(&self) -> usize {
        self.original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

/// Lowercases one character. Multi-character expansions keep only their first char.
pub fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// What an enumeration source yields. Sources never assign public ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub title: String,
    pub owner_name: String,
    pub native_key: Option<u64>,
    pub source_ref: SourceRef,
    pub sub_item: Option<SubItem>,
}

impl RawCandidate {
    pub fn window(title: &str, owner_name: &str, pid: u32, handle: u64) -> Self {
        Self {
            title: title.to_string(),
            owner_name: owner_name.to_string(),
            native_key: Some(handle),
            source_ref: SourceRef::Window { pid, handle },
            sub_item: None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.is_empty() && self.owner_name.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: usize,
    pub title: String,
    pub owner_name: String,
    pub source_ref: SourceRef,
    pub sub_item: Option<SubItem>,
    folded_title: FoldedText,
    folded_owner: FoldedText,
}

impl Candidate {
    pub fn new(id: usize, title: &str, owner_name: &str, source_ref: SourceRef) -> Self {
        Self::from_raw(
            id,
            RawCandidate {
                title: title.to_string(),
                owner_name: owner_name.to_string(),
                native_key: None,
                source_ref,
                sub_item: None,
            },
        )
    }

    pub fn from_raw(id: usize, raw: RawCandidate) -> Self {
        let folded_title = FoldedText::new(&raw.title);
        let folded_owner = FoldedText::new(&raw.owner_name);
        Self {
            id,
            title: raw.title,
            owner_name: raw.owner_name,
            source_ref: raw.source_ref,
            sub_item: raw.sub_item,
            folded_title,
            folded_owner,
        }
    }

    pub fn with_sub_item(mut self, parent_ref: u64, sub_index: usize) -> Self {
        self.sub_item = Some(SubItem {
            parent_ref,
            sub_index,
        });
        self
    }

    pub fn is_sub_item(&self) -> bool {
        self.sub_item.is_some()
    }

    pub fn folded_title(&self) -> &FoldedText {
        &self.folded_title
    }

    pub fn folded_owner(&self) -> &FoldedText {
        &self.folded_owner
    }

    pub fn display_name(&self) -> String {
        if self.title.is_empty() {
            return self.owner_name.clone();
        }
        format!("{}: {}", self.owner_name, self.title)
    }

    /// Row headline: the title, or the owner when the title is empty.
    pub fn primary_text(&self) -> &str {
        if self.title.is_empty() {
            &self.owner_name
        } else {
            &self.title
        }
    }

    pub fn secondary_text(&self) -> Option<&str> {
        if self.title.is_empty() {
            None
        } else {
            Some(&self.owner_name)
        }
    }
}

/// One fully assembled refresh result. Never mutated once published.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub generation: u64,
    pub candidates: Vec<Candidate>,
}

impl Snapshot {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn new(generation: u64, candidates: Vec<Candidate>) -> Self {
        Self {
            generation,
            candidates,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    pub score: i64,
}

#[cfg(test)]
mod tests {
    use super::{fold_char, Candidate, FoldedText, SourceRef};

    fn window(title: &str, owner: &str) -> Candidate {
        Candidate::new(0, title, owner, SourceRef::Window { pid: 1, handle: 1 })
    }

    #[test]
    fn display_name_falls_back_to_owner() {
        assert_eq!(window("", "Finder").display_name(), "Finder");
        assert_eq!(window("Inbox", "Mail").display_name(), "Mail: Inbox");
    }

    #[test]
    fn primary_and_secondary_text_follow_title_presence() {
        let titled = window("Inbox", "Mail");
        assert_eq!(titled.primary_text(), "Inbox");
        assert_eq!(titled.secondary_text(), Some("Mail"));

        let untitled = window("", "Finder");
        assert_eq!(untitled.primary_text(), "Finder");
        assert_eq!(untitled.secondary_text(), None);
    }

    #[test]
    fn folded_text_stays_aligned_with_original() {
        let text = FoldedText::new("İstanbul Ärger");
        assert_eq!(text.original().len(), text.folded().len());
        assert_eq!(text.folded()[0], 'i');
        assert_eq!(text.folded()[9], 'ä');
        assert_eq!(fold_char('Q'), 'q');
    }
}
