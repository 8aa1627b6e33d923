//! Add/edit note form.

use shelf_core::{CategoryStyle, Note, NoteDraft, NotePatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Content,
    Category,
    Authors,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Title,
        FormField::Content,
        FormField::Category,
        FormField::Authors,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Content => "Content",
            FormField::Category => "Category",
            FormField::Authors => "Authors",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    EmptyTitle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub title: String,
    pub content: String,
    pub category: String,
    pub authors: String,
    pub focus: FormField,
}

impl NoteForm {
    /// Empty form; `category` preselects the first catalog entry, if any.
    pub fn new(category: Option<&str>) -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: category.unwrap_or_default().to_string(),
            authors: String::new(),
            focus: FormField::Title,
        }
    }

    /// Form prefilled from an existing note.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            category: note.category.clone(),
            authors: note.authors.clone(),
            focus: FormField::Title,
        }
    }

    pub fn focus_next(&mut self) {
        let next = (self.focus.index() + 1) % FormField::ALL.len();
        self.focus = FormField::ALL[next];
    }

    pub fn focus_prev(&mut self) {
        let len = FormField::ALL.len();
        let prev = (self.focus.index() + len - 1) % len;
        self.focus = FormField::ALL[prev];
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Content => &mut self.content,
            FormField::Category => &mut self.category,
            FormField::Authors => &mut self.authors,
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Content => &self.content,
            FormField::Category => &self.category,
            FormField::Authors => &self.authors,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn pop_char(&mut self) {
        self.focused_mut().pop();
    }

    /// Step the category through `names`. Free text not in the list restarts
    /// at the first (or last, going backwards) entry.
    pub fn cycle_category(&mut self, names: &[&str], forward: bool) {
        if names.is_empty() {
            return;
        }
        let next = match names.iter().position(|n| *n == self.category) {
            Some(i) if forward => (i + 1) % names.len(),
            Some(i) => (i + names.len() - 1) % names.len(),
            None if forward => 0,
            None => names.len() - 1,
        };
        self.category = names[next].to_string();
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::EmptyTitle);
        }
        Ok(())
    }

    pub fn to_draft(&self, style: CategoryStyle, date: String) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone(),
            authors: self.authors.clone(),
            date,
            color: style.color,
            border_color: style.border_color,
        }
    }

    /// Full edit patch. The note's `date` is never touched.
    pub fn to_patch(&self, style: CategoryStyle) -> NotePatch {
        NotePatch {
            title: Some(self.title.clone()),
            content: Some(self.content.clone()),
            category: Some(self.category.clone()),
            authors: Some(self.authors.clone()),
            date: None,
            color: Some(style.color),
            border_color: Some(style.border_color),
        }
    }
}
