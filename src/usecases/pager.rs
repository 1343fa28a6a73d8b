//! Previous/Next browsing over a list of report pages.

use crate::domain::{Button, Report};

pub const PREVIOUS: &str = "page:prev";
pub const NEXT: &str = "page:next";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMove {
    Previous,
    Next,
}

impl PageMove {
    pub fn from_data(data: &str) -> Option<Self> {
        match data {
            PREVIOUS => Some(PageMove::Previous),
            NEXT => Some(PageMove::Next),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pager {
    pages: Vec<Report>,
    current: usize,
}

impl Pager {
    /// `None` for an empty page list.
    pub fn new(pages: Vec<Report>) -> Option<Self> {
        if pages.is_empty() {
            return None;
        }
        Some(Self { pages, current: 0 })
    }

    pub fn current(&self) -> &Report {
        &self.pages[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 0
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.pages.len()
    }

    /// Apply a move. Returns false when already at that end.
    pub fn apply(&mut self, mv: PageMove) -> bool {
        match mv {
            PageMove::Previous if self.has_previous() => self.current -= 1,
            PageMove::Next if self.has_next() => self.current += 1,
            _ => return false,
        }
        true
    }

    /// Buttons for the current position. Ends without a neighbour get no button.
    pub fn buttons(&self) -> Vec<Button> {
        let mut buttons = Vec::with_capacity(2);
        if self.has_previous() {
            buttons.push(Button {
                label: "◀ Previous".to_string(),
                data: PREVIOUS.to_string(),
            });
        }
        if self.has_next() {
            buttons.push(Button {
                label: "Next ▶".to_string(),
                data: NEXT.to_string(),
            });
        }
        buttons
    }
}
