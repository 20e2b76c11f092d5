//! Module-wide artifact numbering
//!
//! Every newly created artifact takes the next number from this counter.
//! The host resets it once per module, before any function is processed,
//! so numbers are dense and strictly increasing within a module no matter
//! how often a function is revisited.

#[derive(Debug, Default)]
pub struct ModuleNumbering {
    next: u32,
}

impl ModuleNumbering {
    pub fn new() -> Self {
        Self { next: 0 }
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }

    /// Take the next number and advance the counter
    pub fn next_number(&mut self) -> u32 {
        let number = self.next;
        self.next = match self.next.checked_add(1) {
            Some(next) => next,
            None => panic!("module numbering exhausted: a module holds at most u32::MAX artifacts"),
        };
        number
    }

    /// The number the next artifact will receive
    pub fn peek(&self) -> u32 {
        self.next
    }
}
