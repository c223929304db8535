//! Registers: unnamed, numbered ring, small-delete, named and read-only slots.
//!
//! Captures go to the register selected for the pending operator (if any)
//! and always mirror into the unnamed register. Deletes rotate the numbered
//! ring (`"1`..`"9`) unless they are charwise and within one line, in which
//! case they land in the small-delete register `"-`. Yanks land in `"0`.
//! Uppercase names append to their lowercase slot.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{trace, warn};

use crate::command::RangeShape;

/// Register contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register {
    pub text: String,
    pub shape: RangeShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("register '{0}' is read-only")]
    ReadOnly(char),
    #[error("'{0}' is not a register name")]
    InvalidName(char),
}

/// Register store seen by the engine.
pub trait RegisterStore {
    /// Store text removed (or copied) by an operator. A refusal must leave the
    /// store untouched; the engine then aborts the edit.
    fn capture(&mut self, text: &str, shape: RangeShape, is_delete: bool)
    -> Result<(), RegisterError>;

    /// Contents of register `name`.
    fn read(&self, name: char) -> Option<Register>;

    /// Target the next capture at register `name`.
    fn select(&mut self, name: char) -> Result<(), RegisterError>;
}

#[derive(Debug, Clone)]
pub struct Registers {
    unnamed: Option<Register>,
    yank: Option<Register>,
    numbered: Vec<Register>, // newest at index 0, length <= MAX
    small_delete: Option<Register>,
    named: [Option<Register>; 26],
    special: HashMap<char, Register>,
    read_only: Vec<char>,
    selected: Option<char>,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub const MAX: usize = 9;

    pub fn new() -> Self {
        Self {
            unnamed: None,
            yank: None,
            numbered: Vec::new(),
            small_delete: None,
            named: std::array::from_fn(|_| None),
            special: HashMap::new(),
            read_only: Vec::new(),
            selected: None,
        }
    }

    /// Registers that refuse capture (e.g. `.`, `:`, `%`).
    pub fn with_read_only(mut self, names: impl IntoIterator<Item = char>) -> Self {
        self.read_only = names.into_iter().collect();
        self
    }

    pub fn selected(&self) -> Option<char> {
        self.selected
    }

    /// Host-maintained contents of a read-only register.
    pub fn set_special(&mut self, name: char, text: impl Into<String>) {
        self.special.insert(
            name,
            Register {
                text: text.into(),
                shape: RangeShape::Exclusive,
            },
        );
    }

    /// Numbered ring, newest first.
    pub fn numbered(&self) -> &[Register] {
        &self.numbered
    }

    fn is_valid(name: char) -> bool {
        name.is_ascii_alphanumeric() || matches!(name, '"' | '-' | '.' | ':' | '%' | '/' | '_')
    }

    fn named_index(c: char) -> Option<usize> {
        if c.is_ascii_alphabetic() {
            Some((c.to_ascii_lowercase() as u8 - b'a') as usize)
        } else {
            None
        }
    }

    fn unshift_numbered(&mut self, reg: Register) -> bool {
        let rotated = self.numbered.len() == Self::MAX;
        if rotated {
            self.numbered.pop();
        }
        self.numbered.insert(0, reg);
        rotated
    }

    fn store_named(&mut self, c: char, reg: Register) -> Register {
        let Some(idx) = Self::named_index(c) else {
            return reg;
        };
        if c.is_ascii_uppercase()
            && let Some(existing) = self.named[idx].as_mut()
        {
            existing.text.push_str(&reg.text);
            if reg.shape == RangeShape::Linewise {
                existing.shape = RangeShape::Linewise;
            }
            return existing.clone();
        }
        self.named[idx] = Some(reg.clone());
        reg
    }
}

impl RegisterStore for Registers {
    fn capture(
        &mut self,
        text: &str,
        shape: RangeShape,
        is_delete: bool,
    ) -> Result<(), RegisterError> {
        let target = self.selected.take();
        if let Some(name) = target
            && self.read_only.contains(&name)
        {
            warn!(target: "state.registers", register = %name, "capture_refused_read_only");
            return Err(RegisterError::ReadOnly(name));
        }
        // Black hole.
        if target == Some('_') {
            return Ok(());
        }
        let reg = Register {
            text: text.to_string(),
            shape,
        };
        let stored = match target {
            Some(name) if name.is_ascii_alphabetic() => self.store_named(name, reg),
            _ if !is_delete => {
                self.yank = Some(reg.clone());
                reg
            }
            _ if shape != RangeShape::Linewise && !text.contains('\n') => {
                self.small_delete = Some(reg.clone());
                reg
            }
            _ => {
                let rotated = self.unshift_numbered(reg.clone());
                trace!(target: "state.registers", rotated, ring = self.numbered.len(), "numbered_unshift");
                reg
            }
        };
        trace!(target: "state.registers", register = ?target, chars = stored.text.chars().count(), is_delete, "capture");
        self.unnamed = Some(stored);
        Ok(())
    }

    fn read(&self, name: char) -> Option<Register> {
        match name {
            '"' => self.unnamed.clone(),
            '0' => self.yank.clone(),
            '1'..='9' => {
                let idx = (name as u8 - b'1') as usize;
                self.numbered.get(idx).cloned()
            }
            '-' => self.small_delete.clone(),
            c if c.is_ascii_alphabetic() => Self::named_index(c).and_then(|i| self.named[i].clone()),
            c => self.special.get(&c).cloned(),
        }
    }

    fn select(&mut self, name: char) -> Result<(), RegisterError> {
        if !Self::is_valid(name) {
            return Err(RegisterError::InvalidName(name));
        }
        self.selected = Some(name);
        Ok(())
    }
}
