//! Mapping from physical keys to logical actions.
//!
//! The [`BindingTable`] is built once at startup and read concurrently afterwards. Several
//! tokens may trigger the same action, but a token triggers at most one action: a
//! configuration that claims one token for two different actions is rejected with
//! [`BindingError::Conflict`] rather than resolved silently.
//!
//! # Configuration
//!
//! Bindings come from the `[bindings]` table of the settings file, keyed by action name:
//!
//! ```toml
//! [bindings]
//! "navigate:up" = ["up", "i"]
//! "click:right" = ["semicolon"]
//! ```
//!
//! Actions missing from the configuration keep their built-in tokens. Unknown action names
//! and unparseable tokens are skipped with a warning; an action whose configured tokens are
//! all invalid falls back to its built-in tokens.

use crate::{
    action::{Button, Direction, LogicalAction, ScrollDirection},
    key::{KeyToken, NamedKey},
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use snafu::Snafu;
use std::collections::BTreeMap;
use tracing::warn;

type Tokens = SmallVec<[KeyToken; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum BindingError {
    #[snafu(display("key {token} is bound to both {first} and {second}"))]
    Conflict {
        token: KeyToken,
        first: LogicalAction,
        second: LogicalAction,
    },
}

#[derive(Debug, Clone)]
pub struct BindingTable {
    by_action: Vec<(LogicalAction, Tokens)>,
    by_token: FxHashMap<KeyToken, LogicalAction>,
}

/// Built-in tokens for `action`, taken from the classic home-row layout.
pub fn default_tokens(action: LogicalAction) -> Tokens {
    use NamedKey::*;
    let named = |key| KeyToken::Named(key);
    let ch = KeyToken::Char;
    match action {
        LogicalAction::Navigate(Direction::Up) => smallvec_of(&[named(Up), ch('i')]),
        LogicalAction::Navigate(Direction::Down) => smallvec_of(&[named(Down), ch('k')]),
        LogicalAction::Navigate(Direction::Left) => smallvec_of(&[named(Left), ch('j')]),
        LogicalAction::Navigate(Direction::Right) => smallvec_of(&[named(Right), ch('l')]),
        LogicalAction::Scroll(ScrollDirection::Up) => smallvec_of(&[ch('u')]),
        LogicalAction::Scroll(ScrollDirection::Down) => smallvec_of(&[ch('m'), ch('n')]),
        LogicalAction::Click(Button::Left) => smallvec_of(&[ch('h')]),
        LogicalAction::Click(Button::Right) => smallvec_of(&[ch(';')]),
        LogicalAction::Click(Button::Middle) => Tokens::new(),
        LogicalAction::HoldClick => smallvec_of(&[named(Space)]),
    }
}

fn smallvec_of(tokens: &[KeyToken]) -> Tokens {
    tokens.iter().copied().collect()
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::defaults()
    }
}

impl BindingTable {
    /// The built-in layout.
    pub fn defaults() -> Self {
        let mut builder = BindingTableBuilder::new();
        for action in LogicalAction::ALL {
            builder.set(action, default_tokens(action));
        }
        builder
            .build()
            .unwrap_or_else(|_| unreachable!("built-in bindings never overlap"))
    }

    pub fn builder() -> BindingTableBuilder {
        BindingTableBuilder::new()
    }

    /// Builds a table from the `[bindings]` section of the settings file.
    pub fn from_config(raw: &BTreeMap<String, Vec<String>>) -> Result<Self, BindingError> {
        let mut builder = BindingTableBuilder::new();
        for action in LogicalAction::ALL {
            builder.set(action, default_tokens(action));
        }

        for (name, tokens) in raw {
            let action = match name.parse::<LogicalAction>() {
                Ok(action) => action,
                Err(e) => {
                    warn!("Skipping binding: {e}");
                    continue;
                },
            };

            let mut parsed = Tokens::new();
            for token in tokens {
                match KeyToken::parse(token) {
                    Some(t) if t.modifier().is_some() => {
                        warn!(%action, "Skipping modifier key {t} in binding; modifiers cannot be bound");
                    },
                    Some(t) => parsed.push(t),
                    None => warn!(%action, "Skipping unparseable key token {token:?}"),
                }
            }

            if parsed.is_empty() {
                warn!(%action, "No usable keys configured, keeping built-in keys");
                continue;
            }
            builder.set(action, parsed);
        }

        builder.build()
    }

    pub fn action_for(&self, token: &KeyToken) -> Option<LogicalAction> {
        self.by_token.get(token).copied()
    }

    pub fn tokens_for(&self, action: LogicalAction) -> &[KeyToken] {
        self.by_action
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, tokens)| tokens.as_slice())
            .unwrap_or(&[])
    }

    /// Every bound token, grouped by action in [`LogicalAction::ALL`] order.
    pub fn tokens(&self) -> impl Iterator<Item = &KeyToken> {
        self.by_action.iter().flat_map(|(_, tokens)| tokens.iter())
    }

    pub fn iter(&self) -> impl Iterator<Item = (LogicalAction, &[KeyToken])> {
        self.by_action
            .iter()
            .map(|(action, tokens)| (*action, tokens.as_slice()))
    }

    pub fn is_hold_token(&self, token: &KeyToken) -> bool {
        self.action_for(token) == Some(LogicalAction::HoldClick)
    }

    pub fn len(&self) -> usize {
        self.by_token.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_token.is_empty()
    }
}

/// Assembles a [`BindingTable`], checking for tokens claimed by more than one action.
#[derive(Debug, Default)]
pub struct BindingTableBuilder {
    by_action: Vec<(LogicalAction, Tokens)>,
}

impl BindingTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the tokens bound to `action`.
    pub fn set(&mut self, action: LogicalAction, tokens: impl IntoIterator<Item = KeyToken>) {
        let mut deduped = Tokens::new();
        for token in tokens {
            if !deduped.contains(&token) {
                deduped.push(token);
            }
        }
        match self.by_action.iter_mut().find(|(a, _)| *a == action) {
            Some((_, existing)) => *existing = deduped,
            None => self.by_action.push((action, deduped)),
        }
    }

    /// Adds one token to `action`, keeping tokens already bound to it.
    pub fn bind(mut self, action: LogicalAction, token: KeyToken) -> Self {
        match self.by_action.iter_mut().find(|(a, _)| *a == action) {
            Some((_, existing)) if !existing.contains(&token) => existing.push(token),
            Some(_) => {},
            None => self.by_action.push((action, smallvec_of(&[token]))),
        }
        self
    }

    pub fn build(mut self) -> Result<BindingTable, BindingError> {
        self.by_action
            .sort_by_key(|(action, _)| LogicalAction::ALL.iter().position(|a| a == action));

        let mut by_token = FxHashMap::default();
        for (action, tokens) in &self.by_action {
            for token in tokens {
                if let Some(first) = by_token.insert(*token, *action) {
                    return ConflictSnafu {
                        token: *token,
                        first,
                        second: *action,
                    }
                    .fail();
                }
            }
        }

        Ok(BindingTable {
            by_action: self.by_action,
            by_token,
        })
    }
}
