//! Edit summary value object filled in by change ops.
//!
//! A summary is consumed by an external formatter to build human-readable
//! text. It never influences control flow.

use std::fmt;

use crate::model::{EntityId, Snak};

/// One argument for the automatic summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryArg {
    Text(String),
    EntityId(EntityId),
    Snak(Snak),
}

impl fmt::Display for SummaryArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummaryArg::Text(s) => f.write_str(s),
            SummaryArg::EntityId(id) => id.fmt(f),
            SummaryArg::Snak(snak) => snak.fmt(f),
        }
    }
}

impl From<&str> for SummaryArg {
    fn from(s: &str) -> Self {
        SummaryArg::Text(s.to_string())
    }
}

impl From<String> for SummaryArg {
    fn from(s: String) -> Self {
        SummaryArg::Text(s)
    }
}

impl From<EntityId> for SummaryArg {
    fn from(id: EntityId) -> Self {
        SummaryArg::EntityId(id)
    }
}

impl From<Snak> for SummaryArg {
    fn from(snak: Snak) -> Self {
        SummaryArg::Snak(snak)
    }
}

/// Structured edit summary.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summary {
    /// Message group of the calling endpoint (e.g. `"wbsetlabel"`).
    pub module_name: Option<String>,
    pub action_name: Option<String>,
    pub language_code: Option<String>,
    pub auto_summary_args: Vec<SummaryArg>,
    /// Free text supplied by the user.
    pub user_summary: Option<String>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_module(module_name: impl Into<String>) -> Self {
        Self {
            module_name: Some(module_name.into()),
            ..Self::default()
        }
    }

    pub fn set_action(&mut self, action: impl Into<String>) {
        self.action_name = Some(action.into());
    }

    pub fn set_language(&mut self, language: Option<impl Into<String>>) {
        self.language_code = language.map(Into::into);
    }

    /// Replaces the auto-summary arguments.
    pub fn set_args(&mut self, args: impl IntoIterator<Item = SummaryArg>) {
        self.auto_summary_args = args.into_iter().collect();
    }

    pub fn add_arg(&mut self, arg: impl Into<SummaryArg>) {
        self.auto_summary_args.push(arg.into());
    }

    /// Message key: `<module>-<action>`, or whichever part is present.
    pub fn message_key(&self) -> Option<String> {
        match (&self.module_name, &self.action_name) {
            (Some(module), Some(action)) => Some(format!("{module}-{action}")),
            (Some(module), None) => Some(module.clone()),
            (None, Some(action)) => Some(action.clone()),
            (None, None) => None,
        }
    }
}

/// Writes action, language and args into an optional summary.
pub(crate) fn update_summary(
    summary: Option<&mut Summary>,
    action: &str,
    language: Option<&str>,
    args: Vec<SummaryArg>,
) {
    if let Some(summary) = summary {
        summary.set_action(action);
        summary.set_language(language);
        summary.set_args(args);
    }
}
