//! Outcome of an edit attempt that is not an error.

use std::fmt;

/// How serious a status message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Fatal,
}

/// A message key with parameters, rendered by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub key: String,
    pub params: Vec<String>,
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)?;
        if !self.params.is_empty() {
            write!(f, " ({})", self.params.join(", "))?;
        }
        Ok(())
    }
}

/// A value or a list of messages explaining why there is none.
///
/// A status is OK while it carries no fatal message. Warnings can accompany
/// a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status<T> {
    value: Option<T>,
    messages: Vec<StatusMessage>,
}

impl<T> Status<T> {
    pub fn good(value: T) -> Self {
        Self {
            value: Some(value),
            messages: Vec::new(),
        }
    }

    pub fn fatal(key: &str) -> Self {
        Self::fatal_with(key, Vec::<String>::new())
    }

    pub fn fatal_with(key: &str, params: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            value: None,
            messages: vec![StatusMessage {
                severity: Severity::Fatal,
                key: key.to_string(),
                params: params.into_iter().map(Into::into).collect(),
            }],
        }
    }

    /// Adds a non-fatal message.
    pub fn warning(&mut self, key: &str) {
        self.messages.push(StatusMessage {
            severity: Severity::Warning,
            key: key.to_string(),
            params: Vec::new(),
        });
    }

    pub fn is_ok(&self) -> bool {
        self.messages.iter().all(|m| m.severity != Severity::Fatal)
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn has_message(&self, key: &str) -> bool {
        self.messages.iter().any(|m| m.key == key)
    }

    /// Keeps the messages, drops the value.
    pub fn without_value<U>(self) -> Status<U> {
        Status {
            value: None,
            messages: self.messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_good_with_warning_is_ok() {
        let mut status = Status::good(7);
        status.warning("edit-conflict-resolved");
        assert!(status.is_ok());
        assert_eq!(status.value(), Some(&7));
        assert!(status.has_message("edit-conflict-resolved"));
    }

    #[test]
    fn test_fatal() {
        let status: Status<u64> = Status::fatal_with("permissiondenied", ["edit", "editor"]);
        assert!(!status.is_ok());
        assert_eq!(status.value(), None);
        assert_eq!(status.messages()[0].to_string(), "permissiondenied (edit, editor)");

        let moved: Status<String> = status.without_value();
        assert!(moved.has_message("permissiondenied"));
    }
}
