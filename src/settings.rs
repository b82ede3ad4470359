//! Account forms shown on the settings view.
//!
//! A `FormState` holds the text typed into one form. `submit` runs the
//! client-side checks and produces an `AuthRequest` with secrets wrapped in
//! `SecretString`, ready for the API client.

use secrecy::SecretString;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("Please fill in all fields.")]
    MissingFields,

    #[error("New passwords do not match.")]
    NewPasswordMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Register,
    ChangePassword,
    ResetPassword,
}

/// One input of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: &'static str,
    /// Rendered masked.
    pub secret: bool,
}

const fn field(label: &'static str, secret: bool) -> FieldSpec {
    FieldSpec { label, secret }
}

const LOGIN_FIELDS: [FieldSpec; 2] = [field("Email", false), field("Password", true)];
const REGISTER_FIELDS: [FieldSpec; 4] = [
    field("Name", false),
    field("Email", false),
    field("Password", true),
    field("Confirm password", true),
];
const CHANGE_FIELDS: [FieldSpec; 3] = [
    field("Current password", true),
    field("New password", true),
    field("Confirm new password", true),
];
const RESET_FIELDS: [FieldSpec; 2] = [field("Email", false), field("New password", true)];

impl FormKind {
    pub const ALL: [FormKind; 4] = [
        FormKind::Login,
        FormKind::Register,
        FormKind::ChangePassword,
        FormKind::ResetPassword,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Register => "Create account",
            Self::ChangePassword => "Change password",
            Self::ResetPassword => "Reset password",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::Login => &LOGIN_FIELDS,
            Self::Register => &REGISTER_FIELDS,
            Self::ChangePassword => &CHANGE_FIELDS,
            Self::ResetPassword => &RESET_FIELDS,
        }
    }
}

/// A validated form, ready to send.
#[derive(Debug)]
pub enum AuthRequest {
    Login {
        email: String,
        password: SecretString,
    },
    Register {
        name: String,
        email: String,
        password: SecretString,
    },
    ChangePassword {
        current: SecretString,
        new: SecretString,
        confirm: SecretString,
    },
    ResetPassword {
        email: String,
        new_password: SecretString,
    },
}

impl AuthRequest {
    /// Short name for logs and task labels.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Register { .. } => "register",
            Self::ChangePassword { .. } => "change_password",
            Self::ResetPassword { .. } => "reset_password",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    kind: FormKind,
    values: Vec<String>,
    focus: usize,
}

impl FormState {
    pub fn new(kind: FormKind) -> Self {
        Self {
            kind,
            values: vec![String::new(); kind.fields().len()],
            focus: 0,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// Switch to another form, discarding what was typed.
    pub fn switch(&mut self, kind: FormKind) {
        *self = Self::new(kind);
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn value(&self, index: usize) -> &str {
        self.values.get(index).map(String::as_str).unwrap_or("")
    }

    /// Field labels paired with what to display (secrets masked).
    pub fn rows(&self) -> impl Iterator<Item = (&'static FieldSpec, String)> + '_ {
        self.kind.fields().iter().zip(&self.values).map(|(spec, value)| {
            let shown = if spec.secret {
                "*".repeat(value.chars().count())
            } else {
                value.clone()
            };
            (spec, shown)
        })
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(value) = self.values.get_mut(self.focus) {
            value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(value) = self.values.get_mut(self.focus) {
            value.pop();
        }
    }

    /// Move focus down, wrapping.
    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.values.len().max(1);
    }

    /// Move focus up, wrapping.
    pub fn prev_field(&mut self) {
        let len = self.values.len().max(1);
        self.focus = (self.focus + len - 1) % len;
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 >= self.values.len()
    }

    pub fn clear(&mut self) {
        self.switch(self.kind);
    }

    /// Validate and build the request.
    pub fn submit(&self) -> Result<AuthRequest, ValidationError> {
        let v = |i: usize| self.value(i).to_string();
        let secret = |i: usize| SecretString::from(self.value(i).to_string());

        match self.kind {
            FormKind::Login => Ok(AuthRequest::Login {
                email: v(0),
                password: secret(1),
            }),
            FormKind::Register => {
                if self.value(2) != self.value(3) {
                    return Err(ValidationError::PasswordMismatch);
                }
                Ok(AuthRequest::Register {
                    name: v(0),
                    email: v(1),
                    password: secret(2),
                })
            }
            FormKind::ChangePassword => {
                if self.values.iter().any(|s| s.is_empty()) {
                    return Err(ValidationError::MissingFields);
                }
                if self.value(1) != self.value(2) {
                    return Err(ValidationError::NewPasswordMismatch);
                }
                Ok(AuthRequest::ChangePassword {
                    current: secret(0),
                    new: secret(1),
                    confirm: secret(2),
                })
            }
            FormKind::ResetPassword => Ok(AuthRequest::ResetPassword {
                email: v(0),
                new_password: secret(1),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn filled(kind: FormKind, values: &[&str]) -> FormState {
        let mut form = FormState::new(kind);
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                form.next_field();
            }
            for c in value.chars() {
                form.push_char(c);
            }
        }
        form
    }

    #[test]
    fn test_register_mismatch_is_rejected_locally() {
        let form = filled(FormKind::Register, &["Ann", "a@x.org", "pw1", "pw2"]);
        let err = form.submit().unwrap_err();
        assert_eq!(err, ValidationError::PasswordMismatch);
        assert_eq!(err.to_string(), "Passwords do not match!");
    }

    #[test]
    fn test_register_ok() {
        let form = filled(FormKind::Register, &["Ann", "a@x.org", "pw", "pw"]);
        match form.submit().unwrap() {
            AuthRequest::Register { email, password, .. } => {
                assert_eq!(email, "a@x.org");
                assert_eq!(password.expose_secret(), "pw");
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn test_change_password_requires_every_field() {
        let form = filled(FormKind::ChangePassword, &["old", "", ""]);
        assert_eq!(form.submit().unwrap_err().to_string(), "Please fill in all fields.");
    }

    #[test]
    fn test_change_password_mismatch() {
        let form = filled(FormKind::ChangePassword, &["old", "new1", "new2"]);
        assert_eq!(form.submit().unwrap_err(), ValidationError::NewPasswordMismatch);
        assert_eq!(
            ValidationError::NewPasswordMismatch.to_string(),
            "New passwords do not match."
        );
    }

    #[test]
    fn test_secrets_are_masked() {
        let form = filled(FormKind::Login, &["me@x.org", "hunter2"]);
        let rows: Vec<_> = form.rows().map(|(_, shown)| shown).collect();
        assert_eq!(rows, vec!["me@x.org".to_string(), "*******".to_string()]);
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = FormState::new(FormKind::ResetPassword);
        form.prev_field();
        assert_eq!(form.focus(), 1);
        assert!(form.is_last_field());
        form.next_field();
        assert_eq!(form.focus(), 0);
    }

    #[test]
    fn test_switch_discards_input() {
        let mut form = filled(FormKind::Login, &["me", "pw"]);
        form.switch(FormKind::ChangePassword);
        assert_eq!(form.kind(), FormKind::ChangePassword);
        assert_eq!(form.value(0), "");
        assert_eq!(form.focus(), 0);
    }
}
