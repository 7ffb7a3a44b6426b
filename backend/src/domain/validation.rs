//! Registration field rules.
//!
//! The ruleset is compiled once per process and shared read-only. Every rule
//! runs on every draft so a client sees all failing fields at once, reported
//! in the fixed order name, email, password.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::RegistrationDraft;

const EMAIL_PATTERN: &str =
    r"^[a-zA-Z0-9.!#$%&'’*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$";

/// Minimum password length in characters.
pub const PASSWORD_MIN_LEN: usize = 8;

/// A single field-level rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Name absent, empty, or whitespace only.
    BlankName,
    /// Email absent or not shaped like an address.
    InvalidEmail,
    /// Password absent or too weak.
    InvalidPassword,
    /// Email already belongs to a stored user.
    DuplicateEmail,
}

impl FieldError {
    /// Name of the offending field.
    pub fn field(self) -> &'static str {
        match self {
            Self::BlankName => "name",
            Self::InvalidEmail | Self::DuplicateEmail => "email",
            Self::InvalidPassword => "password",
        }
    }

    /// Rule message without the field prefix.
    pub fn message(self) -> &'static str {
        match self {
            Self::BlankName => "no debe estar vacio",
            Self::InvalidEmail => "Email invalido",
            Self::InvalidPassword => "Contrasena invalida",
            Self::DuplicateEmail => "Email ya registrado",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error en el campo: {}, {}", self.field(), self.message())
    }
}

/// Compiled registration ruleset.
///
/// # Examples
/// ```
/// use accounts::domain::{RegistrationDraft, UserValidator};
///
/// let errors = UserValidator::shared().validate(&RegistrationDraft::default());
/// assert_eq!(errors.len(), 3);
/// ```
#[derive(Debug)]
pub struct UserValidator {
    email: Regex,
}

static SHARED: OnceLock<UserValidator> = OnceLock::new();

impl UserValidator {
    /// Process-wide validator instance.
    pub fn shared() -> &'static Self {
        SHARED.get_or_init(|| Self {
            email: Regex::new(EMAIL_PATTERN)
                .unwrap_or_else(|error| panic!("email regex failed to compile: {error}")),
        })
    }

    /// Check a draft and return every violation in rule order.
    pub fn validate(&self, draft: &RegistrationDraft) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if !is_present(draft.name.as_deref()) {
            errors.push(FieldError::BlankName);
        }
        if !draft
            .email
            .as_deref()
            .is_some_and(|email| self.email.is_match(email))
        {
            errors.push(FieldError::InvalidEmail);
        }
        if !draft
            .password
            .as_deref()
            .is_some_and(|password| is_strong_password(password))
        {
            errors.push(FieldError::InvalidPassword);
        }
        errors
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

// At least eight ASCII letters or digits with one lowercase, one uppercase
// and one digit.
fn is_strong_password(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LEN
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the registration ruleset.
    use super::*;
    use rstest::{fixture, rstest};
    use zeroize::Zeroizing;

    #[fixture]
    fn valid_draft() -> RegistrationDraft {
        RegistrationDraft {
            name: Some("Juan Rodriguez".to_owned()),
            email: Some("juan@rodriguez.org".to_owned()),
            password: Some(Zeroizing::new("Hunter22".to_owned())),
            phones: Vec::new(),
        }
    }

    #[rstest]
    fn valid_draft_has_no_errors(valid_draft: RegistrationDraft) {
        assert!(UserValidator::shared().validate(&valid_draft).is_empty());
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("   "))]
    fn blank_names_are_rejected(valid_draft: RegistrationDraft, #[case] name: Option<&str>) {
        let draft = RegistrationDraft {
            name: name.map(str::to_owned),
            ..valid_draft
        };
        assert_eq!(
            UserValidator::shared().validate(&draft),
            vec![FieldError::BlankName]
        );
    }

    #[rstest]
    #[case("juan@rodriguez.org", true)]
    #[case("juan.o'neil@mail.example.cl", true)]
    #[case("a+b@host", true)]
    #[case("juan@", false)]
    #[case("@rodriguez.org", false)]
    #[case("juan rodriguez@mail.org", false)]
    #[case("juan@mail..org", false)]
    #[case("juan@mail_org.cl", false)]
    fn email_shape(valid_draft: RegistrationDraft, #[case] email: &str, #[case] ok: bool) {
        let draft = RegistrationDraft {
            email: Some(email.to_owned()),
            ..valid_draft
        };
        let errors = UserValidator::shared().validate(&draft);
        assert_eq!(errors.is_empty(), ok, "{email}: {errors:?}");
    }

    #[rstest]
    #[case("Hunter22", true)]
    #[case("abcDEF123", true)]
    #[case("Hunt3r", false)]
    #[case("hunter222", false)]
    #[case("HUNTER222", false)]
    #[case("Hunterrrr", false)]
    #[case("Hunter 22", false)]
    #[case("Hunter22!", false)]
    #[case("Ñandu1234", false)]
    fn password_strength(valid_draft: RegistrationDraft, #[case] password: &str, #[case] ok: bool) {
        let draft = RegistrationDraft {
            password: Some(Zeroizing::new(password.to_owned())),
            ..valid_draft
        };
        let errors = UserValidator::shared().validate(&draft);
        assert_eq!(errors.is_empty(), ok, "{password}: {errors:?}");
    }

    #[rstest]
    fn all_violations_are_reported_in_rule_order() {
        let errors = UserValidator::shared().validate(&RegistrationDraft::default());
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec![
                "Error en el campo: name, no debe estar vacio",
                "Error en el campo: email, Email invalido",
                "Error en el campo: password, Contrasena invalida",
            ]
        );
    }

    #[rstest]
    fn shared_returns_the_same_instance() {
        assert!(std::ptr::eq(UserValidator::shared(), UserValidator::shared()));
    }
}
