//! Authentication primitives: the bearer token and the payloads that obtain one.
//!
//! Form input is validated here, before the session store talks to a port, so
//! obviously broken submissions never leave the client.

use std::fmt;

use zeroize::Zeroizing;

/// Minimum password length accepted by the registration form.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Opaque bearer token proving an authenticated session.
///
/// The secret is zeroed on drop and never printed by `Debug`.
///
/// # Examples
/// ```
/// use shortflix_client::domain::AuthToken;
///
/// let token = AuthToken::new("9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b").unwrap();
/// assert_eq!(format!("{token:?}"), "AuthToken(<redacted>)");
/// assert_eq!(token.authorization_value(), "Token 9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Wrap a raw token, rejecting blank values.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(trimmed.to_owned())))
    }

    /// Raw token string, for persistence only.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Value for the `Authorization` header.
    pub fn authorization_value(&self) -> String {
        format!("Token {}", self.0.as_str())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials sent to the token endpoint.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is non-empty and keeps caller-provided whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password exactly as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Errors produced by the registration form rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// Username was blank.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Email was blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,
    /// Password is shorter than [`MIN_PASSWORD_LENGTH`].
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
}

/// Validated account-creation payload.
///
/// Registration is chained into a login with the same username and password,
/// so [`Registration::login_credentials`] never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    username: String,
    email: String,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate a registration without a confirmation field.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RegistrationValidationError::EmptyUsername);
        }
        let email = email.trim();
        if email.is_empty() {
            return Err(RegistrationValidationError::EmptyEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(RegistrationValidationError::PasswordTooShort);
        }
        Ok(Self {
            username: username.to_owned(),
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Validate a sign-up form including the repeated password.
    ///
    /// The mismatch check runs first, matching the order the form reports.
    pub fn try_from_form(
        username: &str,
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, RegistrationValidationError> {
        if password != confirmation {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        Self::try_from_parts(username, email, password)
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Trimmed email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password exactly as typed.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Credentials for the automatic login that follows account creation.
    pub fn login_credentials(&self) -> LoginCredentials {
        LoginCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn login_keeps_password_whitespace() {
        let creds = LoginCredentials::try_from_parts("  alice ", " pass ").expect("valid");
        assert_eq!(creds.username(), "alice");
        assert_eq!(creds.password(), " pass ");
    }

    #[rstest]
    #[case("u", "e@x.com", "pw12345678", "pw12345679", RegistrationValidationError::PasswordMismatch)]
    #[case("u", "e@x.com", "short", "short", RegistrationValidationError::PasswordTooShort)]
    #[case(" ", "e@x.com", "pw12345678", "pw12345678", RegistrationValidationError::EmptyUsername)]
    #[case("u", "", "pw12345678", "pw12345678", RegistrationValidationError::EmptyEmail)]
    fn registration_form_rules(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] confirmation: &str,
        #[case] expected: RegistrationValidationError,
    ) {
        let err = Registration::try_from_form(username, email, password, confirmation)
            .expect_err("form must be rejected");
        assert_eq!(err, expected);
    }

    #[test]
    fn registration_chains_into_matching_login() {
        let registration =
            Registration::try_from_parts("u", "e@x.com", "pw12345678").expect("valid");
        let login = registration.login_credentials();
        assert_eq!(login.username(), "u");
        assert_eq!(login.password(), "pw12345678");
    }

    #[test]
    fn padded_username_normalizes_the_same_for_both_forms() {
        let registration =
            Registration::try_from_parts("  alice ", "a@x.com", "pw12345678").expect("valid");
        let login = LoginCredentials::try_from_parts(" alice  ", "pw12345678").expect("valid");

        assert_eq!(registration.username(), "alice");
        assert_eq!(registration.login_credentials(), login);
    }

    #[rstest]
    #[case("")]
    #[case("   \n")]
    fn blank_tokens_are_absent(#[case] raw: &str) {
        assert!(AuthToken::new(raw).is_none());
    }
}
