//! Fixed table of user-facing messages for the `?error=` codes that the
//! sign-in and registration flows redirect with.

pub const DEFAULT_MESSAGE: &str = "Unable to sign in.";

const MESSAGES: &[(&str, &str)] = &[
    ("Signin", "Try signing in with a different account."),
    ("OAuthSignin", "Try signing in with a different account."),
    ("OAuthCallback", "Try signing in with a different account."),
    ("OAuthCreateAccount", "Try signing in with a different account."),
    ("EmailCreateAccount", "Try signing in with a different account."),
    ("Callback", "Try signing in with a different account."),
    (
        "OAuthAccountNotLinked",
        "To confirm your identity, sign in with the same account you used originally.",
    ),
    ("EmailSignin", "The e-mail could not be sent."),
    (
        "CredentialsSignin",
        "Sign in failed. Check the details you provided are correct.",
    ),
    ("SessionRequired", "Please sign in to access this page."),
    ("MissingName", "Please enter your name."),
    ("InvalidEmail", "Please enter a valid email address."),
    ("PasswordTooShort", "Password must be at least 8 characters long."),
    ("PasswordMismatch", "Passwords do not match."),
    ("EmailTaken", "An account with this email already exists."),
];

/// `None` when no code was supplied; unknown codes get [`DEFAULT_MESSAGE`].
pub fn message_for(code: Option<&str>) -> Option<&'static str> {
    let code = code.map(str::trim).filter(|c| !c.is_empty())?;
    Some(
        MESSAGES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, message)| *message)
            .unwrap_or(DEFAULT_MESSAGE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_signin_message() {
        assert_eq!(
            message_for(Some("CredentialsSignin")),
            Some("Sign in failed. Check the details you provided are correct.")
        );
    }

    #[test]
    fn test_unknown_code_uses_default() {
        assert_eq!(message_for(Some("Bogus")), Some(DEFAULT_MESSAGE));
    }

    #[test]
    fn test_missing_or_blank_code_has_no_message() {
        assert_eq!(message_for(None), None);
        assert_eq!(message_for(Some("  ")), None);
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = MESSAGES.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), MESSAGES.len());
    }
}
