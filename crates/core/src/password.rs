/// Coarse password strength shown under the sign-up form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    VeryWeak,
    Weak,
    Medium,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    /// One point each for length >= 8, a lowercase letter, an uppercase
    /// letter, a digit and any other character.
    #[must_use]
    pub fn score(password: &str) -> u8 {
        let checks = [
            password.chars().count() >= 8,
            password.chars().any(|c| c.is_ascii_lowercase()),
            password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ];
        checks.into_iter().map(u8::from).sum()
    }

    #[must_use]
    pub fn evaluate(password: &str) -> Self {
        match Self::score(password) {
            0 => Self::VeryWeak,
            1 | 2 => Self::Weak,
            3 => Self::Medium,
            4 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::VeryWeak => "Very Weak",
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }

    /// Fill of the strength meter, 0..=100.
    #[must_use]
    pub fn percent(password: &str) -> u8 {
        Self::score(password) * 20
    }
}
