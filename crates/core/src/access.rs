//! Route gating shared by the desktop router and the HTTP middleware.

pub const HOME_PATH: &str = "/";
pub const SIGN_IN_PATH: &str = "/auth";

/// Outcome of checking a path against the current auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allow,
    Redirect(&'static str),
}

fn is_auth_path(path: &str) -> bool {
    path == SIGN_IN_PATH
        || path
            .strip_prefix(SIGN_IN_PATH)
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with('?'))
}

#[must_use]
pub fn is_public(path: &str) -> bool {
    path == HOME_PATH || is_auth_path(path)
}

/// Signed-out visitors may only see public pages; signed-in users are sent
/// home from the auth pages.
#[must_use]
pub fn gate(path: &str, signed_in: bool) -> Gate {
    match (signed_in, is_public(path), is_auth_path(path)) {
        (false, false, _) => Gate::Redirect(SIGN_IN_PATH),
        (true, _, true) => Gate::Redirect(HOME_PATH),
        _ => Gate::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_is_sent_to_auth_from_private_pages() {
        assert_eq!(gate("/decks", false), Gate::Redirect(SIGN_IN_PATH));
        assert_eq!(gate("/dashboard/study/1", false), Gate::Redirect(SIGN_IN_PATH));
    }

    #[test]
    fn signed_out_may_visit_public_pages() {
        assert_eq!(gate("/", false), Gate::Allow);
        assert_eq!(gate("/auth", false), Gate::Allow);
        assert_eq!(gate("/auth/callback", false), Gate::Allow);
    }

    #[test]
    fn signed_in_is_sent_home_from_auth() {
        assert_eq!(gate("/auth", true), Gate::Redirect(HOME_PATH));
        assert_eq!(gate("/auth/callback", true), Gate::Redirect(HOME_PATH));
        assert_eq!(gate("/decks", true), Gate::Allow);
    }

    #[test]
    fn lookalike_paths_are_not_public() {
        assert!(!is_public("/authors"));
        assert_eq!(gate("/authors", true), Gate::Allow);
    }
}
