use serde::Serialize;
use std::fmt;

/// Top-level pages of the web shell. Selection is purely by path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Home,
    Subscribe,
    Login,
    Register,
    MagicLink,
    NotFound,
}

impl View {
    pub fn resolve(path: &str) -> View {
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => View::Home,
            "/subscribe" => View::Subscribe,
            "/login" => View::Login,
            "/register" => View::Register,
            "/magic-link" => View::MagicLink,
            _ => View::NotFound,
        }
    }

    pub fn path(self) -> Option<&'static str> {
        match self {
            View::Home => Some("/"),
            View::Subscribe => Some("/subscribe"),
            View::Login => Some("/login"),
            View::Register => Some("/register"),
            View::MagicLink => Some("/magic-link"),
            View::NotFound => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Master the Art of Persuasion",
            View::Subscribe => "Upgrade to Premium",
            View::Login => "Login",
            View::Register => "Register",
            View::MagicLink => "Sign In with Magic Link",
            View::NotFound => "Page not found",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_paths() {
        assert_eq!(View::resolve("/"), View::Home);
        assert_eq!(View::resolve(""), View::Home);
        assert_eq!(View::resolve("/subscribe"), View::Subscribe);
        assert_eq!(View::resolve("/login"), View::Login);
        assert_eq!(View::resolve("/register/"), View::Register);
        assert_eq!(View::resolve("/magic-link"), View::MagicLink);
    }

    #[test]
    fn everything_else_is_not_found() {
        assert_eq!(View::resolve("/admin"), View::NotFound);
        assert_eq!(View::resolve("/login/extra"), View::NotFound);
        assert_eq!(View::NotFound.path(), None);
    }

    #[test]
    fn path_round_trips() {
        for v in [
            View::Home,
            View::Subscribe,
            View::Login,
            View::Register,
            View::MagicLink,
        ] {
            assert_eq!(View::resolve(v.path().unwrap()), v);
        }
    }
}
