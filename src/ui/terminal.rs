//! Terminal detection for the chooser

use is_terminal::IsTerminal;

/// Size used when the terminal cannot report one
const FALLBACK_SIZE: (u16, u16) = (80, 24);

/// What the chooser can rely on from the attached terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    /// Both stdin and stdout are attached to a terminal
    pub is_tty: bool,
    /// Box-drawing and triangle glyphs render correctly
    pub supports_unicode: bool,
    pub width: u16,
    pub height: u16,
}

impl TerminalCapabilities {
    pub fn detect() -> Self {
        Self::from_parts(
            |key| std::env::var(key).ok(),
            std::io::stdin().is_terminal() && std::io::stdout().is_terminal(),
            crossterm::terminal::size().ok(),
        )
    }

    fn from_parts(
        get_env: impl Fn(&str) -> Option<String>,
        is_tty: bool,
        size: Option<(u16, u16)>,
    ) -> Self {
        let dumb = get_env("TERM").is_some_and(|term| term.eq_ignore_ascii_case("dumb"));
        let (width, height) = size
            .filter(|&(width, height)| width > 0 && height > 0)
            .unwrap_or(FALLBACK_SIZE);

        Self {
            is_tty,
            supports_unicode: !dumb && locale_is_unicode(&get_env),
            width,
            height,
        }
    }
}

/// The character set is decided by the first non-empty of `LC_ALL`,
/// `LC_CTYPE` and `LANG`. With none set, assume a UTF-8 terminal.
fn locale_is_unicode(get_env: &impl Fn(&str) -> Option<String>) -> bool {
    let locale = ["LC_ALL", "LC_CTYPE", "LANG"]
        .into_iter()
        .filter_map(|key| get_env(key))
        .find(|value| !value.is_empty());

    match locale {
        None => true,
        Some(locale) => {
            let codeset = locale
                .split_once('.')
                .map(|(_, rest)| rest.split('@').next().unwrap_or(rest))
                .unwrap_or_default()
                .to_ascii_lowercase();
            matches!(codeset.as_str(), "utf-8" | "utf8")
        }
    }
}
