use std::io::IsTerminal;

/// Line width used when the terminal size can't be read (piped output)
pub const FALLBACK_COLUMNS: usize = 100;

/// Current terminal width in columns
pub fn columns() -> usize {
    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 0 => usize::from(cols),
        _ => FALLBACK_COLUMNS,
    }
}

/// Whether stdout should get colored, width-fitted lines
pub fn color_enabled() -> bool {
    wants_color(
        std::io::stdout().is_terminal(),
        std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn wants_color(is_terminal: bool, no_color: bool, term: Option<&str>) -> bool {
    is_terminal && !no_color && term != Some("dumb")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_only_on_capable_terminals() {
        assert!(wants_color(true, false, Some("xterm-256color")));
        assert!(wants_color(true, false, None));
        assert!(!wants_color(false, false, Some("xterm-256color")));
        assert!(!wants_color(true, true, Some("xterm-256color")));
        assert!(!wants_color(true, false, Some("dumb")));
    }

    #[test]
    fn test_columns_is_never_zero() {
        assert!(columns() > 0);
    }
}
