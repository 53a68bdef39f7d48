//! Chooses the command text to execute: the basic form's built fragment or
//! the advanced editor's raw SQL, depending on which panel is visible.

use crate::sql::query_builder::{build_condition, BuildError, SearchForm};
use thiserror::Error;

/// Fixed prefix prepended to every basic-search command
pub const PREAMBLE: &str = "SELECT * FROM Catalog ";

/// Statement terminator appended to the resolved command
pub const TERMINATOR: char = ';';

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("conflicting view state: exactly one of the basic and advanced panels must be visible")]
    ConflictingViewState,
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Resolve the final command text from the current panel visibility.
///
/// The basic panel produces preamble + built fragment + terminator; the
/// advanced panel executes the editor text as typed, plus the terminator.
/// Both or neither panel visible is a caller bug and yields no command.
pub fn resolve_command(
    basic_visible: bool,
    advanced_visible: bool,
    form: &SearchForm,
    editor_text: &str,
) -> Result<String, CommandError> {
    match (basic_visible, advanced_visible) {
        (true, false) => {
            let fragment = build_condition(form)?;
            Ok(format!("{}{}{}", PREAMBLE, fragment, TERMINATOR))
        }
        (false, true) => Ok(format!("{}{}", editor_text.trim_end(), TERMINATOR)),
        _ => Err(CommandError::ConflictingViewState),
    }
}

/// The command text used to seed the advanced editor when switching views.
/// Same SQL the basic panel would execute, without the terminator.
pub fn command_for_editor(form: &SearchForm) -> Result<String, BuildError> {
    Ok(format!("{}{}", PREAMBLE, build_condition(form)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_panel_uses_builder_output() {
        let form = SearchForm::new("memo", "filename");
        let command = resolve_command(true, false, &form, "ignored").unwrap();
        assert!(command.starts_with(PREAMBLE), "{}", command);
        assert!(command.contains("WHERE \"File Name\" LIKE \"%memo%\""));
        assert!(command.ends_with(';'), "{}", command);
    }

    #[test]
    fn advanced_panel_executes_editor_text_as_typed() {
        let form = SearchForm::new("", "filename");
        let command =
            resolve_command(false, true, &form, "SELECT \"File Name\" FROM Catalog").unwrap();
        assert_eq!(command, "SELECT \"File Name\" FROM Catalog;");
    }

    #[test]
    fn conflicting_visibility_yields_no_command() {
        let form = SearchForm::new("", "filename");
        for (basic, advanced) in [(true, true), (false, false)] {
            let err = resolve_command(basic, advanced, &form, "SELECT 1").unwrap_err();
            assert_eq!(err, CommandError::ConflictingViewState);
        }
    }

    #[test]
    fn builder_error_propagates_from_basic_panel() {
        let form = SearchForm::new("memo", "nope");
        let err = resolve_command(true, false, &form, "").unwrap_err();
        assert_eq!(
            err,
            CommandError::Build(BuildError::UndefinedSearchField("nope".to_string()))
        );
    }

    #[test]
    fn editor_seed_matches_basic_command_without_terminator() {
        let form = SearchForm::new("memo", "filename");
        let seed = command_for_editor(&form).unwrap();
        let command = resolve_command(true, false, &form, "").unwrap();
        assert_eq!(format!("{}{}", seed, TERMINATOR), command);
    }
}
