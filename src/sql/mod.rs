pub mod command_source;
pub mod query_builder;

pub use command_source::{command_for_editor, resolve_command, CommandError, PREAMBLE, TERMINATOR};
pub use query_builder::{build_condition, BuildError, SearchForm, TypeFilter};
