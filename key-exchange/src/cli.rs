//! Argument handling shared by the `dhe` and `ecdhe` tools
//!
//! Bad or missing arguments are not failures: the tools print the usage
//! text of the command that was attempted (or of the whole tool) to stdout
//! and exit successfully.

use std::ffi::OsString;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

/// Parses the process arguments, printing usage instead of failing.
pub fn parse_or_usage<C: Parser>() -> Option<C> {
    parse_from_or_usage(std::env::args_os())
}

pub fn parse_from_or_usage<C, I, T>(args: I) -> Option<C>
where
    C: Parser,
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    match C::try_parse_from(&args) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = err.print();
                }
                _ => println!("{}", usage_for::<C>(&args)),
            }
            None
        }
    }
}

/// Help of the first subcommand named in `args`, else of the whole tool
pub fn usage_for<C: CommandFactory>(args: &[OsString]) -> String {
    let mut command = C::command();
    command.build();

    let named = args
        .iter()
        .skip(1)
        .filter_map(|arg| arg.to_str())
        .find_map(|arg| command.find_subcommand_mut(arg).map(|sub| sub.render_help().to_string()));

    named.unwrap_or_else(|| command.render_help().to_string())
}
