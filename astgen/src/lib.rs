//! This crate provides the command line front end shared by the AST generator binaries.
//!
//! Each binary picks a node table from [`astgen_lib::lox`] and hands it to [`run_generator`].
//! The front end takes exactly one positional argument, the base name of the generated files,
//! and no flags.

use astgen_lib::{Driver, Formatter, GenerateError, GeneratedFiles, OutputJob, SchemaError};
use clap::Parser;
use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::{env, ffi::OsString, io::stderr, process};
use thiserror::Error;
use tracing::debug;

/// Builds the output job for a base name.
pub type JobBuilder = fn(&str) -> Result<OutputJob, SchemaError>;

/// The args of the program.
#[derive(Parser, Debug)]
#[command(disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// The base name of the generated `.h` and `.cpp` files.
    output: String,
}

/// The program was called with the wrong arguments.
#[derive(Debug, Error)]
#[error("Usage: {program} <output>")]
pub struct UsageError {
    /// The name of the binary.
    pub program: &'static str,
}

/// An error that stops the generator.
#[derive(Debug, Error)]
pub enum CliError {
    /// Wrong number of arguments, or a flag.
    #[error(transparent)]
    Usage(#[from] UsageError),

    /// Generating or writing the files failed.
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// Parse the arguments (including the program name) and generate the files.
pub fn generate<I, T>(
    program: &'static str,
    args: I,
    build_job: JobBuilder,
    formatter: Option<Formatter>,
) -> Result<Vec<GeneratedFiles>, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = Args::try_parse_from(args).map_err(|_| UsageError { program })?;
    debug!(?args);

    let job = build_job(&args.output).map_err(GenerateError::from)?;
    let files = Driver::new().with_formatter(formatter).run(&[job])?;
    debug!(?files);

    Ok(files)
}

/// Generate the files and report any error, returning the exit code.
pub fn run<I, T>(
    program: &'static str,
    args: I,
    build_job: JobBuilder,
    formatter: Option<Formatter>,
) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match generate(program, args, build_job, formatter) {
        Ok(_) => 0,
        Err(CliError::Usage(error)) => {
            eprintln!("{error}");
            1
        }
        Err(CliError::Generate(error)) => {
            print_error_message(&error.to_string());
            1
        }
    }
}

/// Run the generator with the process arguments, writing into the current directory and
/// formatting with `$CLANG_FORMAT` or `clang-format` from the `PATH` if there is one.
pub fn run_generator(program: &'static str, build_job: JobBuilder) -> color_eyre::Result<()> {
    color_eyre::install()?;
    astgen_lib::init_logging()?;

    let code = run(program, env::args_os(), build_job, Formatter::from_env());
    if code != 0 {
        process::exit(code);
    }

    Ok(())
}

/// Print an error message to stderr with a highlighted `ERROR` prefix.
fn print_error_message(message: &str) {
    // If stderr is gone there's nowhere left to report to.
    let _ = execute!(
        stderr(),
        SetForegroundColor(Color::Red),
        SetAttribute(Attribute::Bold),
        Print("ERROR"),
        ResetColor,
        SetAttribute(Attribute::Reset),
        Print(format!(": {message}\n")),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use astgen_lib::lox;
    use std::{fs, path::PathBuf};

    fn tree_walk(base_name: &str) -> Result<OutputJob, SchemaError> {
        lox::tree_walk_job(base_name)
    }

    fn antlr(base_name: &str) -> Result<OutputJob, SchemaError> {
        lox::antlr_job(base_name)
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("astgen-cli-{}-{name}", process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn usage_message(args: &[&str]) -> Option<String> {
        match generate("astgen", args.iter().copied(), tree_walk, None) {
            Err(CliError::Usage(error)) => Some(error.to_string()),
            _ => None,
        }
    }

    #[test]
    fn wrong_arity_is_a_usage_error() {
        assert_eq!(usage_message(&["astgen"]).as_deref(), Some("Usage: astgen <output>"));
        assert_eq!(
            usage_message(&["astgen", "a", "b"]).as_deref(),
            Some("Usage: astgen <output>")
        );
        assert_eq!(run("astgen", ["astgen"], tree_walk, None), 1);
        assert_eq!(run("astgen", ["astgen", "a", "b"], tree_walk, None), 1);
    }

    #[test]
    fn flags_are_usage_errors() {
        assert!(usage_message(&["astgen", "--help"]).is_some());
        assert!(usage_message(&["astgen", "-h"]).is_some());
        assert!(usage_message(&["astgen", "--version"]).is_some());
        assert_eq!(run("astgen", ["astgen", "--help"], tree_walk, None), 1);
    }

    #[test]
    fn write_failure_names_the_file() {
        let dir = scratch_dir("nodir");
        let output = dir.join("does-not-exist").join("expr");
        let args = [OsString::from("astgen"), output.clone().into_os_string()];

        match generate("astgen", args.clone(), tree_walk, None) {
            Err(CliError::Generate(error @ GenerateError::Io { .. })) => {
                let expected = dir.join("does-not-exist").join("expr.h");
                assert!(error.to_string().contains(&expected.display().to_string()));
            }
            other => panic!("Expected a write error, got {other:?}"),
        }
        assert_eq!(run("astgen", args, tree_walk, None), 1);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn generates_tree_walk_files() {
        let dir = scratch_dir("tree-walk");
        let output = dir.join("expr");

        assert_eq!(
            run("astgen", [OsString::from("astgen"), output.into_os_string()], tree_walk, None),
            0
        );

        let header = fs::read_to_string(dir.join("expr.h")).unwrap();
        assert!(header.contains("#include \"token.h\"\n"));
        assert!(header.contains("struct Assign : Expr {\n"));
        assert!(!header.contains("struct Get : Expr {\n"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn generates_antlr_files() {
        let dir = scratch_dir("antlr");
        let output = dir.join("ast");

        assert_eq!(
            run(
                "astgen-antlr",
                [OsString::from("astgen-antlr"), output.into_os_string()],
                antlr,
                None
            ),
            0
        );

        let header = fs::read_to_string(dir.join("ast.h")).unwrap();
        let source = fs::read_to_string(dir.join("ast.cpp")).unwrap();
        assert!(header.contains("#include \"antlr4-common.h\"\n"));
        assert!(header.contains("struct Get : Expr {\n"));
        assert!(header.contains("struct Return : Stmt {\n"));
        assert!(source.starts_with("#include \"ast.h\"\n"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn usage_names_the_binary() {
        match generate("astgen-antlr", ["astgen-antlr"], antlr, None) {
            Err(CliError::Usage(error)) => {
                assert_eq!(error.to_string(), "Usage: astgen-antlr <output>")
            }
            other => panic!("Expected a usage error, got {other:?}"),
        }
    }
}
