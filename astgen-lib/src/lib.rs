//! This crate generates the C++ AST node hierarchy for a tree-walk Lox interpreter, as described
//! in <https://craftinginterpreters.com/representing-code.html>.
//!
//! A [`schema::FamilySpec`] describes one family of nodes (all the expressions, say), the
//! [`emitter`] turns it into a header and a source file, and the [`driver::Driver`] writes those
//! files and hands them to `clang-format` if it can find it.

pub mod driver;
pub mod emitter;
pub mod field;
pub mod formatter;
pub mod lox;
pub mod schema;

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{filter::LevelFilter, fmt::Layer, prelude::*, EnvFilter};

pub use self::{
    driver::{Driver, GenerateError, GeneratedFiles, OutputJob},
    emitter::{GeneratedUnit, MalformedFieldError, Prelude},
    formatter::Formatter,
    schema::{FamilySpec, FieldSpec, SchemaError, VariantSpec},
};

/// Install the global `tracing` subscriber, filtered by `RUST_LOG` and defaulting to warnings.
pub fn init_logging() -> Result<(), SetGlobalDefaultError> {
    tracing::subscriber::set_global_default(
        tracing_subscriber::registry().with(
            Layer::new().with_writer(std::io::stderr).with_filter(
                EnvFilter::builder()
                    .with_default_directive(LevelFilter::WARN.into())
                    .from_env_lossy(),
            ),
        ),
    )
}
