//! Generate the C++ AST of the ANTLR-fronted Lox interpreter, which adds classes, functions and
//! returns and points at tokens owned by the ANTLR token stream.

use astgen_lib::lox;

/// Generate `<output>.h` and `<output>.cpp` for the interpreter with an ANTLR parser.
fn main() -> color_eyre::Result<()> {
    astgen::run_generator("astgen-antlr", |base_name| lox::antlr_job(base_name))
}
