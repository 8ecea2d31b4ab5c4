//! This crate generates the C++ AST of the tree-walk Lox interpreter, as described in
//! <https://craftinginterpreters.com/representing-code.html>.

use astgen_lib::lox;

/// Generate `<output>.h` and `<output>.cpp` for the interpreter with a hand-written parser.
fn main() -> color_eyre::Result<()> {
    astgen::run_generator("astgen", |base_name| lox::tree_walk_job(base_name))
}
