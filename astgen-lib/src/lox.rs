//! This module holds the node tables for the Lox interpreters.
//!
//! There are two tables: one for the interpreter with a hand-written scanner and parser, which
//! owns its tokens, and one for the interpreter fronted by an ANTLR parser, which points at
//! tokens owned by the ANTLR token stream and also supports classes, functions and returns.
//!
//! Children are held by `std::unique_ptr`. Function declarations are the exception: a class
//! holds its methods, and each function value created at runtime keeps its declaration alive,
//! so they're `std::shared_ptr<Function>`.

use crate::{
    driver::OutputJob,
    emitter::Prelude,
    schema::{FamilySpec, SchemaError},
};
use std::path::PathBuf;

/// The output job for the interpreter with a hand-written scanner and parser.
pub fn tree_walk_job(base_name: impl Into<PathBuf>) -> Result<OutputJob, SchemaError> {
    let expr = FamilySpec::builder("Expr")
        .variant("Assign", ["Token name", "std::unique_ptr<Expr> value"])
        .variant(
            "Binary",
            [
                "std::unique_ptr<Expr> left",
                "Token op",
                "std::unique_ptr<Expr> right",
            ],
        )
        .variant(
            "Call",
            [
                "std::unique_ptr<Expr> callee",
                "Token paren",
                "std::vector<std::unique_ptr<Expr>> args",
            ],
        )
        .variant("Grouping", ["std::unique_ptr<Expr> expr"])
        .variant("Literal", ["std::any value"])
        .variant(
            "Logical",
            [
                "std::unique_ptr<Expr> left",
                "Token op",
                "std::unique_ptr<Expr> right",
            ],
        )
        .variant("Unary", ["Token op", "std::unique_ptr<Expr> expr"])
        .variant("Variable", ["Token name"])
        .build()?;

    let stmt = FamilySpec::builder("Stmt")
        .variant("Block", ["std::vector<std::unique_ptr<Stmt>> statements"])
        .variant("Expression", ["std::unique_ptr<Expr> expr"])
        .variant(
            "If",
            [
                "std::unique_ptr<Expr> condition",
                "std::unique_ptr<Stmt> then_branch",
                "std::unique_ptr<Stmt> else_branch",
            ],
        )
        .variant("Print", ["std::unique_ptr<Expr> expr"])
        .variant("Var", ["Token token", "std::unique_ptr<Expr> initializer"])
        .variant(
            "While",
            ["std::unique_ptr<Expr> condition", "std::unique_ptr<Stmt> body"],
        )
        .build()?;

    Ok(
        OutputJob::new(base_name, Prelude::new(["<any>", "<memory>", "<vector>", "\"token.h\""]))
            .family(expr)
            .family(stmt),
    )
}

/// The output job for the interpreter fronted by an ANTLR parser.
pub fn antlr_job(base_name: impl Into<PathBuf>) -> Result<OutputJob, SchemaError> {
    let expr = FamilySpec::builder("Expr")
        .variant("Assign", ["antlr4::Token *name", "std::unique_ptr<Expr> value"])
        .variant(
            "Binary",
            [
                "std::unique_ptr<Expr> left",
                "antlr4::Token *op",
                "std::unique_ptr<Expr> right",
            ],
        )
        .variant(
            "Call",
            [
                "std::unique_ptr<Expr> callee",
                "antlr4::Token *paren",
                "std::vector<std::unique_ptr<Expr>> args",
            ],
        )
        .variant("Grouping", ["std::unique_ptr<Expr> expr"])
        .variant("Literal", ["std::any value"])
        .variant(
            "Logical",
            [
                "std::unique_ptr<Expr> left",
                "antlr4::Token *op",
                "std::unique_ptr<Expr> right",
            ],
        )
        .variant("Unary", ["antlr4::Token *op", "std::unique_ptr<Expr> expr"])
        .variant("Variable", ["antlr4::Token *name"])
        .variant("Get", ["std::unique_ptr<Expr> object", "antlr4::Token *name"])
        .variant(
            "Set",
            [
                "std::unique_ptr<Expr> object",
                "antlr4::Token *name",
                "std::unique_ptr<Expr> value",
            ],
        )
        .build()?;

    let stmt = FamilySpec::builder("Stmt")
        .variant("Block", ["std::vector<std::unique_ptr<Stmt>> statements"])
        .variant("Expression", ["std::unique_ptr<Expr> expr"])
        .variant(
            "Class",
            [
                "antlr4::Token *name",
                "std::vector<std::shared_ptr<Function>> methods",
            ],
        )
        .variant(
            "If",
            [
                "std::unique_ptr<Expr> condition",
                "std::unique_ptr<Stmt> then_branch",
                "std::unique_ptr<Stmt> else_branch",
            ],
        )
        .variant("Print", ["std::unique_ptr<Expr> expr"])
        .variant("Var", ["antlr4::Token *token", "std::unique_ptr<Expr> initializer"])
        .variant(
            "While",
            ["std::unique_ptr<Expr> condition", "std::unique_ptr<Stmt> body"],
        )
        .variant(
            "Function",
            [
                "antlr4::Token *name",
                "std::vector<antlr4::Token*> params",
                "std::unique_ptr<Stmt> body",
            ],
        )
        .variant("Return", ["antlr4::Token *keyword", "std::unique_ptr<Expr> value"])
        .build()?;

    Ok(OutputJob::new(
        base_name,
        Prelude::new(["<any>", "<memory>", "<vector>", "\"antlr4-common.h\""]),
    )
    .family(expr)
    .family(stmt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::check_shared_unit;

    fn variant_names(family: &FamilySpec) -> Vec<&str> {
        family.variants().map(|variant| variant.name.as_str()).collect()
    }

    #[test]
    fn tree_walk_tables() {
        let job = tree_walk_job("expr").unwrap();
        let [expr, stmt] = &job.families[..] else {
            panic!("Expected exactly two families, got {:#?}", job.families)
        };

        assert_eq!(expr.base_name(), "Expr");
        assert_eq!(
            variant_names(expr),
            vec!["Assign", "Binary", "Call", "Grouping", "Literal", "Logical", "Unary", "Variable"]
        );
        assert_eq!(stmt.base_name(), "Stmt");
        assert_eq!(
            variant_names(stmt),
            vec!["Block", "Expression", "If", "Print", "Var", "While"]
        );
        assert!(job.prelude.includes.contains(&"\"token.h\"".to_string()));
        assert_eq!(check_shared_unit(&job.families), Ok(()));
    }

    #[test]
    fn antlr_tables() {
        let job = antlr_job("expr").unwrap();
        let [expr, stmt] = &job.families[..] else {
            panic!("Expected exactly two families, got {:#?}", job.families)
        };

        assert_eq!(expr.len(), 10);
        assert_eq!(
            variant_names(stmt),
            vec![
                "Block",
                "Expression",
                "Class",
                "If",
                "Print",
                "Var",
                "While",
                "Function",
                "Return"
            ]
        );
        assert!(job
            .prelude
            .includes
            .contains(&"\"antlr4-common.h\"".to_string()));
        assert_eq!(check_shared_unit(&job.families), Ok(()));
    }

    #[test]
    fn antlr_tokens_are_pointers() {
        let mut unit = crate::emitter::GeneratedUnit::new("expr", &Prelude::default());
        for family in &antlr_job("expr").unwrap().families {
            unit.push_family(family).unwrap();
        }

        assert!(unit.declarations.contains(
            "    Function(antlr4::Token *name, std::vector<antlr4::Token*> params, std::unique_ptr<Stmt> body);\n"
        ));
        assert!(unit.definitions.contains(
            "    : name(name), params(std::move(params)), body(std::move(body)) {}\n"
        ));
        assert!(unit
            .definitions
            .contains("    : name(name), methods(std::move(methods)) {}\n"));
    }
}
