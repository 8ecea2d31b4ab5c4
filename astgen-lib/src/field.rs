//! This module splits textual field entries into a type and a name, and works out what sort of
//! value each field holds.

use std::fmt;

/// The sort of value a field holds, worked out from its C++ type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind<'s> {
    /// A lexical token, either by value or through a pointer.
    Token,

    /// A `std::vector` of tokens.
    TokenList,

    /// A `std::unique_ptr` or `std::shared_ptr` to the given node type.
    OwnedChild(&'s str),

    /// A `std::vector` of owning pointers to the given node type.
    OwnedChildList(&'s str),

    /// A dynamically typed literal value (`std::any`).
    LiteralValue,

    /// Anything else. Copied into place without interpretation.
    Other,
}

impl<'s> FieldKind<'s> {
    /// Classify a field from its type and any pointer/reference sigils that were attached to its
    /// name in the entry.
    fn classify(ty: &'s str, sigils: &str) -> Self {
        if !sigils.is_empty() {
            return if is_token(ty) { Self::Token } else { Self::Other };
        }

        if is_token(ty) {
            Self::Token
        } else if let Some(element) = template_argument(ty, "std::vector") {
            if is_token(element) {
                Self::TokenList
            } else if let Some(pointee) = owned_pointee(element) {
                Self::OwnedChildList(pointee)
            } else {
                Self::Other
            }
        } else if let Some(pointee) = owned_pointee(ty) {
            Self::OwnedChild(pointee)
        } else if ty == "std::any" {
            Self::LiteralValue
        } else {
            Self::Other
        }
    }

    /// Should the constructor move the parameter into the member rather than copy it?
    ///
    /// Owning pointers may be move-only, and vectors and `std::any` are cheaper to move.
    pub fn is_moved(&self) -> bool {
        matches!(
            self,
            Self::TokenList | Self::OwnedChild(_) | Self::OwnedChildList(_) | Self::LiteralValue
        )
    }
}

/// Is this type a token or a pointer to one?
fn is_token(ty: &str) -> bool {
    let ty = ty.trim_end_matches(|c: char| c == '*' || c.is_whitespace());
    ty == "Token" || ty.ends_with("::Token")
}

/// Get the single template argument of `ty` if it's an instance of `template`.
fn template_argument<'s>(ty: &'s str, template: &str) -> Option<&'s str> {
    ty.strip_prefix(template)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
        .map(str::trim)
}

/// Get the pointee of an owning smart pointer type.
fn owned_pointee(ty: &str) -> Option<&str> {
    template_argument(ty, "std::unique_ptr").or_else(|| template_argument(ty, "std::shared_ptr"))
}

/// Fundamental type keywords. An entry whose name is one of these was split inside its type.
const FUNDAMENTAL_TYPES: &[&str] = &[
    "auto", "bool", "char", "char8_t", "char16_t", "char32_t", "double", "float", "int", "long",
    "short", "signed", "unsigned", "void", "wchar_t",
];

/// Keywords that qualify or introduce a type but can't be a whole type on their own.
const TYPE_QUALIFIERS: &[&str] = &[
    "class", "const", "enum", "mutable", "static", "struct", "typename", "union", "volatile",
];

/// Is this a valid C++ identifier?
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// A field entry split into its parts.
///
/// Pointer and reference sigils written against the name (`antlr4::Token *name`) belong to the
/// type, so they're kept apart from both the type and the name. That way the member, the
/// constructor parameter and the initializer all agree on the bare name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field<'s> {
    /// The type as written, without any sigils that were attached to the name.
    pub ty: &'s str,

    /// Any `*` or `&` written directly before the name.
    pub sigils: &'s str,

    /// The bare name of the field.
    pub name: &'s str,

    /// What sort of value the field holds.
    pub kind: FieldKind<'s>,
}

impl<'s> Field<'s> {
    /// Split a field entry like `std::unique_ptr<Expr> left` into its type and name.
    ///
    /// Returns `None` if the entry doesn't have both a type and an identifier name, including
    /// when the type is nothing but qualifiers (`const Token`) or the name is part of the type
    /// (`unsigned int`).
    pub fn parse(entry: &'s str) -> Option<Self> {
        let (ty, name) = entry.trim().rsplit_once(char::is_whitespace)?;
        let ty = ty.trim_end();

        let sigils_len = name.len() - name.trim_start_matches(['*', '&']).len();
        let (sigils, name) = name.split_at(sigils_len);

        if ty.is_empty()
            || !is_identifier(name)
            || FUNDAMENTAL_TYPES.contains(&name)
            || ty.split_whitespace().all(|word| TYPE_QUALIFIERS.contains(&word))
        {
            return None;
        }

        Some(Self {
            ty,
            sigils,
            name,
            kind: FieldKind::classify(ty, sigils),
        })
    }

    /// The expression used to initialize the member from the constructor parameter.
    pub fn initializer(&self) -> String {
        if self.kind.is_moved() {
            format!("{}(std::move({}))", self.name, self.name)
        } else {
            format!("{}({})", self.name, self.name)
        }
    }
}

/// Display the field as a declaration, which is the same as the member and the parameter.
impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.ty, self.sigils, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use FieldKind::*;

    fn kind_of(entry: &str) -> Option<FieldKind<'_>> {
        Field::parse(entry).map(|field| field.kind)
    }

    #[test]
    fn split_type_and_name() {
        let field = Field::parse("std::vector<std::unique_ptr<Expr>> args").unwrap();
        assert_eq!(field.ty, "std::vector<std::unique_ptr<Expr>>");
        assert_eq!(field.sigils, "");
        assert_eq!(field.name, "args");

        let field = Field::parse("  std::map<int, int>   lookup ").unwrap();
        assert_eq!(field.ty, "std::map<int, int>");
        assert_eq!(field.name, "lookup");
    }

    #[test]
    fn sigils_are_not_part_of_the_name() {
        let field = Field::parse("antlr4::Token *name").unwrap();
        assert_eq!(field.ty, "antlr4::Token");
        assert_eq!(field.sigils, "*");
        assert_eq!(field.name, "name");
        assert_eq!(field.to_string(), "antlr4::Token *name");
        assert_eq!(field.initializer(), "name(name)");

        let field = Field::parse("antlr4::Token* name").unwrap();
        assert_eq!(field.ty, "antlr4::Token*");
        assert_eq!(field.sigils, "");
        assert_eq!(field.kind, Token);
        assert_eq!(field.to_string(), "antlr4::Token* name");
    }

    #[test]
    fn malformed_entries() {
        assert_eq!(Field::parse(""), None);
        assert_eq!(Field::parse("   "), None);
        assert_eq!(Field::parse("Token"), None);
        assert_eq!(Field::parse("std::unique_ptr<Expr>"), None);
        assert_eq!(Field::parse("Token *"), None);
        assert_eq!(Field::parse("Token 1st"), None);
        assert_eq!(Field::parse("Token na-me"), None);
        assert_eq!(Field::parse("const Token"), None);
        assert_eq!(Field::parse("const volatile Token"), None);
        assert_eq!(Field::parse("unsigned int"), None);
        assert_eq!(Field::parse("long long"), None);
    }

    #[test]
    fn keyword_types_still_parse() {
        assert_eq!(Field::parse("int count").unwrap().name, "count");
        assert_eq!(Field::parse("unsigned int count").unwrap().ty, "unsigned int");
        assert_eq!(Field::parse("const Token name").unwrap().ty, "const Token");
        assert_eq!(Field::parse("const Token name").unwrap().kind, FieldKind::Other);
    }

    #[test]
    fn kinds() {
        assert_eq!(kind_of("Token op"), Some(Token));
        assert_eq!(kind_of("antlr4::Token *op"), Some(Token));
        assert_eq!(kind_of("std::vector<Token> params"), Some(TokenList));
        assert_eq!(kind_of("std::vector<antlr4::Token*> params"), Some(TokenList));
        assert_eq!(kind_of("std::unique_ptr<Expr> left"), Some(OwnedChild("Expr")));
        assert_eq!(kind_of("std::shared_ptr<Stmt> body"), Some(OwnedChild("Stmt")));
        assert_eq!(
            kind_of("std::vector<std::shared_ptr<Function>> methods"),
            Some(OwnedChildList("Function"))
        );
        assert_eq!(kind_of("std::any value"), Some(LiteralValue));
        assert_eq!(kind_of("double number"), Some(Other));
        assert_eq!(kind_of("Expr *parent"), Some(Other));
        assert_eq!(kind_of("std::vector<int> numbers"), Some(Other));
    }

    #[test]
    fn initializers() {
        let init = |entry| Field::parse(entry).unwrap().initializer();

        assert_eq!(init("Token op"), "op(op)");
        assert_eq!(init("std::unique_ptr<Expr> left"), "left(std::move(left))");
        assert_eq!(
            init("std::vector<std::unique_ptr<Stmt>> statements"),
            "statements(std::move(statements))"
        );
        assert_eq!(init("std::any value"), "value(std::move(value))");
        assert_eq!(init("double number"), "number(number)");
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("left"));
        assert!(is_identifier("_"));
        assert!(is_identifier("then_branch2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2x"));
        assert!(!is_identifier("a b"));
        assert!(!is_identifier("*name"));
    }
}
