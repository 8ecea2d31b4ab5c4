//! This module handles the tables that describe families of AST nodes.

use crate::field::{is_identifier, Field};
use indexmap::{map::Entry, IndexMap};
use lazy_static::lazy_static;
use std::{
    collections::{HashMap, HashSet},
    fmt,
};
use thiserror::Error;
use tracing::trace;

lazy_static! {
    /// Every C++ keyword and alternative operator token.
    static ref CPP_KEYWORDS: HashSet<&'static str> = [
        "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
        "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
        "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
        "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
        "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
        "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
        "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
        "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
        "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
        "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
        "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
    ]
    .into_iter()
    .collect();
}

/// The name of the visitor interface nested in every base type.
pub const VISITOR_NAME: &str = "Visitor";

/// The name of the visitation entry point on every node.
pub const ACCEPT_NAME: &str = "accept";

/// An error in the description of a node family.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A family has no variants, so there's nothing to generate.
    #[error("family `{0}` has no variants")]
    EmptyFamily(String),

    /// A base or variant name is empty or not an identifier.
    #[error("`{name}` in family `{family}` is not a valid identifier")]
    InvalidIdentifier {
        /// The base name of the family.
        family: String,

        /// The offending name.
        name: String,
    },

    /// A name is a C++ keyword or would clash with the generated scaffolding.
    #[error("`{name}` cannot be used as a name in family `{family}`")]
    ReservedWord {
        /// The base name of the family.
        family: String,

        /// The offending name.
        name: String,
    },

    /// Two variants in one family have the same name.
    #[error("variant `{variant}` appears more than once in family `{family}`")]
    DuplicateVariant {
        /// The base name of the family.
        family: String,

        /// The repeated variant name.
        variant: String,
    },

    /// Two fields in one variant have the same name.
    #[error("field `{field}` appears more than once in variant `{variant}`")]
    DuplicateField {
        /// The variant with the repeated field.
        variant: String,

        /// The repeated field name.
        field: String,
    },

    /// A variant has the same name as the base type of its family.
    #[error("variant `{0}` has the same name as its family")]
    VariantNamesBase(String),

    /// Two families that are written to the same files declare the same type.
    #[error("type `{name}` is declared by both `{first}` and `{second}`")]
    ClashAcrossFamilies {
        /// The doubly declared type.
        name: String,

        /// The base name of the first family to declare it.
        first: String,

        /// The base name of the second family to declare it.
        second: String,
    },
}

/// A single field entry, written as `<type> <name>`, like `std::unique_ptr<Expr> left`.
///
/// The entry is kept exactly as written. It only gets split into its type and name when it's
/// emitted, so an entry that can't be split is reported by the emitter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldSpec(String);

impl FieldSpec {
    /// Create a new field entry.
    pub fn new(entry: impl Into<String>) -> Self {
        Self(entry.into())
    }

    /// The entry as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldSpec {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One concrete kind of node in a family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantSpec {
    /// The name of the generated type.
    pub name: String,

    /// The fields, in declaration and constructor order.
    pub fields: Vec<FieldSpec>,
}

/// A family of nodes sharing one base type and one visitor.
///
/// The variants keep the order they were added in, and everything emitted for the family follows
/// that order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilySpec {
    /// The name of the base type.
    base_name: String,

    /// The variants, in order.
    variants: IndexMap<String, VariantSpec>,
}

impl FamilySpec {
    /// Start describing a family with the given base type name.
    pub fn builder(base_name: impl Into<String>) -> FamilyBuilder {
        FamilyBuilder {
            base_name: base_name.into(),
            variants: Vec::new(),
        }
    }

    /// The name of the base type.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The variants, in order.
    pub fn variants(&self) -> impl Iterator<Item = &VariantSpec> {
        self.variants.values()
    }

    /// Get a variant by name.
    pub fn variant(&self, name: &str) -> Option<&VariantSpec> {
        self.variants.get(name)
    }

    /// The number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Does this family have no variants? Never true for a built family.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Every type name this family declares: the base type and then each variant.
    fn type_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.base_name.as_str()).chain(self.variants.keys().map(String::as_str))
    }
}

/// A builder for a [`FamilySpec`], checked by [`FamilyBuilder::build`].
#[derive(Clone, Debug)]
pub struct FamilyBuilder {
    /// The name of the base type.
    base_name: String,

    /// The variants, in the order they were added, possibly with duplicates.
    variants: Vec<VariantSpec>,
}

impl FamilyBuilder {
    /// Add a variant with the given field entries.
    pub fn variant<F>(mut self, name: impl Into<String>, fields: impl IntoIterator<Item = F>) -> Self
    where
        F: Into<FieldSpec>,
    {
        self.variants.push(VariantSpec {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Check the family and build it.
    pub fn build(self) -> Result<FamilySpec, SchemaError> {
        let family = self.base_name;
        check_name(&family, &family)?;

        if self.variants.is_empty() {
            return Err(SchemaError::EmptyFamily(family));
        }

        let mut variants = IndexMap::with_capacity(self.variants.len());
        for variant in self.variants {
            check_name(&family, &variant.name)?;
            if variant.name == family {
                return Err(SchemaError::VariantNamesBase(variant.name));
            }
            check_fields(&family, &variant)?;

            match variants.entry(variant.name.clone()) {
                Entry::Occupied(_) => {
                    return Err(SchemaError::DuplicateVariant {
                        family,
                        variant: variant.name,
                    })
                }
                Entry::Vacant(entry) => {
                    trace!(
                        "Adding variant {}::{} with {} fields",
                        family,
                        variant.name,
                        variant.fields.len()
                    );
                    entry.insert(variant);
                }
            }
        }

        Ok(FamilySpec {
            base_name: family,
            variants,
        })
    }
}

/// Check a base or variant name.
fn check_name(family: &str, name: &str) -> Result<(), SchemaError> {
    if !is_identifier(name) {
        Err(SchemaError::InvalidIdentifier {
            family: family.to_string(),
            name: name.to_string(),
        })
    } else if CPP_KEYWORDS.contains(name) || name == VISITOR_NAME {
        Err(SchemaError::ReservedWord {
            family: family.to_string(),
            name: name.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Check the field names of a variant.
///
/// Entries that can't be split into a type and a name are skipped here and rejected when the
/// family is emitted.
fn check_fields(family: &str, variant: &VariantSpec) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();

    for field in variant.fields.iter().filter_map(|spec| Field::parse(spec.as_str())) {
        if CPP_KEYWORDS.contains(field.name)
            || field.name == ACCEPT_NAME
            || field.name == VISITOR_NAME
            || field.name == family
            || field.name == variant.name
        {
            return Err(SchemaError::ReservedWord {
                family: family.to_string(),
                name: field.name.to_string(),
            });
        }

        if !seen.insert(field.name) {
            return Err(SchemaError::DuplicateField {
                variant: variant.name.clone(),
                field: field.name.to_string(),
            });
        }
    }

    Ok(())
}

/// Check that families written into the same pair of files don't declare the same type twice.
pub fn check_shared_unit(families: &[FamilySpec]) -> Result<(), SchemaError> {
    let mut declared_by: HashMap<&str, &str> = HashMap::new();

    for family in families {
        for name in family.type_names() {
            if let Some(first) = declared_by.insert(name, family.base_name()) {
                return Err(SchemaError::ClashAcrossFamilies {
                    name: name.to_string(),
                    first: first.to_string(),
                    second: family.base_name().to_string(),
                });
            }
        }
    }

    Ok(())
}
