//! This module turns node families into C++ declarations and definitions.
//!
//! Every family becomes a forward declaration for each variant, a base type with a nested
//! `Visitor` interface (one `visit` overload per variant), and one struct per variant. The
//! definitions give each variant a constructor that initializes its members from the
//! identically-named parameters, and an `accept` method that calls `v.visit(*this)`, which is
//! what routes a call through the base type to the visitor method for the concrete variant.

use crate::{
    field::Field,
    schema::{FamilySpec, VariantSpec, ACCEPT_NAME, VISITOR_NAME},
};
use thiserror::Error;
use tracing::{debug, instrument, trace};

/// The extension of the declaration unit.
pub const DECLARATION_EXTENSION: &str = "h";

/// The extension of the definition unit.
pub const DEFINITION_EXTENSION: &str = "cpp";

/// A field entry that couldn't be split into a type and a name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(
    "malformed field {index} (`{entry}`) in variant `{family}::{variant}`: expected `<type> <name>`"
)]
pub struct MalformedFieldError {
    /// The base name of the family.
    pub family: String,

    /// The variant containing the field.
    pub variant: String,

    /// The zero-based index of the field in the variant.
    pub index: usize,

    /// The entry as written.
    pub entry: String,
}

/// The includes at the top of the declaration unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Prelude {
    /// Include targets with their delimiters, like `<memory>` or `"token.h"`.
    pub includes: Vec<String>,
}

impl Prelude {
    /// Create a prelude with the given includes.
    pub fn new<I, S>(includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            includes: includes.into_iter().map(Into::into).collect(),
        }
    }

    /// The include lines, always starting with `<utility>` for `std::move`.
    fn lines(&self) -> String {
        let mut lines = String::from("#include <utility>\n");
        for include in self.includes.iter().filter(|include| *include != "<utility>") {
            lines.push_str(&format!("#include {include}\n"));
        }
        lines
    }
}

/// The text of a declaration unit and its matching definition unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratedUnit {
    /// The text of the header.
    pub declarations: String,

    /// The text of the source file.
    pub definitions: String,
}

impl GeneratedUnit {
    /// Start a unit whose header has the given prelude and whose source file includes
    /// `<header_name>.h`.
    pub fn new(header_name: &str, prelude: &Prelude) -> Self {
        Self {
            declarations: format!("#pragma once\n\n{}\n", prelude.lines()),
            definitions: format!("#include \"{header_name}.{DECLARATION_EXTENSION}\"\n\n"),
        }
    }

    /// Emit the family and append it to this unit.
    ///
    /// The unit is left untouched if the family can't be emitted.
    pub fn push_family(&mut self, family: &FamilySpec) -> Result<(), MalformedFieldError> {
        let emitted = emit_family(family)?;
        self.declarations.push_str(&emitted.declarations);
        self.definitions.push_str(&emitted.definitions);
        Ok(())
    }
}

/// A variant with its fields split up.
struct ParsedVariant<'f> {
    /// The name of the variant.
    name: &'f str,

    /// The fields in order.
    fields: Vec<Field<'f>>,
}

impl ParsedVariant<'_> {
    /// The parameter list of the constructor, which is also the field list.
    fn parameters(&self) -> String {
        self.fields
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Split every field of the variant, failing on the first malformed entry.
fn parse_variant<'f>(
    family: &FamilySpec,
    variant: &'f VariantSpec,
) -> Result<ParsedVariant<'f>, MalformedFieldError> {
    let fields = variant
        .fields
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            Field::parse(spec.as_str()).ok_or_else(|| MalformedFieldError {
                family: family.base_name().to_string(),
                variant: variant.name.clone(),
                index,
                entry: spec.to_string(),
            })
        })
        .collect::<Result<_, _>>()?;

    Ok(ParsedVariant {
        name: &variant.name,
        fields,
    })
}

/// Emit the declarations and definitions of a single family, without any prelude.
///
/// This is a pure function of the family. Every field is split before any text is produced, so
/// a malformed entry produces no output at all.
#[instrument(skip_all, fields(family = family.base_name()))]
pub fn emit_family(family: &FamilySpec) -> Result<GeneratedUnit, MalformedFieldError> {
    let variants = family
        .variants()
        .map(|variant| parse_variant(family, variant))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Emitting {} variants", variants.len());

    let mut unit = GeneratedUnit::default();
    emit_forward_declarations(&mut unit.declarations, &variants);
    emit_base(&mut unit.declarations, family.base_name(), &variants);

    for variant in &variants {
        trace!(variant = variant.name, fields = ?variant.fields);
        emit_variant_declaration(&mut unit.declarations, family.base_name(), variant);
        emit_variant_definition(&mut unit.definitions, variant);
    }

    Ok(unit)
}

/// Forward declare every variant so the visitor can name them.
fn emit_forward_declarations(out: &mut String, variants: &[ParsedVariant<'_>]) {
    for variant in variants {
        out.push_str(&format!("struct {};\n", variant.name));
    }
    out.push('\n');
}

/// Declare the base type and its visitor interface.
fn emit_base(out: &mut String, base_name: &str, variants: &[ParsedVariant<'_>]) {
    out.push_str(&format!("struct {base_name} {{\n"));
    out.push_str(&format!("    struct {VISITOR_NAME} {{\n"));
    for variant in variants {
        out.push_str(&format!(
            "        virtual void visit(const {} &) = 0;\n",
            variant.name
        ));
    }
    out.push_str(&format!("        virtual ~{VISITOR_NAME}() {{}}\n"));
    out.push_str("    };\n\n");
    out.push_str(&format!(
        "    virtual void {ACCEPT_NAME}({VISITOR_NAME} &v) const = 0;\n"
    ));
    out.push_str(&format!("    virtual ~{base_name}() {{}}\n"));
    out.push_str("};\n\n");
}

/// Declare a variant: its members, constructor, `accept` override and destructor.
fn emit_variant_declaration(out: &mut String, base_name: &str, variant: &ParsedVariant<'_>) {
    let name = variant.name;

    out.push_str(&format!("struct {name} : {base_name} {{\n"));
    for field in &variant.fields {
        out.push_str(&format!("    {field};\n"));
    }
    if !variant.fields.is_empty() {
        out.push('\n');
    }

    out.push_str(&format!("    {name}({});\n", variant.parameters()));
    out.push_str(&format!(
        "    void {ACCEPT_NAME}({VISITOR_NAME} &v) const override;\n"
    ));
    out.push_str(&format!("    virtual ~{name}() {{}}\n"));
    out.push_str("};\n\n");
}

/// Define a variant's constructor and `accept` override.
fn emit_variant_definition(out: &mut String, variant: &ParsedVariant<'_>) {
    let name = variant.name;

    if variant.fields.is_empty() {
        out.push_str(&format!("{name}::{name}() {{}}\n\n"));
    } else {
        let initializers = variant
            .fields
            .iter()
            .map(Field::initializer)
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!(
            "{name}::{name}({})\n    : {initializers} {{}}\n\n",
            variant.parameters()
        ));
    }

    out.push_str(&format!(
        "void {name}::{ACCEPT_NAME}({VISITOR_NAME} &v) const {{ v.visit(*this); }}\n\n"
    ));
}
