use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

pub use crate::token::{BasicType, Position};

/// The parsed contents of one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFile {
    pub name:         String,
    /// Package named by the last `package` line, if any.
    pub package:      Option<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Package(PackageDecl),
    TypeAlias(TypeAlias),
    Enum(Enum),
    Choice(Choice),
    Message(Message),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageDecl {
    pub name: String,
    pub pos:  Position,
}

/// A named blob built from a basic type, e.g. `type Sha1 [20]byte`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeAlias {
    pub name:  String,
    pub array: Option<ArraySpec>,
    pub basic: BasicType,
    pub pos:   Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name:   String,
    pub fields: Vec<EnumField>,
    pub pos:    Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumField {
    pub tag:  u32,
    pub name: String,
    pub pos:  Position,
}

/// Tagged union over other message or choice types.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Choice {
    pub name:   String,
    pub fields: Vec<ChoiceField>,
    pub pos:    Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceField {
    pub tag:   u32,
    #[serde(rename = "type")]
    pub type_: QualifiedTypeRef,
    pub pos:   Position,
}

/// A record of optional, tagged fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub name:   String,
    pub fields: Vec<MessageField>,
    pub pos:    Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageField {
    pub tag:   u32,
    pub name:  String,
    pub array: Option<ArraySpec>,
    #[serde(rename = "type")]
    pub type_: FieldType,
    pub pos:   Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Basic(BasicType),
    Named(QualifiedTypeRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArraySpec {
    /// `[n]`
    Fixed(u32),
    /// `[]`
    Dynamic,
}

/// `Name` or `package.Name`. Without a package the reference points into
/// the package of the file it appears in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct QualifiedTypeRef {
    pub package: Option<String>,
    pub name:    String,
}

impl QualifiedTypeRef {
    pub fn local(name: impl Into<String>) -> Self {
        QualifiedTypeRef { package: None, name: name.into() }
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        QualifiedTypeRef { package: Some(package.into()), name: name.into() }
    }

    /// The package this reference points into, given the package of the
    /// file it was written in.
    pub fn resolve<'a>(&'a self, current_package: Option<&'a str>) -> Option<&'a str> {
        self.package.as_deref().or(current_package)
    }
}

impl fmt::Display for QualifiedTypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.package {
            Some(package) => write!(f, "{}.{}", package, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl Declaration {
    /// Name of the declared type, or of the package for `package` lines.
    pub fn name(&self) -> &str {
        match self {
            Declaration::Package(d)   => &d.name,
            Declaration::TypeAlias(d) => &d.name,
            Declaration::Enum(d)      => &d.name,
            Declaration::Choice(d)    => &d.name,
            Declaration::Message(d)   => &d.name,
        }
    }

    pub fn pos(&self) -> Position {
        match self {
            Declaration::Package(d)   => d.pos,
            Declaration::TypeAlias(d) => d.pos,
            Declaration::Enum(d)      => d.pos,
            Declaration::Choice(d)    => d.pos,
            Declaration::Message(d)   => d.pos,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Declaration::Package(_)   => "package",
            Declaration::TypeAlias(_) => "type",
            Declaration::Enum(_)      => "enum",
            Declaration::Choice(_)    => "choice",
            Declaration::Message(_)   => "message",
        }
    }
}

impl SourceFile {
    pub fn new(name: impl Into<String>) -> Self {
        SourceFile {
            name:         name.into(),
            package:      None,
            declarations: Vec::new(),
        }
    }

    /// Declarations other than `package` lines.
    pub fn types(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations
            .iter()
            .filter(|d| !matches!(d, Declaration::Package(_)))
    }

    /// Every type reference in source order.
    pub fn type_refs(&self) -> Vec<&QualifiedTypeRef> {
        let mut refs = Vec::new();
        for decl in &self.declarations {
            match decl {
                Declaration::Choice(choice) => {
                    refs.extend(choice.fields.iter().map(|f| &f.type_));
                }
                Declaration::Message(message) => {
                    for field in &message.fields {
                        if let FieldType::Named(type_ref) = &field.type_ {
                            refs.push(type_ref);
                        }
                    }
                }
                _ => {}
            }
        }
        refs
    }

    /// Packages named explicitly by type references, excluding this file's
    /// own package. These are the outgoing edges of the package graph.
    pub fn referenced_packages(&self) -> BTreeSet<&str> {
        self.type_refs()
            .into_iter()
            .filter_map(|r| r.package.as_deref())
            .filter(|p| Some(*p) != self.package.as_deref())
            .collect()
    }
}
