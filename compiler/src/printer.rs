//! Canonical source form of the AST.
//!
//! One declaration per paragraph, field lines indented by four spaces and
//! arrays written right before their element type. Parsing the output gives
//! back the same declarations.

use std::fmt;

use crate::types::{
    ArraySpec, Choice, Declaration, Enum, FieldType, Message, PackageDecl, SourceFile, TypeAlias,
};

const INDENT: &str = "    ";

impl fmt::Display for ArraySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArraySpec::Fixed(size) => write!(f, "[{}]", size),
            ArraySpec::Dynamic => f.write_str("[]"),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Basic(basic) => write!(f, "{}", basic),
            FieldType::Named(type_ref) => write!(f, "{}", type_ref),
        }
    }
}

fn write_array(f: &mut fmt::Formatter<'_>, array: &Option<ArraySpec>) -> fmt::Result {
    match array {
        Some(array) => write!(f, "{}", array),
        None => Ok(()),
    }
}

impl fmt::Display for PackageDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "package {}", self.name)
    }
}

impl fmt::Display for TypeAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {} ", self.name)?;
        write_array(f, &self.array)?;
        writeln!(f, "{}", self.basic)
    }
}

impl fmt::Display for Enum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "enum {}", self.name)?;
        for field in &self.fields {
            writeln!(f, "{}{}: {}", INDENT, field.tag, field.name)?;
        }
        writeln!(f, "end")
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "choice {}", self.name)?;
        for field in &self.fields {
            writeln!(f, "{}{}: {}", INDENT, field.tag, field.type_)?;
        }
        writeln!(f, "end")
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "message {}", self.name)?;
        for field in &self.fields {
            write!(f, "{}{}: {} ", INDENT, field.tag, field.name)?;
            write_array(f, &field.array)?;
            writeln!(f, "{}", field.type_)?;
        }
        writeln!(f, "end")
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Package(d)   => write!(f, "{}", d),
            Declaration::TypeAlias(d) => write!(f, "{}", d),
            Declaration::Enum(d)      => write!(f, "{}", d),
            Declaration::Choice(d)    => write!(f, "{}", d),
            Declaration::Message(d)   => write!(f, "{}", d),
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, decl) in self.declarations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", decl)?;
        }
        Ok(())
    }
}
