//! Decaf type specifications.
use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::symbols::ClassId;

/// The resolved static type of an expression, as assigned by the type checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeSpec {
    Void,
    /// The type of the `null` literal.
    Null,
    Int,
    Bool,
    String,
    Class(ClassId),
    Array(Box<TypeSpec>),
}
impl TypeSpec {
    pub fn as_class(&self) -> Option<ClassId> {
        match self {
            TypeSpec::Class(class) => Some(*class),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        *self == TypeSpec::Void
    }
}
impl Display for TypeSpec {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            TypeSpec::Void => f.write_str("void"),
            TypeSpec::Null => f.write_str("null"),
            TypeSpec::Int => f.write_str("int"),
            TypeSpec::Bool => f.write_str("bool"),
            TypeSpec::String => f.write_str("string"),
            TypeSpec::Class(class) => write!(f, "class {}", class),
            TypeSpec::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_array_types_display_like_declarations() {
        let ty = TypeSpec::Array(Box::new(TypeSpec::Array(Box::new(TypeSpec::Int))));

        assert_eq!("int[][]", ty.to_string());
    }

    #[test]
    fn only_class_types_expose_their_class() {
        assert_eq!(Some(ClassId(3)), TypeSpec::Class(ClassId(3)).as_class());
        assert_eq!(None, TypeSpec::Null.as_class());
    }
}
