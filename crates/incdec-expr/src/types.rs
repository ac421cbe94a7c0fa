use std::fmt::{self, Display, Formatter};

use smol_str::SmolStr;

/// Static type of an expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Single,
    Double,
    Decimal,
    String,
    /// Root of every reference type.
    Object,
    Class(SmolStr),
    Array(Box<Type>),
    Nullable(Box<Type>),
    /// An unbound generic parameter of a method or class definition.
    Generic(SmolStr),
}

impl Type {
    /// Wraps a value type in its nullable form.
    ///
    /// Reference types and already nullable types are returned unchanged.
    pub fn nullable(inner: Type) -> Self {
        if inner.is_value_type() && !inner.is_nullable() {
            Type::Nullable(Box::new(inner))
        } else {
            inner
        }
    }

    pub fn class(name: &str) -> Self {
        Type::Class(SmolStr::new(name))
    }

    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    #[inline(always)]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// Returns the wrapped type of a nullable type, or the type itself.
    #[inline(always)]
    pub fn non_nullable(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner,
            _ => self,
        }
    }

    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            Type::Bool
                | Type::Int8
                | Type::UInt8
                | Type::Int16
                | Type::UInt16
                | Type::Int32
                | Type::UInt32
                | Type::Int64
                | Type::UInt64
                | Type::Single
                | Type::Double
                | Type::Decimal
                | Type::Nullable(_)
        )
    }

    pub fn is_reference_type(&self) -> bool {
        matches!(
            self,
            Type::String | Type::Object | Type::Class(_) | Type::Array(_)
        )
    }

    /// Returns `true` if a null value is a valid inhabitant of this type.
    pub fn accepts_null(&self) -> bool {
        self.is_nullable() || self.is_reference_type()
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Type::Int8
                | Type::UInt8
                | Type::Int16
                | Type::UInt16
                | Type::Int32
                | Type::UInt32
                | Type::Int64
                | Type::UInt64
        )
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn contains_generic_parameters(&self) -> bool {
        match self {
            Type::Generic(_) => true,
            Type::Array(inner) | Type::Nullable(inner) => inner.contains_generic_parameters(),
            _ => false,
        }
    }

    /// Returns `true` if a value of type `source` can be passed where `self` is expected.
    ///
    /// Value types box into `Object`, and a value type converts into its nullable form.
    pub fn is_assignable_from(&self, source: &Type) -> bool {
        if self == source {
            return true;
        }

        match self {
            Type::Object => !matches!(source, Type::Void | Type::Generic(_)),
            Type::Nullable(inner) => inner.as_ref() == source,
            _ => false,
        }
    }

    /// Assignability without boxing or nullable conversion: identical types, or
    /// two reference types related by assignment.
    pub fn is_reference_assignable_from(&self, source: &Type) -> bool {
        self == source
            || (self.is_reference_type()
                && source.is_reference_type()
                && self.is_assignable_from(source))
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "Void"),
            Type::Bool => write!(f, "Boolean"),
            Type::Int8 => write!(f, "SByte"),
            Type::UInt8 => write!(f, "Byte"),
            Type::Int16 => write!(f, "Int16"),
            Type::UInt16 => write!(f, "UInt16"),
            Type::Int32 => write!(f, "Int32"),
            Type::UInt32 => write!(f, "UInt32"),
            Type::Int64 => write!(f, "Int64"),
            Type::UInt64 => write!(f, "UInt64"),
            Type::Single => write!(f, "Single"),
            Type::Double => write!(f, "Double"),
            Type::Decimal => write!(f, "Decimal"),
            Type::String => write!(f, "String"),
            Type::Object => write!(f, "Object"),
            Type::Class(name) | Type::Generic(name) => write!(f, "{}", name),
            Type::Array(element) => write!(f, "{}[]", element),
            Type::Nullable(inner) => write!(f, "{}?", inner),
        }
    }
}
