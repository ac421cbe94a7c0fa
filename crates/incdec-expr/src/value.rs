use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::{PoisonError, RwLockReadGuard, RwLockWriteGuard, Weak};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::{Shared, SharedCell, types::Type};

/// A runtime value stored at a location or produced by an expression.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(SmolStr),
    Object(ObjectRef),
    Array(ArrayRef),
}

impl Value {
    #[inline(always)]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The zero value a fresh location of type `ty` holds.
    pub fn default_of(ty: &Type) -> Self {
        match ty {
            Type::Bool => Value::Bool(false),
            Type::Int8 => Value::Int8(0),
            Type::UInt8 => Value::UInt8(0),
            Type::Int16 => Value::Int16(0),
            Type::UInt16 => Value::UInt16(0),
            Type::Int32 => Value::Int32(0),
            Type::UInt32 => Value::UInt32(0),
            Type::Int64 => Value::Int64(0),
            Type::UInt64 => Value::UInt64(0),
            Type::Single => Value::Single(0.0),
            Type::Double => Value::Double(0.0),
            Type::Decimal => Value::Decimal(Decimal::ZERO),
            _ => Value::Null,
        }
    }

    /// Returns `true` if this value is an inhabitant of `ty`.
    pub fn conforms_to(&self, ty: &Type) -> bool {
        match (self, ty) {
            (Value::Null, ty) => ty.accepts_null(),
            (_, Type::Nullable(inner)) => self.conforms_to(inner),
            (Value::Bool(_), Type::Bool)
            | (Value::Int8(_), Type::Int8)
            | (Value::UInt8(_), Type::UInt8)
            | (Value::Int16(_), Type::Int16)
            | (Value::UInt16(_), Type::UInt16)
            | (Value::Int32(_), Type::Int32)
            | (Value::UInt32(_), Type::UInt32)
            | (Value::Int64(_), Type::Int64)
            | (Value::UInt64(_), Type::UInt64)
            | (Value::Single(_), Type::Single)
            | (Value::Double(_), Type::Double)
            | (Value::Decimal(_), Type::Decimal)
            | (Value::String(_), Type::String) => true,
            (Value::Object(object), Type::Class(name)) => object.class() == *name,
            (Value::Array(array), Type::Array(element)) => array.element_type() == **element,
            (_, Type::Object) => true,
            _ => false,
        }
    }

    /// Converts an integral value into an array position candidate.
    pub fn as_index(&self) -> Option<i128> {
        match self {
            Value::Int8(v) => Some(*v as i128),
            Value::UInt8(v) => Some(*v as i128),
            Value::Int16(v) => Some(*v as i128),
            Value::UInt16(v) => Some(*v as i128),
            Value::Int32(v) => Some(*v as i128),
            Value::UInt32(v) => Some(*v as i128),
            Value::Int64(v) => Some(*v as i128),
            Value::UInt64(v) => Some(*v as i128),
            _ => None,
        }
    }

    /// The most specific static type of this value; null reports `Object`.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::Object,
            Value::Bool(_) => Type::Bool,
            Value::Int8(_) => Type::Int8,
            Value::UInt8(_) => Type::UInt8,
            Value::Int16(_) => Type::Int16,
            Value::UInt16(_) => Type::UInt16,
            Value::Int32(_) => Type::Int32,
            Value::UInt32(_) => Type::UInt32,
            Value::Int64(_) => Type::Int64,
            Value::UInt64(_) => Type::UInt64,
            Value::Single(_) => Type::Single,
            Value::Double(_) => Type::Double,
            Value::Decimal(_) => Type::Decimal,
            Value::String(_) => Type::String,
            Value::Object(object) => Type::Class(object.class()),
            Value::Array(array) => Type::array(array.element_type()),
        }
    }

    pub fn type_name(&self) -> SmolStr {
        match self {
            Value::Null => SmolStr::new_inline("null"),
            Value::Bool(_) => Type::Bool.to_string().into(),
            Value::Int8(_) => Type::Int8.to_string().into(),
            Value::UInt8(_) => Type::UInt8.to_string().into(),
            Value::Int16(_) => Type::Int16.to_string().into(),
            Value::UInt16(_) => Type::UInt16.to_string().into(),
            Value::Int32(_) => Type::Int32.to_string().into(),
            Value::UInt32(_) => Type::UInt32.to_string().into(),
            Value::Int64(_) => Type::Int64.to_string().into(),
            Value::UInt64(_) => Type::UInt64.to_string().into(),
            Value::Single(_) => Type::Single.to_string().into(),
            Value::Double(_) => Type::Double.to_string().into(),
            Value::Decimal(_) => Type::Decimal.to_string().into(),
            Value::String(_) => Type::String.to_string().into(),
            Value::Object(object) => object.class(),
            Value::Array(array) => Type::array(array.element_type()).to_string().into(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int8(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Single(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
            Value::Object(object) => write!(f, "{}", object.class()),
            Value::Array(array) => write!(f, "{}[{}]", array.element_type(), array.len()),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive!(
    bool => Bool,
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
    f32 => Single,
    f64 => Double,
    Decimal => Decimal,
    SmolStr => String,
    ObjectRef => Object,
    ArrayRef => Array,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(SmolStr::new(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value.into())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    class: SmolStr,
    fields: FxHashMap<SmolStr, Value>,
    indexed: FxHashMap<(SmolStr, IndexKeys), Value>,
}

/// Shared handle to a class instance. Equality is reference identity.
#[derive(Debug, Clone)]
pub struct ObjectRef(Shared<SharedCell<Object>>);

impl ObjectRef {
    pub fn new(class: &str) -> Self {
        Self(Shared::new(SharedCell::new(Object {
            class: SmolStr::new(class),
            fields: FxHashMap::default(),
            indexed: FxHashMap::default(),
        })))
    }

    fn read(&self) -> RwLockReadGuard<'_, Object> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Object> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn class(&self) -> SmolStr {
        self.read().class.clone()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.read().fields.get(name).cloned()
    }

    pub fn set(&self, name: &str, value: impl Into<Value>) {
        self.write().fields.insert(SmolStr::new(name), value.into());
    }

    pub fn get_indexed(&self, name: &str, args: &[Value]) -> Option<Value> {
        let key = (SmolStr::new(name), IndexKey::of_args(args));
        self.read().indexed.get(&key).cloned()
    }

    pub fn set_indexed(&self, name: &str, args: &[Value], value: impl Into<Value>) {
        let key = (SmolStr::new(name), IndexKey::of_args(args));
        let value = value.into();
        self.write().indexed.insert(key, value);
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        Shared::ptr_eq(&self.0, &other.0)
    }
}

type IndexKeys = SmallVec<[IndexKey; 2]>;

/// Hashable form of one indexer argument.
///
/// Objects and arrays are keyed by identity. The key holds a weak handle, so
/// the allocation (and with it the address) outlives a dropped argument
/// without keeping the value alive or forming a cycle for `obj[obj]`.
#[derive(Debug, Clone)]
enum IndexKey {
    Scalar(ScalarKey),
    Object(Weak<SharedCell<Object>>),
    Array(Weak<SharedCell<Array>>),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScalarKey {
    Null,
    Bool(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(u32),
    Double(u64),
    Decimal(Decimal),
    String(SmolStr),
}

impl IndexKey {
    fn of_args(args: &[Value]) -> IndexKeys {
        args.iter().map(IndexKey::of).collect()
    }

    fn of(value: &Value) -> Self {
        let scalar = match value {
            Value::Object(object) => return IndexKey::Object(Shared::downgrade(&object.0)),
            Value::Array(array) => return IndexKey::Array(Shared::downgrade(&array.0)),
            Value::Null => ScalarKey::Null,
            Value::Bool(v) => ScalarKey::Bool(*v),
            Value::Int8(v) => ScalarKey::Int8(*v),
            Value::UInt8(v) => ScalarKey::UInt8(*v),
            Value::Int16(v) => ScalarKey::Int16(*v),
            Value::UInt16(v) => ScalarKey::UInt16(*v),
            Value::Int32(v) => ScalarKey::Int32(*v),
            Value::UInt32(v) => ScalarKey::UInt32(*v),
            Value::Int64(v) => ScalarKey::Int64(*v),
            Value::UInt64(v) => ScalarKey::UInt64(*v),
            // 0.0 and -0.0 are one key, as are all NaNs.
            Value::Single(v) if *v == 0.0 => ScalarKey::Single(0),
            Value::Single(v) if v.is_nan() => ScalarKey::Single(f32::NAN.to_bits()),
            Value::Single(v) => ScalarKey::Single(v.to_bits()),
            Value::Double(v) if *v == 0.0 => ScalarKey::Double(0),
            Value::Double(v) if v.is_nan() => ScalarKey::Double(f64::NAN.to_bits()),
            Value::Double(v) => ScalarKey::Double(v.to_bits()),
            Value::Decimal(v) => ScalarKey::Decimal(*v),
            Value::String(v) => ScalarKey::String(v.clone()),
        };
        IndexKey::Scalar(scalar)
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (IndexKey::Scalar(a), IndexKey::Scalar(b)) => a == b,
            (IndexKey::Object(a), IndexKey::Object(b)) => Weak::ptr_eq(a, b),
            (IndexKey::Array(a), IndexKey::Array(b)) => Weak::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for IndexKey {}

impl Hash for IndexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            IndexKey::Scalar(scalar) => scalar.hash(state),
            IndexKey::Object(object) => Weak::as_ptr(object).hash(state),
            IndexKey::Array(array) => Weak::as_ptr(array).hash(state),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    element: Type,
    items: Vec<Value>,
}

/// Shared handle to a fixed-length array. Equality is reference identity.
#[derive(Debug, Clone)]
pub struct ArrayRef(Shared<SharedCell<Array>>);

impl ArrayRef {
    pub fn new(element: Type, items: Vec<Value>) -> Self {
        Self(Shared::new(SharedCell::new(Array { element, items })))
    }

    /// Creates an array of `len` default values.
    pub fn with_len(element: Type, len: usize) -> Self {
        let items = vec![Value::default_of(&element); len];
        Self::new(element, items)
    }

    fn read(&self) -> RwLockReadGuard<'_, Array> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Array> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn element_type(&self) -> Type {
        self.read().element.clone()
    }

    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.read().items.get(index).cloned()
    }

    /// Stores `value` at `index`, returning `false` when the index is out of range.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        match self.write().items.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }
}

impl PartialEq for ArrayRef {
    fn eq(&self, other: &Self) -> bool {
        Shared::ptr_eq(&self.0, &other.0)
    }
}
