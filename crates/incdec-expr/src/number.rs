//! Built-in unit increment and decrement for numeric kinds.
//!
//! [`UnitOp`] is the operation descriptor shared by both executors: the
//! evaluator calls [`UnitOp::apply`] on every execution, while the compiler
//! resolves [`UnitOp::step_fn`] once and captures it in the compiled closure.
//! Both end up in the same monomorphized step functions below.

use std::fmt::{self, Display, Formatter};

use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use crate::{error::runtime::RuntimeError, types::Type, value::Value};

/// Steps a single non-null value by one unit.
pub type StepFn = fn(&Value) -> Result<Value, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericKind {
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
}

impl NumericKind {
    pub const ALL: [NumericKind; 11] = [
        NumericKind::Int8,
        NumericKind::UInt8,
        NumericKind::Int16,
        NumericKind::UInt16,
        NumericKind::Int32,
        NumericKind::UInt32,
        NumericKind::Int64,
        NumericKind::UInt64,
        NumericKind::Single,
        NumericKind::Double,
        NumericKind::Decimal,
    ];

    /// Maps a non-nullable type to its numeric kind.
    pub fn of(ty: &Type) -> Option<Self> {
        match ty {
            Type::Int8 => Some(NumericKind::Int8),
            Type::UInt8 => Some(NumericKind::UInt8),
            Type::Int16 => Some(NumericKind::Int16),
            Type::UInt16 => Some(NumericKind::UInt16),
            Type::Int32 => Some(NumericKind::Int32),
            Type::UInt32 => Some(NumericKind::UInt32),
            Type::Int64 => Some(NumericKind::Int64),
            Type::UInt64 => Some(NumericKind::UInt64),
            Type::Single => Some(NumericKind::Single),
            Type::Double => Some(NumericKind::Double),
            Type::Decimal => Some(NumericKind::Decimal),
            _ => None,
        }
    }

    pub fn ty(self) -> Type {
        match self {
            NumericKind::Int8 => Type::Int8,
            NumericKind::UInt8 => Type::UInt8,
            NumericKind::Int16 => Type::Int16,
            NumericKind::UInt16 => Type::UInt16,
            NumericKind::Int32 => Type::Int32,
            NumericKind::UInt32 => Type::UInt32,
            NumericKind::Int64 => Type::Int64,
            NumericKind::UInt64 => Type::UInt64,
            NumericKind::Single => Type::Single,
            NumericKind::Double => Type::Double,
            NumericKind::Decimal => Type::Decimal,
        }
    }

    pub fn is_floating(self) -> bool {
        matches!(self, NumericKind::Single | NumericKind::Double)
    }

    pub fn step(self, direction: Direction) -> StepFn {
        match (self, direction) {
            (NumericKind::Int8, Direction::Increment) => increment::<i8>,
            (NumericKind::Int8, Direction::Decrement) => decrement::<i8>,
            (NumericKind::UInt8, Direction::Increment) => increment::<u8>,
            (NumericKind::UInt8, Direction::Decrement) => decrement::<u8>,
            (NumericKind::Int16, Direction::Increment) => increment::<i16>,
            (NumericKind::Int16, Direction::Decrement) => decrement::<i16>,
            (NumericKind::UInt16, Direction::Increment) => increment::<u16>,
            (NumericKind::UInt16, Direction::Decrement) => decrement::<u16>,
            (NumericKind::Int32, Direction::Increment) => increment::<i32>,
            (NumericKind::Int32, Direction::Decrement) => decrement::<i32>,
            (NumericKind::UInt32, Direction::Increment) => increment::<u32>,
            (NumericKind::UInt32, Direction::Decrement) => decrement::<u32>,
            (NumericKind::Int64, Direction::Increment) => increment::<i64>,
            (NumericKind::Int64, Direction::Decrement) => decrement::<i64>,
            (NumericKind::UInt64, Direction::Increment) => increment::<u64>,
            (NumericKind::UInt64, Direction::Decrement) => decrement::<u64>,
            (NumericKind::Single, Direction::Increment) => increment::<f32>,
            (NumericKind::Single, Direction::Decrement) => decrement::<f32>,
            (NumericKind::Double, Direction::Increment) => increment::<f64>,
            (NumericKind::Double, Direction::Decrement) => decrement::<f64>,
            (NumericKind::Decimal, Direction::Increment) => increment::<Decimal>,
            (NumericKind::Decimal, Direction::Decrement) => decrement::<Decimal>,
        }
    }
}

impl Display for NumericKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Increment,
    Decrement,
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increment => write!(f, "increment"),
            Direction::Decrement => write!(f, "decrement"),
        }
    }
}

trait Step: Sized {
    const KIND: NumericKind;

    fn unwrap(value: &Value) -> Option<Self>;
    fn wrap(self) -> Value;
    fn next(self) -> Option<Self>;
    fn prev(self) -> Option<Self>;
}

macro_rules! checked_step {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Step for $ty {
                const KIND: NumericKind = NumericKind::$variant;

                #[inline(always)]
                fn unwrap(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                #[inline(always)]
                fn wrap(self) -> Value {
                    Value::$variant(self)
                }

                #[inline(always)]
                fn next(self) -> Option<Self> {
                    self.checked_add(1)
                }

                #[inline(always)]
                fn prev(self) -> Option<Self> {
                    self.checked_sub(1)
                }
            }
        )*
    };
}

checked_step!(
    i8 => Int8,
    u8 => UInt8,
    i16 => Int16,
    u16 => UInt16,
    i32 => Int32,
    u32 => UInt32,
    i64 => Int64,
    u64 => UInt64,
);

// IEEE semantics: NaN and infinities step to themselves, never an error.
macro_rules! float_step {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Step for $ty {
                const KIND: NumericKind = NumericKind::$variant;

                #[inline(always)]
                fn unwrap(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                #[inline(always)]
                fn wrap(self) -> Value {
                    Value::$variant(self)
                }

                #[inline(always)]
                fn next(self) -> Option<Self> {
                    Some(self + 1.0)
                }

                #[inline(always)]
                fn prev(self) -> Option<Self> {
                    Some(self - 1.0)
                }
            }
        )*
    };
}

float_step!(f32 => Single, f64 => Double);

impl Step for Decimal {
    const KIND: NumericKind = NumericKind::Decimal;

    #[inline(always)]
    fn unwrap(value: &Value) -> Option<Self> {
        match value {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    #[inline(always)]
    fn wrap(self) -> Value {
        Value::Decimal(self)
    }

    #[inline(always)]
    fn next(self) -> Option<Self> {
        self.checked_add(Decimal::ONE)
    }

    #[inline(always)]
    fn prev(self) -> Option<Self> {
        self.checked_sub(Decimal::ONE)
    }
}

fn increment<T: Step>(value: &Value) -> Result<Value, RuntimeError> {
    let current = T::unwrap(value).ok_or_else(|| RuntimeError::type_mismatch(T::KIND.ty(), value))?;
    current.next().map(T::wrap).ok_or(RuntimeError::Overflow {
        kind: T::KIND,
        direction: Direction::Increment,
    })
}

fn decrement<T: Step>(value: &Value) -> Result<Value, RuntimeError> {
    let current = T::unwrap(value).ok_or_else(|| RuntimeError::type_mismatch(T::KIND.ty(), value))?;
    current.prev().map(T::wrap).ok_or(RuntimeError::Overflow {
        kind: T::KIND,
        direction: Direction::Decrement,
    })
}

/// Built-in unit operation resolved for an operand type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitOp {
    pub kind: NumericKind,
    pub direction: Direction,
    /// The operand is nullable: a null value short-circuits to null.
    pub lifted: bool,
}

impl UnitOp {
    #[inline(always)]
    pub fn step_fn(&self) -> StepFn {
        self.kind.step(self.direction)
    }

    pub fn apply(&self, value: &Value) -> Result<Value, RuntimeError> {
        Self::run(self.step_fn(), self.lifted, value)
    }

    /// Applies an already resolved step function, honouring null lifting.
    #[inline(always)]
    pub fn run(step: StepFn, lifted: bool, value: &Value) -> Result<Value, RuntimeError> {
        if lifted && value.is_null() {
            return Ok(Value::Null);
        }
        step(value)
    }
}

/// The set of numeric kinds handled without an operator method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericKinds(FxHashSet<NumericKind>);

impl Default for NumericKinds {
    fn default() -> Self {
        Self(NumericKind::ALL.into_iter().collect())
    }
}

impl NumericKinds {
    pub fn empty() -> Self {
        Self(FxHashSet::default())
    }

    /// The kinds with built-in increment in the CLR expression model, where the
    /// 8-bit integers are excluded.
    pub fn clr() -> Self {
        Self::default()
            .without(NumericKind::Int8)
            .without(NumericKind::UInt8)
    }

    pub fn with(mut self, kind: NumericKind) -> Self {
        self.0.insert(kind);
        self
    }

    pub fn without(mut self, kind: NumericKind) -> Self {
        self.0.remove(&kind);
        self
    }

    pub fn contains(&self, kind: NumericKind) -> bool {
        self.0.contains(&kind)
    }

    /// Resolves the built-in operation for `ty`, unwrapping nullable types.
    pub fn resolve(&self, ty: &Type, direction: Direction) -> Option<UnitOp> {
        let kind = NumericKind::of(ty.non_nullable()).filter(|kind| self.contains(*kind))?;
        Some(UnitOp {
            kind,
            direction,
            lifted: ty.is_nullable(),
        })
    }
}
