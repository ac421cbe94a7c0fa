//! Class metadata consulted while building nodes.
//!
//! The registry resolves members and methods by declaring type and name and
//! locates operator methods (`op_Increment`, `op_Decrement`) for class types.
//! It never touches runtime values except to create default instances.

use std::fmt::{self, Debug, Formatter};

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::{Shared, error::runtime::RuntimeError, types::Type, value::ObjectRef, value::Value};

/// Native body of a registered method.
pub type NativeFn = fn(&[Value]) -> Result<Value, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field { read_only: bool },
    Property { can_read: bool, can_write: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub declaring_type: SmolStr,
    pub name: SmolStr,
    pub ty: Type,
    pub kind: MemberKind,
    pub is_static: bool,
    /// Parameter types of an indexed property, empty for plain members.
    pub index_params: Vec<Type>,
}

impl MemberInfo {
    pub fn field(name: &str, ty: Type) -> Self {
        Self::new(name, ty, MemberKind::Field { read_only: false })
    }

    pub fn property(name: &str, ty: Type) -> Self {
        Self::new(
            name,
            ty,
            MemberKind::Property {
                can_read: true,
                can_write: true,
            },
        )
    }

    fn new(name: &str, ty: Type, kind: MemberKind) -> Self {
        Self {
            declaring_type: SmolStr::default(),
            name: SmolStr::new(name),
            ty,
            kind,
            is_static: false,
            index_params: Vec::new(),
        }
    }

    pub fn read_only(mut self) -> Self {
        self.kind = match self.kind {
            MemberKind::Field { .. } => MemberKind::Field { read_only: true },
            MemberKind::Property { .. } => MemberKind::Property {
                can_read: true,
                can_write: false,
            },
        };
        self
    }

    /// Marks a property as having a setter but no getter.
    pub fn write_only(mut self) -> Self {
        if let MemberKind::Property { .. } = self.kind {
            self.kind = MemberKind::Property {
                can_read: false,
                can_write: true,
            };
        }
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn indexed(mut self, params: Vec<Type>) -> Self {
        self.index_params = params;
        self
    }

    pub fn can_read(&self) -> bool {
        match self.kind {
            MemberKind::Field { .. } => true,
            MemberKind::Property { can_read, .. } => can_read,
        }
    }

    pub fn can_write(&self) -> bool {
        match self.kind {
            MemberKind::Field { read_only } => !read_only,
            MemberKind::Property { can_write, .. } => can_write,
        }
    }

    #[inline(always)]
    pub fn is_indexed(&self) -> bool {
        !self.index_params.is_empty()
    }

    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }
}

#[derive(Clone)]
pub struct MethodInfo {
    pub declaring_type: SmolStr,
    pub name: SmolStr,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    /// Unbound type parameters of a generic method definition.
    pub generic_params: Vec<SmolStr>,
    pub func: NativeFn,
}

impl MethodInfo {
    /// Creates a static, non-generic method.
    pub fn new(name: &str, params: Vec<Type>, return_type: Type, func: NativeFn) -> Self {
        Self {
            declaring_type: SmolStr::default(),
            name: SmolStr::new(name),
            params,
            return_type,
            is_static: true,
            generic_params: Vec::new(),
            func,
        }
    }

    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    pub fn generic(mut self, params: &[&str]) -> Self {
        self.generic_params = params.iter().map(|p| SmolStr::new(p)).collect();
        self
    }

    pub fn contains_generic_parameters(&self) -> bool {
        !self.generic_params.is_empty()
            || self.return_type.contains_generic_parameters()
            || self.params.iter().any(Type::contains_generic_parameters)
    }

    pub fn qualified_name(&self) -> SmolStr {
        if self.declaring_type.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.declaring_type, self.name).into()
        }
    }

    #[inline(always)]
    pub fn invoke(&self, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.func)(args)
    }
}

impl Debug for MethodInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("declaring_type", &self.declaring_type)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return_type", &self.return_type)
            .field("is_static", &self.is_static)
            .field("generic_params", &self.generic_params)
            .finish_non_exhaustive()
    }
}

impl PartialEq for MethodInfo {
    fn eq(&self, other: &Self) -> bool {
        self.declaring_type == other.declaring_type
            && self.name == other.name
            && self.params == other.params
            && self.return_type == other.return_type
            && self.is_static == other.is_static
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClassInfo {
    pub name: SmolStr,
    members: FxHashMap<SmolStr, Shared<MemberInfo>>,
    methods: FxHashMap<SmolStr, Vec<Shared<MethodInfo>>>,
}

impl ClassInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            ..Default::default()
        }
    }

    pub fn with_member(mut self, mut member: MemberInfo) -> Self {
        member.declaring_type = self.name.clone();
        self.members
            .insert(member.name.clone(), Shared::new(member));
        self
    }

    pub fn with_method(mut self, mut method: MethodInfo) -> Self {
        method.declaring_type = self.name.clone();
        self.methods
            .entry(method.name.clone())
            .or_default()
            .push(Shared::new(method));
        self
    }

    pub fn member(&self, name: &str) -> Option<Shared<MemberInfo>> {
        self.members.get(name).map(Shared::clone)
    }

    /// Returns the first method declared under `name`.
    pub fn method(&self, name: &str) -> Option<Shared<MethodInfo>> {
        self.methods
            .get(name)
            .and_then(|overloads| overloads.first())
            .map(Shared::clone)
    }

    pub fn overloads(&self, name: &str) -> &[Shared<MethodInfo>] {
        self.methods.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn members(&self) -> impl Iterator<Item = &Shared<MemberInfo>> {
        self.members.values()
    }
}

/// Registry of the classes visible to the builder.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    classes: FxHashMap<SmolStr, ClassInfo>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_class(&mut self, class: ClassInfo) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn with_class(mut self, class: ClassInfo) -> Self {
        self.register_class(class);
        self
    }

    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn member(&self, class: &str, name: &str) -> Option<Shared<MemberInfo>> {
        self.class(class).and_then(|class| class.member(name))
    }

    pub fn method(&self, class: &str, name: &str) -> Option<Shared<MethodInfo>> {
        self.class(class).and_then(|class| class.method(name))
    }

    /// Looks up a static unary operator method named `name` on the class of `ty`.
    ///
    /// Nullable operands are looked up through their wrapped type.
    pub fn find_operator(&self, ty: &Type, name: &str) -> Option<Shared<MethodInfo>> {
        let operand = ty.non_nullable();
        let Type::Class(class_name) = operand else {
            return None;
        };

        self.class(class_name)?
            .overloads(name)
            .iter()
            .find(|method| {
                method.is_static
                    && method.params.len() == 1
                    && method.params[0].is_assignable_from(operand)
            })
            .map(Shared::clone)
    }

    /// Creates an instance of `class` with every instance field and property set
    /// to its default value.
    pub fn instantiate(&self, class: &str) -> Option<ObjectRef> {
        let info = self.class(class)?;
        let object = ObjectRef::new(class);

        info.members()
            .filter(|member| !member.is_static && !member.is_indexed())
            .for_each(|member| object.set(&member.name, Value::default_of(&member.ty)));

        Some(object)
    }
}
