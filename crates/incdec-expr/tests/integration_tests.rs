use std::cell::Cell;

use incdec_expr::{
    ArrayRef, AssignOpKind, BuildError, Builder, ClassInfo, Direction, Engine, Env, Error, Host, MemberInfo,
    MethodInfo, NoOpVisitor, Node, NumericKind, NumericKinds, ObjectRef, Options, RuntimeError, ShapeError, Shared,
    Type, TypeRegistry, Value, Variable, Visitor,
};
use rstest::{fixture, rstest};
use rust_decimal::Decimal;

fn silly_method(_: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::from("Eggplant"))
}

fn get_string(_: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::from("string"))
}

fn reference_equals(args: &[Value]) -> Result<Value, RuntimeError> {
    Ok(Value::Bool(args[0] == args[1]))
}

fn halve(args: &[Value]) -> Result<Value, RuntimeError> {
    match &args[0] {
        Value::Object(object) => {
            let halved = ObjectRef::new(&object.class());
            if let Some(Value::Int64(cents)) = object.get("Cents") {
                halved.set("Cents", cents / 2);
            }
            Ok(Value::Object(halved))
        }
        other => Err(RuntimeError::Method {
            method: "op_Decrement".into(),
            message: format!("unexpected {}", other),
        }),
    }
}

thread_local! {
    static CALLS: Cell<usize> = const { Cell::new(0) };
}

fn counted_identity(args: &[Value]) -> Result<Value, RuntimeError> {
    CALLS.with(|calls| calls.set(calls.get() + 1));
    Ok(args[0].clone())
}

#[fixture]
fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .with_class(
            ClassInfo::new("IncDecAssignTests")
                .with_method(MethodInfo::new("SillyMethod", vec![Type::String], Type::String, silly_method))
                .with_method(MethodInfo::new("GetString", vec![Type::Int32], Type::String, get_string))
                .with_method(MethodInfo::new("CountedIdentity", vec![Type::Int32], Type::Int32, counted_identity)),
        )
        .with_class(ClassInfo::new("Object").with_method(MethodInfo::new(
            "ReferenceEquals",
            vec![Type::Object, Type::Object],
            Type::Bool,
            reference_equals,
        )))
        .with_class(
            ClassInfo::new("TestPropertyClass")
                .with_member(MemberInfo::property("TestInstance", Type::Int32))
                .with_member(MemberInfo::property("TestSingle", Type::Single))
                .with_member(MemberInfo::property("TestDouble", Type::Double))
                .with_member(MemberInfo::property("TestStatic", Type::Double).static_())
                .with_member(MemberInfo::property("Item", Type::Int64).indexed(vec![Type::Int32])),
        )
        .with_class(
            ClassInfo::new("Grid")
                .with_member(MemberInfo::property("Item", Type::Int32).indexed(vec![Type::class("Grid")])),
        )
        .with_class(
            ClassInfo::new("Pair")
                .with_member(MemberInfo::property("Item", Type::Int32).indexed(vec![Type::String, Type::String])),
        )
        .with_class(ClassInfo::new("Unreadable").with_member(
            MemberInfo::property("WriteOnly", Type::Int32).write_only().static_(),
        ))
        .with_class(
            ClassInfo::new("Money")
                .with_member(MemberInfo::field("Cents", Type::Int64))
                .with_method(MethodInfo::new(
                    "op_Decrement",
                    vec![Type::class("Money")],
                    Type::class("Money"),
                    halve,
                )),
        )
}

fn engine(use_compiler: bool) -> Engine {
    Engine::new(Options { use_compiler })
}

fn method(registry: &TypeRegistry, class: &str, name: &str) -> Shared<MethodInfo> {
    registry.method(class, name).unwrap()
}

fn build(builder: &Builder<'_>, kind: AssignOpKind, operand: Node) -> Node {
    builder.assign_op(kind, operand, None).unwrap()
}

#[rstest]
#[case(Type::Int16, Value::Int16(1), Value::Int16(0))]
#[case(Type::Int16, Value::Int16(-1), Value::Int16(-2))]
#[case(Type::Int16, Value::Int16(i16::MAX), Value::Int16(i16::MAX - 1))]
#[case(Type::UInt16, Value::UInt16(1), Value::UInt16(0))]
#[case(Type::UInt16, Value::UInt16(u16::MAX), Value::UInt16(u16::MAX - 1))]
#[case(Type::Int32, Value::Int32(0), Value::Int32(-1))]
#[case(Type::Int32, Value::Int32(i32::MAX), Value::Int32(i32::MAX - 1))]
#[case(Type::UInt32, Value::UInt32(1), Value::UInt32(0))]
#[case(Type::Int64, Value::Int64(i64::MAX), Value::Int64(i64::MAX - 1))]
#[case(Type::UInt64, Value::UInt64(u64::MAX), Value::UInt64(u64::MAX - 1))]
#[case(Type::Decimal, Value::Decimal(Decimal::ONE), Value::Decimal(Decimal::ZERO))]
#[case(Type::Decimal, Value::Decimal(Decimal::MAX), Value::Decimal(Decimal::MAX - Decimal::ONE))]
#[case(Type::Single, Value::Single(0.5), Value::Single(-0.5))]
#[case(Type::Single, Value::Single(f32::NEG_INFINITY), Value::Single(f32::NEG_INFINITY))]
#[case(Type::Double, Value::Double(1.0), Value::Double(0.0))]
#[case(Type::Double, Value::Double(f64::MIN), Value::Double(f64::MIN))]
#[case(Type::nullable(Type::Int32), Value::Int32(3), Value::Int32(2))]
#[case(Type::nullable(Type::Int32), Value::Null, Value::Null)]
#[case(Type::nullable(Type::UInt64), Value::UInt64(1), Value::UInt64(0))]
#[case(Type::nullable(Type::Decimal), Value::Null, Value::Null)]
#[case(Type::nullable(Type::Double), Value::Null, Value::Null)]
fn test_decrement_returns_and_assigns(
    registry: TypeRegistry,
    #[case] ty: Type,
    #[case] value: Value,
    #[case] decremented: Value,
    #[values(false, true)] use_compiler: bool,
) {
    let builder = Builder::new(&registry);

    for (kind, expected) in [
        (AssignOpKind::PostDecrement, value.clone()),
        (AssignOpKind::PreDecrement, decremented.clone()),
    ] {
        let variable = builder.variable(ty.clone());
        let node = build(&builder, kind, variable.clone());
        let mut env = Env::new();
        env.define(variable.as_variable().unwrap(), value.clone()).unwrap();

        assert_eq!(engine(use_compiler).eval(&node, &mut env), Ok(expected), "{}", kind);
        assert_eq!(env.get(variable.as_variable().unwrap()), Some(&decremented), "{}", kind);
    }
}

#[rstest]
#[case(Type::Int8, Value::Int8(-1), Value::Int8(0))]
#[case(Type::UInt8, Value::UInt8(0), Value::UInt8(1))]
#[case(Type::Int32, Value::Int32(i32::MIN), Value::Int32(i32::MIN + 1))]
#[case(Type::UInt32, Value::UInt32(0), Value::UInt32(1))]
#[case(Type::Int64, Value::Int64(-1), Value::Int64(0))]
#[case(Type::Decimal, Value::Decimal(Decimal::new(-5, 1)), Value::Decimal(Decimal::new(5, 1)))]
#[case(Type::Double, Value::Double(f64::INFINITY), Value::Double(f64::INFINITY))]
#[case(Type::nullable(Type::Int16), Value::Int16(9), Value::Int16(10))]
#[case(Type::nullable(Type::Single), Value::Null, Value::Null)]
fn test_increment_returns_and_assigns(
    registry: TypeRegistry,
    #[case] ty: Type,
    #[case] value: Value,
    #[case] incremented: Value,
    #[values(false, true)] use_compiler: bool,
) {
    let builder = Builder::new(&registry);

    for (kind, expected) in [
        (AssignOpKind::PostIncrement, value.clone()),
        (AssignOpKind::PreIncrement, incremented.clone()),
    ] {
        let variable = builder.variable(ty.clone());
        let node = build(&builder, kind, variable.clone());
        let mut env = Env::new();
        env.define(variable.as_variable().unwrap(), value.clone()).unwrap();

        assert_eq!(engine(use_compiler).eval(&node, &mut env), Ok(expected), "{}", kind);
        assert_eq!(env.get(variable.as_variable().unwrap()), Some(&incremented), "{}", kind);
    }
}

#[rstest]
#[case("TestSingle", Value::Single(f32::NAN))]
#[case("TestDouble", Value::Double(f64::NAN))]
fn test_nan_to_nan(
    registry: TypeRegistry,
    #[case] property: &str,
    #[case] nan: Value,
    #[values(AssignOpKind::PreIncrement, AssignOpKind::PostDecrement)] kind: AssignOpKind,
    #[values(false, true)] use_compiler: bool,
) {
    let builder = Builder::new(&registry);
    let instance = registry.instantiate("TestPropertyClass").unwrap();
    instance.set(property, nan);

    let target = builder.constant(instance.clone(), Type::class("TestPropertyClass")).unwrap();
    let node = build(
        &builder,
        kind,
        builder.property(target, "TestPropertyClass", property).unwrap(),
    );

    let is_nan = |value: &Value| match value {
        Value::Single(v) => v.is_nan(),
        Value::Double(v) => v.is_nan(),
        _ => false,
    };

    let result = engine(use_compiler).eval(&node, &mut Env::new()).unwrap();
    assert!(is_nan(&result));
    assert!(is_nan(&instance.get(property).unwrap()));
}

#[rstest]
#[case(Value::Int8(i8::MIN), NumericKind::Int8)]
#[case(Value::UInt8(u8::MIN), NumericKind::UInt8)]
#[case(Value::Int16(i16::MIN), NumericKind::Int16)]
#[case(Value::UInt16(u16::MIN), NumericKind::UInt16)]
#[case(Value::Int32(i32::MIN), NumericKind::Int32)]
#[case(Value::UInt32(u32::MIN), NumericKind::UInt32)]
#[case(Value::Int64(i64::MIN), NumericKind::Int64)]
#[case(Value::UInt64(u64::MIN), NumericKind::UInt64)]
#[case(Value::Decimal(Decimal::MIN), NumericKind::Decimal)]
fn test_overflowing_values_throw(
    registry: TypeRegistry,
    #[case] value: Value,
    #[case] numeric: NumericKind,
    #[values(AssignOpKind::PreDecrement, AssignOpKind::PostDecrement)] kind: AssignOpKind,
    #[values(false, true)] use_compiler: bool,
) {
    let builder = Builder::new(&registry);
    let variable = builder.variable(numeric.ty());
    let node = build(&builder, kind, variable.clone());
    let mut env = Env::new();
    env.define(variable.as_variable().unwrap(), value.clone()).unwrap();

    let err = engine(use_compiler).eval(&node, &mut env).unwrap_err();
    assert_eq!(
        err,
        Error::Runtime(RuntimeError::Overflow {
            kind: numeric,
            direction: Direction::Decrement
        })
    );
    assert_eq!(env.get(variable.as_variable().unwrap()), Some(&value));
}

#[rstest]
#[case(Type::Bool)]
#[case(Type::String)]
#[case(Type::Object)]
#[case(Type::nullable(Type::Bool))]
#[case(Type::class("TestPropertyClass"))]
#[case(Type::array(Type::Int32))]
fn test_invalid_operand_type(registry: TypeRegistry, #[case] ty: Type) {
    let builder = Builder::new(&registry);
    assert_eq!(
        builder.post_decrement_assign(builder.variable(ty.clone())),
        Err(BuildError::Unsupported {
            kind: AssignOpKind::PostDecrement,
            ty
        })
    );
}

#[rstest]
fn test_eight_bit_kinds_can_be_excluded(registry: TypeRegistry) {
    let builder = Builder::new(&registry).with_numeric_kinds(NumericKinds::clr());
    for ty in [Type::Int8, Type::UInt8, Type::nullable(Type::Int8)] {
        assert!(matches!(
            builder.post_decrement_assign(builder.variable(ty)),
            Err(BuildError::Unsupported { .. })
        ));
    }
}

#[rstest]
fn test_method_correct_result_and_assign(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let silly = method(&registry, "IncDecAssignTests", "SillyMethod");

    let variable = builder.variable(Type::String);
    let node = builder.post_decrement_assign_with(variable.clone(), silly).unwrap();
    let mut env = Env::new();
    env.define(variable.as_variable().unwrap(), "hello").unwrap();

    assert_eq!(engine(use_compiler).eval(&node, &mut env), Ok(Value::from("hello")));
    assert_eq!(env.get(variable.as_variable().unwrap()), Some(&Value::from("Eggplant")));
}

#[rstest]
fn test_incorrect_method_type(registry: TypeRegistry) {
    let builder = Builder::new(&registry);
    let silly = method(&registry, "IncDecAssignTests", "SillyMethod");
    let err = builder
        .post_decrement_assign_with(builder.variable(Type::Int32), silly)
        .unwrap_err();

    assert_eq!(
        err,
        BuildError::InvalidShape {
            param: "method",
            reason: ShapeError::OperandMismatch {
                kind: AssignOpKind::PostDecrement,
                method: "IncDecAssignTests.SillyMethod".into(),
            },
        }
    );
}

#[rstest]
fn test_incorrect_method_parameter_count(registry: TypeRegistry) {
    let builder = Builder::new(&registry);
    let reference_equals = method(&registry, "Object", "ReferenceEquals");
    let err = builder
        .post_decrement_assign_with(builder.variable(Type::String), reference_equals)
        .unwrap_err();

    assert!(matches!(
        err,
        BuildError::InvalidShape {
            reason: ShapeError::ParameterCount { expected: 1, found: 2, .. },
            ..
        }
    ));
}

#[rstest]
fn test_incorrect_method_return_type(registry: TypeRegistry) {
    let builder = Builder::new(&registry);
    let get_string = method(&registry, "IncDecAssignTests", "GetString");
    let err = builder
        .post_decrement_assign_with(builder.variable(Type::Int32), get_string)
        .unwrap_err();

    assert!(matches!(
        err,
        BuildError::InvalidShape {
            param: "method",
            reason: ShapeError::ReturnType { .. }
        }
    ));
}

#[rstest]
fn test_static_member_access(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let member = registry.member("TestPropertyClass", "TestStatic").unwrap();
    let node = builder
        .post_decrement_assign(builder.static_property("TestPropertyClass", "TestStatic").unwrap())
        .unwrap();

    let mut env = Env::new();
    env.set_static(&member, 2.0);

    assert_eq!(engine(use_compiler).eval(&node, &mut env), Ok(Value::Double(2.0)));
    assert_eq!(env.get_static(&member), Some(&Value::Double(1.0)));
}

#[rstest]
fn test_instance_member_access(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let instance = registry.instantiate("TestPropertyClass").unwrap();
    instance.set("TestInstance", 2);

    let target = builder.constant(instance.clone(), Type::class("TestPropertyClass")).unwrap();
    let node = builder
        .post_decrement_assign(builder.property(target, "TestPropertyClass", "TestInstance").unwrap())
        .unwrap();

    assert_eq!(engine(use_compiler).eval(&node, &mut Env::new()), Ok(Value::Int32(2)));
    assert_eq!(instance.get("TestInstance"), Some(Value::Int32(1)));
}

#[rstest]
fn test_array_access(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let array = ArrayRef::new(Type::Int32, vec![Value::Int32(2)]);
    let element = builder
        .array_index(
            builder.constant(array.clone(), Type::array(Type::Int32)).unwrap(),
            builder.constant(0, Type::Int32).unwrap(),
        )
        .unwrap();
    let node = builder.post_decrement_assign(element).unwrap();

    assert_eq!(engine(use_compiler).eval(&node, &mut Env::new()), Ok(Value::Int32(2)));
    assert_eq!(array.get(0), Some(Value::Int32(1)));
}

#[rstest]
fn test_array_index_out_of_bounds(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let array = ArrayRef::with_len(Type::Int32, 1);
    let element = builder
        .array_index(
            builder.constant(array, Type::array(Type::Int32)).unwrap(),
            builder.constant(1, Type::Int32).unwrap(),
        )
        .unwrap();
    let node = builder.pre_increment_assign(element).unwrap();

    assert_eq!(
        engine(use_compiler).eval(&node, &mut Env::new()),
        Err(Error::Runtime(RuntimeError::IndexOutOfBounds { index: 1, len: 1 }))
    );
}

#[rstest]
fn test_indexed_property_access(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let instance = registry.instantiate("TestPropertyClass").unwrap();
    instance.set_indexed("Item", &[Value::Int32(3)], 40i64);

    let target = builder.constant(instance.clone(), Type::class("TestPropertyClass")).unwrap();
    let index = builder.constant(3, Type::Int32).unwrap();
    let item = builder
        .indexed_property(target, "TestPropertyClass", "Item", vec![index])
        .unwrap();
    let node = builder.pre_increment_assign(item).unwrap();

    assert_eq!(engine(use_compiler).eval(&node, &mut Env::new()), Ok(Value::Int64(41)));
    assert_eq!(instance.get_indexed("Item", &[Value::Int32(3)]), Some(Value::Int64(41)));
}

/// Builds `++target[args]` over the `Item` indexer of `class`.
fn increment_item(builder: &Builder<'_>, target: &ObjectRef, class: &str, args: &[Value]) -> Node {
    let target = builder.constant(target.clone(), Type::class(class)).unwrap();
    let args = args
        .iter()
        .map(|arg| builder.constant(arg.clone(), arg.ty()).unwrap())
        .collect();
    let item = builder.indexed_property(target, class, "Item", args).unwrap();
    builder.pre_increment_assign(item).unwrap()
}

#[rstest]
fn test_indexed_property_self_argument(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let grid = registry.instantiate("Grid").unwrap();
    let target = builder.constant(grid.clone(), Type::class("Grid")).unwrap();

    // grid[grid]++
    let item = builder
        .indexed_property(target.clone(), "Grid", "Item", vec![target])
        .unwrap();
    let node = builder.post_increment_assign(item).unwrap();

    assert_eq!(engine(use_compiler).eval(&node, &mut Env::new()), Ok(Value::Int32(0)));
    assert_eq!(engine(use_compiler).eval(&node, &mut Env::new()), Ok(Value::Int32(1)));
    assert_eq!(
        grid.get_indexed("Item", &[Value::Object(grid.clone())]),
        Some(Value::Int32(2))
    );
}

#[rstest]
fn test_indexed_property_object_arguments_are_distinct(
    registry: TypeRegistry,
    #[values(false, true)] use_compiler: bool,
) {
    let builder = Builder::new(&registry);
    let grid = registry.instantiate("Grid").unwrap();
    let a = Value::Object(registry.instantiate("Grid").unwrap());
    let b = Value::Object(registry.instantiate("Grid").unwrap());

    let mut env = Env::new();
    let first = increment_item(&builder, &grid, "Grid", std::slice::from_ref(&a));
    let second = increment_item(&builder, &grid, "Grid", std::slice::from_ref(&b));

    assert_eq!(engine(use_compiler).eval(&first, &mut env), Ok(Value::Int32(1)));
    assert_eq!(engine(use_compiler).eval(&second, &mut env), Ok(Value::Int32(1)));
    assert_eq!(engine(use_compiler).eval(&first, &mut env), Ok(Value::Int32(2)));
    assert_eq!(grid.get_indexed("Item", &[a]), Some(Value::Int32(2)));
    assert_eq!(grid.get_indexed("Item", &[b]), Some(Value::Int32(1)));
}

#[rstest]
#[case::separators_in_first(["a,String:b", "c"], ["a", "b,String:c"])]
#[case::swapped(["x", "y"], ["y", "x"])]
#[case::empty_strings(["", ","], [",", ""])]
fn test_indexed_property_multiple_arguments(
    registry: TypeRegistry,
    #[case] first: [&str; 2],
    #[case] second: [&str; 2],
    #[values(false, true)] use_compiler: bool,
) {
    let builder = Builder::new(&registry);
    let pair = registry.instantiate("Pair").unwrap();
    let first = first.map(Value::from);
    let second = second.map(Value::from);

    let mut env = Env::new();
    let increment_first = increment_item(&builder, &pair, "Pair", &first);
    let increment_second = increment_item(&builder, &pair, "Pair", &second);

    assert_eq!(engine(use_compiler).eval(&increment_first, &mut env), Ok(Value::Int32(1)));
    assert_eq!(engine(use_compiler).eval(&increment_second, &mut env), Ok(Value::Int32(1)));
    assert_eq!(engine(use_compiler).eval(&increment_first, &mut env), Ok(Value::Int32(2)));
    assert_eq!(pair.get_indexed("Item", &first), Some(Value::Int32(2)));
    assert_eq!(pair.get_indexed("Item", &second), Some(Value::Int32(1)));
}

#[rstest]
fn test_unreadable_root_rejected(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let write_only = builder.static_property("Unreadable", "WriteOnly").unwrap();

    assert_eq!(
        engine(use_compiler).eval(&write_only, &mut Env::new()),
        Err(Error::Build(BuildError::InvalidShape {
            param: "expression",
            reason: ShapeError::NotReadable
        }))
    );
}

#[rstest]
fn test_index_is_evaluated_once(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let array = ArrayRef::new(Type::Int32, vec![Value::Int32(10), Value::Int32(20)]);
    let i = builder.named_variable("i", Type::Int32);

    // array[i++]--
    let index = builder.post_increment_assign(i.clone()).unwrap();
    let element = builder
        .array_index(builder.constant(array.clone(), Type::array(Type::Int32)).unwrap(), index)
        .unwrap();
    let node = builder.post_decrement_assign(element).unwrap();

    let mut env = Env::new();
    env.define(i.as_variable().unwrap(), 0).unwrap();

    assert_eq!(engine(use_compiler).eval(&node, &mut env), Ok(Value::Int32(10)));
    assert_eq!(env.get(i.as_variable().unwrap()), Some(&Value::Int32(1)));
    assert_eq!(array.get(0), Some(Value::Int32(9)));
    assert_eq!(array.get(1), Some(Value::Int32(20)));
}

/// Host that counts variable accesses.
#[derive(Default)]
struct CountingHost {
    env: Env,
    reads: Cell<usize>,
    writes: usize,
}

impl Host for CountingHost {
    fn read_variable(&self, variable: &Variable) -> Result<Value, RuntimeError> {
        self.reads.set(self.reads.get() + 1);
        self.env.read_variable(variable)
    }

    fn write_variable(&mut self, variable: &Variable, value: Value) -> Result<(), RuntimeError> {
        self.writes += 1;
        self.env.write_variable(variable, value)
    }

    fn read_static(&self, member: &MemberInfo) -> Result<Value, RuntimeError> {
        self.env.read_static(member)
    }

    fn write_static(&mut self, member: &MemberInfo, value: Value) -> Result<(), RuntimeError> {
        self.env.write_static(member, value)
    }
}

#[rstest]
#[case(Value::Int32(5), 1)]
#[case(Value::Int32(i32::MIN), 0)]
fn test_single_read_and_write(
    registry: TypeRegistry,
    #[case] value: Value,
    #[case] writes: usize,
    #[values(false, true)] use_compiler: bool,
) {
    let builder = Builder::new(&registry);
    let variable = builder.variable(Type::Int32);
    let node = builder.pre_decrement_assign(variable.clone()).unwrap();

    let mut host = CountingHost::default();
    host.env.define(variable.as_variable().unwrap(), value).unwrap();

    let _ = engine(use_compiler).eval(&node, &mut host);
    assert_eq!(host.reads.get(), 1);
    assert_eq!(host.writes, writes);
}

#[rstest]
fn test_null_operand(registry: TypeRegistry) {
    let builder = Builder::new(&registry);
    let err = builder.post_decrement_assign(None::<Node>).unwrap_err();
    assert_eq!(err, BuildError::NullArgument("expression"));
    assert_eq!(err.param(), Some("expression"));
}

#[rstest]
fn test_unwritable_operand(registry: TypeRegistry) {
    let builder = Builder::new(&registry);
    let err = builder
        .post_decrement_assign(builder.constant(1, Type::Int32).unwrap())
        .unwrap_err();
    assert_eq!(err.param(), Some("expression"));
    assert!(matches!(
        err,
        BuildError::InvalidShape {
            reason: ShapeError::NotWritable,
            ..
        }
    ));
}

#[rstest]
fn test_unreadable_operand(registry: TypeRegistry) {
    let builder = Builder::new(&registry);
    let value = builder.static_property("Unreadable", "WriteOnly").unwrap();
    let err = builder.post_decrement_assign(value).unwrap_err();
    assert_eq!(err.param(), Some("expression"));
    assert!(matches!(
        err,
        BuildError::InvalidShape {
            reason: ShapeError::NotReadable,
            ..
        }
    ));
}

#[rstest]
fn test_update_same_operand_same_node(registry: TypeRegistry) {
    let builder = Builder::new(&registry);
    let op = builder.post_decrement_assign(builder.variable(Type::Int32)).unwrap();
    let operand = op.as_assign_op().unwrap().operand().clone();

    assert!(op.update_operand(operand).unwrap().ptr_eq(&op));
    assert!(NoOpVisitor.visit(&op).unwrap().ptr_eq(&op));
}

#[rstest]
fn test_update_diff_operand_diff_node(registry: TypeRegistry) {
    let builder = Builder::new(&registry);
    let op = builder.post_decrement_assign(builder.variable(Type::Int32)).unwrap();
    let updated = op.update_operand(builder.variable(Type::Int32)).unwrap();

    assert!(!updated.ptr_eq(&op));
    assert_ne!(updated, op);
}

#[rstest]
fn test_operator_method_lookup(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let wallet = registry.instantiate("Money").unwrap();
    wallet.set("Cents", 100i64);

    let variable = builder.variable(Type::class("Money"));
    let node = builder.pre_decrement_assign(variable.clone()).unwrap();
    let mut env = Env::new();
    env.define(variable.as_variable().unwrap(), wallet.clone()).unwrap();

    let result = engine(use_compiler).eval(&node, &mut env).unwrap();
    let Value::Object(halved) = result else {
        panic!("expected an object");
    };
    assert_ne!(halved, wallet);
    assert_eq!(halved.get("Cents"), Some(Value::Int64(50)));
    assert_eq!(env.get(variable.as_variable().unwrap()), Some(&Value::Object(halved)));
}

#[rstest]
fn test_lifted_method_skips_null(registry: TypeRegistry, #[values(false, true)] use_compiler: bool) {
    let builder = Builder::new(&registry);
    let identity = method(&registry, "IncDecAssignTests", "CountedIdentity");
    let variable = builder.variable(Type::nullable(Type::Int32));
    let node = builder.pre_increment_assign_with(variable.clone(), identity).unwrap();

    let mut env = Env::new();
    env.define(variable.as_variable().unwrap(), Value::Null).unwrap();
    CALLS.with(|calls| calls.set(0));

    assert_eq!(engine(use_compiler).eval(&node, &mut env), Ok(Value::Null));
    assert_eq!(CALLS.with(Cell::get), 0);

    env.define(variable.as_variable().unwrap(), 7).unwrap();
    assert_eq!(engine(use_compiler).eval(&node, &mut env), Ok(Value::Int32(7)));
    assert_eq!(CALLS.with(Cell::get), 1);
}
