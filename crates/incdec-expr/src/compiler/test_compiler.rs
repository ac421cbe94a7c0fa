//! Equivalence tests between the compiler and the tree walker.

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        Builder, Engine, Env, Error, Node, Options, RuntimeError, Type, TypeRegistry, Value,
        ast::node::AssignOpKind,
        reflect::{ClassInfo, MemberInfo, MethodInfo},
    };

    const KINDS: [AssignOpKind; 4] = [
        AssignOpKind::PreIncrement,
        AssignOpKind::PreDecrement,
        AssignOpKind::PostIncrement,
        AssignOpKind::PostDecrement,
    ];

    fn shout(args: &[Value]) -> Result<Value, RuntimeError> {
        match &args[0] {
            Value::String(s) => Ok(Value::from(format!("{}!", s))),
            other => Err(RuntimeError::type_mismatch(Type::String, other)),
        }
    }

    fn fail(_: &[Value]) -> Result<Value, RuntimeError> {
        Err(RuntimeError::Method {
            method: "Fail".into(),
            message: "refused".to_string(),
        })
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::new().with_class(
            ClassInfo::new("Holder")
                .with_member(MemberInfo::property("Value", Type::Int32))
                .with_member(MemberInfo::field("Ratio", Type::Single))
                .with_member(MemberInfo::property("Shared", Type::nullable(Type::Int16)).static_())
                .with_member(MemberInfo::property("Item", Type::Decimal).indexed(vec![Type::String]))
                .with_method(MethodInfo::new("Shout", vec![Type::String], Type::String, shout))
                .with_method(MethodInfo::new("Fail", vec![Type::Int32], Type::Int32, fail)),
        )
    }

    /// Defines a fresh variable of `ty` holding `value`.
    fn variable_operand(builder: &Builder<'_>, env: &mut Env, ty: Type, value: Value) -> Node {
        let variable = builder.variable(ty);
        env.define(variable.as_variable().unwrap(), value).unwrap();
        variable
    }

    fn run(
        use_compiler: bool,
        kind: AssignOpKind,
        ty: &Type,
        value: &Value,
        method: Option<&str>,
    ) -> (Result<Value, Error>, Option<Value>) {
        let registry = registry();
        let builder = Builder::new(&registry);
        let mut env = Env::new();
        let operand = variable_operand(&builder, &mut env, ty.clone(), value.clone());
        let method = method.and_then(|name| registry.method("Holder", name));
        let node = builder.assign_op(kind, operand.clone(), method).unwrap();

        let result = Engine::new(Options { use_compiler }).eval(&node, &mut env);
        let stored = env.get(operand.as_variable().unwrap()).cloned();
        (result, stored)
    }

    #[test]
    fn test_comprehensive_compiler_tree_walker_equivalence() {
        let test_cases: Vec<(Type, Value, Option<&str>)> = vec![
            // Integers
            (Type::Int8, Value::Int8(0), None),
            (Type::Int8, Value::Int8(i8::MIN), None),
            (Type::UInt8, Value::UInt8(u8::MAX), None),
            (Type::Int16, Value::Int16(-3), None),
            (Type::UInt16, Value::UInt16(0), None),
            (Type::Int32, Value::Int32(i32::MAX), None),
            (Type::UInt32, Value::UInt32(7), None),
            (Type::Int64, Value::Int64(i64::MIN), None),
            (Type::UInt64, Value::UInt64(u64::MAX), None),
            // Floating point
            (Type::Single, Value::Single(f32::MAX), None),
            (Type::Double, Value::Double(-0.5), None),
            (Type::Double, Value::Double(f64::INFINITY), None),
            // Decimal
            (Type::Decimal, Value::Decimal(Decimal::new(-15, 1)), None),
            (Type::Decimal, Value::Decimal(Decimal::MAX), None),
            // Nullable
            (Type::nullable(Type::Int32), Value::Null, None),
            (Type::nullable(Type::UInt64), Value::UInt64(0), None),
            (Type::nullable(Type::Decimal), Value::Null, None),
            // Methods
            (Type::String, Value::from("hi"), Some("Shout")),
            (Type::String, Value::Null, Some("Shout")),
            (Type::Int32, Value::Int32(1), Some("Fail")),
            (Type::nullable(Type::Int32), Value::Null, Some("Fail")),
        ];

        for (ty, value, method) in test_cases {
            for kind in KINDS {
                let (result_tw, stored_tw) = run(false, kind, &ty, &value, method);
                let (result_comp, stored_comp) = run(true, kind, &ty, &value, method);

                assert_eq!(
                    result_tw, result_comp,
                    "result mismatch for {} {} over {:?}",
                    kind, ty, value
                );
                assert_eq!(
                    stored_tw, stored_comp,
                    "location mismatch for {} {} over {:?}",
                    kind, ty, value
                );
            }
        }
    }

    #[test]
    fn test_location_equivalence() {
        let registry = registry();
        let builder = Builder::new(&registry);

        for use_compiler in [false, true] {
            let engine = Engine::new(Options { use_compiler });
            let mut env = Env::new();
            let holder = registry.instantiate("Holder").unwrap();
            holder.set("Value", 10);
            holder.set("Ratio", 0.25f32);
            let target = builder.constant(holder.clone(), Type::class("Holder")).unwrap();

            let value = builder.property(target.clone(), "Holder", "Value").unwrap();
            let ratio = builder.field(target.clone(), "Holder", "Ratio").unwrap();
            let shared = builder.static_property("Holder", "Shared").unwrap();
            let item = builder
                .indexed_property(
                    target,
                    "Holder",
                    "Item",
                    vec![builder.constant("k", Type::String).unwrap()],
                )
                .unwrap();

            let cases = [
                (builder.post_decrement_assign(value).unwrap(), Value::Int32(10)),
                (builder.pre_increment_assign(ratio).unwrap(), Value::Single(1.25)),
                (builder.post_increment_assign(shared).unwrap(), Value::Null),
                (builder.pre_decrement_assign(item).unwrap(), Value::Decimal(Decimal::NEGATIVE_ONE)),
            ];

            for (node, expected) in cases {
                assert_eq!(
                    engine.eval(&node, &mut env),
                    Ok(expected),
                    "use_compiler = {}",
                    use_compiler
                );
            }

            assert_eq!(holder.get("Value"), Some(Value::Int32(9)));
            assert_eq!(holder.get("Ratio"), Some(Value::Single(1.25)));
            assert_eq!(
                holder.get_indexed("Item", &[Value::from("k")]),
                Some(Value::Decimal(Decimal::NEGATIVE_ONE))
            );
        }
    }
}
