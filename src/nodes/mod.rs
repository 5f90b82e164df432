//! The built-in node library, registered by [`NodeRegistry::builder`](crate::schema::NodeRegistry::builder).

use crate::declare_ports;
use crate::graph::EvalContext;
use crate::node::NodeLogic;
use crate::port::NodePort;
use crate::schema::{FieldDeclaration, NodeKind, NodeRegistryBuilder, NodeTypeDefinition};
use crate::value::{FromValue, Value, ValueType};

/// Outputs a fixed number.
#[derive(Debug, Clone, Default)]
pub struct ConstantNode {
    pub value: f32,
}

impl NodeLogic for ConstantNode {
    fn value(&self, _ctx: &EvalContext<'_>, _port: &NodePort) -> Value {
        Value::Float(self.value)
    }

    fn field(&self, name: &str) -> Option<Value> {
        (name == "value").then_some(Value::Float(self.value))
    }

    fn set_field(&mut self, name: &str, value: Value) -> bool {
        match (name, f32::from_value(&value.coerce(ValueType::Float))) {
            ("value", Some(v)) => {
                self.value = v;
                true
            }
            _ => false,
        }
    }
}

impl NodeKind for ConstantNode {
    const TYPE_NAME: &'static str = "Constant";

    fn fields() -> Vec<FieldDeclaration> {
        declare_ports! {
            output value: Float,
        }
    }
}

/// Adds up every float connected to `inputs`.
#[derive(Debug, Clone, Default)]
pub struct SumNode;

impl NodeLogic for SumNode {
    fn value(&self, ctx: &EvalContext<'_>, _port: &NodePort) -> Value {
        Value::Float(ctx.input_sum("inputs", 0.0f32))
    }
}

impl NodeKind for SumNode {
    const TYPE_NAME: &'static str = "Sum";

    fn fields() -> Vec<FieldDeclaration> {
        declare_ports! {
            input inputs: Float,
            output sum: Float,
        }
    }
}

/// A sink that shows whatever is connected to it.
#[derive(Debug, Clone, Default)]
pub struct DisplayNode {
    pub label: String,
}

impl NodeLogic for DisplayNode {
    fn field(&self, name: &str) -> Option<Value> {
        (name == "label").then(|| Value::Text(self.label.clone()))
    }

    fn set_field(&mut self, name: &str, value: Value) -> bool {
        match (name, value) {
            ("label", Value::Text(label)) => {
                self.label = label;
                true
            }
            _ => false,
        }
    }
}

impl NodeKind for DisplayNode {
    const TYPE_NAME: &'static str = "Display";

    fn fields() -> Vec<FieldDeclaration> {
        declare_ports! {
            input input: Any (Override),
            field label: Text,
        }
    }
}

/// Defines a two-operand float node per entry, plus the registration of the
/// whole built-in library.
///
/// Each operand falls back to the node's own field value when its port is
/// not connected.
macro_rules! define_binary_nodes {
    ( $( ($struct_name:ident, $type_name:expr, |$a:ident, $b:ident| $body:expr) ),* $(,)? ) => {
        $(
            #[derive(Debug, Clone, Default)]
            pub struct $struct_name {
                pub a: f32,
                pub b: f32,
            }

            impl NodeLogic for $struct_name {
                fn value(&self, ctx: &EvalContext<'_>, port: &NodePort) -> Value {
                    if port.field_name() != "result" {
                        return Value::Null;
                    }
                    let $a = ctx.input_or("a", self.a);
                    let $b = ctx.input_or("b", self.b);
                    Value::Float($body)
                }

                fn field(&self, name: &str) -> Option<Value> {
                    match name {
                        "a" => Some(Value::Float(self.a)),
                        "b" => Some(Value::Float(self.b)),
                        _ => None,
                    }
                }

                fn set_field(&mut self, name: &str, value: Value) -> bool {
                    let Some(v) = f32::from_value(&value.coerce(ValueType::Float)) else {
                        return false;
                    };
                    match name {
                        "a" => self.a = v,
                        "b" => self.b = v,
                        _ => return false,
                    }
                    true
                }
            }

            impl NodeKind for $struct_name {
                const TYPE_NAME: &'static str = $type_name;

                fn fields() -> Vec<FieldDeclaration> {
                    declare_ports! {
                        input a: Float (Override),
                        input b: Float (Override),
                        output result: Float,
                    }
                }
            }
        )*

        pub(crate) fn register_builtin_nodes(builder: &mut NodeRegistryBuilder) {
            builder.insert(NodeTypeDefinition::of::<ConstantNode>());
            builder.insert(NodeTypeDefinition::of::<SumNode>());
            builder.insert(NodeTypeDefinition::of::<DisplayNode>());
            $( builder.insert(NodeTypeDefinition::of::<$struct_name>()); )*
        }
    };
}

define_binary_nodes! {
    (AddNode, "Add", |a, b| a + b),
    (SubtractNode, "Subtract", |a, b| a - b),
    (MultiplyNode, "Multiply", |a, b| a * b),
    (DivideNode, "Divide", |a, b| if b == 0.0 { 0.0 } else { a / b }),
}
