// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The AST contract consumed by the analyzer.
//!
//! The compiler that turns template source text into this AST lives outside
//! this crate; the types here define the closed set of node kinds it may
//! produce. Every node carries the source position assigned by that
//! compiler so usages and errors can be traced back to a file location.

use core::{cmp, fmt, ops::Deref};
use std::rc::Rc;

/// Line/column position of a node within its template source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub const fn new(line: u32, col: u32) -> Pos {
        Pos { line, col }
    }
}

/// Shared handle to an AST node.
///
/// Equality and ordering are pointer identity, so a `NodeRef` can be used as
/// an opaque key identifying one occurrence in the tree (two structurally
/// equal nodes at different positions compare unequal).
pub struct NodeRef {
    r: Rc<Node>,
}

impl NodeRef {
    pub fn new(node: Node) -> NodeRef {
        NodeRef { r: Rc::new(node) }
    }
}

impl Clone for NodeRef {
    fn clone(&self) -> Self {
        Self { r: self.r.clone() }
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.r.as_ref().fmt(f)
    }
}

impl cmp::PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::as_ptr(&self.r).eq(&Rc::as_ptr(&other.r))
    }
}

impl cmp::Eq for NodeRef {}

impl cmp::Ord for NodeRef {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        Rc::as_ptr(&self.r).cmp(&Rc::as_ptr(&other.r))
    }
}

impl cmp::PartialOrd for NodeRef {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Deref for NodeRef {
    type Target = Node;

    fn deref(&self) -> &Self::Target {
        &self.r
    }
}

impl AsRef<Node> for NodeRef {
    fn as_ref(&self) -> &Node {
        &self.r
    }
}

impl From<Node> for NodeRef {
    fn from(node: Node) -> NodeRef {
        NodeRef::new(node)
    }
}

/// One step in a data-reference access chain.
#[derive(Debug, Clone)]
pub enum Access {
    /// Named field access: `$a.b` or `$a['b']`.
    Key(String),
    /// Numeric index access: `$a.0` or `$a[5]`.
    Index(i64),
    /// Access through a computed key: `$a[$expr]`.
    Expr(NodeRef),
}

/// Binary operators. All of them consume their operands whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// One arm of an `{if}`/`{elseif}`/`{else}` chain. `cond` is `None` for the
/// trailing `{else}`.
#[derive(Debug, Clone)]
pub struct IfArm {
    pub cond: Option<NodeRef>,
    pub body: NodeRef,
}

/// One `{case ...}` of a switch. A case may list several candidate values.
#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub values: Vec<NodeRef>,
    pub body: NodeRef,
}

/// One `{case n}` of a plural block.
#[derive(Debug, Clone)]
pub struct PluralCase {
    pub count: i64,
    pub body: NodeRef,
}

/// A print directive: `{$x | directive:arg1,arg2}`.
#[derive(Debug, Clone)]
pub struct Directive {
    pub pos: Pos,
    pub name: String,
    pub args: Vec<NodeRef>,
}

/// How a template call forwards caller data to the callee.
#[derive(Debug, Clone)]
pub enum CallData {
    /// No data forwarding; only explicit parameters are passed.
    None,
    /// `data="all"`: the caller's whole parameter frame is forwarded.
    All,
    /// `data="$expr"`: the resolved sub-value's fields are forwarded.
    Expr(NodeRef),
}

/// An explicit call-site parameter.
#[derive(Debug, Clone)]
pub enum CallParam {
    /// `{param key: $expr /}`
    Value {
        pos: Pos,
        key: String,
        value: NodeRef,
    },
    /// `{param key}...content...{/param}`
    Content {
        pos: Pos,
        key: String,
        body: NodeRef,
    },
}

/// The closed set of AST node kinds.
#[derive(Debug)]
pub enum Node {
    /// Raw template text between commands.
    Text { pos: Pos, text: String },

    Str { pos: Pos, value: String },

    Int { pos: Pos, value: i64 },

    Float { pos: Pos, value: f64 },

    Bool { pos: Pos, value: bool },

    Null { pos: Pos },

    /// A dotted global identifier. Declared in the grammar but not
    /// analyzable; the walker rejects it.
    Global { pos: Pos, name: String },

    /// `$key.a.0[$expr]`: a parameter or variable read with an access chain.
    DataRef {
        pos: Pos,
        key: String,
        access: Vec<Access>,
    },

    Not { pos: Pos, arg: NodeRef },

    Neg { pos: Pos, arg: NodeRef },

    Binary {
        pos: Pos,
        op: BinaryOp,
        lhs: NodeRef,
        rhs: NodeRef,
    },

    /// `$a ?: $b`
    Elvis { pos: Pos, lhs: NodeRef, rhs: NodeRef },

    /// `$c ? $a : $b`
    Ternary {
        pos: Pos,
        cond: NodeRef,
        then: NodeRef,
        otherwise: NodeRef,
    },

    List { pos: Pos, items: Vec<NodeRef> },

    Map {
        pos: Pos,
        entries: Vec<(String, NodeRef)>,
    },

    FunctionCall {
        pos: Pos,
        name: String,
        args: Vec<NodeRef>,
    },

    /// A sequence of statements sharing one lexical block.
    Block { pos: Pos, nodes: Vec<NodeRef> },

    If { pos: Pos, arms: Vec<IfArm> },

    Switch {
        pos: Pos,
        value: NodeRef,
        cases: Vec<SwitchCase>,
        default: Option<NodeRef>,
    },

    /// `{foreach $var in $collection}...{ifempty}...{/foreach}`; ranged
    /// loops share this kind with `range(...)` as the collection.
    For {
        pos: Pos,
        var: String,
        collection: NodeRef,
        body: NodeRef,
        if_empty: Option<NodeRef>,
    },

    /// `{let $name: $expr /}`
    LetValue {
        pos: Pos,
        name: String,
        value: NodeRef,
    },

    /// `{let $name}...content...{/let}`
    LetContent {
        pos: Pos,
        name: String,
        body: NodeRef,
    },

    Print {
        pos: Pos,
        arg: NodeRef,
        directives: Vec<Directive>,
    },

    Call {
        pos: Pos,
        template: String,
        data: CallData,
        params: Vec<CallParam>,
    },

    /// Message container; transparent to usage analysis.
    Msg { pos: Pos, body: NodeRef },

    /// Message placeholder; transparent to usage analysis.
    Placeholder { pos: Pos, body: NodeRef },

    Plural {
        pos: Pos,
        value: NodeRef,
        cases: Vec<PluralCase>,
        default: Option<NodeRef>,
    },
}

impl Node {
    pub const fn pos(&self) -> Pos {
        match *self {
            Self::Text { pos, .. }
            | Self::Str { pos, .. }
            | Self::Int { pos, .. }
            | Self::Float { pos, .. }
            | Self::Bool { pos, .. }
            | Self::Null { pos }
            | Self::Global { pos, .. }
            | Self::DataRef { pos, .. }
            | Self::Not { pos, .. }
            | Self::Neg { pos, .. }
            | Self::Binary { pos, .. }
            | Self::Elvis { pos, .. }
            | Self::Ternary { pos, .. }
            | Self::List { pos, .. }
            | Self::Map { pos, .. }
            | Self::FunctionCall { pos, .. }
            | Self::Block { pos, .. }
            | Self::If { pos, .. }
            | Self::Switch { pos, .. }
            | Self::For { pos, .. }
            | Self::LetValue { pos, .. }
            | Self::LetContent { pos, .. }
            | Self::Print { pos, .. }
            | Self::Call { pos, .. }
            | Self::Msg { pos, .. }
            | Self::Placeholder { pos, .. }
            | Self::Plural { pos, .. } => pos,
        }
    }

    /// Short name of the node kind, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Str { .. } => "string",
            Self::Int { .. } => "int",
            Self::Float { .. } => "float",
            Self::Bool { .. } => "bool",
            Self::Null { .. } => "null",
            Self::Global { .. } => "global",
            Self::DataRef { .. } => "data-ref",
            Self::Not { .. } => "not",
            Self::Neg { .. } => "negate",
            Self::Binary { .. } => "binary",
            Self::Elvis { .. } => "elvis",
            Self::Ternary { .. } => "ternary",
            Self::List { .. } => "list",
            Self::Map { .. } => "map",
            Self::FunctionCall { .. } => "function-call",
            Self::Block { .. } => "block",
            Self::If { .. } => "if",
            Self::Switch { .. } => "switch",
            Self::For { .. } => "for",
            Self::LetValue { .. } => "let-value",
            Self::LetContent { .. } => "let-content",
            Self::Print { .. } => "print",
            Self::Call { .. } => "call",
            Self::Msg { .. } => "msg",
            Self::Placeholder { .. } => "placeholder",
            Self::Plural { .. } => "plural",
        }
    }

    /// Structural children, used for generic traversal of transparent
    /// container kinds.
    pub fn children(&self) -> Vec<NodeRef> {
        match self {
            Self::Text { .. }
            | Self::Str { .. }
            | Self::Int { .. }
            | Self::Float { .. }
            | Self::Bool { .. }
            | Self::Null { .. }
            | Self::Global { .. } => vec![],
            Self::DataRef { access, .. } => access
                .iter()
                .filter_map(|a| match a {
                    Access::Expr(e) => Some(e.clone()),
                    _ => None,
                })
                .collect(),
            Self::Not { arg, .. } | Self::Neg { arg, .. } => vec![arg.clone()],
            Self::Binary { lhs, rhs, .. } | Self::Elvis { lhs, rhs, .. } => {
                vec![lhs.clone(), rhs.clone()]
            }
            Self::Ternary {
                cond,
                then,
                otherwise,
                ..
            } => vec![cond.clone(), then.clone(), otherwise.clone()],
            Self::List { items, .. } => items.clone(),
            Self::Map { entries, .. } => entries.iter().map(|(_, v)| v.clone()).collect(),
            Self::FunctionCall { args, .. } => args.clone(),
            Self::Block { nodes, .. } => nodes.clone(),
            Self::If { arms, .. } => arms
                .iter()
                .flat_map(|arm| arm.cond.iter().cloned().chain([arm.body.clone()]))
                .collect(),
            Self::Switch {
                value,
                cases,
                default,
                ..
            } => [value.clone()]
                .into_iter()
                .chain(
                    cases
                        .iter()
                        .flat_map(|c| c.values.iter().cloned().chain([c.body.clone()])),
                )
                .chain(default.iter().cloned())
                .collect(),
            Self::For {
                collection,
                body,
                if_empty,
                ..
            } => [collection.clone(), body.clone()]
                .into_iter()
                .chain(if_empty.iter().cloned())
                .collect(),
            Self::LetValue { value, .. } => vec![value.clone()],
            Self::LetContent { body, .. } => vec![body.clone()],
            Self::Print {
                arg, directives, ..
            } => [arg.clone()]
                .into_iter()
                .chain(directives.iter().flat_map(|d| d.args.iter().cloned()))
                .collect(),
            Self::Call { data, params, .. } => {
                let mut out = vec![];
                if let CallData::Expr(e) = data {
                    out.push(e.clone());
                }
                for p in params {
                    match p {
                        CallParam::Value { value, .. } => out.push(value.clone()),
                        CallParam::Content { body, .. } => out.push(body.clone()),
                    }
                }
                out
            }
            Self::Msg { body, .. } | Self::Placeholder { body, .. } => vec![body.clone()],
            Self::Plural {
                value,
                cases,
                default,
                ..
            } => [value.clone()]
                .into_iter()
                .chain(cases.iter().map(|c| c.body.clone()))
                .chain(default.iter().cloned())
                .collect(),
        }
    }
}

/// Terse constructors for building ASTs programmatically.
///
/// A template compiler will normally construct [`Node`] values directly so
/// it can attach real positions; these helpers default every position and
/// exist for tests and embedders that generate templates in memory.
pub mod build {
    use super::*;

    pub fn text(t: &str) -> NodeRef {
        Node::Text {
            pos: Pos::default(),
            text: t.to_string(),
        }
        .into()
    }

    pub fn str_lit(v: &str) -> NodeRef {
        Node::Str {
            pos: Pos::default(),
            value: v.to_string(),
        }
        .into()
    }

    pub fn int_lit(v: i64) -> NodeRef {
        Node::Int {
            pos: Pos::default(),
            value: v,
        }
        .into()
    }

    pub fn bool_lit(v: bool) -> NodeRef {
        Node::Bool {
            pos: Pos::default(),
            value: v,
        }
        .into()
    }

    pub fn global(name: &str) -> NodeRef {
        Node::Global {
            pos: Pos::default(),
            name: name.to_string(),
        }
        .into()
    }

    pub fn var(key: &str) -> NodeRef {
        data_ref(key, [])
    }

    pub fn data_ref<A: IntoIterator<Item = Access>>(key: &str, access: A) -> NodeRef {
        Node::DataRef {
            pos: Pos::default(),
            key: key.to_string(),
            access: access.into_iter().collect(),
        }
        .into()
    }

    pub fn key(k: &str) -> Access {
        Access::Key(k.to_string())
    }

    pub fn index(i: i64) -> Access {
        Access::Index(i)
    }

    pub fn expr_key(e: NodeRef) -> Access {
        Access::Expr(e)
    }

    pub fn not(arg: NodeRef) -> NodeRef {
        Node::Not {
            pos: Pos::default(),
            arg,
        }
        .into()
    }

    pub fn binary(op: BinaryOp, lhs: NodeRef, rhs: NodeRef) -> NodeRef {
        Node::Binary {
            pos: Pos::default(),
            op,
            lhs,
            rhs,
        }
        .into()
    }

    pub fn add(lhs: NodeRef, rhs: NodeRef) -> NodeRef {
        binary(BinaryOp::Add, lhs, rhs)
    }

    pub fn elvis(lhs: NodeRef, rhs: NodeRef) -> NodeRef {
        Node::Elvis {
            pos: Pos::default(),
            lhs,
            rhs,
        }
        .into()
    }

    pub fn ternary(cond: NodeRef, then: NodeRef, otherwise: NodeRef) -> NodeRef {
        Node::Ternary {
            pos: Pos::default(),
            cond,
            then,
            otherwise,
        }
        .into()
    }

    pub fn list<I: IntoIterator<Item = NodeRef>>(items: I) -> NodeRef {
        Node::List {
            pos: Pos::default(),
            items: items.into_iter().collect(),
        }
        .into()
    }

    pub fn map<'a, I: IntoIterator<Item = (&'a str, NodeRef)>>(entries: I) -> NodeRef {
        Node::Map {
            pos: Pos::default(),
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        }
        .into()
    }

    pub fn function<I: IntoIterator<Item = NodeRef>>(name: &str, args: I) -> NodeRef {
        Node::FunctionCall {
            pos: Pos::default(),
            name: name.to_string(),
            args: args.into_iter().collect(),
        }
        .into()
    }

    pub fn block<I: IntoIterator<Item = NodeRef>>(nodes: I) -> NodeRef {
        Node::Block {
            pos: Pos::default(),
            nodes: nodes.into_iter().collect(),
        }
        .into()
    }

    pub fn if_node<I: IntoIterator<Item = IfArm>>(arms: I) -> NodeRef {
        Node::If {
            pos: Pos::default(),
            arms: arms.into_iter().collect(),
        }
        .into()
    }

    pub fn if_arm(cond: NodeRef, body: NodeRef) -> IfArm {
        IfArm {
            cond: Some(cond),
            body,
        }
    }

    pub fn else_arm(body: NodeRef) -> IfArm {
        IfArm { cond: None, body }
    }

    pub fn switch<I: IntoIterator<Item = SwitchCase>>(
        value: NodeRef,
        cases: I,
        default: Option<NodeRef>,
    ) -> NodeRef {
        Node::Switch {
            pos: Pos::default(),
            value,
            cases: cases.into_iter().collect(),
            default,
        }
        .into()
    }

    pub fn case<I: IntoIterator<Item = NodeRef>>(values: I, body: NodeRef) -> SwitchCase {
        SwitchCase {
            values: values.into_iter().collect(),
            body,
        }
    }

    pub fn for_loop(var: &str, collection: NodeRef, body: NodeRef) -> NodeRef {
        Node::For {
            pos: Pos::default(),
            var: var.to_string(),
            collection,
            body,
            if_empty: None,
        }
        .into()
    }

    pub fn let_value(name: &str, value: NodeRef) -> NodeRef {
        Node::LetValue {
            pos: Pos::default(),
            name: name.to_string(),
            value,
        }
        .into()
    }

    pub fn let_content(name: &str, body: NodeRef) -> NodeRef {
        Node::LetContent {
            pos: Pos::default(),
            name: name.to_string(),
            body,
        }
        .into()
    }

    pub fn print(arg: NodeRef) -> NodeRef {
        Node::Print {
            pos: Pos::default(),
            arg,
            directives: vec![],
        }
        .into()
    }

    pub fn print_directed<I: IntoIterator<Item = Directive>>(
        arg: NodeRef,
        directives: I,
    ) -> NodeRef {
        Node::Print {
            pos: Pos::default(),
            arg,
            directives: directives.into_iter().collect(),
        }
        .into()
    }

    pub fn directive<I: IntoIterator<Item = NodeRef>>(name: &str, args: I) -> Directive {
        Directive {
            pos: Pos::default(),
            name: name.to_string(),
            args: args.into_iter().collect(),
        }
    }

    pub fn call<I: IntoIterator<Item = CallParam>>(
        template: &str,
        data: CallData,
        params: I,
    ) -> NodeRef {
        Node::Call {
            pos: Pos::default(),
            template: template.to_string(),
            data,
            params: params.into_iter().collect(),
        }
        .into()
    }

    pub fn param_value(key: &str, value: NodeRef) -> CallParam {
        CallParam::Value {
            pos: Pos::default(),
            key: key.to_string(),
            value,
        }
    }

    pub fn param_content(key: &str, body: NodeRef) -> CallParam {
        CallParam::Content {
            pos: Pos::default(),
            key: key.to_string(),
            body,
        }
    }

    pub fn msg(body: NodeRef) -> NodeRef {
        Node::Msg {
            pos: Pos::default(),
            body,
        }
        .into()
    }

    pub fn placeholder(body: NodeRef) -> NodeRef {
        Node::Placeholder {
            pos: Pos::default(),
            body,
        }
        .into()
    }

    pub fn plural<I: IntoIterator<Item = PluralCase>>(
        value: NodeRef,
        cases: I,
        default: Option<NodeRef>,
    ) -> NodeRef {
        Node::Plural {
            pos: Pos::default(),
            value,
            cases: cases.into_iter().collect(),
            default,
        }
        .into()
    }

    pub fn plural_case(count: i64, body: NodeRef) -> PluralCase {
        PluralCase { count, body }
    }
}
