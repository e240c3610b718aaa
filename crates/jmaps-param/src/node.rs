//! The `JParam` tagged union: the node type of a parameter tree.

use crate::error::ParamError;
use indexmap::IndexMap;
use jmaps_core::{JValue, SqlType};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// When a [`Buffer`]/[`YBuffer`]/[`XBuffer`] clears its memoized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCondition {
    /// Never clear; the memo survives every `init_run`.
    Never,
    /// Clear on every `init_run`, regardless of depth.
    OnRun,
    /// Clear only when `init_run` is called with `is_root = true`.
    OnRunIfRoot,
}

/// A buffer's call function: takes the evaluated values of its bound
/// arguments (in declaration order, keyed by name) and returns the
/// computed output.
pub type BufferFn = Arc<dyn Fn(&IndexMap<String, JValue>) -> JValue + Send + Sync>;

/// Per-node bookkeeping: usage tracking and lock state. Embedded in
/// every [`JParam`] regardless of variant.
#[derive(Debug, Clone, Default)]
struct NodeState {
    used: bool,
    locked: bool,
}

/// Shared state for `Buffer`, `YBuffer`, and `XBuffer`: a memoized call
/// site over a set of bound argument nodes.
#[derive(Clone)]
pub struct BufferCore {
    /// Name used for function-identity tracking in the SQL projection
    /// (the `"var"` entry).
    pub var_name: String,
    args: IndexMap<String, JParam>,
    reset_condition: ResetCondition,
    #[allow(clippy::type_complexity)]
    func: BufferFn,
    memo: Option<JValue>,
}

impl fmt::Debug for BufferCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferCore")
            .field("var_name", &self.var_name)
            .field("args", &self.args)
            .field("reset_condition", &self.reset_condition)
            .field("memo", &self.memo)
            .finish()
    }
}

impl BufferCore {
    fn new(
        var_name: impl Into<String>,
        args: IndexMap<String, JParam>,
        reset_condition: ResetCondition,
        func: BufferFn,
    ) -> Self {
        Self {
            var_name: var_name.into(),
            args,
            reset_condition,
            func,
            memo: None,
        }
    }

    fn clear_if_due(&mut self, is_root: bool) {
        let fire = match self.reset_condition {
            ResetCondition::Never => false,
            ResetCondition::OnRun => true,
            ResetCondition::OnRunIfRoot => is_root,
        };
        if fire {
            self.memo = None;
        }
    }

    pub(crate) fn args_mut(&mut self) -> &mut IndexMap<String, JParam> {
        &mut self.args
    }

    /// Evaluate (or return the memoized) output, marking the consumed
    /// argument nodes as used in the process.
    pub(crate) fn evaluate(&mut self) -> JValue {
        if let Some(v) = &self.memo {
            return v.clone();
        }
        let mut evaluated = IndexMap::with_capacity(self.args.len());
        for (name, arg) in self.args.iter_mut() {
            evaluated.insert(name.clone(), arg.get_value());
        }
        let out = (self.func)(&evaluated);
        self.memo = Some(out.clone());
        out
    }
}

/// A `Refer` node: a late-bound reference to another node, addressed by
/// a dotted path from the environment root.
#[derive(Debug, Clone)]
pub struct ReferCore {
    path: Vec<String>,
    resolved: Option<Box<JParam>>,
}

impl ReferCore {
    pub(crate) fn path_string(&self) -> String {
        self.path.join(".")
    }

    pub(crate) fn resolved_mut(&mut self) -> Option<&mut JParam> {
        self.resolved.as_deref_mut()
    }
}

/// One node of a JourneyMAPS parameter tree.
///
/// See the module-level documentation of the crate for the semantics of
/// each variant; this type is a closed sum so that SQL projection and
/// `init_run` hooks can match exhaustively.
#[derive(Clone)]
pub struct JParam {
    state: NodeState,
    pub(crate) kind: NodeKind,
}

#[derive(Clone)]
pub(crate) enum NodeKind {
    Value {
        value: JValue,
        dtype: Option<SqlType>,
    },
    Dict(IndexMap<String, JParam>),
    Invisible(Box<JParam>),
    Buffer(BufferCore),
    YBuffer(BufferCore),
    XBuffer(BufferCore, Option<SqlType>),
    Refer(ReferCore),
}

impl fmt::Debug for JParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Value { value, dtype } => f
                .debug_struct("Value")
                .field("value", value)
                .field("dtype", dtype)
                .field("used", &self.state.used)
                .finish(),
            NodeKind::Dict(children) => f.debug_map().entries(children.iter()).finish(),
            NodeKind::Invisible(inner) => f.debug_tuple("Invisible").field(inner).finish(),
            NodeKind::Buffer(b) => f.debug_tuple("Buffer").field(b).finish(),
            NodeKind::YBuffer(b) => f.debug_tuple("YBuffer").field(b).finish(),
            NodeKind::XBuffer(b, dtype) => f
                .debug_struct("XBuffer")
                .field("buffer", b)
                .field("dtype", dtype)
                .finish(),
            NodeKind::Refer(r) => f.debug_tuple("Refer").field(r).finish(),
        }
    }
}

impl JParam {
    /// Construct a terminal `Value` node.
    pub fn value(value: impl Into<JValue>) -> Self {
        JParam {
            state: NodeState::default(),
            kind: NodeKind::Value {
                value: value.into(),
                dtype: None,
            },
        }
    }

    /// Construct a terminal `Value` node with an explicit SQL dtype
    /// override.
    pub fn value_with_dtype(value: impl Into<JValue>, dtype: SqlType) -> Self {
        JParam {
            state: NodeState::default(),
            kind: NodeKind::Value {
                value: value.into(),
                dtype: Some(dtype),
            },
        }
    }

    /// Construct a `Dict` node from an ordered set of named children.
    pub fn dict(children: impl IntoIterator<Item = (String, JParam)>) -> Self {
        JParam {
            state: NodeState::default(),
            kind: NodeKind::Dict(children.into_iter().collect()),
        }
    }

    /// Wrap `inner` so it is excluded from SQL projection unless
    /// explicitly requested.
    pub fn invisible(inner: JParam) -> Self {
        JParam {
            state: NodeState::default(),
            kind: NodeKind::Invisible(Box::new(inner)),
        }
    }

    /// Construct a `Buffer`: a memoized call site whose *inputs* project
    /// to SQL.
    pub fn buffer(
        var_name: impl Into<String>,
        args: impl IntoIterator<Item = (String, JParam)>,
        reset_condition: ResetCondition,
        func: BufferFn,
    ) -> Self {
        JParam {
            state: NodeState::default(),
            kind: NodeKind::Buffer(BufferCore::new(
                var_name,
                args.into_iter().collect(),
                reset_condition,
                func,
            )),
        }
    }

    /// Construct a `YBuffer`: identical semantics to [`JParam::buffer`];
    /// the distinction only matters to SQL projection naming, which for
    /// a `YBuffer` is, per spec, identical to `Buffer`.
    pub fn y_buffer(
        var_name: impl Into<String>,
        args: impl IntoIterator<Item = (String, JParam)>,
        reset_condition: ResetCondition,
        func: BufferFn,
    ) -> Self {
        JParam {
            state: NodeState::default(),
            kind: NodeKind::YBuffer(BufferCore::new(
                var_name,
                args.into_iter().collect(),
                reset_condition,
                func,
            )),
        }
    }

    /// Construct an `XBuffer`: a memoized call site whose *output*
    /// projects to SQL (identity = output).
    pub fn x_buffer(
        var_name: impl Into<String>,
        args: impl IntoIterator<Item = (String, JParam)>,
        reset_condition: ResetCondition,
        dtype: Option<SqlType>,
        func: BufferFn,
    ) -> Self {
        JParam {
            state: NodeState::default(),
            kind: NodeKind::XBuffer(
                BufferCore::new(var_name, args.into_iter().collect(), reset_condition, func),
                dtype,
            ),
        }
    }

    /// Construct a `Refer`: resolved at the next `init_run` by deep-copy
    /// of the node found by walking `path` from the supplied root.
    pub fn refer(path: impl IntoIterator<Item = impl Into<String>>) -> Self {
        JParam {
            state: NodeState::default(),
            kind: NodeKind::Refer(ReferCore {
                path: path.into_iter().map(Into::into).collect(),
                resolved: None,
            }),
        }
    }

    // ------------------------------------------------------------------
    // Locking
    // ------------------------------------------------------------------

    /// Lock this subtree, forbidding user mutation at any depth.
    pub fn lock(&mut self) {
        self.state.locked = true;
        self.for_each_child_mut(|c| c.lock());
    }

    /// Unlock this subtree.
    pub fn unlock(&mut self) {
        self.state.locked = false;
        self.for_each_child_mut(|c| c.unlock());
    }

    /// Whether this exact node is currently locked.
    pub fn is_locked(&self) -> bool {
        self.state.locked
    }

    // ------------------------------------------------------------------
    // Usage tracking
    // ------------------------------------------------------------------

    /// Clear `used` across the whole subtree.
    pub fn reset_usage(&mut self) {
        self.state.used = false;
        self.for_each_child_mut(|c| c.reset_usage());
    }

    /// Set `used` on this exact node (not children).
    pub fn set_usage(&mut self, used: bool) {
        self.state.used = used;
    }

    /// Whether this exact node has been read since the last
    /// `reset_usage`.
    pub fn used(&self) -> bool {
        self.state.used
    }

    /// OR `other`'s usage flags into `self`, node-by-node, recursing
    /// pairwise over children. Idempotent and OR-monotone: merging a
    /// subtree with itself is a no-op; merging twice is the same as
    /// merging once.
    pub fn merge_usage(&mut self, other: &JParam) {
        self.state.used |= other.state.used;
        match (&mut self.kind, &other.kind) {
            (NodeKind::Dict(a), NodeKind::Dict(b)) => {
                for (key, child) in a.iter_mut() {
                    if let Some(other_child) = b.get(key) {
                        child.merge_usage(other_child);
                    }
                }
            }
            (NodeKind::Invisible(a), NodeKind::Invisible(b)) => a.merge_usage(b),
            (NodeKind::Buffer(a), NodeKind::Buffer(b))
            | (NodeKind::YBuffer(a), NodeKind::YBuffer(b)) => merge_buffer_args(a, b),
            (NodeKind::XBuffer(a, _), NodeKind::XBuffer(b, _)) => merge_buffer_args(a, b),
            (NodeKind::Refer(a), NodeKind::Refer(b)) => {
                if let (Some(ar), Some(br)) = (&mut a.resolved, &b.resolved) {
                    ar.merge_usage(br);
                }
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // init_run
    // ------------------------------------------------------------------

    /// Run the top-down `init_run` pass: this node's own hook executes
    /// before its children's. `Refer`s resolve against `root` (defaults
    /// to a snapshot of `self` taken before mutation begins); buffers
    /// clear their memo per [`ResetCondition`].
    pub fn init_run(&mut self, is_root: bool, root: Option<&JParam>) {
        match root {
            Some(r) => self.init_run_with_root(is_root, r),
            None => {
                let snapshot = self.clone();
                self.init_run_with_root(is_root, &snapshot);
            }
        }
    }

    fn init_run_with_root(&mut self, is_root: bool, root: &JParam) {
        match &mut self.kind {
            NodeKind::Value { .. } => {}
            NodeKind::Dict(children) => {
                for child in children.values_mut() {
                    child.init_run_with_root(is_root, root);
                }
            }
            NodeKind::Invisible(inner) => inner.init_run_with_root(is_root, root),
            NodeKind::Buffer(b) | NodeKind::YBuffer(b) => {
                b.clear_if_due(is_root);
                for child in b.args.values_mut() {
                    child.init_run_with_root(is_root, root);
                }
            }
            NodeKind::XBuffer(b, _) => {
                b.clear_if_due(is_root);
                for child in b.args.values_mut() {
                    child.init_run_with_root(is_root, root);
                }
            }
            NodeKind::Refer(r) => {
                // Resolved lazily here regardless of prior state: a
                // Refer always re-resolves on init_run, since it has no
                // reset_condition of its own to suppress it.
                if let Ok(found) = lookup_path(root, &r.path) {
                    let mut copy = found.clone();
                    let snapshot = copy.clone();
                    copy.init_run_with_root(is_root, &snapshot);
                    r.resolved = Some(Box::new(copy));
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Reading
    // ------------------------------------------------------------------

    /// Evaluate this node, marking it (and only it) as used.
    pub fn get_value(&mut self) -> JValue {
        self.state.used = true;
        match &mut self.kind {
            NodeKind::Value { value, .. } => value.clone(),
            NodeKind::Dict(_) => JValue::Null,
            NodeKind::Invisible(inner) => inner.get_value(),
            NodeKind::Buffer(b) | NodeKind::YBuffer(b) => b.evaluate(),
            NodeKind::XBuffer(b, _) => b.evaluate(),
            NodeKind::Refer(r) => match &mut r.resolved {
                Some(inner) => inner.get_value(),
                None => JValue::Null,
            },
        }
    }

    /// Index into a `Dict` child by name, without marking anything used.
    pub fn get(&mut self, key: &str) -> Result<&mut JParam, ParamError> {
        match &mut self.kind {
            NodeKind::Dict(children) => {
                children.get_mut(key).ok_or_else(|| ParamError::KeyNotFound {
                    key: key.to_string(),
                })
            }
            _ => Err(ParamError::NotADict {
                path: key.to_string(),
            }),
        }
    }

    /// Assign (insert or overwrite) a `Dict` child. Fails with
    /// `LockedMutation` if this node is locked. `dtype` on an existing
    /// `Value` child survives the assignment if the incoming value
    /// carries none of its own.
    pub fn set(&mut self, key: &str, mut value: JParam) -> Result<(), ParamError> {
        if self.state.locked {
            warn!(target: "jmaps::param", key, "rejected mutation on a locked node");
            return Err(ParamError::LockedMutation {
                path: key.to_string(),
            });
        }
        match &mut self.kind {
            NodeKind::Dict(children) => {
                let existing_dtype = children.get(key).and_then(|existing| match &existing.kind {
                    NodeKind::Value { dtype: Some(d), .. } => Some(*d),
                    _ => None,
                });
                if let (Some(existing_dtype), NodeKind::Value { dtype: incoming @ None, .. }) =
                    (existing_dtype, &mut value.kind)
                {
                    *incoming = Some(existing_dtype);
                }
                children.insert(key.to_string(), value);
                Ok(())
            }
            _ => Err(ParamError::NotADict {
                path: key.to_string(),
            }),
        }
    }

    /// Merge `overlay`'s children into this `Dict`, key by key, the way
    /// a batch entry's environment overlay is merged into a subpath's
    /// environment clone. An existing `Value`'s `dtype` survives onto
    /// the incoming `Value` when the incoming one carries none.
    pub fn replace(&mut self, overlay: &JParam) -> Result<(), ParamError> {
        let overlay_children = match &overlay.kind {
            NodeKind::Dict(c) => c,
            _ => {
                return Err(ParamError::NotADict {
                    path: String::from("<overlay>"),
                })
            }
        };
        for (key, incoming) in overlay_children.iter() {
            self.set(key, incoming.clone())?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn for_each_child_mut(&mut self, mut f: impl FnMut(&mut JParam)) {
        match &mut self.kind {
            NodeKind::Value { .. } => {}
            NodeKind::Dict(children) => children.values_mut().for_each(f),
            NodeKind::Invisible(inner) => f(inner),
            NodeKind::Buffer(b) | NodeKind::YBuffer(b) => b.args.values_mut().for_each(f),
            NodeKind::XBuffer(b, _) => b.args.values_mut().for_each(f),
            NodeKind::Refer(r) => {
                if let Some(inner) = &mut r.resolved {
                    f(inner);
                }
            }
        }
    }

    /// Whether this node is a `Dict`.
    pub fn is_dict(&self) -> bool {
        matches!(self.kind, NodeKind::Dict(_))
    }
}

fn merge_buffer_args(a: &mut BufferCore, b: &BufferCore) {
    for (key, child) in a.args.iter_mut() {
        if let Some(other_child) = b.args.get(key) {
            child.merge_usage(other_child);
        }
    }
}

fn lookup_path<'a>(root: &'a JParam, path: &[String]) -> Result<&'a JParam, ParamError> {
    let mut current = root;
    for segment in path {
        match &current.kind {
            NodeKind::Dict(children) => {
                current = children.get(segment).ok_or_else(|| ParamError::ReferResolutionFailed {
                    path: path.join("."),
                })?;
            }
            _ => {
                return Err(ParamError::ReferResolutionFailed {
                    path: path.join("."),
                })
            }
        }
    }
    Ok(current)
}
