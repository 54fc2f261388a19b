//! Local rewriting to a fixpoint.
//!
//! Every rule looks at one interior node and at most two of its neighbours,
//! and rewires them into an equivalent, smaller or more canonical shape. The
//! driver sweeps over all nodes, fires at most one rule per node, and
//! repeats until a sweep changes nothing.
//!
//! Rules are tried in a fixed order per gate kind:
//!
//! | gate          | rules, first match wins                                  |
//! |---------------|----------------------------------------------------------|
//! | `&` `\|`      | erasure, associativity, idempotence\*, absorption\*      |
//! | `^`           | erasure, associativity, XOR involution, NOT/XOR fusion   |
//! | `~`           | erasure, double negation, NOT/copy fusion                |
//! | `0` `1`       | erasure                                                  |
//! | copy          | copy associativity, copy elision                         |
//!
//! Rules marked \* are the bonus family, toggled by
//! [`RewriteConfig::bonus_rules`]. Erasure is toggled by
//! [`RewriteConfig::erasure`].

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, info, trace};

use super::{Circuit, Gate};
use crate::graph::{Multiplicity, NodeId};

/// A rewrite rule, as reported in [`RewriteStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    /// A copy with one input and one output is replaced by a wire
    CopyElision,
    /// A copy feeding a copy is merged into it
    CopyAssociativity,
    /// A gate feeding a gate of the same kind is flattened into it
    Associativity,
    /// Parallel edges from a copy into a XOR cancel in pairs
    XorInvolution,
    /// Parallel edges from a copy into an AND/OR collapse to one
    Idempotence,
    /// `a & (a | b)` and `a | (a & b)` reduce to `a`
    Absorption,
    /// `~a ^ b` becomes `~(a ^ b)`
    NotXorFusion,
    /// A negated fan-out becomes a fan-out of negations
    NotCopyFusion,
    /// `~~a` becomes `a`
    DoubleNegation,
    /// A gate whose only consumer is a dead copy is removed
    Erasure,
}

impl Rule {
    pub const ALL: [Rule; 10] = [
        Rule::CopyElision,
        Rule::CopyAssociativity,
        Rule::Associativity,
        Rule::XorInvolution,
        Rule::Idempotence,
        Rule::Absorption,
        Rule::NotXorFusion,
        Rule::NotCopyFusion,
        Rule::DoubleNegation,
        Rule::Erasure,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Rule::CopyElision => "copy-elision",
            Rule::CopyAssociativity => "copy-associativity",
            Rule::Associativity => "associativity",
            Rule::XorInvolution => "xor-involution",
            Rule::Idempotence => "idempotence",
            Rule::Absorption => "absorption",
            Rule::NotXorFusion => "not-xor-fusion",
            Rule::NotCopyFusion => "not-copy-fusion",
            Rule::DoubleNegation => "double-negation",
            Rule::Erasure => "erasure",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which rule families the simplifier may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteConfig {
    /// Enable idempotence and absorption for `&` and `|`.
    pub bonus_rules: bool,
    /// Enable erasure of gates that only feed a dead copy.
    pub erasure: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            bonus_rules: true,
            erasure: true,
        }
    }
}

impl RewriteConfig {
    /// Create a new configuration with every rule enabled.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bonus_rules(mut self, enabled: bool) -> Self {
        self.bonus_rules = enabled;
        self
    }

    pub fn with_erasure(mut self, enabled: bool) -> Self {
        self.erasure = enabled;
        self
    }
}

/// What a simplification run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Full sweeps over the node set, including the final quiet one.
    pub passes: usize,
    fired: BTreeMap<Rule, usize>,
}

impl RewriteStats {
    /// How many times `rule` fired.
    pub fn count(&self, rule: Rule) -> usize {
        self.fired.get(&rule).copied().unwrap_or(0)
    }

    /// Total rule applications.
    pub fn total(&self) -> usize {
        self.fired.values().sum()
    }

    fn record(&mut self, rule: Rule) {
        *self.fired.entry(rule).or_insert(0) += 1;
    }
}

impl fmt::Display for RewriteStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rewrites in {} passes", self.total(), self.passes)?;
        for (rule, count) in &self.fired {
            write!(f, "\n  {:<20} {}", rule.name(), count)?;
        }
        Ok(())
    }
}

impl Circuit {
    /// Rewrite to a fixpoint with every rule enabled.
    pub fn simplify(&mut self) -> RewriteStats {
        self.simplify_with(&RewriteConfig::default())
    }

    /// Rewrite to a fixpoint using the rule families in `config`.
    ///
    /// Boundary nodes are never rewritten, so the input and output lists are
    /// unchanged. Every rule keeps the circuit legal.
    pub fn simplify_with(&mut self, config: &RewriteConfig) -> RewriteStats {
        let mut stats = RewriteStats::default();
        loop {
            stats.passes += 1;
            let before = stats.total();
            for id in self.node_ids() {
                if !self.contains(id) || self.is_boundary(id) {
                    continue;
                }
                if let Some(rule) = self.rewrite_node(id, config) {
                    trace!(%rule, node = %id, "rewrite");
                    stats.record(rule);
                }
            }
            let fired = stats.total() - before;
            debug!(pass = stats.passes, fired, nodes = self.len(), "rewrite pass");
            debug_assert!(self.is_well_formed());
            if fired == 0 {
                break;
            }
        }
        info!(passes = stats.passes, rewrites = stats.total(), nodes = self.len(), "simplified");
        stats
    }

    /// Simplified copy of this circuit.
    pub fn simplified(&self) -> Circuit {
        let mut result = self.clone();
        result.simplify();
        result
    }

    fn rewrite_node(&mut self, id: NodeId, config: &RewriteConfig) -> Option<Rule> {
        let gate = self.gate_at(id)?;
        if config.erasure && !gate.is_copy() && self.erase(id) {
            return Some(Rule::Erasure);
        }
        match gate {
            Gate::Copy => {
                if self.merge_copies(id) {
                    Some(Rule::CopyAssociativity)
                } else if self.elide_copy(id) {
                    Some(Rule::CopyElision)
                } else {
                    None
                }
            }
            Gate::Xor => {
                if self.associate(id) {
                    Some(Rule::Associativity)
                } else if self.cancel_pairs(id) {
                    Some(Rule::XorInvolution)
                } else if self.pull_not_through_xor(id) {
                    Some(Rule::NotXorFusion)
                } else {
                    None
                }
            }
            Gate::And | Gate::Or => {
                if self.associate(id) {
                    Some(Rule::Associativity)
                } else if config.bonus_rules && self.collapse_duplicates(id) {
                    Some(Rule::Idempotence)
                } else if config.bonus_rules && self.absorb(id) {
                    Some(Rule::Absorption)
                } else {
                    None
                }
            }
            Gate::Not => {
                if self.cancel_negations(id) {
                    Some(Rule::DoubleNegation)
                } else if self.push_not_through_copy(id) {
                    Some(Rule::NotCopyFusion)
                } else {
                    None
                }
            }
            Gate::Const(_) => None,
        }
    }

    // ============ Rules ============

    /// Erasure: `id` feeds only an interior copy with no consumers.
    fn erase(&mut self, id: NodeId) -> bool {
        let Some(child) = self.node(id).and_then(|n| n.single_child()) else {
            return false;
        };
        let dead = self.gate_at(child) == Some(Gate::Copy)
            && !self.is_output(child)
            && self.children_of(child).is_empty();
        if !dead {
            return false;
        }
        self.graph.take(child);
        self.discard(id);
        true
    }

    /// Copy associativity: the parent copy absorbs this copy's consumers.
    fn merge_copies(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.node(id).and_then(|n| n.single_parent()) else {
            return false;
        };
        if self.gate_at(parent) != Some(Gate::Copy) || self.is_input(parent) {
            return false;
        }
        let children = self.children_of(id);
        self.graph.take(id);
        for (c, m) in children {
            self.graph.link(parent, c, m);
        }
        true
    }

    /// Copy elision: a one-in one-out copy becomes a plain edge.
    fn elide_copy(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let (Some(parent), Some(child)) = (node.single_parent(), node.single_child()) else {
            return false;
        };
        self.graph.take(id);
        self.graph.link(parent, child, 1);
        true
    }

    /// Associativity: a same-kind parent gate is dissolved into `id`.
    fn associate(&mut self, id: NodeId) -> bool {
        let Some(gate) = self.gate_at(id) else {
            return false;
        };
        let nested = self
            .parents_of(id)
            .into_iter()
            .map(|(p, _)| p)
            .find(|&p| p != id && !self.is_boundary(p) && self.gate_at(p) == Some(gate));
        let Some(nested) = nested else {
            return false;
        };
        let inherited = self.parents_of(nested);
        self.graph.take(nested);
        for (p, m) in inherited {
            self.graph.link(p, id, m);
        }
        true
    }

    /// XOR involution: `m` parallel edges from a copy reduce to `m mod 2`.
    fn cancel_pairs(&mut self, id: NodeId) -> bool {
        let Some((copy, m)) = self.bundled_copy_parent(id) else {
            return false;
        };
        self.graph.unlink_all(copy, id);
        self.graph.link(copy, id, m % 2);
        true
    }

    /// Idempotence: parallel edges from a copy into `&`/`|` collapse to one.
    fn collapse_duplicates(&mut self, id: NodeId) -> bool {
        let Some((copy, _)) = self.bundled_copy_parent(id) else {
            return false;
        };
        self.graph.unlink_all(copy, id);
        self.graph.link(copy, id, 1);
        true
    }

    /// Absorption: a copy feeding both `id` and a dual-gate parent of `id`
    /// makes that parent redundant.
    fn absorb(&mut self, id: NodeId) -> bool {
        let dual = match self.gate_at(id) {
            Some(Gate::And) => Gate::Or,
            Some(Gate::Or) => Gate::And,
            _ => return false,
        };
        let parents = self.parents_of(id);
        let copies: Vec<NodeId> = parents
            .iter()
            .map(|&(p, _)| p)
            .filter(|&p| self.gate_at(p) == Some(Gate::Copy))
            .collect();
        let absorbed = parents.iter().map(|&(p, _)| p).find(|&p| {
            self.gate_at(p) == Some(dual)
                && !self.is_boundary(p)
                && copies.iter().any(|&c| self.node(c).is_some_and(|n| n.child_multiplicity(p) > 0))
        });
        match absorbed {
            Some(p) => {
                self.discard(p);
                true
            }
            None => false,
        }
    }

    /// NOT/XOR fusion: `~a ^ b -> out` becomes `a ^ b -> ~ -> out`.
    fn pull_not_through_xor(&mut self, id: NodeId) -> bool {
        let Some(out) = self.node(id).and_then(|n| n.single_child()) else {
            return false;
        };
        let found = self.parents_of(id).into_iter().find_map(|(p, _)| {
            if self.gate_at(p) != Some(Gate::Not) {
                return None;
            }
            self.node(p).and_then(|n| n.single_parent()).map(|a| (p, a))
        });
        let Some((not, source)) = found else {
            return false;
        };
        self.graph.unlink_once(source, not);
        self.graph.unlink_once(not, id);
        self.graph.unlink_once(id, out);
        self.graph.link(source, id, 1);
        self.graph.link(id, not, 1);
        self.graph.link(not, out, 1);
        true
    }

    /// Double negation: `~~a` is replaced by a wire from `a`.
    fn cancel_negations(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let (Some(inner), Some(out)) = (node.single_parent(), node.single_child()) else {
            return false;
        };
        if self.gate_at(inner) != Some(Gate::Not) {
            return false;
        }
        let Some(source) = self.node(inner).and_then(|n| n.single_parent()) else {
            return false;
        };
        self.graph.take(inner);
        self.graph.take(id);
        self.graph.link(source, out, 1);
        true
    }

    /// NOT/copy fusion: the copy is fed directly and every unit of its
    /// fan-out gets its own negation.
    fn push_not_through_copy(&mut self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let (Some(source), Some(copy)) = (node.single_parent(), node.single_child()) else {
            return false;
        };
        if self.gate_at(copy) != Some(Gate::Copy) || self.is_output(copy) {
            return false;
        }
        let fanout = self.children_of(copy);
        self.graph.take(id);
        self.graph.link(source, copy, 1);
        for (c, m) in fanout {
            self.graph.unlink_all(copy, c);
            for _ in 0..m {
                let not = self.graph.spawn(Gate::Not);
                self.graph.link(copy, not, 1);
                self.graph.link(not, c, 1);
            }
        }
        true
    }

    // ============ Helpers ============

    pub(crate) fn gate_at(&self, id: NodeId) -> Option<Gate> {
        self.node(id).map(|n| *n.label())
    }

    pub(crate) fn parents_of(&self, id: NodeId) -> Vec<(NodeId, Multiplicity)> {
        self.node(id)
            .map(|n| n.parents().iter().map(|(&p, &m)| (p, m)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn children_of(&self, id: NodeId) -> Vec<(NodeId, Multiplicity)> {
        self.node(id)
            .map(|n| n.children().iter().map(|(&c, &m)| (c, m)).collect())
            .unwrap_or_default()
    }

    /// Remove `id` and hang a fresh dead copy under each of its parents.
    pub(crate) fn discard(&mut self, id: NodeId) {
        let parents = self.parents_of(id);
        self.graph.take(id);
        for (p, _) in parents {
            let sink = self.graph.spawn(Gate::Copy);
            self.graph.link(p, sink, 1);
        }
    }

    /// A copy parent joined to `id` by more than one parallel edge.
    fn bundled_copy_parent(&self, id: NodeId) -> Option<(NodeId, Multiplicity)> {
        self.parents_of(id)
            .into_iter()
            .find(|&(p, m)| m > 1 && self.gate_at(p) == Some(Gate::Copy))
    }
}
