use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::render;
use super::{build, Builder, Operator, Result};

pub type NodeId = usize;

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum DagNode {
    Leaf(String),
    Interior { op: Operator, left: NodeId, right: NodeId },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Dag {
    pub nodes: Vec<DagNode>,
    pub root: NodeId,
}

// Value numbering: a node is only created when no node with the same label
// and children exists yet
#[derive(Default)]
struct Numbering {
    nodes: Vec<DagNode>,
    numbers: HashMap<DagNode, NodeId>,
}

impl Numbering {
    fn node(&mut self, node: DagNode) -> NodeId {
        if let Some(id) = self.numbers.get(&node) {
            return *id;
        }
        self.nodes.push(node.clone());
        self.numbers.insert(node, self.nodes.len() - 1);
        self.nodes.len() - 1
    }
}

impl Builder for Numbering {
    type Value = NodeId;

    fn operand(&mut self, name: &str) -> NodeId {
        self.node(DagNode::Leaf(name.to_string()))
    }

    fn apply(&mut self, op: Operator, left: NodeId, right: NodeId) -> NodeId {
        self.node(DagNode::Interior { op, left, right })
    }
}

pub fn build_dag(expression: &str) -> Result<Dag> {
    let mut numbering = Numbering::default();
    let root = build(expression, &mut numbering)?;
    Ok(Dag { nodes: numbering.nodes, root })
}

fn node_name(id: NodeId) -> String {
    format!("n{}", id)
}

impl Dag {
    fn parents(&self, id: NodeId) -> usize {
        self.nodes
            .iter()
            .map(|node| match node {
                DagNode::Interior { left, right, .. } => (*left == id) as usize + (*right == id) as usize,
                DagNode::Leaf(_) => 0,
            })
            .sum()
    }

    // Operator nodes used more than once
    pub fn common_subexpressions(&self) -> Vec<NodeId> {
        (0..self.nodes.len())
            .filter(|id| matches!(self.nodes[*id], DagNode::Interior { .. }) && self.parents(*id) > 1)
            .collect()
    }

    // Nodes the same expression needs as a syntax tree
    pub fn tree_size(&self) -> usize {
        self.subtree_size(self.root)
    }

    fn subtree_size(&self, id: NodeId) -> usize {
        match &self.nodes[id] {
            DagNode::Leaf(_) => 1,
            DagNode::Interior { left, right, .. } => 1 + self.subtree_size(*left) + self.subtree_size(*right),
        }
    }

    pub fn expression(&self, id: NodeId) -> String {
        let operand = |child: NodeId| match &self.nodes[child] {
            DagNode::Leaf(name) => name.clone(),
            DagNode::Interior { .. } => format!("({})", self.expression(child)),
        };
        match &self.nodes[id] {
            DagNode::Leaf(name) => name.clone(),
            DagNode::Interior { op, left, right } => format!("{} {} {}", operand(*left), op, operand(*right)),
        }
    }
}

impl Display for Dag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let header = ["Node", "Label", "Left", "Right"].map(String::from);
        let rows = self
            .nodes
            .iter()
            .enumerate()
            .map(|(id, node)| {
                let name = if id == self.root { format!("→{}", node_name(id)) } else { node_name(id) };
                match node {
                    DagNode::Leaf(label) => vec![name, label.clone()],
                    DagNode::Interior { op, left, right } => vec![name, op.to_string(), node_name(*left), node_name(*right)],
                }
            })
            .collect_vec();

        write!(f, "{}", render::table(&header, &rows))
    }
}

pub struct DagDot<'a>(pub &'a Dag);

impl Display for DagDot<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let dag = self.0;
        writeln!(f, "digraph {{")?;
        writeln!(f, "  rankdir=TB;")?;
        writeln!(f, "  node [shape=circle];")?;
        for (id, node) in dag.nodes.iter().enumerate() {
            let label = match node {
                DagNode::Leaf(name) => name.clone(),
                DagNode::Interior { op, .. } => op.to_string(),
            };
            let root = if id == dag.root { ", penwidth=2" } else { "" };
            writeln!(f, "  {} [label=\"{}\"{}];", node_name(id), label, root)?;
        }
        for (id, node) in dag.nodes.iter().enumerate() {
            if let DagNode::Interior { left, right, .. } = node {
                writeln!(f, "  {} -> {} [label=\"L\"];", node_name(id), node_name(*left))?;
                writeln!(f, "  {} -> {} [label=\"R\"];", node_name(id), node_name(*right))?;
            }
        }
        writeln!(f, "}}")
    }
}

pub fn dag_to_dot(dag: &Dag) -> String {
    DagDot(dag).to_string()
}
