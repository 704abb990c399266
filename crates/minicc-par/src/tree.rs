//! Parse-tree arena and its text rendering.
//!
//! Nodes live in a flat vector and refer to children by index, so partial
//! trees left behind by an aborted parse render just as well as complete
//! ones.

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(u32);

impl NodeId {
    /// The first node ever allocated; the parser allocates the start
    /// symbol's node before anything else.
    pub const ROOT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct Node {
    label: String,
    children: Vec<NodeId>,
}

/// Arena-backed parse tree.
#[derive(Debug, Default)]
pub struct ParseTree {
    nodes: Vec<Node>,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocates a node with no children.
    pub fn node(&mut self, label: impl Into<String>) -> NodeId {
        self.nodes.push(Node {
            label: label.into(),
            children: Vec::new(),
        });
        NodeId(self.nodes.len() as u32 - 1)
    }

    /// Appends `child` to `parent`'s child list.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.index()].children.push(child);
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].label
    }

    /// Renders the subtree under `root` with box-drawing connectors:
    ///
    /// ```text
    /// Program
    /// ├── Declaration-list
    /// │   └── epsilon
    /// └── $
    /// ```
    pub fn render(&self, root: NodeId) -> String {
        let mut out = String::new();
        out.push_str(self.label(root));
        out.push('\n');
        self.render_children(root, "", &mut out);
        out
    }

    fn render_children(&self, id: NodeId, prefix: &str, out: &mut String) {
        let children = &self.nodes[id.index()].children;
        for (pos, &child) in children.iter().enumerate() {
            let last = pos + 1 == children.len();
            out.push_str(prefix);
            out.push_str(if last { "└── " } else { "├── " });
            out.push_str(self.label(child));
            out.push('\n');
            let deeper = format!("{prefix}{}", if last { "    " } else { "│   " });
            self.render_children(child, &deeper, out);
        }
    }
}
