//! Shader graph accessor: named nodes, input values, image bindings and links.
//!
//! Every mutator returns a [`GraphEdit`] describing the state it replaced, so
//! callers can run mutate → render → restore transactions with
//! [`ShaderGraph::revert`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by graph lookups and edits.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    /// No node with this name exists.
    #[error("node `{0}` not found")]
    UnknownNode(String),

    /// The node has no input with this name.
    #[error("node `{node}` has no input `{input}`")]
    UnknownInput {
        /// Node name.
        node: String,
        /// Input name.
        input: String,
    },

    /// The node has no output with this name.
    #[error("node `{node}` has no output `{output}`")]
    UnknownOutput {
        /// Node name.
        node: String,
        /// Output name.
        output: String,
    },

    /// The node does not hold an image.
    #[error("node `{0}` is not an image node")]
    NotAnImageNode(String),

    /// The node does not reference a node group.
    #[error("node `{0}` is not a group node")]
    NotAGroupNode(String),
}

// ---------------------------------------------------------------------------
// Nodes and sockets
// ---------------------------------------------------------------------------

/// Default value of an unlinked input socket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SocketValue {
    /// Scalar (blend weights, toggles).
    Float(f32),
    /// Linear RGBA color.
    Color([f32; 4]),
    /// Three-component vector.
    Vector([f32; 3]),
}

impl SocketValue {
    /// Scalar view: floats as-is, colors and vectors by their first component.
    pub fn as_f32(&self) -> f32 {
        match self {
            Self::Float(v) => *v,
            Self::Color(c) => c[0],
            Self::Vector(v) => v[0],
        }
    }
}

/// A named input socket with its default value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Socket {
    /// Socket name, unique within the node.
    pub name: String,
    /// Value used while the socket is unlinked.
    pub value: SocketValue,
}

/// What a node carries besides its sockets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Image texture node; `None` when nothing is bound.
    Image {
        /// Name of the bound image in the scene's image store.
        image: Option<String>,
    },
    /// Instance of a shared node group.
    Group {
        /// Name of the node group in the scene.
        tree: String,
    },
    /// Any other node.
    Generic,
}

/// A graph node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node name, unique within the graph.
    pub name: String,
    /// Node payload.
    pub kind: NodeKind,
    /// Input sockets.
    #[serde(default)]
    pub inputs: Vec<Socket>,
    /// Output socket names.
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl Node {
    /// A plain node without sockets.
    pub fn generic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Generic,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// An image texture node with a `Color` output.
    pub fn image(name: impl Into<String>, image: Option<&str>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Image {
                image: image.map(str::to_string),
            },
            inputs: Vec::new(),
            outputs: vec!["Color".to_string()],
        }
    }

    /// A node-group instance.
    pub fn group(name: impl Into<String>, tree: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group { tree: tree.into() },
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Adds an input socket.
    pub fn with_input(mut self, name: impl Into<String>, value: SocketValue) -> Self {
        self.inputs.push(Socket {
            name: name.into(),
            value,
        });
        self
    }

    /// Adds an output socket.
    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    /// Input socket by name.
    pub fn input(&self, name: &str) -> Option<&Socket> {
        self.inputs.iter().find(|s| s.name == name)
    }

    /// Returns `true` if the node has an output with this name.
    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|o| o == name)
    }
}

/// A connection from a node output to a node input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source node.
    pub from_node: String,
    /// Output socket on the source node.
    pub from_socket: String,
    /// Destination node.
    pub to_node: String,
    /// Input socket on the destination node.
    pub to_socket: String,
}

impl Link {
    /// Creates a link `from_node.from_socket → to_node.to_socket`.
    pub fn new(
        from_node: impl Into<String>,
        from_socket: impl Into<String>,
        to_node: impl Into<String>,
        to_socket: impl Into<String>,
    ) -> Self {
        Self {
            from_node: from_node.into(),
            from_socket: from_socket.into(),
            to_node: to_node.into(),
            to_socket: to_socket.into(),
        }
    }

    fn targets(&self, node: &str, input: &str) -> bool {
        self.to_node == node && self.to_socket == input
    }
}

// ---------------------------------------------------------------------------
// GraphEdit
// ---------------------------------------------------------------------------

/// The state replaced by one graph mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEdit {
    /// An input default value was overwritten.
    InputValue {
        /// Node name.
        node: String,
        /// Input name.
        input: String,
        /// Value before the edit.
        previous: SocketValue,
    },
    /// The link into an input was removed or replaced.
    Link {
        /// Destination node.
        node: String,
        /// Destination input.
        input: String,
        /// Link into the input before the edit, with its index in `links`.
        previous: Option<(usize, Link)>,
    },
    /// An image binding changed.
    Image {
        /// Image node name.
        node: String,
        /// Binding before the edit.
        previous: Option<String>,
    },
    /// A group node was pointed at a different tree.
    GroupTree {
        /// Group node name.
        node: String,
        /// Tree before the edit.
        previous: String,
    },
}

// ---------------------------------------------------------------------------
// ShaderGraph
// ---------------------------------------------------------------------------

/// Nodes plus the links between them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShaderGraph {
    /// Nodes in declaration order.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Links; at most one per destination input.
    #[serde(default)]
    pub links: Vec<Link>,
}

impl ShaderGraph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: adds a node.
    pub fn with_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    /// Builder: adds a link without validation.
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.retain(|l| !l.targets(&link.to_node, &link.to_socket));
        self.links.push(link);
        self
    }

    /// Node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Mutable node by name. Edits made through it are not tracked.
    pub fn node_mut(&mut self, name: &str) -> Result<&mut Node, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.name == name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// Returns `true` if a node with this name exists.
    pub fn has_node(&self, name: &str) -> bool {
        self.node(name).is_some()
    }

    /// Image bound to an image node, if any.
    pub fn image(&self, node: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Image { image } => image.as_deref(),
            _ => None,
        }
    }

    /// Binds `image` to an image node.
    pub fn set_image(&mut self, node: &str, image: Option<String>) -> Result<GraphEdit, GraphError> {
        let target = self.node_mut(node)?;
        match &mut target.kind {
            NodeKind::Image { image: slot } => {
                let previous = std::mem::replace(slot, image);
                Ok(GraphEdit::Image {
                    node: node.to_string(),
                    previous,
                })
            }
            _ => Err(GraphError::NotAnImageNode(node.to_string())),
        }
    }

    /// Tree referenced by a group node, if any.
    pub fn group_tree(&self, node: &str) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Group { tree } => Some(tree.as_str()),
            _ => None,
        }
    }

    /// Points a group node at another tree.
    pub fn set_group_tree(&mut self, node: &str, tree: &str) -> Result<GraphEdit, GraphError> {
        let target = self.node_mut(node)?;
        match &mut target.kind {
            NodeKind::Group { tree: slot } => {
                let previous = std::mem::replace(slot, tree.to_string());
                Ok(GraphEdit::GroupTree {
                    node: node.to_string(),
                    previous,
                })
            }
            _ => Err(GraphError::NotAGroupNode(node.to_string())),
        }
    }

    /// Image nodes in declaration order, with their bindings.
    pub fn image_nodes(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::Image { image } => Some((n.name.as_str(), image.as_deref())),
            _ => None,
        })
    }

    /// Link feeding `node.input`, if any.
    pub fn link_into(&self, node: &str, input: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.targets(node, input))
    }

    /// Removes the link feeding `node.input`. Succeeds with `previous: None`
    /// when the input was already unlinked.
    pub fn remove_link_into(&mut self, node: &str, input: &str) -> Result<GraphEdit, GraphError> {
        self.check_input(node, input)?;
        let previous = self
            .links
            .iter()
            .position(|l| l.targets(node, input))
            .map(|idx| (idx, self.links.remove(idx)));
        Ok(GraphEdit::Link {
            node: node.to_string(),
            input: input.to_string(),
            previous,
        })
    }

    /// Connects `link`, replacing whatever fed its destination input.
    pub fn add_link(&mut self, link: Link) -> Result<GraphEdit, GraphError> {
        let source = self
            .node(&link.from_node)
            .ok_or_else(|| GraphError::UnknownNode(link.from_node.clone()))?;
        if !source.has_output(&link.from_socket) {
            return Err(GraphError::UnknownOutput {
                node: link.from_node.clone(),
                output: link.from_socket.clone(),
            });
        }
        let edit = self.remove_link_into(&link.to_node, &link.to_socket)?;
        self.links.push(link);
        Ok(edit)
    }

    /// Default value of `node.input`.
    pub fn input_value(&self, node: &str, input: &str) -> Option<&SocketValue> {
        self.node(node)?.input(input).map(|s| &s.value)
    }

    /// Overwrites the default value of `node.input`.
    pub fn set_input_value(
        &mut self,
        node: &str,
        input: &str,
        value: SocketValue,
    ) -> Result<GraphEdit, GraphError> {
        let target = self.node_mut(node)?;
        let socket = target
            .inputs
            .iter_mut()
            .find(|s| s.name == input)
            .ok_or_else(|| GraphError::UnknownInput {
                node: node.to_string(),
                input: input.to_string(),
            })?;
        let previous = std::mem::replace(&mut socket.value, value);
        Ok(GraphEdit::InputValue {
            node: node.to_string(),
            input: input.to_string(),
            previous,
        })
    }

    /// Restores the state captured in `edit`.
    pub fn revert(&mut self, edit: GraphEdit) -> Result<(), GraphError> {
        match edit {
            GraphEdit::InputValue {
                node,
                input,
                previous,
            } => {
                self.set_input_value(&node, &input, previous)?;
            }
            GraphEdit::Link {
                node,
                input,
                previous,
            } => {
                self.links.retain(|l| !l.targets(&node, &input));
                if let Some((idx, link)) = previous {
                    let idx = idx.min(self.links.len());
                    self.links.insert(idx, link);
                }
            }
            GraphEdit::Image { node, previous } => {
                self.set_image(&node, previous)?;
            }
            GraphEdit::GroupTree { node, previous } => {
                self.set_group_tree(&node, &previous)?;
            }
        }
        Ok(())
    }

    /// Reverts a sequence of edits, most recent first.
    pub fn revert_all(&mut self, edits: Vec<GraphEdit>) -> Result<(), GraphError> {
        for edit in edits.into_iter().rev() {
            self.revert(edit)?;
        }
        Ok(())
    }

    fn check_input(&self, node: &str, input: &str) -> Result<(), GraphError> {
        let target = self
            .node(node)
            .ok_or_else(|| GraphError::UnknownNode(node.to_string()))?;
        if target.input(input).is_none() {
            return Err(GraphError::UnknownInput {
                node: node.to_string(),
                input: input.to_string(),
            });
        }
        Ok(())
    }
}
