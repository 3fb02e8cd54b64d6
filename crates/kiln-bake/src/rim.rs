use kiln_config::NamingConfig;
use kiln_scene::{Link, Scene};
use tracing::{debug, info};

use crate::error::BakeError;

/// Switches every rim group that uses the light-based-shading tree to the
/// plain rim tree and feeds it straight from the shader node. Returns the
/// number of materials changed. The change is permanent.
pub fn normalize_rim_groups(scene: &mut Scene, naming: &NamingConfig) -> Result<usize, BakeError> {
    let mut changed = 0;
    for material in &mut scene.materials {
        let graph = &mut material.graph;
        if graph.group_tree(&naming.rim_node) != Some(naming.rim_lbs_tree.as_str()) {
            continue;
        }
        let graph_error = |source| BakeError::Graph {
            owner: material.name.clone(),
            source,
        };

        graph
            .set_group_tree(&naming.rim_node, &naming.rim_none_tree)
            .map_err(graph_error)?;

        let from = graph
            .node(&naming.shader_node)
            .and_then(|node| node.outputs.first().cloned());
        let to = graph
            .node(&naming.rim_node)
            .and_then(|node| node.inputs.first())
            .map(|socket| socket.name.clone());
        match (from, to) {
            (Some(from), Some(to)) => {
                graph
                    .add_link(Link::new(
                        naming.shader_node.as_str(),
                        from,
                        naming.rim_node.as_str(),
                        to,
                    ))
                    .map_err(graph_error)?;
            }
            _ => debug!("{}: no {} output to feed the rim", material.name, naming.shader_node),
        }
        changed += 1;
    }
    if changed > 0 {
        info!("Switched {changed} rim group(s) to {}", naming.rim_none_tree);
    }
    Ok(changed)
}
