use crate::error::LayoutError;
use crate::model::GraphModel;

/// Check that every link moves strictly forward through the layers
///
/// Links are checked in insertion order and the first offending one is
/// reported.
///
/// # Errors
/// Returns [`LayoutError::BackwardLink`] for a link whose target layer
/// does not rank after its source layer
pub fn validate_layer_order(model: &GraphModel) -> Result<(), LayoutError> {
    for (source, target, _) in model.links() {
        let source_rank = model.node(source).rank;
        let target_rank = model.node(target).rank;
        if source_rank >= target_rank {
            return Err(LayoutError::BackwardLink {
                link: model.link_key(source, target),
                source_rank,
                target_rank,
            });
        }
    }
    Ok(())
}
