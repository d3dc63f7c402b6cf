//! Pure drift computation between the orchestrator's and the backend's
//! network sets.

use std::collections::HashSet;

/// Returns the `(tenant, network)` pairs present on the backend but no
/// longer tagged on any live orchestrator network, preserving backend
/// order.
///
/// These are the networks whose orchestrator record disappeared before the
/// driver's delete callback ran (or while the plugin was down); the caller
/// decides how many of them to act on.
pub fn orphaned_pairs(
    orchestrator: &HashSet<(String, String)>,
    backend: &[(String, String)],
) -> Vec<(String, String)> {
    backend
        .iter()
        .filter(|pair| !orchestrator.contains(*pair))
        .cloned()
        .collect()
}
