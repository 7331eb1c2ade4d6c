pub mod node_integration;

use super::Check;
use crate::config::CheckSettings;

/// Returns all built-in checks, configured from `[checks]`.
pub fn all_checks(settings: &CheckSettings) -> Vec<Box<dyn Check>> {
    vec![Box::new(node_integration::NodeIntegrationCheck::new(settings))]
}
