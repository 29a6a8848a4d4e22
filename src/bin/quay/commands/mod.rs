//! Command implementations

pub mod completions;
pub mod package;
pub mod plan;
pub mod platforms;

use std::error::Error as StdError;

use quay::core::error::{ConfigurationError, PlanError};
use quay::resolver::ResolutionError;
use quay::util::context::ProjectNotFound;
use quay::util::Diagnostic;

/// The diagnostic of the first error in the chain that has one, with the
/// outermost message as context when they differ.
pub fn diagnostic_for(err: &anyhow::Error) -> Option<Diagnostic> {
    err.chain().enumerate().find_map(|(depth, cause)| {
        let diagnostic = known_diagnostic(cause)?;
        Some(if depth > 0 {
            diagnostic.with_context(err.to_string())
        } else {
            diagnostic
        })
    })
}

fn known_diagnostic(cause: &(dyn StdError + 'static)) -> Option<Diagnostic> {
    if let Some(e) = cause.downcast_ref::<ConfigurationError>() {
        return Some(e.to_diagnostic());
    }
    if let Some(PlanError::Configuration(e)) = cause.downcast_ref::<PlanError>() {
        return Some(e.to_diagnostic());
    }
    if let Some(e) = cause.downcast_ref::<ResolutionError>() {
        return Some(e.to_diagnostic());
    }
    cause
        .downcast_ref::<ProjectNotFound>()
        .map(ProjectNotFound::to_diagnostic)
}
