use std::future::Future;
use tracing::{debug, warn};

/// Every stage failed; carries the last stage's error.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Number of stages attempted
    pub attempts: usize,
    /// Error returned by the final stage
    pub last_error: E,
}

/// Run `operation` against each stage in order until one succeeds
///
/// Each stage is attempted exactly once, with no delay between stages. Every
/// failure is logged; only the last one is returned.
///
/// # Arguments
/// * `stages` - Ordered stages (must not be empty)
/// * `operation_name` - Name of the operation for logging
/// * `stage_name` - Label for a stage in log lines
/// * `operation` - Async closure run against one stage
///
/// # Panics
/// Panics if `stages` is empty
pub async fn with_fallback<'s, S, T, E, N, F, Fut>(
    stages: &'s [S],
    operation_name: &str,
    stage_name: N,
    mut operation: F,
) -> Result<T, Exhausted<E>>
where
    S: 's,
    N: Fn(&'s S) -> &'s str,
    F: FnMut(&'s S) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    assert!(!stages.is_empty(), "with_fallback needs at least one stage");

    let total = stages.len();
    let mut last_error: Option<E> = None;

    for (index, stage) in stages.iter().enumerate() {
        let label = stage_name(stage);

        match operation(stage).await {
            Ok(result) => {
                if index > 0 {
                    debug!(
                        "{}: {} succeeded on stage {}/{}",
                        operation_name,
                        label,
                        index + 1,
                        total
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if index + 1 < total {
                    warn!(
                        "{}: {} failed ({}), falling back to {}",
                        operation_name,
                        label,
                        e,
                        stage_name(&stages[index + 1])
                    );
                } else {
                    warn!(
                        "{}: All {} stages failed. Last error ({}): {}",
                        operation_name, total, label, e
                    );
                }
                last_error = Some(e);
            }
        }
    }

    Err(Exhausted {
        attempts: total,
        last_error: last_error.expect("At least one stage should have been attempted"),
    })
}
