//! Ordered fallback over overlay strategies.
//!
//! ```text
//! Pending(remaining) --success--> Succeeded(layer, bounds) --set_view--> done
//!        |
//!        +--failure--> Pending(remaining - 1) ... --empty--> Exhausted(failures)
//! ```
//!
//! Every strategy is tried at most once, strictly in order, and nothing
//! runs after the first success.

use std::path::Path;

use overlay_common::{ViewMode, ViewRequest};
use tracing::{debug, info, warn};

use crate::error::StrategyFailure;
use crate::sink::MapSink;
use crate::strategy::{LayerPlacement, OverlayStrategy};

/// Result of a single strategy attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    Success(LayerPlacement),
    Failure(StrategyFailure),
}

/// Result of running the whole chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainOutcome {
    Succeeded {
        strategy: String,
        placement: LayerPlacement,
        view: ViewRequest,
        /// Strategies that failed before the successful one
        failures: Vec<StrategyFailure>,
    },
    Exhausted(Vec<StrategyFailure>),
}

impl ChainOutcome {
    pub fn failures(&self) -> &[StrategyFailure] {
        match self {
            ChainOutcome::Succeeded { failures, .. } | ChainOutcome::Exhausted(failures) => failures,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ChainOutcome::Succeeded { .. })
    }
}

enum ChainState {
    Pending {
        next: usize,
        failures: Vec<StrategyFailure>,
    },
    Succeeded {
        strategy: String,
        placement: LayerPlacement,
        failures: Vec<StrategyFailure>,
    },
    Exhausted(Vec<StrategyFailure>),
}

/// Strategies in priority order plus how to frame the view on success.
pub struct OverlayStrategyChain {
    strategies: Vec<Box<dyn OverlayStrategy>>,
    view_mode: ViewMode,
}

impl OverlayStrategyChain {
    pub fn new(strategies: Vec<Box<dyn OverlayStrategy>>, view_mode: ViewMode) -> Self {
        Self {
            strategies,
            view_mode,
        }
    }

    /// Strategy names in attempt order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Try strategies in order until one registers a layer.
    ///
    /// On success the sink receives exactly one `set_view` call. On
    /// exhaustion it receives none and the failures come back in attempt order.
    pub fn run(&self, path: &Path, sink: &mut dyn MapSink) -> ChainOutcome {
        let mut state = ChainState::Pending {
            next: 0,
            failures: Vec::new(),
        };

        loop {
            state = match state {
                ChainState::Pending { next, mut failures } => match self.strategies.get(next) {
                    None => ChainState::Exhausted(failures),
                    Some(strategy) => match attempt(strategy.as_ref(), path, sink) {
                        StrategyOutcome::Success(placement) => ChainState::Succeeded {
                            strategy: strategy.name().to_string(),
                            placement,
                            failures,
                        },
                        StrategyOutcome::Failure(failure) => {
                            failures.push(failure);
                            ChainState::Pending {
                                next: next + 1,
                                failures,
                            }
                        }
                    },
                },
                ChainState::Succeeded {
                    strategy,
                    placement,
                    failures,
                } => {
                    let view = self.view_mode.request_for(&placement.bounds);
                    if let Err(e) = sink.set_view(view) {
                        warn!(error = %e, "Map rejected view request");
                    }
                    info!(
                        strategy = %strategy,
                        layer = %placement.handle,
                        bounds = %placement.bounds,
                        failed_before = failures.len(),
                        "Overlay registered"
                    );
                    return ChainOutcome::Succeeded {
                        strategy,
                        placement,
                        view,
                        failures,
                    };
                }
                ChainState::Exhausted(failures) => return ChainOutcome::Exhausted(failures),
            };
        }
    }
}

fn attempt(strategy: &dyn OverlayStrategy, path: &Path, sink: &mut dyn MapSink) -> StrategyOutcome {
    let name = strategy.name();
    debug!(strategy = %name, path = %path.display(), "Trying overlay strategy");
    metrics::counter!("overlay_strategy_attempts_total", "strategy" => name.to_string()).increment(1);

    match strategy.attempt(path, sink) {
        Ok(placement) => StrategyOutcome::Success(placement),
        Err(e) => {
            warn!(strategy = %name, kind = e.kind(), error = %e, "Overlay strategy failed");
            metrics::counter!("overlay_strategy_failures_total", "strategy" => name.to_string())
                .increment(1);
            StrategyOutcome::Failure(StrategyFailure::new(name, &e))
        }
    }
}
