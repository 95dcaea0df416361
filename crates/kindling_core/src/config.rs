//! Runtime configuration

/// Tunables for a [`RenderRuntime`](crate::runtime::RenderRuntime)
///
/// The defaults reproduce the plain runtime behavior: hook order is trusted
/// and the replay loop is unbounded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Compare hook call counts between passes and fail fast on a mismatch
    pub strict_hook_order: bool,
    /// Upper bound on render passes replayed by a single refresh
    pub max_passes_per_refresh: Option<u32>,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable strict hook-order checking
    pub fn strict_hook_order(mut self, enabled: bool) -> Self {
        self.strict_hook_order = enabled;
        self
    }

    /// Limit the number of passes one refresh may replay
    pub fn max_passes_per_refresh(mut self, limit: u32) -> Self {
        self.max_passes_per_refresh = Some(limit);
        self
    }
}
