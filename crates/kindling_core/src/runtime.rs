//! Kindling Runtime
//!
//! The render runtime that owns hook storage, the effect queue, the refresh
//! controller and the mount binding. All of it lives in one context object
//! rather than process-wide statics; cloning a [`RenderRuntime`] yields
//! another handle to the same runtime.
//!
//! A refresh runs whole passes: call the root function, hand the new tree to
//! the sink, run the effects approved during the pass, rewind the hook
//! cursors. Refresh requests made during a pass are replayed as further
//! passes before `refresh` returns. An effect that requests a refresh on
//! every pass without a dependency guard makes that loop unbounded unless
//! [`RuntimeConfig::max_passes_per_refresh`] is set.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::config::RuntimeConfig;
use crate::controller::{RefreshController, RefreshPhase};
use crate::effects::EffectScheduler;
use crate::error::{Result, RuntimeError};
use crate::hooks::{HookStore, RenderScope};
use crate::node::Node;
use crate::sink::{TargetResolver, TreeSink};

/// Root render function
pub type RootFn = Rc<dyn Fn(&RenderScope) -> Node>;

/// Binding between a mount point and the root function
struct MountContext {
    /// `None` when the mount target could not be resolved
    sink: Option<Box<dyn TreeSink>>,
    root: RootFn,
}

pub(crate) struct RuntimeInner {
    pub(crate) config: RuntimeConfig,
    pub(crate) hooks: RefCell<HookStore>,
    pub(crate) effects: RefCell<EffectScheduler>,
    controller: RefCell<RefreshController>,
    mount: RefCell<Option<MountContext>>,
    /// Completed render passes since creation
    passes: Cell<u64>,
}

/// The Kindling render runtime
#[derive(Clone)]
pub struct RenderRuntime {
    inner: Rc<RuntimeInner>,
}

impl RenderRuntime {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            inner: Rc::new(RuntimeInner {
                config,
                hooks: RefCell::new(HookStore::default()),
                effects: RefCell::new(EffectScheduler::default()),
                controller: RefCell::new(RefreshController::new()),
                mount: RefCell::new(None),
                passes: Cell::new(0),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<RuntimeInner>) -> Self {
        Self { inner }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    // =========================================================================
    // MOUNTING
    // =========================================================================

    /// Mount `root` at the target named `target_id` and render it
    ///
    /// An unresolvable target is not an error: the runtime stays bound to
    /// `root` but every refresh is a no-op.
    pub fn mount<F>(&self, resolver: &dyn TargetResolver, target_id: &str, root: F) -> Result<()>
    where
        F: Fn(&RenderScope) -> Node + 'static,
    {
        let sink = resolver.resolve(target_id);
        if sink.is_none() {
            warn!(target_id, "mount target not found; refreshes will be no-ops");
        } else {
            debug!(target_id, "mounting root");
        }
        self.bind(sink, Rc::new(root))
    }

    /// Mount `root` directly into `sink` and render it
    pub fn mount_into<S, F>(&self, sink: S, root: F) -> Result<()>
    where
        S: TreeSink + 'static,
        F: Fn(&RenderScope) -> Node + 'static,
    {
        debug!("mounting root into sink");
        self.bind(Some(Box::new(sink)), Rc::new(root))
    }

    fn bind(&self, sink: Option<Box<dyn TreeSink>>, root: RootFn) -> Result<()> {
        self.inner.mount.replace(Some(MountContext { sink, root }));
        self.schedule_refresh()
    }

    /// Whether a root is bound to a resolved mount point
    pub fn is_mounted(&self) -> bool {
        self.inner
            .mount
            .borrow()
            .as_ref()
            .is_some_and(|mount| mount.sink.is_some())
    }

    // =========================================================================
    // REFRESH LOOP
    // =========================================================================

    /// Request a refresh
    ///
    /// Runs the refresh immediately when idle and outside a batch. While a
    /// pass is running the request is deferred and replayed after the pass.
    pub fn schedule_refresh(&self) -> Result<()> {
        let run_now = self.inner.controller.borrow_mut().schedule();
        if run_now {
            self.refresh()
        } else {
            trace!(
                phase = ?self.phase(),
                "refresh deferred"
            );
            Ok(())
        }
    }

    /// Run pending render passes until no request is outstanding
    ///
    /// A no-op when nothing is mounted, nothing is pending, or a pass is
    /// already running.
    pub fn refresh(&self) -> Result<()> {
        if !self.is_mounted() {
            self.inner.controller.borrow_mut().cancel();
            return Ok(());
        }

        let mut passes: u32 = 0;
        loop {
            if let Some(limit) = self.inner.config.max_passes_per_refresh {
                if passes >= limit && self.phase() == RefreshPhase::Pending {
                    return Err(RuntimeError::RefreshLimitExceeded { passes: limit });
                }
            }
            if !self.inner.controller.borrow_mut().begin() {
                return Ok(());
            }
            passes += 1;

            let outcome = self.render_pass();
            self.inner.controller.borrow_mut().finish();
            self.reset_cycle();
            outcome?;
        }
    }

    /// One pass: render, swap, run effects
    fn render_pass(&self) -> Result<()> {
        let root = match self.inner.mount.borrow().as_ref() {
            Some(mount) => mount.root.clone(),
            None => return Ok(()),
        };
        let pass = self.inner.passes.get() + 1;
        debug!(pass, "render pass started");

        let tree = root(&RenderScope::new(self.inner.clone()));
        self.inner
            .hooks
            .borrow_mut()
            .close_render(self.inner.config.strict_hook_order)?;

        if let Some(sink) = self
            .inner
            .mount
            .borrow_mut()
            .as_mut()
            .and_then(|mount| mount.sink.as_mut())
        {
            sink.replace_children(tree);
        }
        self.inner.passes.set(pass);

        let effects = {
            let mut scheduler = self.inner.effects.borrow_mut();
            trace!(pass, queued = scheduler.len(), "running effects");
            scheduler.take()
        };
        let ran = effects.run()?;
        debug!(pass, effects = ran, "render pass finished");
        Ok(())
    }

    /// Rewind hook cursors and drop unrun effects for the next pass
    fn reset_cycle(&self) {
        self.inner.hooks.borrow_mut().reset_cursors();
        self.inner.effects.borrow_mut().clear();
    }

    // =========================================================================
    // BATCHING
    // =========================================================================

    /// Run `f` with refreshes held back, then refresh once if anything
    /// requested it
    pub fn batch<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        self.inner.controller.borrow_mut().batch_start();
        let result = f();
        let refresh = self.inner.controller.borrow_mut().batch_end();
        if refresh {
            self.refresh()?;
        }
        Ok(result)
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    pub fn phase(&self) -> RefreshPhase {
        self.inner.controller.borrow().phase()
    }

    /// Get statistics about the runtime
    pub fn stats(&self) -> RuntimeStats {
        let hooks = self.inner.hooks.borrow();
        let controller = self.inner.controller.borrow();
        RuntimeStats {
            passes: self.inner.passes.get(),
            state_cells: hooks.state_cells(),
            effect_records: hooks.effect_records(),
            pending_requests: controller.pending_requests(),
            phase: controller.phase(),
        }
    }
}

impl Default for RenderRuntime {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}

/// Statistics about the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStats {
    pub passes: u64,
    pub state_cells: usize,
    pub effect_records: usize,
    pub pending_requests: u32,
    pub phase: RefreshPhase,
}
