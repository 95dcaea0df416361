//! Effect scheduling
//!
//! Effects approved by the hook store during a pass are queued here and run
//! once the pass's tree has been handed to the sink. The queue is drained on
//! every pass, so an effect runs at most once per pass.

use smallvec::SmallVec;
use tracing::trace;

use crate::error::{BoxError, Result, RuntimeError};

/// A queued effect callback
pub(crate) type EffectFn = Box<dyn FnOnce() -> std::result::Result<(), BoxError>>;

struct PendingEffect {
    /// Registration position within the pass
    position: usize,
    run: EffectFn,
}

/// Effects approved during the current pass, in registration order
#[derive(Default)]
pub(crate) struct EffectScheduler {
    pending: SmallVec<[PendingEffect; 4]>,
}

impl EffectScheduler {
    pub(crate) fn schedule(&mut self, position: usize, run: EffectFn) {
        trace!(position, "effect scheduled");
        self.pending.push(PendingEffect { position, run });
    }

    /// Take the queue so it can run without borrowing the scheduler
    pub(crate) fn take(&mut self) -> EffectBatch {
        EffectBatch {
            effects: std::mem::take(&mut self.pending),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }
}

/// The effects of one pass, detached from the scheduler
pub(crate) struct EffectBatch {
    effects: SmallVec<[PendingEffect; 4]>,
}

impl EffectBatch {
    /// Run every effect in registration order
    ///
    /// The first failure stops the batch; later effects are dropped unrun.
    /// Returns the number of effects that ran successfully.
    pub(crate) fn run(self) -> Result<usize> {
        let mut ran = 0;
        for PendingEffect { position, run } in self.effects {
            run().map_err(|source| RuntimeError::Effect { position, source })?;
            ran += 1;
        }
        Ok(ran)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<usize>>>, id: usize) -> EffectFn {
        let log = log.clone();
        Box::new(move || {
            log.borrow_mut().push(id);
            Ok(())
        })
    }

    #[test]
    fn test_runs_in_registration_order_and_drains() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = EffectScheduler::default();

        scheduler.schedule(0, recorder(&log, 10));
        scheduler.schedule(2, recorder(&log, 30));
        scheduler.schedule(1, recorder(&log, 20));
        assert_eq!(scheduler.len(), 3);

        let ran = scheduler.take().run().unwrap();
        assert_eq!(ran, 3);
        assert_eq!(*log.borrow(), vec![10, 30, 20]);
        assert_eq!(scheduler.len(), 0);
    }

    #[test]
    fn test_failure_aborts_remaining_effects() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = EffectScheduler::default();

        scheduler.schedule(0, recorder(&log, 1));
        scheduler.schedule(
            1,
            Box::new(|| -> std::result::Result<(), BoxError> { Err("fetch failed".into()) }),
        );
        scheduler.schedule(2, recorder(&log, 3));

        let err = scheduler.take().run().unwrap_err();
        assert!(matches!(err, RuntimeError::Effect { position: 1, .. }));
        assert_eq!(err.to_string(), "effect at position 1 failed: fetch failed");
        assert_eq!(*log.borrow(), vec![1]);
    }

    #[test]
    fn test_clear_drops_queue() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = EffectScheduler::default();
        scheduler.schedule(0, recorder(&log, 1));

        scheduler.clear();
        assert_eq!(scheduler.take().run().unwrap(), 0);
        assert!(log.borrow().is_empty());
    }
}
