//! Positional hook storage
//!
//! Hooks are identified by call order: the Nth `use_state` call of a pass
//! maps to the Nth state cell, the Nth `use_effect` call to the Nth effect
//! record. Cells are created lazily on first access and live as long as the
//! runtime. A root function must therefore register its hooks in the same
//! order on every pass; conditional or loop-dependent hook calls are not
//! supported. With [`RuntimeConfig::strict_hook_order`] the store counts
//! calls per pass and reports a mismatch instead of silently misbinding.
//!
//! [`RuntimeConfig::strict_hook_order`]: crate::config::RuntimeConfig::strict_hook_order
//!
//! # Example
//!
//! ```rust
//! use kindling_core::prelude::*;
//!
//! fn counter(cx: &RenderScope) -> Node {
//!     let (count, set_count) = cx.use_state(0u32);
//!     cx.use_effect(move || println!("count is {count}"), Some(count));
//!
//!     Node::new("button")
//!         .on("click", move |_| {
//!             let _ = set_count.set(count + 1);
//!         })
//!         .child(count.to_string())
//! }
//! ```

use std::any::{type_name, Any};
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use tracing::{trace, warn};

use crate::effects::EffectFn;
use crate::error::{BoxError, HookKind, Result, RuntimeError};
use crate::runtime::{RenderRuntime, RuntimeInner};

/// A state slot: the stored value plus the type it was created with
struct StateCell {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl StateCell {
    fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }
}

/// Dependency recorded by the last pass that scheduled the effect
struct EffectRecord {
    dependency: Option<Box<dyn Any>>,
}

/// Storage for state cells and effect records plus the per-pass cursors
#[derive(Default)]
pub(crate) struct HookStore {
    cells: Vec<StateCell>,
    records: Vec<EffectRecord>,
    state_cursor: usize,
    effect_cursor: usize,
    /// Hook counts of the last completed pass
    last_counts: Option<(usize, usize)>,
    /// Strict-mode violation noticed during the current pass
    violation: Option<RuntimeError>,
}

impl HookStore {
    /// Read (or lazily create) the state cell at the next position
    pub(crate) fn use_state<T: Clone + 'static>(&mut self, initial: T, strict: bool) -> (usize, T) {
        let position = self.state_cursor;
        self.state_cursor += 1;

        let existing = self
            .cells
            .get(position)
            .map(|cell| cell.value.downcast_ref::<T>().cloned());

        match existing {
            Some(Some(value)) => {
                trace!(position, "state hook hit");
                (position, value)
            }
            Some(None) => {
                let held = self.cells[position].type_name;
                if strict {
                    self.violation.get_or_insert(RuntimeError::HookTypeMismatch {
                        position,
                        expected: type_name::<T>(),
                    });
                    // the held cell stays, so the next pass reports it again
                    return (position, initial);
                } else {
                    warn!(
                        position,
                        held,
                        requested = type_name::<T>(),
                        "state hook type changed between passes; reinitializing"
                    );
                }
                self.cells[position] = StateCell::new(initial.clone());
                (position, initial)
            }
            None => {
                trace!(position, "state hook created");
                self.cells.push(StateCell::new(initial.clone()));
                (position, initial)
            }
        }
    }

    /// Current value of the cell at `position`, if it holds a `T`
    pub(crate) fn read<T: Clone + 'static>(&self, position: usize) -> Option<T> {
        self.cells
            .get(position)
            .and_then(|cell| cell.value.downcast_ref::<T>().cloned())
    }

    /// Overwrite the cell at `position`
    pub(crate) fn write<T: 'static>(&mut self, position: usize, value: T) {
        if let Some(cell) = self.cells.get_mut(position) {
            *cell = StateCell::new(value);
        }
    }

    /// Advance the effect cursor and decide whether the effect is dirty
    ///
    /// A missing dependency is always dirty. A dependency is compared only
    /// with the one recorded at the same position, and a value of a
    /// different type counts as a change.
    pub(crate) fn effect_dirty<D: PartialEq + 'static>(
        &mut self,
        dependency: Option<D>,
    ) -> (usize, bool) {
        let position = self.effect_cursor;
        self.effect_cursor += 1;

        let recorded = self
            .records
            .get(position)
            .and_then(|record| record.dependency.as_ref());

        let dirty = match (&dependency, recorded) {
            (Some(new), Some(old)) => old.downcast_ref::<D>().map_or(true, |old| old != new),
            _ => true,
        };

        if dirty {
            let record = EffectRecord {
                dependency: dependency.map(|dep| Box::new(dep) as Box<dyn Any>),
            };
            if position < self.records.len() {
                self.records[position] = record;
            } else {
                self.records.push(record);
            }
        }

        (position, dirty)
    }

    /// Close the render phase of a pass
    ///
    /// Reports any strict-mode violation and, in strict mode, a change in
    /// hook counts compared with the previous pass.
    pub(crate) fn close_render(&mut self, strict: bool) -> Result<()> {
        let counts = (self.state_cursor, self.effect_cursor);

        if let Some(violation) = self.violation.take() {
            return Err(violation);
        }
        if strict {
            self.check_counts(counts)?;
        }
        // only an accepted pass becomes the baseline
        self.last_counts = Some(counts);
        Ok(())
    }

    fn check_counts(&self, counts: (usize, usize)) -> Result<()> {
        if let Some((states, effects)) = self.last_counts {
            if states != counts.0 {
                return Err(RuntimeError::HookOrderMismatch {
                    kind: HookKind::State,
                    previous: states,
                    current: counts.0,
                });
            }
            if effects != counts.1 {
                return Err(RuntimeError::HookOrderMismatch {
                    kind: HookKind::Effect,
                    previous: effects,
                    current: counts.1,
                });
            }
        }
        Ok(())
    }

    /// Rewind both cursors for the next pass
    pub(crate) fn reset_cursors(&mut self) {
        self.state_cursor = 0;
        self.effect_cursor = 0;
        self.violation = None;
    }

    pub(crate) fn state_cells(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn effect_records(&self) -> usize {
        self.records.len()
    }
}

// =============================================================================
// Render scope - the hook API seen by render functions
// =============================================================================

/// Handle passed to the root render function for the duration of a pass
#[derive(Clone)]
pub struct RenderScope {
    inner: Rc<RuntimeInner>,
}

impl RenderScope {
    pub(crate) fn new(inner: Rc<RuntimeInner>) -> Self {
        Self { inner }
    }

    /// Positional state hook
    ///
    /// The first call at a position stores `initial`; later passes return the
    /// stored value and ignore `initial`.
    pub fn use_state<T: Clone + 'static>(&self, initial: T) -> (T, StateSetter<T>) {
        let strict = self.inner.config.strict_hook_order;
        let (position, value) = self.inner.hooks.borrow_mut().use_state(initial, strict);
        let setter = StateSetter {
            position,
            runtime: Rc::downgrade(&self.inner),
            _marker: PhantomData,
        };
        (value, setter)
    }

    /// Positional effect hook
    ///
    /// `f` runs after this pass's tree is mounted if `dependency` is `None`
    /// or differs from the dependency recorded at this position.
    pub fn use_effect<D, F>(&self, f: F, dependency: Option<D>)
    where
        D: PartialEq + 'static,
        F: FnOnce() + 'static,
    {
        self.use_fallible_effect(
            move || {
                f();
                Ok(())
            },
            dependency,
        );
    }

    /// Effect hook with no dependency; runs after every pass
    pub fn use_effect_every_pass<F>(&self, f: F)
    where
        F: FnOnce() + 'static,
    {
        self.use_effect(f, None::<()>);
    }

    /// Effect hook whose callback may fail
    ///
    /// An error aborts the remaining effects of the pass and is returned from
    /// the refresh that ran it.
    pub fn use_fallible_effect<D, F>(&self, f: F, dependency: Option<D>)
    where
        D: PartialEq + 'static,
        F: FnOnce() -> std::result::Result<(), BoxError> + 'static,
    {
        let (position, dirty) = self.inner.hooks.borrow_mut().effect_dirty(dependency);
        trace!(position, dirty, "effect hook");
        if dirty {
            let run: EffectFn = Box::new(f);
            self.inner.effects.borrow_mut().schedule(position, run);
        }
    }

    /// Handle to the runtime driving this pass
    pub fn runtime(&self) -> RenderRuntime {
        RenderRuntime::from_inner(self.inner.clone())
    }
}

/// Setter bound to one state position
///
/// Setting stores the value and schedules a refresh. A setter that outlives
/// its runtime does nothing.
pub struct StateSetter<T> {
    position: usize,
    runtime: Weak<RuntimeInner>,
    _marker: PhantomData<fn(T)>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            position: self.position,
            runtime: self.runtime.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateSetter")
            .field("position", &self.position)
            .finish()
    }
}

impl<T: 'static> StateSetter<T> {
    /// Store `value` and request a refresh
    ///
    /// Outside a refresh or batch the refresh runs before this returns;
    /// otherwise it is deferred.
    pub fn set(&self, value: T) -> Result<()> {
        let Some(inner) = self.runtime.upgrade() else {
            return Ok(());
        };
        inner.hooks.borrow_mut().write(self.position, value);
        RenderRuntime::from_inner(inner).schedule_refresh()
    }

    /// Replace the value with `f(current)` and request a refresh
    pub fn update(&self, f: impl FnOnce(T) -> T) -> Result<()>
    where
        T: Clone,
    {
        let Some(inner) = self.runtime.upgrade() else {
            return Ok(());
        };
        let current = inner.hooks.borrow().read::<T>(self.position);
        match current {
            Some(current) => self.set(f(current)),
            None => Ok(()),
        }
    }

    /// Position of the bound cell
    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_initializes_once() {
        let mut store = HookStore::default();

        assert_eq!(store.use_state(1i32, false), (0, 1));
        store.reset_cursors();
        assert_eq!(store.use_state(99i32, false), (0, 1));
    }

    #[test]
    fn test_write_is_visible_at_same_position_only() {
        let mut store = HookStore::default();
        store.use_state("a".to_string(), false);
        store.use_state("b".to_string(), false);
        store.use_state("c".to_string(), false);
        store.reset_cursors();

        store.write(1, "B".to_string());

        let values: Vec<_> = ["x", "y", "z"]
            .into_iter()
            .map(|initial| store.use_state(initial.to_string(), false).1)
            .collect();
        assert_eq!(values, vec!["a", "B", "c"]);
    }

    #[test]
    fn test_effect_dirty_tracks_previous_dependency() {
        let mut store = HookStore::default();

        assert_eq!(store.effect_dirty(Some(1)), (0, true));
        store.reset_cursors();
        assert_eq!(store.effect_dirty(Some(1)), (0, false));
        store.reset_cursors();
        assert_eq!(store.effect_dirty(Some(2)), (0, true));
        store.reset_cursors();
        assert_eq!(store.effect_dirty(Some(2)), (0, false));
    }

    #[test]
    fn test_missing_dependency_is_always_dirty() {
        let mut store = HookStore::default();
        for _ in 0..3 {
            assert_eq!(store.effect_dirty(None::<i32>), (0, true));
            store.reset_cursors();
        }
    }

    #[test]
    fn test_dependency_of_new_type_counts_as_change() {
        let mut store = HookStore::default();
        store.effect_dirty(Some(1u8));
        store.reset_cursors();
        assert_eq!(store.effect_dirty(Some("1")), (0, true));
    }

    #[test]
    fn test_effect_positions_are_independent() {
        let mut store = HookStore::default();
        store.effect_dirty(Some('a'));
        store.effect_dirty(Some('b'));
        store.reset_cursors();

        assert_eq!(store.effect_dirty(Some('a')), (0, false));
        assert_eq!(store.effect_dirty(Some('c')), (1, true));
    }

    #[test]
    fn test_type_mismatch_reinitializes_when_lenient() {
        let mut store = HookStore::default();
        store.use_state(5u32, false);
        store.reset_cursors();

        assert_eq!(store.use_state(String::from("s"), false), (0, "s".to_string()));
        assert!(store.close_render(false).is_ok());
    }

    #[test]
    fn test_type_mismatch_reported_when_strict() {
        let mut store = HookStore::default();
        store.use_state(5u32, true);
        store.close_render(true).unwrap();
        store.reset_cursors();

        store.use_state(String::from("s"), true);
        assert!(matches!(
            store.close_render(true),
            Err(RuntimeError::HookTypeMismatch { position: 0, .. })
        ));
    }

    #[test]
    fn test_rejected_pass_keeps_count_baseline() {
        let mut store = HookStore::default();
        store.use_state(1, true);
        store.close_render(true).unwrap();

        for _ in 0..2 {
            store.reset_cursors();
            store.use_state(1, true);
            store.use_state(2, true);
            assert!(matches!(
                store.close_render(true),
                Err(RuntimeError::HookOrderMismatch {
                    kind: HookKind::State,
                    previous: 1,
                    current: 2,
                })
            ));
        }

        store.reset_cursors();
        store.use_state(1, true);
        assert!(store.close_render(true).is_ok());
    }

    #[test]
    fn test_strict_type_mismatch_keeps_held_cell() {
        let mut store = HookStore::default();
        store.use_state(5u32, true);
        store.close_render(true).unwrap();

        for _ in 0..2 {
            store.reset_cursors();
            store.use_state(String::from("s"), true);
            assert!(store.close_render(true).is_err());
        }

        store.reset_cursors();
        assert_eq!(store.use_state(0u32, true), (0, 5));
        assert!(store.close_render(true).is_ok());
    }

    #[test]
    fn test_count_mismatch_reported_when_strict() {
        let mut store = HookStore::default();
        store.use_state(1, true);
        store.use_state(2, true);
        store.close_render(true).unwrap();
        store.reset_cursors();

        store.use_state(1, true);
        assert!(matches!(
            store.close_render(true),
            Err(RuntimeError::HookOrderMismatch {
                kind: HookKind::State,
                previous: 2,
                current: 1,
            })
        ));
    }

    #[test]
    fn test_count_mismatch_ignored_when_lenient() {
        let mut store = HookStore::default();
        store.effect_dirty(None::<()>);
        store.close_render(false).unwrap();
        store.reset_cursors();

        assert!(store.close_render(false).is_ok());
    }
}
