// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

//! Synchronized blinking of LEDs.

use std::{collections::BTreeMap, fmt};

use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BlinkSpeed {
    /// Toggles on every tick.
    Fast,
    /// Toggles on every other tick.
    Slow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkPhase {
    pub fast: bool,
    pub slow: bool,
}

impl BlinkPhase {
    pub const INITIAL: Self = Self {
        fast: true,
        slow: true,
    };

    #[must_use]
    pub const fn value(self, speed: BlinkSpeed) -> bool {
        match speed {
            BlinkSpeed::Fast => self.fast,
            BlinkSpeed::Slow => self.slow,
        }
    }

    /// The slow phase flips whenever the fast phase turns on again.
    #[must_use]
    pub const fn next(self) -> Self {
        let fast = !self.fast;
        let slow = if fast { !self.slow } else { self.slow };
        Self { fast, slow }
    }
}

/// Generates the sequence of blink phases.
///
/// The first tick yields [`BlinkPhase::INITIAL`], i.e. blinking LEDs
/// are lit immediately.
#[derive(Debug, Default)]
pub struct BlinkTicker {
    phase: Option<BlinkPhase>,
}

impl BlinkTicker {
    /// The most recent phase, `None` before the first tick.
    #[must_use]
    pub const fn phase(&self) -> Option<BlinkPhase> {
        self.phase
    }

    pub fn tick(&mut self) -> BlinkPhase {
        let phase = self.phase.map_or(BlinkPhase::INITIAL, BlinkPhase::next);
        self.phase = Some(phase);
        phase
    }

    pub fn reset(&mut self) {
        self.phase = None;
    }
}

/// Invoked with the shared context and the current phase of the
/// enrolled speed.
pub type BlinkCallback<C> = Box<dyn FnMut(&mut C, bool) + Send>;

struct Enrollment<C> {
    speed: BlinkSpeed,
    callback: BlinkCallback<C>,
}

/// Drives the callbacks of all enrolled keys from a single ticker.
///
/// Fast callbacks are invoked on every tick. Slow callbacks are only
/// invoked on ticks when the fast phase is on, i.e. at half the rate.
/// Callbacks are invoked in key order.
pub struct BlinkScheduler<K, C> {
    ticker: BlinkTicker,
    enrollments: BTreeMap<K, Enrollment<C>>,
}

impl<K, C> Default for BlinkScheduler<K, C> {
    fn default() -> Self {
        Self {
            ticker: Default::default(),
            enrollments: BTreeMap::new(),
        }
    }
}

impl<K, C> fmt::Debug for BlinkScheduler<K, C>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlinkScheduler")
            .field("ticker", &self.ticker)
            .field(
                "enrollments",
                &self
                    .enrollments
                    .iter()
                    .map(|(key, enrollment)| (key, enrollment.speed))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<K, C> BlinkScheduler<K, C>
where
    K: Ord,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enroll or re-enroll a key.
    ///
    /// Takes effect on the next tick. Returns the speed of a replaced
    /// enrollment.
    pub fn enroll(
        &mut self,
        key: K,
        speed: BlinkSpeed,
        callback: BlinkCallback<C>,
    ) -> Option<BlinkSpeed> {
        self.enrollments
            .insert(key, Enrollment { speed, callback })
            .map(|replaced| replaced.speed)
    }

    /// Returns `true` if the key has been enrolled.
    pub fn unenroll(&mut self, key: &K) -> bool {
        self.enrollments.remove(key).is_some()
    }

    #[must_use]
    pub fn speed(&self, key: &K) -> Option<BlinkSpeed> {
        self.enrollments.get(key).map(|enrollment| enrollment.speed)
    }

    #[must_use]
    pub fn is_enrolled(&self, key: &K) -> bool {
        self.enrollments.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.enrollments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enrollments.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.enrollments.keys()
    }

    #[must_use]
    pub const fn phase(&self) -> Option<BlinkPhase> {
        self.ticker.phase()
    }

    /// Remove all enrollments.
    ///
    /// The phase continues.
    pub fn clear(&mut self) {
        self.enrollments.clear();
    }

    /// Remove all enrollments and restart from the initial phase.
    pub fn reset(&mut self) {
        self.clear();
        self.ticker.reset();
    }

    pub fn tick(&mut self, context: &mut C) -> BlinkPhase {
        let phase = self.ticker.tick();
        for Enrollment { speed, callback } in self.enrollments.values_mut() {
            match speed {
                BlinkSpeed::Fast => callback(context, phase.fast),
                BlinkSpeed::Slow => {
                    if phase.fast {
                        callback(context, phase.slow);
                    }
                }
            }
        }
        phase
    }
}
