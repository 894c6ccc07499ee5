// SPDX-FileCopyrightText: The djio authors
// SPDX-License-Identifier: MPL-2.0

use std::{future::Future, time::Duration};

use futures_util::future::{AbortHandle, Abortable, Aborted};

pub const DEFAULT_BLINK_PERIOD: Duration = Duration::from_millis(700);

/// Invoke `on_tick` periodically.
///
/// All blinking LEDs are driven from a single task to synchronize
/// their frequencies.
#[expect(clippy::manual_async_fn)] // Explicit return type to to enforce the trait bounds
pub fn blinking_led_task<F>(period: Duration, mut on_tick: F) -> impl Future<Output = ()> + Send + 'static
where
    F: FnMut() + Send + 'static,
{
    async move {
        let mut interval = tokio::time::interval(period);
        // Unlikely that a tick is missed. If it happens, then simply delay the next tick.
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            // The first tick arrives immediately
            interval.tick().await;
            on_tick();
        }
    }
}

/// Dedicated thread for the blink timer.
#[derive(Debug)]
pub struct BlinkThread {
    abort_handle: AbortHandle,
    os_thread: std::thread::JoinHandle<()>,
}

impl BlinkThread {
    #[must_use]
    pub fn spawn<F>(period: Duration, on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (abort_handle, abort_registration) = AbortHandle::new_pair();
        let abortable_task = Abortable::new(blinking_led_task(period, on_tick), abort_registration);
        let os_thread = std::thread::spawn(move || {
            log::info!("Entering blink thread");
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    log::error!("Failed to create Tokio runtime: {err}");
                    return;
                }
            };
            runtime.block_on(async move {
                log::info!("Blinking LEDs every {period:?}");
                match abortable_task.await {
                    Ok(()) => {
                        log::info!("Blink task terminated");
                    }
                    Err(Aborted) => {
                        log::info!("Blink task aborted");
                    }
                }
            });
            log::info!("Exiting blink thread");
        });
        Self {
            abort_handle,
            os_thread,
        }
    }

    pub fn abort_and_join(self) -> anyhow::Result<()> {
        let Self {
            abort_handle,
            os_thread,
        } = self;
        abort_handle.abort();
        os_thread
            .join()
            .map_err(|err| anyhow::anyhow!("Blink thread panicked: {err:?}"))
    }
}
