use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize},
        Arc, LazyLock, Mutex, PoisonError, Weak,
    },
    time::Duration,
};

use tokio::time::MissedTickBehavior;

use crate::{Labels, Meter};

/// How often meters are ticked. The 1, 5 and 15 minute averages are tuned for this.
pub const DEFAULT_TICK_CADENCE: Duration = Duration::from_secs(5);

/// The default meter ticker. Registries share it unless you give them their own.
///
/// Remember to tick_meters_forever() or spawn_ticker_thread() at the start of
/// your program if you use meters.
pub fn default_meter_ticker() -> &'static MeterTicker {
    static DEFAULT_METER_TICKER: LazyLock<MeterTicker> = LazyLock::new(MeterTicker::default);

    &DEFAULT_METER_TICKER
}

/// One periodic task that advances the moving averages of every meter it
/// tracks, instead of one task per meter.
///
/// It is cheap to clone; clones tick the same set of meters. Meters are held
/// weakly: once every other reference to a meter is dropped, or the meter is
/// stopped, the ticker forgets it.
#[derive(Clone, Debug, Default)]
pub struct MeterTicker {
    meters: Arc<Mutex<Vec<Weak<Meter>>>>,
}

impl MeterTicker {
    /// Make a new meter that this ticker advances
    pub fn meter(&self, labels: Labels) -> Arc<Meter> {
        let meter = Arc::new(Meter::new(labels));
        self.track(&meter);
        meter
    }

    /// Start ticking an existing meter. Tracking the same meter twice is harmless.
    ///
    /// Dropped and stopped meters are forgotten here too, so the tracked set
    /// stays bounded when nothing is ticking.
    pub fn track(&self, meter: &Arc<Meter>) {
        let mut meters = self.meters.lock().unwrap_or_else(PoisonError::into_inner);
        Self::forget_finished(&mut meters);
        let weak = Arc::downgrade(meter);
        if !meters.iter().any(|tracked| tracked.ptr_eq(&weak)) {
            meters.push(weak);
        }
    }

    /// Number of meters currently tracked, including ones not yet pruned
    pub fn tracked_meters(&self) -> usize {
        self.meters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Tick every live meter once, forgetting dropped and stopped meters.
    /// Returns how many meters were ticked.
    pub fn tick(&self) -> usize {
        let live: Vec<Arc<Meter>> = {
            let mut meters = self.meters.lock().unwrap_or_else(PoisonError::into_inner);
            Self::forget_finished(&mut meters);
            meters.iter().filter_map(Weak::upgrade).collect()
        };
        for meter in &live {
            meter.tick();
        }
        live.len()
    }

    fn forget_finished(meters: &mut Vec<Weak<Meter>>) {
        let before = meters.len();
        meters.retain(|meter| meter.upgrade().is_some_and(|meter| !meter.is_stopped()));
        if meters.len() < before {
            log::debug!("stopped ticking {} meters", before - meters.len());
        }
    }

    /// You'll want to schedule this in your runtime if you are using Meters.
    ///
    /// You can use a clone of self for this function.
    pub async fn tick_meters_forever(self, cadence: Duration) {
        let mut interval = tokio::time::interval(cadence);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::debug!("ticking meters every {cadence:?}");
        loop {
            interval.tick().await;
            let ticked = self.tick();
            log::trace!("ticked {ticked} meters");
        }
    }

    /// Tick meters on a dedicated thread until the returned flag is set.
    pub fn spawn_ticker_thread(
        self,
        cadence: Duration,
    ) -> Result<(std::thread::JoinHandle<()>, Arc<AtomicBool>), std::io::Error> {
        let abort = Arc::new(AtomicBool::new(false));
        static I: AtomicUsize = AtomicUsize::new(0);
        let thread_id = I.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let thread_abort = abort.clone();
        std::thread::Builder::new()
            .name(format!("meter-ticker-{thread_id}"))
            .spawn(move || {
                self.tick_meters_until(thread_abort, cadence);
            })
            .map(|handle| (handle, abort))
    }

    /// This consumes the calling thread until `abort` is set.
    /// Consider calling spawn_ticker_thread instead.
    pub fn tick_meters_until(&self, abort: Arc<AtomicBool>, cadence: Duration) {
        loop {
            if abort.load(std::sync::atomic::Ordering::Relaxed) {
                log::info!("quitting meter ticker");
                break;
            }
            std::thread::sleep(cadence);
            self.tick();
        }
    }
}
