//! Periodic measure → compensate → publish loop.

use embedded_hal_async::delay::DelayNs;
use log::{debug, warn};

use crate::sensors::Sensor;

/// Destination for the readings produced by an [`AcquisitionLoop`].
pub trait ReadingSink<R, E> {
    /// Called with every successful reading.
    fn publish(&mut self, readings: &R);

    /// Called when a cycle fails; the loop carries on with the next cycle.
    fn report_error(&mut self, error: &E);
}

/// Outcome counters of [`AcquisitionLoop::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcquisitionStats {
    pub cycles: usize,
    pub failures: usize,
}

/// Drives a sensor at a fixed interval and hands results to a sink.
pub struct AcquisitionLoop<S, C, K, const COUNT: usize> {
    sensor: S,
    delay: C,
    sink: K,
    interval_ms: u32,
}

impl<S, C, K, const COUNT: usize> AcquisitionLoop<S, C, K, COUNT>
where
    S: Sensor<COUNT>,
    C: DelayNs,
    K: ReadingSink<S::Readings, S::Error>,
{
    pub fn new(sensor: S, delay: C, sink: K, interval_ms: u32) -> Self {
        Self {
            sensor,
            delay,
            sink,
            interval_ms,
        }
    }

    /// One measurement cycle. No retry: a failure is reported to the sink
    /// and returned, and the next cycle starts from scratch.
    pub async fn run_cycle(&mut self) -> Result<(), S::Error> {
        match self.sensor.read().await {
            Ok(readings) => {
                self.sink.publish(&readings);
                Ok(())
            }
            Err(e) => {
                warn!("Acquisition cycle failed: {:?}", e);
                self.sink.report_error(&e);
                Err(e)
            }
        }
    }

    /// Runs `cycles` cycles, or forever when `None`, waiting the configured
    /// interval between cycles.
    pub async fn run(&mut self, cycles: Option<usize>) -> AcquisitionStats {
        let mut stats = AcquisitionStats::default();

        loop {
            if cycles.is_some_and(|limit| stats.cycles >= limit) {
                break;
            }

            if self.run_cycle().await.is_err() {
                stats.failures += 1;
            }
            stats.cycles += 1;
            debug!("Acquisition cycle {} done", stats.cycles);

            if cycles.is_none_or(|limit| stats.cycles < limit) {
                self.delay.delay_ms(self.interval_ms).await;
            }
        }

        stats
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn release(self) -> (S, C, K) {
        (self.sensor, self.delay, self.sink)
    }
}
