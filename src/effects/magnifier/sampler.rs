//! Background screen sampling for the magnifier lens.
//!
//! The event loop asks for samples; a Tokio task grabs a screenshot through a
//! [`ScreenSource`], decodes it and leaves it in a shared slot. The loop picks
//! it up with [`MagnifierSampler::try_sample`] without ever blocking.

use super::{portal, reader};
use async_trait::async_trait;
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{Mutex, OnceCell};

/// Errors from grabbing or decoding a screen sample.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("xdg-desktop-portal is not available")]
    PortalUnavailable,

    #[error("Screen access was denied")]
    PermissionDenied,

    #[error("D-Bus communication error: {0}")]
    DBus(#[from] zbus::Error),

    #[error("Failed to decode screen sample: {0}")]
    Decode(String),

    #[error("Portal returned invalid response: {0}")]
    InvalidResponse(String),
}

impl SampleError {
    /// Whether retrying is pointless and the magnifier should switch off.
    pub fn disables_magnifier(&self) -> bool {
        matches!(
            self,
            SampleError::PortalUnavailable | SampleError::PermissionDenied | SampleError::DBus(_)
        )
    }
}

/// Decoded screenshot pixels, ready to wrap in a cairo surface on the loop thread.
#[derive(Debug)]
pub struct ScreenSample {
    pub width: i32,
    pub height: i32,
    pub stride: i32,
    pub format: cairo::Format,
    pub data: Vec<u8>,
}

impl ScreenSample {
    pub fn decode_png(bytes: &[u8]) -> Result<Self, SampleError> {
        let mut surface = cairo::ImageSurface::create_from_png(&mut Cursor::new(bytes))
            .map_err(|e| SampleError::Decode(e.to_string()))?;
        surface.flush();

        let width = surface.width();
        let height = surface.height();
        let stride = surface.stride();
        let format = surface.format();
        let data = surface
            .data()
            .map_err(|e| SampleError::Decode(e.to_string()))?
            .to_vec();

        Ok(Self {
            width,
            height,
            stride,
            format,
            data,
        })
    }

    pub fn into_surface(self) -> Result<cairo::ImageSurface, cairo::Error> {
        cairo::ImageSurface::create_for_data(
            self.data,
            self.format,
            self.width,
            self.height,
            self.stride,
        )
    }
}

/// Where screen pixels come from. Returns PNG bytes.
#[async_trait]
pub trait ScreenSource: Send + Sync {
    async fn grab(&self) -> Result<Vec<u8>, SampleError>;
}

/// Samples through the xdg-desktop-portal Screenshot interface.
#[derive(Default)]
pub struct PortalScreenSource {
    connection: OnceCell<zbus::Connection>,
}

#[async_trait]
impl ScreenSource for PortalScreenSource {
    async fn grab(&self) -> Result<Vec<u8>, SampleError> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                zbus::Connection::session()
                    .await
                    .map_err(|_| SampleError::PortalUnavailable)
            })
            .await?;

        let uri = portal::screenshot_uri(connection).await?;
        tokio::task::spawn_blocking(move || reader::read_sample_file(&uri))
            .await
            .map_err(|e| SampleError::Decode(format!("Sample reader task failed: {}", e)))?
    }
}

/// What the loop gets back from the sampler.
#[derive(Debug)]
pub enum SamplerEvent {
    /// A fresh sample to show
    Sample(ScreenSample),
    /// Screen access is denied or impossible; the magnifier should turn off
    Unavailable(SampleError),
}

struct Delivery {
    generation: u64,
    result: Result<ScreenSample, SampleError>,
}

/// Throttled, cancellable screen sampler.
///
/// At most one grab is in flight, and a new one starts no sooner than
/// `interval` after the previous one. [`cancel`](Self::cancel) bumps a
/// generation counter so late results from before the cancel are dropped.
pub struct MagnifierSampler {
    runtime: tokio::runtime::Handle,
    source: Arc<dyn ScreenSource>,
    slot: Arc<Mutex<Option<Delivery>>>,
    in_flight: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    interval: Duration,
    last_request: Option<Instant>,
    waker: Option<calloop::ping::Ping>,
    notice_sent: bool,
}

impl MagnifierSampler {
    pub fn new(runtime: &tokio::runtime::Handle, interval: Duration) -> Self {
        Self::with_source(runtime, Arc::new(PortalScreenSource::default()), interval)
    }

    /// Create a sampler with a custom source (useful for testing).
    pub fn with_source(
        runtime: &tokio::runtime::Handle,
        source: Arc<dyn ScreenSource>,
        interval: Duration,
    ) -> Self {
        Self {
            runtime: runtime.clone(),
            source,
            slot: Arc::new(Mutex::new(None)),
            in_flight: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            interval,
            last_request: None,
            waker: None,
            notice_sent: false,
        }
    }

    /// Ping used to wake the event loop when a result lands.
    pub fn set_waker(&mut self, waker: calloop::ping::Ping) {
        self.waker = Some(waker);
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Starts a grab unless one is running or the interval has not elapsed.
    pub fn request(&mut self, now: Instant) -> bool {
        if self.in_flight() {
            return false;
        }
        if let Some(last) = self.last_request
            && now.saturating_duration_since(last) < self.interval
        {
            return false;
        }

        self.last_request = Some(now);
        self.in_flight.store(true, Ordering::Release);

        let generation = self.generation.load(Ordering::Acquire);
        let source = Arc::clone(&self.source);
        let slot = Arc::clone(&self.slot);
        let in_flight = Arc::clone(&self.in_flight);
        let waker = self.waker.clone();

        self.runtime.spawn(async move {
            let result = match source.grab().await {
                Ok(bytes) => tokio::task::spawn_blocking(move || ScreenSample::decode_png(&bytes))
                    .await
                    .unwrap_or_else(|e| {
                        Err(SampleError::Decode(format!("Decode task failed: {}", e)))
                    }),
                Err(err) => Err(err),
            };

            *slot.lock().await = Some(Delivery { generation, result });
            in_flight.store(false, Ordering::Release);
            if let Some(waker) = waker {
                waker.ping();
            }
        });

        log::debug!("Requested screen sample (generation {})", generation);
        true
    }

    /// Takes a finished result, if any, without blocking.
    ///
    /// Transient failures are logged and swallowed so the lens keeps showing
    /// the previous sample.
    pub fn try_sample(&mut self) -> Option<SamplerEvent> {
        let delivery = self.slot.try_lock().ok().and_then(|mut slot| slot.take())?;

        if delivery.generation != self.generation.load(Ordering::Acquire) {
            log::debug!("Dropping stale screen sample");
            return None;
        }

        match delivery.result {
            Ok(sample) => Some(SamplerEvent::Sample(sample)),
            Err(err) if err.disables_magnifier() => Some(SamplerEvent::Unavailable(err)),
            Err(err) => {
                log::debug!("Screen sample failed: {}", err);
                None
            }
        }
    }

    /// Invalidates anything in flight and forgets the throttle timestamp.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        if let Ok(mut slot) = self.slot.try_lock() {
            *slot = None;
        }
        self.last_request = None;
    }

    /// True the first time it is called after a denial; false afterwards.
    pub fn take_denial_notice(&mut self) -> bool {
        !std::mem::replace(&mut self.notice_sent, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    struct MockSource {
        png: Vec<u8>,
        deny: bool,
        calls: Arc<std::sync::Mutex<usize>>,
    }

    #[async_trait]
    impl ScreenSource for MockSource {
        async fn grab(&self) -> Result<Vec<u8>, SampleError> {
            *self.calls.lock().unwrap() += 1;
            if self.deny {
                Err(SampleError::PermissionDenied)
            } else {
                Ok(self.png.clone())
            }
        }
    }

    fn solid_png() -> Vec<u8> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, 8, 6).unwrap();
        {
            let ctx = cairo::Context::new(&surface).unwrap();
            ctx.set_source_rgb(0.0, 0.5, 1.0);
            ctx.paint().unwrap();
        }
        let mut buffer = Vec::new();
        surface.write_to_png(&mut buffer).unwrap();
        buffer
    }

    fn sampler(deny: bool) -> (MagnifierSampler, Arc<std::sync::Mutex<usize>>) {
        let calls = Arc::new(std::sync::Mutex::new(0));
        let source = MockSource {
            png: solid_png(),
            deny,
            calls: calls.clone(),
        };
        let sampler = MagnifierSampler::with_source(
            &tokio::runtime::Handle::current(),
            Arc::new(source),
            Duration::from_millis(250),
        );
        (sampler, calls)
    }

    async fn wait_idle(sampler: &MagnifierSampler) {
        for _ in 0..400 {
            if !sampler.in_flight() {
                return;
            }
            sleep(Duration::from_millis(5)).await;
        }
        panic!("sampler never finished");
    }

    #[tokio::test]
    async fn delivers_decoded_sample() {
        let (mut sampler, _) = sampler(false);
        assert!(sampler.request(Instant::now()));
        wait_idle(&sampler).await;

        match sampler.try_sample() {
            Some(SamplerEvent::Sample(sample)) => {
                assert_eq!((sample.width, sample.height), (8, 6));
                let surface = sample.into_surface().unwrap();
                assert_eq!(surface.width(), 8);
            }
            other => panic!("expected a sample, got {:?}", other),
        }
        assert!(sampler.try_sample().is_none());
    }

    #[tokio::test]
    async fn throttles_requests() {
        let (mut sampler, calls) = sampler(false);
        let start = Instant::now();
        assert!(sampler.request(start));
        assert!(!sampler.request(start), "one grab in flight at a time");
        wait_idle(&sampler).await;

        assert!(!sampler.request(start + Duration::from_millis(100)));
        assert!(sampler.request(start + Duration::from_millis(250)));
        wait_idle(&sampler).await;
        assert_eq!(*calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn cancel_drops_in_flight_results() {
        let (mut sampler, _) = sampler(false);
        assert!(sampler.request(Instant::now()));
        sampler.cancel();
        wait_idle(&sampler).await;
        assert!(sampler.try_sample().is_none());
    }

    #[tokio::test]
    async fn denial_is_reported_once() {
        let (mut sampler, _) = sampler(true);
        assert!(sampler.request(Instant::now()));
        wait_idle(&sampler).await;

        match sampler.try_sample() {
            Some(SamplerEvent::Unavailable(SampleError::PermissionDenied)) => {}
            other => panic!("expected denial, got {:?}", other),
        }
        assert!(sampler.take_denial_notice());
        assert!(!sampler.take_denial_notice());
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            ScreenSample::decode_png(b"not a png"),
            Err(SampleError::Decode(_))
        ));
    }
}
