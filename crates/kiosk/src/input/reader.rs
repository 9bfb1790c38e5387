use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use tracing::{debug, error};

use super::InputSource;
use crate::{
    error::{Error, Result},
    event::Gesture,
    gesture::Classifier,
};

/// The input reader thread. It owns the source and the classifier, and sends
/// every gesture over a channel to the application thread.
///
/// The thread ends when the stop flag is set (within one read timeout), when
/// the receiving end of the channel is dropped, or when the source fails.
/// Dropping the handle stops and joins the thread.
#[derive(Debug)]
pub struct InputThread {
    /// Shared stop request.
    stop: Arc<AtomicBool>,
    /// Join handle, taken on join.
    handle: Option<JoinHandle<Result<()>>>,
}

impl InputThread {
    /// Start reading from `source`.
    pub fn spawn<S>(
        source: S,
        classifier: Classifier,
        tx: Sender<Gesture>,
        poll_timeout: Duration,
    ) -> Result<Self>
    where
        S: InputSource + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::Builder::new()
            .name("touch-input".into())
            .spawn(move || {
                let ret = read_loop(source, classifier, &tx, &flag, poll_timeout);
                if let Err(e) = &ret {
                    error!("touch input stopped: {e}");
                }
                ret
            })
            .map_err(|e| Error::RunLoop(format!("spawning input thread: {e}")))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Ask the thread to stop without waiting for it.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Has the thread exited?
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Stop the thread and wait for it, returning the source error if it
    /// failed.
    pub fn join(mut self) -> Result<()> {
        self.stop();
        match self.handle.take() {
            Some(h) => h
                .join()
                .map_err(|_| Error::RunLoop("input thread panicked".into()))?,
            None => Ok(()),
        }
    }
}

impl Drop for InputThread {
    fn drop(&mut self) {
        self.stop();
        if let Some(h) = self.handle.take() {
            drop(h.join());
        }
    }
}

/// Read, classify and forward until stopped.
fn read_loop<S: InputSource>(
    mut source: S,
    mut classifier: Classifier,
    tx: &Sender<Gesture>,
    stop: &AtomicBool,
    poll_timeout: Duration,
) -> Result<()> {
    while !stop.load(Ordering::Relaxed) {
        let Some(event) = source.next_event(poll_timeout)? else {
            continue;
        };
        if let Some(gesture) = classifier.feed(event, Instant::now()) {
            debug!("gesture {gesture}");
            if tx.send(gesture).is_err() {
                // The application has gone away.
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::{
        config::GestureConfig,
        event::{Axis, GestureKind, RawEvent},
        geom::SensorSpace,
        testing::ScriptedSource,
    };

    fn tap(x: i32, y: i32) -> Vec<RawEvent> {
        vec![
            RawEvent::AxisUpdate {
                axis: Axis::X,
                value: x,
            },
            RawEvent::AxisUpdate {
                axis: Axis::Y,
                value: y,
            },
            RawEvent::ContactUpdate { down: true },
            RawEvent::ContactUpdate { down: false },
        ]
    }

    fn classifier() -> Classifier {
        Classifier::new(GestureConfig::default(), SensorSpace::default())
    }

    #[test]
    fn forwards_gestures() -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let t = InputThread::spawn(
            ScriptedSource::new(tap(100, 200)),
            classifier(),
            tx,
            Duration::from_millis(5),
        )?;
        let press = rx.recv()?;
        assert_eq!(press.kind, GestureKind::Press);
        let tap = rx.recv()?;
        assert_eq!(tap.kind, GestureKind::Tap);
        assert_eq!((tap.x, tap.y), (100, 200));
        t.join()
    }

    #[test]
    fn stop_flag_ends_an_idle_reader() -> Result<()> {
        let (tx, _rx) = mpsc::channel();
        let t = InputThread::spawn(
            ScriptedSource::default(),
            classifier(),
            tx,
            Duration::from_millis(5),
        )?;
        assert!(!t.is_finished());
        t.join()
    }

    #[test]
    fn dropped_receiver_ends_the_reader() -> Result<()> {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let t = InputThread::spawn(
            ScriptedSource::new(tap(1, 1)),
            classifier(),
            tx,
            Duration::from_millis(5),
        )?;
        while !t.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        t.join()
    }

    #[test]
    fn source_errors_surface_on_join() -> Result<()> {
        let (tx, _rx) = mpsc::channel();
        let t = InputThread::spawn(
            ScriptedSource::default().fail_at_end(),
            classifier(),
            tx,
            Duration::from_millis(5),
        )?;
        while !t.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(matches!(t.join(), Err(Error::Device(_))));
        Ok(())
    }
}
