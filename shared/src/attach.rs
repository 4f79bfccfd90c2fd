//! Input attachment: the three event sources a controller listens to.
//!
//! Sources are polled, not pushed. The host stamps every event with an
//! [`InputClock`] as it arrives and drains the sources once per frame with
//! [`InputAttachment::pump`] right before calling `update`. Pumping merges the
//! sources back into arrival order, so a key pressed while the pointer was
//! free stays ignored even if the lock is regained before the next pump.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use bevy::prelude::*;

use crate::controller::FirstPersonController;
use crate::error::ControllerError;
use crate::input::{CaptureEvent, KeyEvent, PointerMotion};

/// Something that queues input events for the controller.
pub trait InputSource<E> {
    fn poll_event(&mut self) -> Option<E>;
}

impl<E> InputSource<E> for Receiver<E> {
    fn poll_event(&mut self) -> Option<E> {
        self.try_recv().ok()
    }
}

impl<E> InputSource<E> for VecDeque<E> {
    fn poll_event(&mut self) -> Option<E> {
        self.pop_front()
    }
}

/// An event and its place in the host's arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<E> {
    pub seq: u64,
    pub event: E,
}

/// Arrival counter shared by everything feeding one attachment.
#[derive(Debug, Clone, Default)]
pub struct InputClock(Arc<AtomicU64>);

impl InputClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stamp<E>(&self, event: E) -> Stamped<E> {
        Stamped {
            seq: self.0.fetch_add(1, Ordering::Relaxed),
            event,
        }
    }
}

pub type BoxedSource<E> = Box<dyn InputSource<Stamped<E>>>;

/// Listener registration returned by [`attach_input`].
///
/// Dropping it detaches every source.
pub struct InputAttachment {
    capture: Option<BoxedSource<CaptureEvent>>,
    pointer: Option<BoxedSource<PointerMotion>>,
    keys: Option<BoxedSource<KeyEvent>>,
}

/// Register the capture-request, pointer and key sources.
///
/// The capture source is mandatory: without it the pointer can never be
/// locked, and every other event would be ignored forever.
pub fn attach_input(
    capture: Option<BoxedSource<CaptureEvent>>,
    pointer: BoxedSource<PointerMotion>,
    keys: BoxedSource<KeyEvent>,
) -> Result<InputAttachment, ControllerError> {
    let capture = capture.ok_or(ControllerError::MissingInputSource)?;
    debug!("input sources attached");
    Ok(InputAttachment {
        capture: Some(capture),
        pointer: Some(pointer),
        keys: Some(keys),
    })
}

/// A source plus the event already polled from it but not yet delivered.
struct Pending<'a, E> {
    source: Option<&'a mut BoxedSource<E>>,
    head: Option<Stamped<E>>,
}

impl<'a, E> Pending<'a, E> {
    fn new(source: Option<&'a mut BoxedSource<E>>) -> Self {
        Self { source, head: None }
    }

    fn next_seq(&mut self) -> Option<u64> {
        if self.head.is_none() {
            self.head = self.source.as_mut()?.poll_event();
        }
        self.head.as_ref().map(|stamped| stamped.seq)
    }

    fn take(&mut self) -> Option<E> {
        self.head.take().map(|stamped| stamped.event)
    }
}

impl InputAttachment {
    pub fn is_attached(&self) -> bool {
        self.capture.is_some() || self.pointer.is_some() || self.keys.is_some()
    }

    /// Deliver every queued event to `controller`, oldest stamp first across
    /// all sources. Returns how many were delivered.
    ///
    /// Equal stamps go capture, then pointer, then keys.
    pub fn pump(&mut self, controller: &mut FirstPersonController) -> usize {
        let mut capture = Pending::new(self.capture.as_mut());
        let mut pointer = Pending::new(self.pointer.as_mut());
        let mut keys = Pending::new(self.keys.as_mut());
        let mut delivered = 0;

        loop {
            let capture_seq = capture.next_seq();
            let pointer_seq = pointer.next_seq();
            let key_seq = keys.next_seq();
            let Some(oldest) = [capture_seq, pointer_seq, key_seq]
                .into_iter()
                .flatten()
                .min()
            else {
                break;
            };

            if capture_seq == Some(oldest) {
                if let Some(event) = capture.take() {
                    controller.handle_capture(event);
                }
            } else if pointer_seq == Some(oldest) {
                if let Some(motion) = pointer.take() {
                    controller.handle_pointer(motion);
                }
            } else if let Some(event) = keys.take() {
                controller.handle_key(&event);
            }
            delivered += 1;
        }

        delivered
    }

    /// Drop all sources. Safe to call any number of times.
    pub fn detach(&mut self) {
        if !self.is_attached() {
            return;
        }
        self.capture = None;
        self.pointer = None;
        self.keys = None;
        debug!("input sources detached");
    }
}

impl Drop for InputAttachment {
    fn drop(&mut self) {
        self.detach();
    }
}
