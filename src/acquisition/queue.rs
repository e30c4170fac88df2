use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::frame::FrameCapture;

pub const DEFAULT_QUEUE_CAPACITY: usize = 50;

/// Bounded frame handoff between the producer thread and the session tick.
///
/// When the queue is full the incoming frame is discarded (drop-newest); the
/// producer never blocks and never sees an error, so a stalled consumer only
/// costs frames, not acquisition.
#[derive(Debug)]
pub struct FrameQueue {
    frames: VecDeque<FrameCapture>,
    capacity: usize,
    dropped: u64,
}

impl FrameQueue {
    pub fn new(capacity: usize) -> Self {
        FrameQueue {
            frames: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Returns false when the frame was dropped because the queue was full.
    pub fn push(&mut self, capture: FrameCapture) -> bool {
        if self.frames.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.frames.push_back(capture);
        true
    }

    pub fn pop(&mut self) -> Option<FrameCapture> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for FrameQueue {
    fn default() -> Self {
        FrameQueue::new(DEFAULT_QUEUE_CAPACITY)
    }
}

pub type SharedFrameQueue = Arc<Mutex<FrameQueue>>;

pub fn shared_queue(capacity: usize) -> SharedFrameQueue {
    Arc::new(Mutex::new(FrameQueue::new(capacity)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::frame::Frame;

    fn capture(value: f64) -> FrameCapture {
        FrameCapture::complete(Frame::from_vec(1, 1, vec![value]).unwrap())
    }

    #[test]
    fn full_queue_drops_the_newest() {
        let mut queue = FrameQueue::new(2);
        assert!(queue.push(capture(1.0)));
        assert!(queue.push(capture(2.0)));
        assert!(!queue.push(capture(3.0)));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.dropped(), 1);
        // The oldest frames survive, in arrival order.
        assert_eq!(queue.pop().unwrap().frame.get(0, 0), 1.0);
        assert_eq!(queue.pop().unwrap().frame.get(0, 0), 2.0);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn push_after_pop_succeeds_again() {
        let mut queue = FrameQueue::new(1);
        assert!(queue.push(capture(1.0)));
        assert!(!queue.push(capture(2.0)));
        queue.pop();
        assert!(queue.push(capture(3.0)));
        assert_eq!(queue.pop().unwrap().frame.get(0, 0), 3.0);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut queue = FrameQueue::new(0);
        assert!(queue.push(capture(1.0)));
        assert!(!queue.push(capture(2.0)));
    }

    #[test]
    fn shared_queue_hands_frames_across_lock() {
        let queue = shared_queue(4);
        queue.lock().unwrap().push(capture(7.0));
        let popped = queue.lock().unwrap().pop().unwrap();
        assert_eq!(popped.frame.get(0, 0), 7.0);
    }
}
