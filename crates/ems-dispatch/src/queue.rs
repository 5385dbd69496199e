//! Admission queue: calls waiting for an ambulance.
//!
//! Ordered by `(call_tick, seq)` ascending: the oldest call first, and among
//! calls from the same tick the one enqueued first.  Nothing else (patient
//! id, category, hospital) takes part in the comparison.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ems_core::{NodeId, Tick};
use ems_plan::PatientCall;

// ── PendingRequest ────────────────────────────────────────────────────────────

/// A call that could not be served yet.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub call: PatientCall,

    /// Hospital the patient goes to, resolved when the call was injected.
    pub hospital: NodeId,

    /// Tick the request first entered the queue.
    pub enqueued_at: Tick,

    /// Insertion sequence number.  Kept across re-insertions.
    pub seq: u64,

    /// Failed dispatch attempts so far.
    pub attempts: u32,
}

impl PendingRequest {
    /// Queue priority; lower is served first.
    #[inline]
    pub fn priority(&self) -> Tick {
        self.call.call_tick
    }

    #[inline]
    fn key(&self) -> (Tick, u64) {
        (self.call.call_tick, self.seq)
    }
}

impl PartialEq for PendingRequest {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}
impl Eq for PendingRequest {}

impl PartialOrd for PendingRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for PendingRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

// ── AdmissionQueue ────────────────────────────────────────────────────────────

/// Min-heap of [`PendingRequest`]s.
#[derive(Debug, Default)]
pub struct AdmissionQueue {
    heap:     BinaryHeap<Reverse<PendingRequest>>,
    next_seq: u64,
}

impl AdmissionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a request with the next sequence number without queueing it.
    pub fn new_request(&mut self, call: PatientCall, hospital: NodeId, now: Tick) -> PendingRequest {
        let seq = self.next_seq;
        self.next_seq += 1;
        PendingRequest { call, hospital, enqueued_at: now, seq, attempts: 0 }
    }

    /// Queue `call` for `hospital`.  Returns the assigned sequence number.
    pub fn enqueue(&mut self, call: PatientCall, hospital: NodeId, now: Tick) -> u64 {
        let request = self.new_request(call, hospital, now);
        let seq = request.seq;
        self.heap.push(Reverse(request));
        seq
    }

    /// Put a previously popped request back, keeping its sequence number.
    pub fn requeue(&mut self, request: PendingRequest) {
        self.heap.push(Reverse(request));
    }

    /// Remove the head (earliest call tick, then lowest seq).
    pub fn pop(&mut self) -> Option<PendingRequest> {
        self.heap.pop().map(|Reverse(r)| r)
    }

    pub fn peek(&self) -> Option<&PendingRequest> {
        self.heap.peek().map(|Reverse(r)| r)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Pending requests in service order.  Allocates; meant for reporting.
    pub fn to_sorted_vec(&self) -> Vec<PendingRequest> {
        let mut all: Vec<PendingRequest> = self.heap.iter().map(|Reverse(r)| r.clone()).collect();
        all.sort();
        all
    }
}
