//! Re-marshals collaborator completions onto the UI thread.
//!
//! A [`CompletionSender`] may travel to any thread; the callback it was
//! registered with stays on the UI thread and only runs from
//! [`CompletionQueue::drain`], never inline with the call that issued the
//! mutation.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

type Payload = Box<dyn Any + Send>;
type Callback = Box<dyn FnOnce(Payload)>;

struct Delivery {
    ticket: Ticket,
    payload: Option<Payload>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub completed: usize,
    pub abandoned: usize,
}

pub struct CompletionQueue {
    sender: mpsc::Sender<Delivery>,
    receiver: mpsc::Receiver<Delivery>,
    callbacks: RefCell<HashMap<Ticket, Callback>>,
    next_ticket: Cell<u64>,
}

impl Default for CompletionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            sender,
            receiver,
            callbacks: RefCell::new(HashMap::new()),
            next_ticket: Cell::new(1),
        }
    }

    pub fn register<T, F>(&self, callback: F) -> CompletionSender<T>
    where
        T: Send + 'static,
        F: FnOnce(T) + 'static,
    {
        let ticket = Ticket(self.next_ticket.get());
        self.next_ticket.set(ticket.0 + 1);
        let callback: Callback = Box::new(move |payload: Payload| {
            match payload.downcast::<T>() {
                Ok(value) => callback(*value),
                Err(_) => tracing::error!(
                    ticket = ticket.0,
                    "completion payload type does not match its registration"
                ),
            }
        });
        self.callbacks.borrow_mut().insert(ticket, callback);
        CompletionSender {
            ticket,
            sender: Some(self.sender.clone()),
            _marker: PhantomData,
        }
    }

    pub fn pending(&self) -> usize {
        self.callbacks.borrow().len()
    }

    /// Runs every completion delivered so far. Callbacks may register new
    /// completions; those are picked up by the next drain at the earliest.
    pub fn drain(&self) -> DrainReport {
        let mut report = DrainReport::default();
        let ready: Vec<Delivery> = self.receiver.try_iter().collect();
        for delivery in ready {
            let callback = self.callbacks.borrow_mut().remove(&delivery.ticket);
            let Some(callback) = callback else {
                continue;
            };
            match delivery.payload {
                Some(payload) => {
                    callback(payload);
                    report.completed += 1;
                }
                None => {
                    tracing::debug!(ticket = delivery.ticket.0, "completion abandoned");
                    report.abandoned += 1;
                }
            }
        }
        report
    }
}

/// One-shot reply channel handed to a collaborator.
///
/// Dropping it without calling [`complete`](Self::complete) abandons the
/// ticket: the registered callback is released without running.
pub struct CompletionSender<T> {
    ticket: Ticket,
    sender: Option<mpsc::Sender<Delivery>>,
    _marker: PhantomData<fn(T)>,
}

impl<T> std::fmt::Debug for CompletionSender<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionSender")
            .field("ticket", &self.ticket)
            .finish()
    }
}

impl<T: Send + 'static> CompletionSender<T> {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn complete(mut self, value: T) {
        if let Some(sender) = self.sender.take() {
            // The queue may already be gone with the host; nothing to notify then.
            let _ = sender.send(Delivery {
                ticket: self.ticket,
                payload: Some(Box::new(value)),
            });
        }
    }
}

impl<T> Drop for CompletionSender<T> {
    fn drop(&mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Delivery {
                ticket: self.ticket,
                payload: None,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::thread;

    #[test]
    fn callbacks_run_only_on_drain() {
        let queue = CompletionQueue::new();
        let seen = Rc::new(Cell::new(0));
        let seen_in_callback = Rc::clone(&seen);
        let sender = queue.register(move |value: u32| seen_in_callback.set(value));

        sender.complete(7);
        assert_eq!(seen.get(), 0);
        assert_eq!(queue.pending(), 1);

        let report = queue.drain();
        assert_eq!(report.completed, 1);
        assert_eq!(seen.get(), 7);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn completion_from_worker_thread_is_delivered() {
        let queue = CompletionQueue::new();
        let seen = Rc::new(RefCell::new(None));
        let seen_in_callback = Rc::clone(&seen);
        let sender = queue.register(move |value: Result<(), String>| {
            *seen_in_callback.borrow_mut() = Some(value);
        });

        thread::spawn(move || sender.complete(Err("quota".to_string())))
            .join()
            .expect("worker thread");

        queue.drain();
        assert_eq!(*seen.borrow(), Some(Err("quota".to_string())));
    }

    #[test]
    fn dropped_sender_abandons_without_running_callback() {
        let queue = CompletionQueue::new();
        let ran = Rc::new(Cell::new(false));
        let ran_in_callback = Rc::clone(&ran);
        let sender = queue.register(move |_: ()| ran_in_callback.set(true));
        drop(sender);

        let report = queue.drain();
        assert_eq!(report.abandoned, 1);
        assert!(!ran.get());
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn callbacks_may_register_follow_up_completions() {
        let queue = Rc::new(CompletionQueue::new());
        let hits = Rc::new(Cell::new(0));
        let queue_in_callback = Rc::clone(&queue);
        let hits_in_callback = Rc::clone(&hits);
        let sender = queue.register(move |_: ()| {
            hits_in_callback.set(hits_in_callback.get() + 1);
            let hits_again = Rc::clone(&hits_in_callback);
            queue_in_callback
                .register(move |_: ()| hits_again.set(hits_again.get() + 10))
                .complete(());
        });
        sender.complete(());

        queue.drain();
        assert_eq!(hits.get(), 1);
        queue.drain();
        assert_eq!(hits.get(), 11);
    }
}
