use std::collections::VecDeque;

use crate::{
  observable::Observable,
  rc::MutArc,
  scheduler::Scheduler,
  subscriber::{Event, Subscriber},
};

#[derive(Default)]
struct DrainQueue {
  events: VecDeque<Event>,
  draining: bool,
}

fn enqueue(queue: &MutArc<DrainQueue>, scheduler: &Scheduler, down: &Subscriber, event: Event) {
  let start = {
    let mut queue = queue.rc_deref_mut();
    queue.events.push_back(event);
    !std::mem::replace(&mut queue.draining, true)
  };
  if start && !down.is_closed() {
    let (queue, c_down) = (queue.clone(), down.clone());
    let task = scheduler.post(move || drain(&queue, &c_down));
    down.subscription().add_task(task);
  }
}

fn drain(queue: &MutArc<DrainQueue>, down: &Subscriber) {
  loop {
    let event = {
      let mut queue = queue.rc_deref_mut();
      match queue.events.pop_front() {
        Some(event) => event,
        None => {
          queue.draining = false;
          return;
        }
      }
    };
    event.deliver(down);
  }
}

impl<T: 'static> Observable<T> {
  /// Re-delivers every notification on `scheduler`.
  ///
  /// Notifications keep their order even on a multi-threaded executor: at
  /// most one drain task per subscription is scheduled at a time, and it
  /// delivers everything queued so far.
  pub fn observe_on(&self, scheduler: Scheduler) -> Observable<T> {
    let source = self.clone();
    Observable::from_fn(move |down| {
      let queue = MutArc::own(DrainQueue::default());
      let (n_queue, e_queue, c_queue) = (queue.clone(), queue.clone(), queue);
      let (n_sd, e_sd, c_sd) = (scheduler.clone(), scheduler.clone(), scheduler.clone());
      let (n, e, c) = (down.clone(), down.clone(), down.clone());
      let up = down.upstream(
        move |v| {
          enqueue(&n_queue, &n_sd, &n, Event::Next(v));
          Ok(())
        },
        move |err| enqueue(&e_queue, &e_sd, &e, Event::Error(err)),
        move || enqueue(&c_queue, &c_sd, &c, Event::Complete),
      );
      source.actual_subscribe(up);
    })
  }
}
