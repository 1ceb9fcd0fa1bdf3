//! Example: Custom Executor Integration
//!
//! A host application usually owns its event loop. This example plugs such a
//! loop into rxdyn by implementing [`Executor`]: tasks are sent over a
//! channel to the loop's thread, and delayed tasks are held back by a timer
//! thread until they are due.

use std::{
  sync::mpsc::{channel, Receiver, Sender},
  sync::Mutex,
  thread,
  time::Duration,
};

use rxdyn::prelude::*;

// ==================================================================================
// 1. The host loop
// ==================================================================================

struct HostLoop {
  sender: Mutex<Sender<Task>>,
}

impl HostLoop {
  fn new() -> (Self, Receiver<Task>) {
    let (sender, receiver) = channel();
    (HostLoop { sender: Mutex::new(sender) }, receiver)
  }
}

// ==================================================================================
// 2. Implement Executor
// ==================================================================================

impl Executor for HostLoop {
  fn schedule(&self, task: Task, delay: Option<Duration>) -> TaskHandle {
    println!("[HostLoop] scheduling task, delay: {:?}", delay);
    let handle = TaskHandle::new();
    let task = handle.guard(task);
    let sender = self.sender.lock().unwrap().clone();
    match delay {
      Some(delay) => {
        thread::spawn(move || {
          thread::sleep(delay);
          let _ = sender.send(task);
        });
      }
      None => {
        let _ = sender.send(task);
      }
    }
    handle
  }
}

// ==================================================================================
// 3. Use it
// ==================================================================================

fn main() {
  let (host, tasks) = HostLoop::new();
  let scheduler = Scheduler::new(host);

  let counter = ValueCell::with_scheduler(0, scheduler.clone());
  let _guard = counter
    .observable()
    .cast::<i32>()
    .debounce_on(Duration::from_millis(50), scheduler.clone())
    .subscribe(|v| println!("[main loop] settled on {v}"))
    .unsubscribe_when_dropped();

  let c_counter = counter.clone();
  let writer = thread::spawn(move || {
    for i in 1..=5 {
      c_counter.set_value(i);
      thread::sleep(Duration::from_millis(10));
    }
  });

  // Pump the loop until it stays idle for a while.
  while let Ok(task) = tasks.recv_timeout(Duration::from_millis(200)) {
    task();
  }
  let _ = writer.join();
}
