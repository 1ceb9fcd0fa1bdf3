use std::sync::Arc;

use crate::{observable::Observable, subscriber::Subscriber};

impl<T: 'static> Observable<T> {
  /// Emits every value of this observable, then every value of each of
  /// `others` in turn. Each input is subscribed only after the previous one
  /// completed; an error ends the whole chain.
  pub fn concat(&self, others: impl IntoIterator<Item = Observable<T>>) -> Observable<T> {
    let sources: Arc<[Observable<T>]> = std::iter::once(self.clone()).chain(others).collect();
    Observable::from_fn(move |down| subscribe_from(sources.clone(), 0, down))
  }
}

fn subscribe_from<T: 'static>(sources: Arc<[Observable<T>]>, index: usize, down: Subscriber) {
  if down.is_closed() {
    return;
  }
  let Some(source) = sources.get(index).cloned() else {
    down.complete();
    return;
  };
  let (n, e, c) = (down.clone(), down.clone(), down.clone());
  let up = down.upstream(
    move |v| {
      n.next(v);
      Ok(())
    },
    move |err| e.error(err),
    move || subscribe_from(sources, index + 1, c),
  );
  source.actual_subscribe(up);
}
