use std::time::Duration;

use rxsearch::{
    subscribe::{Subscriber, Subscription, SubscriptionHandle, UnsubscribeLogic},
    Observable, Observer,
};

/// Types `keys` from a Tokio task, waiting the paired number of milliseconds
/// before each one, then completes. Must be subscribed inside a runtime.
pub fn typed_keystrokes(keys: &[(&'static str, u64)]) -> Observable<String> {
    let keys = keys.to_vec();

    Observable::new(move |mut o: Subscriber<_>| {
        let keys = keys.clone();
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();

        let jh = tokio::spawn(async move {
            for (key, delay_ms) in keys {
                tokio::select! {
                    Ok(()) = &mut stop_rx => return,
                    _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                }
                o.next(key.to_string());
            }
            o.complete();
        });

        Subscription::new(
            UnsubscribeLogic::Logic(Box::new(move || {
                if stop_tx.send(()).is_err() {
                    eprintln!("typing already finished");
                }
            })),
            SubscriptionHandle::JoinTask(jh),
        )
    })
}
