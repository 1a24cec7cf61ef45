use std::future::Future;
use std::sync::Arc;
use log::debug;
use tokio::sync::{mpsc, Semaphore};
use crate::common::context::ScanContext;

/// Runs `task` over `items` with at most `width` tasks in flight.
///
/// An item is only dispatched once a slot is free. When `ctx` fires, dispatch
/// stops; tasks already running finish on their own and their results are
/// still returned. Results arrive in completion order.
pub async fn run_bounded<T, R, F, Fut>(
    ctx: &ScanContext,
    width: usize,
    items: Vec<T>,
    task: F,
) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send,
    Fut: Future<Output = Option<R>> + Send + 'static,
{
    let total = items.len();
    let semaphore = Arc::new(Semaphore::new(width.max(1)));
    // 容量等于任务数，worker发送结果时不会阻塞
    let (tx, mut rx) = mpsc::channel(total.max(1));
    let mut dispatched = 0usize;

    for item in items {
        let permit = tokio::select! {
            biased;
            _ = ctx.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let tx = tx.clone();
        let fut = task(item);
        tokio::spawn(async move {
            if let Some(result) = fut.await {
                let _ = tx.send(result).await;
            }
            drop(permit);
        });
        dispatched += 1;
    }

    // 丢弃原始发送者
    drop(tx);

    if dispatched < total {
        debug!("Dispatch stopped after {}/{} tasks", dispatched, total);
    }

    // 收集结果
    let mut results = Vec::with_capacity(dispatched);
    while let Some(result) = rx.recv().await {
        results.push(result);
    }
    results
}
