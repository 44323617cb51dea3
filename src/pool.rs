/*!
A task-queue + worker-pool executor for units of work.

Units are independent: each opens its own stream and returns a plain result,
so the pool shares nothing between workers beyond the two channels. Result
order is unspecified.
*/
use crossbeam_channel::unbounded;
use std::num::NonZeroUsize;
use std::thread;

/// Worker count matching the machine's available parallelism.
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Runs `f` over every task on `workers` threads and collects the results.
///
/// The merge downstream of this call must be associative and commutative:
/// results arrive in whatever order workers finish.
pub fn map_reduce<T, R, F>(tasks: Vec<T>, workers: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let workers = workers.max(1);
    let (task_tx, task_rx) = unbounded::<T>();
    let (result_tx, result_rx) = unbounded::<R>();

    for task in tasks {
        // receivers outlive the sends below
        task_tx.send(task).expect("task queue closed");
    }
    drop(task_tx);

    thread::scope(|s| {
        let f = &f;
        for _ in 0..workers {
            let task_rx = task_rx.clone();
            let result_tx = result_tx.clone();
            s.spawn(move || {
                for task in task_rx.iter() {
                    result_tx.send(f(task)).expect("result channel closed");
                }
            });
        }
        drop(result_tx);
        result_rx.iter().collect()
    })
}
