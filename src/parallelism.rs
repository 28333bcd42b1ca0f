use crossbeam_channel::TryRecvError;
use itertools::Itertools;
use log::trace;
use std::thread;

/// Default number of worker threads.
pub fn default_threads() -> usize {
    num_cpus::get()
}

/// Run `runner` on each job in a pool of `nthreads` threads.
///
/// Results are returned in the order of `jobs`, whatever order the
/// threads finish in. A panic in `runner` is propagated.
pub fn run_jobs<TJob, TResult, TRunner>(
    jobs: Vec<TJob>,
    nthreads: usize,
    runner: TRunner,
) -> Vec<TResult>
where
    TJob: Send,
    TResult: Send,
    TRunner: Fn(TJob) -> TResult + Sync,
{
    let njobs = jobs.len();
    let (s1, r1) = crossbeam_channel::unbounded();
    for job in jobs.into_iter().enumerate() {
        s1.send(job).expect("job queue is open");
    }
    drop(s1);
    let nthreads = nthreads.clamp(1, njobs.max(1));
    trace!(target: "crease", "{njobs} jobs, {nthreads} threads");
    let mut results: Vec<Option<TResult>> = (0..njobs).map(|_| None).collect_vec();
    thread::scope(|scope| {
        let (s2, r2) = crossbeam_channel::unbounded();
        for _ in 0..nthreads {
            let r1 = r1.clone();
            let s2 = s2.clone();
            let runner = &runner;
            scope.spawn(move || {
                loop {
                    match r1.try_recv() {
                        Ok((i, job)) => {
                            s2.send((i, runner(job))).expect("result queue is open");
                        }
                        Err(TryRecvError::Empty) => unreachable!(),
                        Err(TryRecvError::Disconnected) => break,
                    }
                }
            });
        }
        drop(s2);
        while let Ok((i, result)) = r2.recv() {
            results[i] = Some(result);
        }
    });
    results
        .into_iter()
        .map(|r| r.expect("every job produced a result"))
        .collect_vec()
}
