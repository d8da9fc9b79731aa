use std::collections::VecDeque;

use crate::{CircularQueue, SoakConfig};

#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Report {
    pub seed: u64,
    pub operations: usize,
    pub enqueued: usize,
    pub dequeued: usize,
    pub empty_dequeues: usize,
    pub grows: usize,
    pub shrinks: usize,
    pub peak_capacity: usize,
    pub final_capacity: usize,
}

/// Drives a [`CircularQueue`] with random operations, checking every step
/// against a [`VecDeque`].
pub fn run(config: &SoakConfig) -> anyhow::Result<Report> {
    let seed = config.seed.unwrap_or_else(|| fastrand::u64(..));
    let rng = fastrand::Rng::with_seed(seed);

    log::info!(
        "soaking {} ops (seed: {seed}, initial capacity: {}, enqueue: {}%)",
        config.operations,
        config.initial_capacity,
        config.enqueue_percent,
    );

    let mut queue = CircularQueue::new(config.initial_capacity);
    let mut model = VecDeque::new();

    let mut report = Report {
        seed,
        operations: config.operations,
        peak_capacity: queue.capacity(),
        ..Report::default()
    };

    for step in 0..config.operations as u64 {
        let before = queue.capacity();

        if rng.u8(0..100) < config.enqueue_percent {
            queue.enqueue(step);
            model.push_back(step);
            report.enqueued += 1;
        } else {
            let (got, expected) = (queue.dequeue(), model.pop_front());
            anyhow::ensure!(
                got == expected,
                "step {step}: dequeued {got:?}, expected {expected:?}"
            );
            match got {
                Some(_) => report.dequeued += 1,
                None => report.empty_dequeues += 1,
            }
        }

        check(&queue, &model, config).map_err(|err| err.context(format!("step {step}")))?;

        let after = queue.capacity();
        if after != before {
            if after > before {
                report.grows += 1;
            } else {
                report.shrinks += 1;
            }
            report.peak_capacity = std::cmp::max(report.peak_capacity, after);

            anyhow::ensure!(
                queue.iter().eq(model.iter()),
                "step {step}: contents diverged after resizing {before} -> {after}"
            );
        }
    }

    report.final_capacity = queue.capacity();
    log::debug!(
        "draining {} queued after {} grows and {} shrinks",
        queue.len(),
        report.grows,
        report.shrinks
    );

    while let Some(expected) = model.pop_front() {
        let got = queue.dequeue();
        anyhow::ensure!(
            got == Some(expected),
            "drain: dequeued {got:?}, expected {expected}"
        );
    }
    anyhow::ensure!(queue.is_empty(), "drain: {} left over", queue.len());

    log::info!("soak finished, peak capacity {}", report.peak_capacity);
    Ok(report)
}

fn check(
    queue: &CircularQueue<u64>,
    model: &VecDeque<u64>,
    config: &SoakConfig,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        queue.len() == model.len(),
        "len {} != model len {}",
        queue.len(),
        model.len()
    );
    anyhow::ensure!(
        queue.len() <= queue.capacity(),
        "len {} exceeds capacity {}",
        queue.len(),
        queue.capacity()
    );
    anyhow::ensure!(
        queue.capacity() >= config.initial_capacity,
        "capacity {} fell below initial {}",
        queue.capacity(),
        config.initial_capacity
    );

    if let Some(front) = model.front() {
        anyhow::ensure!(
            queue.peek() == front,
            "peek {} != model front {front}",
            queue.peek()
        );
    }

    Ok(())
}
