use evsim::Simulator;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use testing::{expected_order, random_schedule, Recorder};

fn check_random_schedule(
    sim: &mut Simulator,
    seed: u64,
    max_delay: i64,
    priorities: std::ops::RangeInclusive<i64>,
) -> evsim::Result<()> {
    let requests = random_schedule(seed, max_delay, 1000, priorities);
    let recorder = Recorder::default();
    for request in &requests {
        let recorder = recorder.clone();
        let value = request.value;
        sim.schedule_with_priority(request.delay, request.priority, move |sim| {
            recorder.push((sim.now(), value))
        })?;
    }
    let end = sim.run(None)?;
    let expected: Vec<_> = expected_order(&requests)
        .into_iter()
        .map(|r| (r.delay, r.value))
        .collect();
    assert_eq!(recorder.take(), expected);
    assert_eq!(end, expected.last().map_or(0, |&(time, _)| time));
    sim.reset();
    Ok(())
}

#[test]
fn test_randomized() -> evsim::Result<()> {
    let mut rng = ChaChaRng::seed_from_u64(8_849_866_351_611_827);
    let mut sim = Simulator::new();
    for _ in 0..5 {
        let seed = rng.gen();
        // One time moment.
        check_random_schedule(&mut sim, seed, 0, 0..=0)?;
        check_random_schedule(&mut sim, seed, 0, -10..=10)?;
        // Two time moments.
        check_random_schedule(&mut sim, seed, 1, 0..=0)?;
        check_random_schedule(&mut sim, seed, 1, -100..=-10)?;
        // Three time moments.
        check_random_schedule(&mut sim, seed, 2, 0..=0)?;
        check_random_schedule(&mut sim, seed, 2, 65..=3662)?;
        // Six time moments.
        check_random_schedule(&mut sim, seed, 5, 66..=66)?;
        check_random_schedule(&mut sim, seed, 5, -10..=66)?;
        // 101 time moments.
        check_random_schedule(&mut sim, seed, 100, -7..=-7)?;
        check_random_schedule(&mut sim, seed, 100, 0..=10)?;
    }
    assert!(sim.is_init());
    Ok(())
}

#[test]
fn test_recursive_scheduling_keeps_order() -> evsim::Result<()> {
    // Every event schedules two children, so the heap is mutated from inside the run loop.
    fn spawn(sim: &mut Simulator, depth: u32, times: Recorder<i64>) -> evsim::Result<()> {
        times.push(sim.now());
        if depth > 0 {
            for &delay in &[i64::from(depth % 3), 0] {
                let times = times.clone();
                sim.schedule(delay, move |sim| spawn(sim, depth - 1, times))?;
            }
        }
        Ok(())
    }
    let times = Recorder::default();
    let mut sim = Simulator::new();
    let recorder = times.clone();
    sim.schedule(0, move |sim| spawn(sim, 8, recorder))?;
    sim.run(None)?;
    let times = times.take();
    assert_eq!(times.len(), (1 << 9) - 1);
    assert!(times.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}
