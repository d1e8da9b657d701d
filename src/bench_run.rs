use std::hint::black_box;
use std::time::{Duration, Instant};

/// Runs `routine` for `iterations` rounds and returns the fastest run.
pub fn run<O, R>(iterations: usize, mut routine: R) -> Duration
where
    R: FnMut() -> O,
{
    run_with_setup(iterations, || (), |_| routine())
}

/// Like [`run`], with per-iteration setup excluded from the measured time.
pub fn run_with_setup<I, O, S, R>(iterations: usize, mut setup: S, mut routine: R) -> Duration
where
    S: FnMut() -> I,
    R: FnMut(I) -> O,
{
    let mut fastest_result = Duration::MAX;
    for _ in 0..iterations {
        let state = black_box(setup());
        let start = Instant::now();
        let output = routine(state);
        let elapsed = start.elapsed();
        drop(black_box(output));
        fastest_result = fastest_result.min(elapsed);
    }

    fastest_result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_is_not_measured() {
        let elapsed = run_with_setup(
            3,
            || std::thread::sleep(Duration::from_millis(20)),
            |_| (),
        );
        assert!(elapsed < Duration::from_millis(20));
    }

    #[test]
    fn routine_output_is_returned_through_black_box() {
        let mut calls = 0;
        let _ = run(5, || {
            calls += 1;
            calls
        });
        assert_eq!(calls, 5);
    }
}
