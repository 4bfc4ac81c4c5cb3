use std::time::Duration;

use flow_gpgpu::flow::{FrameClock, FrameTime};
use instant::Instant;

#[test]
fn should_start_on_the_first_frame() {
    let mut clock = FrameClock::default();
    // However long setup took, the first frame starts at zero.
    let first = Instant::now() + Duration::from_secs(3);

    assert_eq!(clock.tick(first), FrameTime { elapsed: 0.0, delta: 0.0 });

    let second = clock.tick(first + Duration::from_millis(250));
    assert!((second.elapsed - 0.25).abs() < 1e-6);
    assert!((second.delta - 0.25).abs() < 1e-6);

    let third = clock.tick(first + Duration::from_millis(300));
    assert!((third.elapsed - 0.3).abs() < 1e-6);
    assert!((third.delta - 0.05).abs() < 1e-5);
}

#[test]
fn should_never_report_a_negative_delta() {
    let mut time = FrameTime::default();
    time.advance(2.0);
    time.advance(1.5);
    assert_eq!(time.delta, 0.0);
    assert_eq!(time.elapsed, 1.5);
}
