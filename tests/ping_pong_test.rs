use flow_gpgpu::gpgpu::ping_pong::PingPong;

#[test]
fn should_alternate_front_and_back() {
    let mut targets = PingPong::new("a", "b");
    assert_eq!((*targets.front(), *targets.back()), ("a", "b"));

    targets.swap();
    assert_eq!((*targets.front(), *targets.back()), ("b", "a"));

    targets.swap();
    assert_eq!((*targets.front(), *targets.back()), ("a", "b"));
    assert_eq!(targets.generation(), 2);
}

#[test]
fn should_read_what_the_previous_pass_wrote() {
    // Each "pass" reads front and writes front + 1 into back.
    let mut targets = PingPong::new(0u32, 0u32);
    for _ in 0..5 {
        let next = *targets.front() + 1;
        *targets.back_mut() = next;
        targets.swap();
    }
    assert_eq!(*targets.front(), 5);
    assert_eq!(*targets.back(), 4);
}
