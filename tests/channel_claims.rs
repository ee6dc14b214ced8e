#![allow(missing_docs)]
use pio_envoy::Error;
use pio_envoy::channel::{CHANNELS_PER_PIO, ChannelArena};

#[test]
fn each_channel_claims_once() {
    let arena: ChannelArena = ChannelArena::new();

    let claim = arena.claim(2).unwrap();

    assert_eq!(claim.index(), 2);
    assert!(arena.is_claimed(2));
    assert_eq!(arena.claim(2), Err(Error::ChannelUnavailable));
}

#[test]
fn out_of_range_channel_is_unavailable() {
    let arena: ChannelArena = ChannelArena::new();

    assert_eq!(arena.claim(CHANNELS_PER_PIO), Err(Error::ChannelUnavailable));
    assert!(!arena.is_claimed(CHANNELS_PER_PIO));
}

#[test]
fn claim_unused_takes_lowest_free_slot() {
    let arena: ChannelArena = ChannelArena::new();
    let _first = arena.claim(0).unwrap();

    assert_eq!(arena.claim_unused().unwrap().index(), 1);
    assert_eq!(arena.claim_unused().unwrap().index(), 2);
    assert_eq!(arena.claim_unused().unwrap().index(), 3);
    assert_eq!(arena.claim_unused(), Err(Error::ChannelUnavailable));
}

#[test]
fn arenas_are_independent() {
    let pio0: ChannelArena = ChannelArena::default();
    let pio1: ChannelArena = ChannelArena::default();

    let _led = pio0.claim(0).unwrap();

    assert!(pio1.claim(0).is_ok());
}

#[test]
fn concurrent_claims_have_one_winner() {
    let arena: ChannelArena = ChannelArena::new();

    let winners = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| arena.claim(1).is_ok()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or(false))
            .filter(|&won| won)
            .count()
    });

    assert_eq!(winners, 1);
}
