#![allow(missing_docs)]
use pio_envoy::i2s_in::{self, I2S_CYCLES_PER_BIT};
use pio_envoy::led_strip::{self, LED_CYCLES_PER_BIT, T1, T2, T3};
use pio_envoy::program::{PROGRAM_CAPACITY, PinRole};
use pio_envoy::sample::SampleBitWidth;

#[test]
fn led_symbol_timing_adds_up() {
    assert_eq!(u32::from(T1 + T2 + T3), LED_CYCLES_PER_BIT);
    assert_eq!(LED_CYCLES_PER_BIT, 10);
}

#[test]
fn led_program_layout() {
    let program = led_strip::program();

    assert_eq!(program.len(), 4);
    assert_eq!(program.cycles_per_symbol(), LED_CYCLES_PER_BIT);
    assert_eq!(program.side_set_roles(), &[PinRole::LedData]);
    assert_eq!(program.program().wrap.target, 0);
    assert_eq!(program.program().wrap.source, 3);
}

#[test]
fn led_one_and_zero_bits_cost_the_same() {
    let program = led_strip::program();

    // out, jmp !x (not taken), jmp bitloop
    let one_bit = program.cycles_along(&[0, 1, 2]);
    // out, jmp !x (taken), nop
    let zero_bit = program.cycles_along(&[0, 1, 3]);

    assert_eq!(one_bit, Some(LED_CYCLES_PER_BIT));
    assert_eq!(zero_bit, Some(LED_CYCLES_PER_BIT));
}

#[test]
fn led_high_times_distinguish_bits() {
    let program = led_strip::program();

    // A one stays high through the lead-in and the deciding jump.
    assert_eq!(program.cycles_along(&[1, 2]), Some(8));
    // A zero goes low after the lead-in.
    assert_eq!(program.cycles_along(&[1]), Some(3));
}

#[test]
fn audio_bits_cost_two_cycles_on_every_path() {
    for bit_width in [SampleBitWidth::Bits16, SampleBitWidth::Bits24, SampleBitWidth::Bits32] {
        let program = i2s_in::program(bit_width);

        assert_eq!(program.cycles_per_symbol(), I2S_CYCLES_PER_BIT);
        // left loop, left tail, left last bit, right loop, right tail, right last bit
        for path in [[1, 2], [3, 4], [5, 6], [7, 8], [9, 10], [11, 12]] {
            assert_eq!(program.cycles_along(&path), Some(I2S_CYCLES_PER_BIT));
        }
    }
}

#[test]
fn audio_word_takes_bit_width_bits() {
    let bit_width = SampleBitWidth::Bits24;
    let program = i2s_in::program(bit_width);
    let loop_bits = bit_width.bits() - 2;

    let loop_cycles = program.cycles_along(&[1, 2]).unwrap() * loop_bits;
    let tail_cycles = program.cycles_along(&[3, 4, 5, 6]).unwrap();

    assert_eq!(loop_cycles + tail_cycles, bit_width.bits() * I2S_CYCLES_PER_BIT);
}

#[test]
fn audio_program_layout() {
    let program = i2s_in::program(SampleBitWidth::Bits32);

    assert_eq!(program.len(), 13);
    assert!(program.len() <= PROGRAM_CAPACITY);
    assert_eq!(program.side_set_roles(), &[PinRole::BitClock, PinRole::WordSelect]);
    assert_eq!(program.program().wrap.target, 1);
    assert_eq!(program.program().wrap.source, 12);
}

#[test]
fn both_programs_fit_one_pio() {
    let led = led_strip::program();
    let audio = i2s_in::program(SampleBitWidth::Bits32);

    assert!(led.len() + audio.len() <= PROGRAM_CAPACITY);
}

#[test]
fn out_of_range_path_is_none() {
    let program = led_strip::program();

    assert_eq!(program.cycles_along(&[0, 4]), None);
    assert_eq!(program.delay_at(4), None);
}

#[test]
fn led_delays_are_encoded() {
    let program = led_strip::program();

    assert_eq!(program.delay_at(0), Some(u32::from(T3 - 1)));
    assert_eq!(program.delay_at(1), Some(u32::from(T1 - 1)));
    assert_eq!(program.delay_at(2), Some(u32::from(T2 - 1)));
    assert_eq!(program.delay_at(3), Some(u32::from(T2 - 1)));
}
