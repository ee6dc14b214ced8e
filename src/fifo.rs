//! The seam between protocol drivers and a state machine's FIFOs.
//!
//! Drivers talk to [`TxFifo`] and [`RxFifo`] rather than to `embassy_rp` directly, so
//! the encoding and decoding logic runs the same against hardware and against test
//! doubles on the host.

/// Software-to-state-machine queue.
pub trait TxFifo {
    /// Push `word` if there is room. Returns `false` (and drops nothing) when full.
    fn try_push(&mut self, word: u32) -> bool;

    /// Wait until there is room, then push `word`.
    async fn wait_push(&mut self, word: u32);
}

/// State-machine-to-software queue.
///
/// Words come out left-aligned: the first bit the state machine shifted in is bit 31.
pub trait RxFifo {
    /// Words currently queued.
    fn level(&mut self) -> u8;

    /// Pop the oldest word, or `None` if empty.
    fn try_pull(&mut self) -> Option<u32>;

    /// Wait for a word and pop it.
    async fn wait_pull(&mut self) -> u32;
}

#[cfg(not(feature = "host"))]
pub use self::pio_fifo::{PioRxFifo, PioTxFifo};

#[cfg(not(feature = "host"))]
mod pio_fifo {
    use embassy_rp::pio::{Instance, StateMachine};

    use super::{RxFifo, TxFifo};
    use crate::channel::ChannelClaim;

    /// TX side of a claimed, running state machine.
    pub struct PioTxFifo<PIO: Instance + 'static, const SM: usize> {
        sm: StateMachine<'static, PIO, SM>,
        _claim: ChannelClaim,
    }

    impl<PIO: Instance + 'static, const SM: usize> PioTxFifo<PIO, SM> {
        pub(crate) fn new(sm: StateMachine<'static, PIO, SM>, claim: ChannelClaim) -> Self {
            Self { sm, _claim: claim }
        }
    }

    impl<PIO: Instance + 'static, const SM: usize> TxFifo for PioTxFifo<PIO, SM> {
        fn try_push(&mut self, word: u32) -> bool {
            self.sm.tx().try_push(word)
        }

        async fn wait_push(&mut self, word: u32) {
            self.sm.tx().wait_push(word).await;
        }
    }

    /// RX side of a claimed, running state machine.
    ///
    /// With autopush below 32 bits the state machine pushes its sample in the low bits
    /// of the word; this adapter shifts it back to the top.
    pub struct PioRxFifo<PIO: Instance + 'static, const SM: usize> {
        sm: StateMachine<'static, PIO, SM>,
        align_shift: u32,
        _claim: ChannelClaim,
    }

    impl<PIO: Instance + 'static, const SM: usize> PioRxFifo<PIO, SM> {
        pub(crate) fn new(
            sm: StateMachine<'static, PIO, SM>,
            push_threshold: u32,
            claim: ChannelClaim,
        ) -> Self {
            Self {
                sm,
                align_shift: 32_u32.saturating_sub(push_threshold),
                _claim: claim,
            }
        }

        fn align(&self, word: u32) -> u32 {
            word.checked_shl(self.align_shift).unwrap_or(0)
        }
    }

    impl<PIO: Instance + 'static, const SM: usize> RxFifo for PioRxFifo<PIO, SM> {
        fn level(&mut self) -> u8 {
            self.sm.rx().level()
        }

        fn try_pull(&mut self) -> Option<u32> {
            let word = self.sm.rx().try_pull()?;
            Some(self.align(word))
        }

        async fn wait_pull(&mut self) -> u32 {
            let word = self.sm.rx().wait_pull().await;
            self.align(word)
        }
    }
}
