//! Immutable descriptions of the PIO programs the drivers load.
//!
//! A [`ProtocolProgram`] bundles the assembled instructions with the number of PIO
//! cycles one protocol symbol costs and the roles of its side-set pins. The cycle
//! count is what the driver feeds to the divider math, so it must equal the cost of
//! every path a symbol can take through the instructions;
//! [`cycles_along`](ProtocolProgram::cycles_along) recomputes a path's cost from the
//! encoded delay fields.

/// Instruction slots in one PIO block.
pub const PROGRAM_CAPACITY: usize = 32;

/// What a side-set pin carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(not(feature = "host"), derive(defmt::Format))]
pub enum PinRole {
    /// WS2812 data line.
    LedData,
    /// I2S bit clock (BCLK / SCK).
    BitClock,
    /// I2S word select (LRCLK / WS); low for left, high for right.
    WordSelect,
}

/// An assembled PIO program plus the timing facts its driver relies on.
pub struct ProtocolProgram {
    program: pio::Program<PROGRAM_CAPACITY>,
    cycles_per_symbol: u32,
    side_set_bits: u8,
    side_set_roles: &'static [PinRole],
}

impl ProtocolProgram {
    /// Wrap an assembled program. `side_set_bits` counts side-set pins (no optional bit).
    #[must_use]
    pub(crate) const fn new(
        program: pio::Program<PROGRAM_CAPACITY>,
        cycles_per_symbol: u32,
        side_set_bits: u8,
        side_set_roles: &'static [PinRole],
    ) -> Self {
        Self {
            program,
            cycles_per_symbol,
            side_set_bits,
            side_set_roles,
        }
    }

    /// The assembled program, ready for `Common::load_program`.
    #[must_use]
    pub const fn program(&self) -> &pio::Program<PROGRAM_CAPACITY> {
        &self.program
    }

    /// PIO cycles per protocol symbol.
    #[must_use]
    pub const fn cycles_per_symbol(&self) -> u32 {
        self.cycles_per_symbol
    }

    /// Side-set pins, lowest bit first. Pin `n` is the side-set base pin plus `n`.
    #[must_use]
    pub const fn side_set_roles(&self) -> &'static [PinRole] {
        self.side_set_roles
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.program.code.len()
    }

    /// True if the program has no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.program.code.is_empty()
    }

    /// Delay cycles encoded in the instruction at `index`.
    #[must_use]
    pub fn delay_at(&self, index: usize) -> Option<u32> {
        // Bits 12..8 hold side-set bits at the top and delay below.
        let delay_bits = 5_u32.saturating_sub(u32::from(self.side_set_bits));
        let delay_mask = (1_u16 << delay_bits).wrapping_sub(1);
        self.program
            .code
            .get(index)
            .map(|instruction| u32::from((instruction >> 8) & delay_mask))
    }

    /// Total cycles to execute the instructions at `path` once each, in order.
    ///
    /// Returns `None` if any index is out of range.
    #[must_use]
    pub fn cycles_along(&self, path: &[usize]) -> Option<u32> {
        path.iter().try_fold(0_u32, |total, &index| {
            let delay = self.delay_at(index)?;
            total.checked_add(delay)?.checked_add(1)
        })
    }
}
