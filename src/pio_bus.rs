//! Shared ownership of one PIO block: its instruction memory, its state machine claims,
//! and the programs loaded into it.
//!
//! [`pio_split!`](macro@crate::pio_split) turns a PIO peripheral into a `'static` [`PioBus`]
//! and four [`PioStateMachine`]s. Drivers take a `PioStateMachine` by value, claim its
//! index on the bus, and load their program through the bus.

use core::cell::RefCell;

use embassy_rp::pio::{Common, Instance, LoadedProgram, StateMachine};
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::once_lock::OnceLock;

use crate::channel::{CHANNELS_PER_PIO, ChannelArena, ChannelClaim};
use crate::program::ProtocolProgram;
use crate::{Error, Result};

// ============================================================================
// PIO Bus
// ============================================================================

/// Shared `Common` resource, state machine claims, and the WS2812 program for one PIO.
#[doc(hidden)] // Support type for `pio_split!`; not intended as surface API
pub struct PioBus<'d, PIO: Instance> {
    common: Mutex<CriticalSectionRawMutex, RefCell<Common<'d, PIO>>>,
    channels: ChannelArena<CHANNELS_PER_PIO>,
    led_program: OnceLock<LoadedProgram<'d, PIO>>,
}

impl<'d, PIO: Instance> PioBus<'d, PIO> {
    /// Wrap the `Common` half of a freshly split PIO.
    pub fn new(common: Common<'d, PIO>) -> Self {
        Self {
            common: Mutex::new(RefCell::new(common)),
            channels: ChannelArena::new(),
            led_program: OnceLock::new(),
        }
    }

    /// Claim state machine `index` for the life of the firmware.
    ///
    /// # Errors
    ///
    /// [`Error::ChannelUnavailable`] if it is already claimed.
    pub fn claim_channel(&self, index: usize) -> Result<ChannelClaim> {
        self.channels.claim(index)
    }

    /// True once state machine `index` has been claimed.
    pub fn is_claimed(&self, index: usize) -> bool {
        self.channels.is_claimed(index)
    }

    /// The WS2812 program, loaded on first use. Strips on the same PIO share one copy.
    ///
    /// # Errors
    ///
    /// [`Error::ProgramSpace`] if the program does not fit in the free instruction slots.
    pub fn led_program(&'static self, program: &ProtocolProgram) -> Result<&'static LoadedProgram<'d, PIO>> {
        if let Some(loaded) = self.led_program.try_get() {
            return Ok(loaded);
        }
        let loaded = self
            .with_common(|common| common.try_load_program(program.program()))
            .map_err(|_| Error::ProgramSpace)?;
        // Another caller may have won the race; its copy is used and ours stays loaded but idle.
        Ok(self.led_program.get_or_init(|| loaded))
    }

    /// Run `f` with exclusive access to the `Common` resource.
    pub fn with_common<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Common<'d, PIO>) -> R,
    {
        self.common.lock(|common_cell: &RefCell<Common<'d, PIO>>| {
            let mut common = common_cell.borrow_mut();
            f(&mut common)
        })
    }
}

// ============================================================================
// State Machine Handle
// ============================================================================

/// A state machine bundled with its PIO bus.
///
/// Returned by [`pio_split!`](macro@crate::pio_split) and passed to driver constructors.
pub struct PioStateMachine<PIO: Instance + 'static, const SM: usize> {
    bus: &'static PioBus<'static, PIO>,
    state_machine: StateMachine<'static, PIO, SM>,
}

impl<PIO: Instance + 'static, const SM: usize> PioStateMachine<PIO, SM> {
    #[doc(hidden)]
    pub fn new(bus: &'static PioBus<'static, PIO>, state_machine: StateMachine<'static, PIO, SM>) -> Self {
        Self { bus, state_machine }
    }

    /// The shared bus.
    #[must_use]
    pub fn bus(&self) -> &'static PioBus<'static, PIO> {
        self.bus
    }

    #[doc(hidden)]
    pub fn into_parts(self) -> (&'static PioBus<'static, PIO>, StateMachine<'static, PIO, SM>) {
        (self.bus, self.state_machine)
    }
}

// ============================================================================
// Splitting
// ============================================================================

/// Split `pio` into a bus stored in `bus_cell` and its four state machines.
///
/// Prefer [`pio_split!`](macro@crate::pio_split), which supplies the cell.
///
/// # Panics
///
/// If `bus_cell` was already initialized, i.e. the same PIO is split twice.
#[allow(clippy::type_complexity, reason = "one handle per state machine")]
pub fn split<PIO: crate::pio_irqs::PioPeripheral>(
    pio: embassy_rp::Peri<'static, PIO>,
    bus_cell: &'static static_cell::StaticCell<PioBus<'static, PIO>>,
) -> (
    PioStateMachine<PIO, 0>,
    PioStateMachine<PIO, 1>,
    PioStateMachine<PIO, 2>,
    PioStateMachine<PIO, 3>,
) {
    let embassy_rp::pio::Pio {
        common,
        sm0,
        sm1,
        sm2,
        sm3,
        ..
    } = embassy_rp::pio::Pio::new(pio, PIO::irqs());
    let bus: &'static PioBus<'static, PIO> = bus_cell.init_with(|| PioBus::new(common));
    (
        PioStateMachine::new(bus, sm0),
        PioStateMachine::new(bus, sm1),
        PioStateMachine::new(bus, sm2),
        PioStateMachine::new(bus, sm3),
    )
}

/// Split a PIO peripheral into its four [`PioStateMachine`]s.
///
/// Each expansion owns a fresh `static` bus cell, so expand it once per PIO.
///
/// ```rust,ignore
/// let p = embassy_rp::init(Default::default());
/// let (sm0, sm1, _sm2, _sm3) = pio_envoy::pio_split!(PIO0, p.PIO0);
/// ```
#[macro_export]
macro_rules! pio_split {
    ($pio:ident, $peri:expr) => {{
        static PIO_BUS: ::static_cell::StaticCell<
            $crate::pio_bus::PioBus<'static, ::embassy_rp::peripherals::$pio>,
        > = ::static_cell::StaticCell::new();
        $crate::pio_bus::split::<::embassy_rp::peripherals::$pio>($peri, &PIO_BUS)
    }};
}
