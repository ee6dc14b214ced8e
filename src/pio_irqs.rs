//! Crate-level PIO interrupt bindings, shared by every driver on a PIO.

use embassy_rp::bind_interrupts;
use embassy_rp::interrupt::typelevel::Binding;
use embassy_rp::peripherals::{PIO0, PIO1};
use embassy_rp::pio::{Instance, InterruptHandler};

bind_interrupts!(pub struct Pio0Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

bind_interrupts!(pub struct Pio1Irqs {
    PIO1_IRQ_0 => InterruptHandler<PIO1>;
});

#[cfg(feature = "pico2")]
bind_interrupts!(pub struct Pio2Irqs {
    PIO2_IRQ_0 => InterruptHandler<embassy_rp::peripherals::PIO2>;
});

/// A PIO peripheral together with its interrupt binding.
pub trait PioPeripheral: Instance {
    /// The interrupt binding type for this PIO
    type Irqs: Binding<<Self as Instance>::Interrupt, InterruptHandler<Self>>;

    /// Get the interrupt configuration
    fn irqs() -> Self::Irqs;
}

impl PioPeripheral for PIO0 {
    type Irqs = Pio0Irqs;

    fn irqs() -> Self::Irqs {
        Pio0Irqs
    }
}

impl PioPeripheral for PIO1 {
    type Irqs = Pio1Irqs;

    fn irqs() -> Self::Irqs {
        Pio1Irqs
    }
}

#[cfg(feature = "pico2")]
impl PioPeripheral for embassy_rp::peripherals::PIO2 {
    type Irqs = Pio2Irqs;

    fn irqs() -> Self::Irqs {
        Pio2Irqs
    }
}
